//! Equipment troubleshooting assistant.
//!
//! A machine id resolves to a decision-tree template; the tree is validated,
//! spare parts from the catalog are attached to its end nodes, and a
//! [`domain::TraversalState`] walks it answer by answer.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
