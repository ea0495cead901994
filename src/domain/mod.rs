//! Domain layer: entities and business logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod audit;
pub mod builder;
pub mod entities;
pub mod error;
pub mod parts;
pub mod schema;
pub mod traversal;

pub use audit::{audit, AuditReport, Finding};
pub use builder::{TreeBuilder, TreeResult};
pub use entities::*;
pub use error::{DomainError, IntegrityViolation};
pub use parts::PartsResolver;
pub use traversal::{Answer, EphemeralEnd, PathEntry, Position, TraversalState};
