//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, Prompter)
//! but are themselves concrete structs, not traits.

mod audit;
mod loader;
mod session;

pub use audit::{
    AuditService, AuditSummary, DataIssue, MachineAudit, TemplateAudit, TemplateOutcome,
};
pub use loader::{TemplateSource, TreeLoader};
pub use session::{Session, SessionCommand, SessionView};
