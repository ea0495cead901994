//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent malformed diagnostic data.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("integrity error in template {template}: {violation}")]
    Integrity {
        template: String,
        violation: IntegrityViolation,
    },

    #[error("unknown part {part_id} referenced by node {node_id}")]
    UnknownPart { part_id: String, node_id: String },
}

/// Structural defects that make a tree unusable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntegrityViolation {
    #[error("root node {0} not found")]
    MissingRoot(String),

    #[error("duplicate node id: {0}")]
    DuplicateNode(String),

    #[error("node with empty id")]
    EmptyNodeId,

    #[error("node id {0} is reserved for the terminal marker")]
    ReservedNodeId(String),

    #[error("question {0} has no yes-target")]
    MissingYesTarget(String),

    #[error("question {0} has no no-target and is not continue-only")]
    MissingNoTarget(String),

    #[error("node {node}: unknown type {value}")]
    UnknownNodeType { node: String, value: String },

    #[error("node {node}: unknown question mode {value}")]
    UnknownMode { node: String, value: String },

    #[error("node {node}: unknown end result {value}")]
    UnknownResult { node: String, value: String },
}

impl DomainError {
    pub fn integrity(template: impl Into<String>, violation: IntegrityViolation) -> Self {
        Self::Integrity {
            template: template.into(),
            violation,
        }
    }
}
