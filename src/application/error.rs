//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::DomainError;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("machine id not mapped to a template: {0}")]
    MachineNotFound(String),

    #[error("template {template} not found for locales [{}]", .locales.join(", "))]
    TemplateNotFound {
        template: String,
        locales: Vec<String>,
    },

    #[error("invalid template id: {0}")]
    InvalidTemplateId(String),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{context}: {source}")]
    Parse {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApplicationError {
    /// Unmapped machine or missing template.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ApplicationError::MachineNotFound(_) | ApplicationError::TemplateNotFound { .. }
        )
    }

    /// Data file that does not exist at all.
    pub fn is_missing_file(&self) -> bool {
        matches!(
            self,
            ApplicationError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound
        )
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
