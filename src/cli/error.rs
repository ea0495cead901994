//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("{0}")]
    Usage(String),

    #[error("check failed: {0} problem(s) found")]
    CheckFailed(usize),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::CheckFailed(_) => crate::exitcode::DATAERR,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::Prompt(_) => crate::exitcode::IOERR,
                InfraError::Application(app) => match app {
                    ApplicationError::MachineNotFound(_)
                    | ApplicationError::TemplateNotFound { .. } => crate::exitcode::NOINPUT,
                    ApplicationError::Io { .. } if app.is_missing_file() => {
                        crate::exitcode::NOINPUT
                    }
                    ApplicationError::Domain(_) | ApplicationError::Parse { .. } => {
                        crate::exitcode::DATAERR
                    }
                    ApplicationError::InvalidTemplateId(_) => crate::exitcode::USAGE,
                    ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                    ApplicationError::Io { .. } => crate::exitcode::IOERR,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DomainError, IntegrityViolation};
    use std::io;

    #[test]
    fn given_unmapped_machine_when_mapping_exit_code_then_noinput() {
        let err = CliError::from(ApplicationError::MachineNotFound("M-1".into()));
        assert_eq!(err.exit_code(), crate::exitcode::NOINPUT);
    }

    #[test]
    fn given_integrity_error_when_mapping_exit_code_then_dataerr() {
        let err = CliError::from(ApplicationError::Domain(DomainError::integrity(
            "t",
            IntegrityViolation::MissingRoot("q1".into()),
        )));
        assert_eq!(err.exit_code(), crate::exitcode::DATAERR);
    }

    #[test]
    fn given_unparsable_data_file_when_mapping_exit_code_then_dataerr() {
        let source = serde_json::from_str::<serde_json::Value>("{ not json").unwrap_err();
        let err = CliError::from(ApplicationError::Parse {
            context: "parse template: broken.en.json".into(),
            source,
        });
        assert_eq!(err.exit_code(), crate::exitcode::DATAERR);
    }

    #[test]
    fn given_missing_data_file_when_mapping_exit_code_then_noinput() {
        let err = CliError::from(ApplicationError::Io {
            context: "read machine index: machines.json".into(),
            source: io::Error::from(io::ErrorKind::NotFound),
        });
        assert_eq!(err.exit_code(), crate::exitcode::NOINPUT);
    }

    #[test]
    fn given_unreadable_data_file_when_mapping_exit_code_then_ioerr() {
        let err = CliError::from(ApplicationError::Io {
            context: "read parts catalog: parts.json".into(),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        });
        assert_eq!(err.exit_code(), crate::exitcode::IOERR);
    }

    #[test]
    fn given_config_error_when_mapping_exit_code_then_config() {
        let err = CliError::from(ApplicationError::Config {
            message: "bad".into(),
        });
        assert_eq!(err.exit_code(), crate::exitcode::CONFIG);
    }
}
