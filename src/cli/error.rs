//! CLI-level errors (wraps every lower layer)

use std::path::PathBuf;

use thiserror::Error;

use crate::commands::CommandError;
use crate::config::SettingsError;
use crate::logging::LoggingError;
use crate::registry::RegistryError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Settings(#[from] SettingsError),

    #[error("logging setup failed: {0}")]
    Logging(#[from] LoggingError),

    #[error("command tree: {0}")]
    Registry(#[from] RegistryError),

    #[error("{0}")]
    Command(#[from] CommandError),

    #[error("cannot detect shell, pass one explicitly (bash, zsh, fish)")]
    UnknownShell,

    #[error("completion install is not supported for {0}")]
    UnsupportedShell(String),

    #[error("cannot write completion to {path}: {source}")]
    Completion {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Settings(_) | CliError::Logging(_) => crate::exitcode::CONFIG,
            CliError::Registry(_) => crate::exitcode::SOFTWARE,
            CliError::Command(e) => e.exit_code(),
            CliError::UnknownShell | CliError::UnsupportedShell(_) => crate::exitcode::USAGE,
            CliError::Completion { .. } => crate::exitcode::CANTCREAT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exitcode;

    #[test]
    fn given_startup_errors_when_mapping_then_config_exit_code() {
        let settings = CliError::from(SettingsError {
            message: "bad".into(),
        });
        let logging = CliError::from(LoggingError::AlreadyInitialized);
        assert_eq!(settings.exit_code(), exitcode::CONFIG);
        assert_eq!(logging.exit_code(), exitcode::CONFIG);
    }

    #[test]
    fn given_child_exit_when_mapping_then_child_code_kept() {
        let err = CliError::from(CommandError::Exited {
            program: "mcs_backup_manager.sh".into(),
            code: 3,
        });
        assert_eq!(err.exit_code(), 3);
    }
}
