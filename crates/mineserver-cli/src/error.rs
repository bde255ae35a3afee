//! CLI-specific error types and mappings.
//!
//! Maps core, persistence and supervisor errors to exit codes and
//! user-facing messages.

use mineserver_core::{PathError, RepositoryError, SettingsError};
use mineserver_runtime::SupervisorError;
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// IO error (file not found, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The server executable is missing.
    #[error("{0}")]
    NotInstalled(String),

    /// Process control error.
    #[error("Process error: {0}")]
    Process(String),
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow Unix conventions:
    /// - 0: Success
    /// - 2: Misuse of shell command (invalid arguments)
    /// - 64-78: Reserved for specific error categories (see sysexits.h)
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Arguments(_) => 2,     // EX_USAGE
            Self::NotInstalled(_) => 69, // EX_UNAVAILABLE
            Self::Process(_) => 71,      // EX_OSERR
            Self::Io(_) => 74,           // EX_IOERR
            Self::Config(_) => 78,       // EX_CONFIG
        }
    }
}

impl From<RepositoryError> for CliError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Storage(msg) => Self::Io(msg),
            RepositoryError::Serialization(msg) => Self::Config(msg),
            RepositoryError::Invalid(settings_err) => settings_err.into(),
        }
    }
}

impl From<SettingsError> for CliError {
    fn from(err: SettingsError) -> Self {
        Self::Arguments(err.to_string())
    }
}

impl From<PathError> for CliError {
    fn from(err: PathError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<SupervisorError> for CliError {
    fn from(err: SupervisorError) -> Self {
        match err {
            SupervisorError::NotInstalled(_) => Self::NotInstalled(err.to_string()),
            SupervisorError::Spawn(_)
            | SupervisorError::AlreadyRunning(_)
            | SupervisorError::NotRunning
            | SupervisorError::PipeClosed => Self::Process(err.to_string()),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_settings_errors_are_usage_errors() {
        let err = CliError::from(RepositoryError::Invalid(SettingsError::InvalidMaxPlayers));
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.to_string(), "Invalid arguments: Max players must be at least 1");
    }

    #[test]
    fn test_not_installed_exit_code() {
        let err = CliError::from(SupervisorError::NotInstalled(PathBuf::from("/srv/bedrock_server")));
        assert_eq!(err.exit_code(), 69);
        assert!(err.to_string().contains("/srv/bedrock_server"));
    }

    #[test]
    fn test_supervisor_errors_are_process_errors() {
        let err = CliError::from(SupervisorError::NotRunning);
        assert_eq!(err.exit_code(), 71);
        assert_eq!(err.to_string(), "Process error: Server is not running");
    }

    #[test]
    fn test_storage_errors_are_io_errors() {
        let err = CliError::from(RepositoryError::Storage("disk full".to_string()));
        assert_eq!(err.exit_code(), 74);
    }
}
