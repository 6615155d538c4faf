//! Error types for the CLI

use std::ffi::OsString;
use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// The entry package was compiled but no unit declares `main`
    #[error("No source unit of package '{package}' declares func main")]
    NoEntryUnit {
        /// Package being compiled
        package: String,
    },

    /// Instrumentation failed
    #[error("Instrumentation failed: {0}")]
    Instrument(#[from] funccover_core::FuncCoverError),

    /// Runtime source could not be generated
    #[error("Runtime generation failed: {0}")]
    Generate(#[from] funccover_gen::GenError),

    /// Coverage file could not be read
    #[error("Coverage report failed: {0}")]
    Report(#[from] covcollect::CollectError),

    /// Staged sources do not match their session manifest
    #[error("Staging check failed: {0}")]
    Verify(#[source] funccover_core::FuncCoverError),

    /// The wrapped tool could not be started
    #[error("Failed to run '{}': {source}", tool.to_string_lossy())]
    Spawn {
        /// Tool path
        tool: OsString,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Process exit code for this error: 2 for usage and configuration
    /// problems, 1 otherwise
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Config { .. } => 2,
            _ => 1,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error() {
        let err = CliError::config("bad config");
        assert!(err.to_string().contains("Configuration"));
        assert!(err.to_string().contains("bad config"));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_no_entry_unit_error() {
        let err = CliError::NoEntryUnit {
            package: "main".to_string(),
        };
        assert!(err.to_string().contains("func main"));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_instrument_error() {
        let err: CliError = funccover_core::FuncCoverError::NoSources.into();
        assert!(err.to_string().contains("Instrumentation failed"));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_verify_error() {
        let err = CliError::Verify(funccover_core::FuncCoverError::Internal("x".to_string()));
        assert!(err.to_string().starts_with("Staging check failed"));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_spawn_error() {
        let err = CliError::Spawn {
            tool: OsString::from("/no/compile"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.to_string().contains("/no/compile"));
    }

    #[test]
    fn test_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: CliError = io_err.into();
        assert!(err.to_string().contains("I/O error"));
    }
}
