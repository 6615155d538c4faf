//! Error types for `funccover-gen`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for generation operations.
pub type Result<T> = std::result::Result<T, GenError>;

/// Errors that can occur while building generated Go code.
#[derive(Debug, Error)]
pub enum GenError {
    /// Invalid identifier name (keyword, invalid characters, etc.)
    #[error("Invalid identifier '{name}': {reason}")]
    InvalidIdentifier {
        /// The invalid identifier
        name: String,
        /// Why it's invalid
        reason: String,
    },

    /// Invalid import path
    #[error("Invalid import path '{path}': {reason}")]
    InvalidImportPath {
        /// The rejected path
        path: String,
        /// Why it's invalid
        reason: String,
    },

    /// Writing generated source failed
    #[error("Failed to write '{}': {source}", path.display())]
    Write {
        /// Target path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}
