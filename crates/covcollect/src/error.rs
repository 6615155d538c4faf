//! Error types for the collection runtime.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for collection operations
pub type CollectResult<T> = Result<T, CollectError>;

/// Errors that can occur while building, collecting or reading a counter table
#[derive(Debug, Error)]
pub enum CollectError {
    /// The parallel sequences of a counter table differ in length
    #[error("Counter table mismatch: {names} names, {lines} lines, {flags} flags")]
    TableMismatch {
        /// Number of function names
        names: usize,
        /// Number of source lines
        lines: usize,
        /// Number of execution flags
        flags: usize,
    },

    /// The coverage file could not be created
    #[error("Failed to create coverage file '{}': {source}", path.display())]
    Create {
        /// Output path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// The coverage file could not be written
    #[error("Failed to write coverage file '{}': {source}", path.display())]
    Write {
        /// Output path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// The background collection thread could not be started
    #[error("Failed to start periodic collection: {0}")]
    Spawn(#[source] std::io::Error),

    /// A coverage file line is not `name:line:flag`
    #[error("Malformed coverage line {line_number}: '{content}'")]
    MalformedLine {
        /// 1-indexed line number in the coverage file
        line_number: usize,
        /// Offending line
        content: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
