//! Error types for `funccover-core`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for instrumentation operations.
pub type Result<T> = std::result::Result<T, FuncCoverError>;

/// A Go source file that could not be understood.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct ParseError {
    /// 1-indexed line of the offending token
    pub line: u32,
    /// What went wrong
    pub message: String,
}

impl ParseError {
    /// Create a parse error at `line`.
    pub fn new(line: u32, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// Errors that can occur while instrumenting a package.
#[derive(Debug, Error)]
pub enum FuncCoverError {
    /// A source unit could not be read
    #[error("Failed to read source unit '{path}': {source}")]
    Read {
        /// Unit path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A source unit failed to parse
    #[error("Failed to parse '{path}': {source}")]
    Parse {
        /// Unit path
        path: PathBuf,
        /// Parse failure
        #[source]
        source: ParseError,
    },

    /// More than one unit declares the entry function
    #[error("Entry function declared in both '{first}' and '{second}'")]
    DuplicateEntry {
        /// First unit in path order
        first: PathBuf,
        /// Second unit in path order
        second: PathBuf,
    },

    /// Two units would be staged under the same file name
    #[error("Source units '{first}' and '{second}' share the base name '{name}'")]
    DuplicateBaseName {
        /// Shared base name
        name: String,
        /// First unit
        first: PathBuf,
        /// Second unit
        second: PathBuf,
    },

    /// The session has no source units
    #[error("No source units to instrument")]
    NoSources,

    /// Function records do not match the content they were computed from
    #[error("Stale function records: {0}")]
    StaleRecords(String),

    /// Invariant violated while rewriting
    #[error("Internal instrumentation error: {0}")]
    Internal(String),

    /// Generated code could not be built
    #[error(transparent)]
    Gen(#[from] funccover_gen::GenError),

    /// Staging or manifest write failed
    #[error("Failed to write '{path}': {source}")]
    Write {
        /// Target path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Import configuration could not be patched
    #[error("Failed to patch import configuration '{path}': {source}")]
    ImportCfg {
        /// importcfg path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Staged file no longer matches the session manifest
    #[error("Hash mismatch for '{path}': expected {expected}, got {actual}")]
    HashMismatch {
        /// Staged file
        path: PathBuf,
        /// Hash recorded in the manifest
        expected: String,
        /// Hash of the file on disk
        actual: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
