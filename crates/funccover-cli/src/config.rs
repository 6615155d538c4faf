//! Interceptor configuration

use crate::error::{CliError, CliResult};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Log verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Warnings and errors only
    #[default]
    Normal,
    /// Decisions per invocation
    Verbose,
    /// Everything, including per-unit staging
    Debug,
}

impl Verbosity {
    /// Map a `-v` count to a level
    #[must_use]
    pub const fn from_count(count: u8) -> Self {
        match count {
            0 => Self::Normal,
            1 => Self::Verbose,
            _ => Self::Debug,
        }
    }

    /// Default `tracing` filter directive for this level
    #[must_use]
    pub const fn filter(self) -> &'static str {
        match self {
            Self::Normal => "warn",
            Self::Verbose => "info",
            Self::Debug => "debug",
        }
    }

    /// Check if verbose or higher
    #[must_use]
    pub const fn is_verbose(self) -> bool {
        matches!(self, Self::Verbose | Self::Debug)
    }
}

/// Settings for one interceptor run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterceptConfig {
    /// Periodic collection interval; zero disables it
    pub period: Duration,
    /// Staging directory; defaults to the compile output's directory
    pub staging_dir: Option<PathBuf>,
    /// Coverage output file written by the instrumented program
    pub output_file: String,
    /// Prebuilt runtime archive
    pub runtime_archive: Option<PathBuf>,
    /// Standard-library archive directory
    pub stdlib_dir: Option<PathBuf>,
    /// Log verbosity
    pub verbosity: Verbosity,
}

impl Default for InterceptConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl InterceptConfig {
    /// Create default configuration
    #[must_use]
    pub fn new() -> Self {
        Self {
            period: Duration::ZERO,
            staging_dir: None,
            output_file: funccover_core::DEFAULT_OUTPUT_FILE.to_string(),
            runtime_archive: None,
            stdlib_dir: None,
            verbosity: Verbosity::Normal,
        }
    }

    /// Set periodic collection interval
    #[must_use]
    pub const fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Set staging directory
    #[must_use]
    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = Some(dir.into());
        self
    }

    /// Set coverage output file
    #[must_use]
    pub fn with_output_file(mut self, output_file: impl Into<String>) -> Self {
        self.output_file = output_file.into();
        self
    }

    /// Set runtime archive
    #[must_use]
    pub fn with_runtime_archive(mut self, path: impl Into<PathBuf>) -> Self {
        self.runtime_archive = Some(path.into());
        self
    }

    /// Set standard-library archive directory
    #[must_use]
    pub fn with_stdlib_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdlib_dir = Some(path.into());
        self
    }

    /// Set verbosity
    #[must_use]
    pub const fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Check settings every invocation needs
    pub fn validate(&self) -> CliResult<()> {
        if self.output_file.trim().is_empty() {
            return Err(CliError::config("coverage output file name must not be empty"));
        }
        Ok(())
    }

    /// Runtime archive, required to compile or link an instrumented package
    pub fn runtime_archive(&self) -> CliResult<&Path> {
        self.runtime_archive.as_deref().ok_or_else(|| {
            CliError::config("runtime archive not set (use -runtime or FUNCCOVER_RUNTIME)")
        })
    }

    /// Standard-library archive directory, required to patch link
    pub fn stdlib_dir(&self) -> CliResult<&Path> {
        self.stdlib_dir.as_deref().ok_or_else(|| {
            CliError::config("standard library directory not set (use -stdlib or FUNCCOVER_STDLIB)")
        })
    }
}
