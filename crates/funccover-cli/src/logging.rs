//! Log output for the wrapper process.
//!
//! Stdout belongs to the wrapped tool (`compile -V=full` is parsed by the
//! go command), so logs always go to stderr.

use crate::config::Verbosity;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a `tracing` filter directive.
pub const LOG_ENV: &str = "FUNCCOVER_LOG";

/// Build the filter: `FUNCCOVER_LOG` if set and valid, else the
/// verbosity default.
#[must_use]
pub fn filter(verbosity: Verbosity) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(verbosity.filter()))
}

/// Install the stderr subscriber. A second call is a no-op.
pub fn init(verbosity: Verbosity) {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter(verbosity))
        .with_target(false)
        .try_init();
}
