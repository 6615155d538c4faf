//! funccover: function coverage for Go programs via `go build -toolexec`
//!
//! The binary sits in front of every toolchain tool the go command runs.
//! Compiles of the entry package are redirected to instrumented copies of
//! their sources; links get the coverage runtime and its dependencies added
//! to the import manifest; everything else runs untouched.
//!
//! ```text
//! funccover -emit-runtime ./covcollect        # Go runtime package source
//! go build -toolexec '/path/to/funccover -period 2s -o cover.out' ./cmd/app
//! funccover -report cover.out                 # summarize a run
//! ```

#![warn(missing_docs)]

pub mod commands;
pub mod config;
pub mod error;
pub mod interceptor;
pub mod invocation;
pub mod logging;
pub mod tasks;

pub use commands::{normalize_args, Cli, Task};
pub use config::{InterceptConfig, Verbosity};
pub use error::{CliError, CliResult};
pub use interceptor::Interceptor;
pub use invocation::{ToolInvocation, ToolKind};

/// Run the standalone task or the forwarded invocation described by `cli`,
/// returning the exit code to report.
///
/// # Errors
///
/// Returns an error if configuration is invalid, instrumentation fails or
/// the tool cannot be started.
pub fn run(cli: &Cli) -> CliResult<u8> {
    if let Some(task) = cli.task() {
        tasks::run_task(&task, &mut std::io::stdout().lock())?;
        return Ok(0);
    }
    let config = cli.to_config();
    config.validate()?;
    let invocation = ToolInvocation::parse(cli.tool.clone())
        .ok_or_else(|| CliError::config("missing tool to run"))?;
    Interceptor::new(config).run(invocation)
}
