//! CLI definition using clap
//!
//! `go build -toolexec` prepends the wrapper command to every tool
//! invocation, so the command line is `funccover [flags] <tool> <tool args>`.
//! Flags follow Go conventions (`-period 2s`, `-dir=/tmp/x`); they are
//! rewritten to clap's GNU form by [`normalize_args`] before parsing, and
//! everything from the tool path on is passed through verbatim.

use crate::config::{InterceptConfig, Verbosity};
use clap::Parser;
use funccover_core::DEFAULT_OUTPUT_FILE;
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

/// funccover: function coverage instrumentation for Go builds
///
/// Use as `go build -toolexec '/path/to/funccover [flags]'`.
#[derive(Parser, Debug)]
#[command(name = "funccover")]
#[command(author, version, about, long_about = None)]
#[command(group(clap::ArgGroup::new("task").multiple(false)))]
pub struct Cli {
    /// Periodic collection interval (e.g. 2s, 500ms); 0 disables it
    #[arg(long, value_name = "DURATION", default_value = "0", value_parser = parse_period)]
    pub period: Duration,

    /// Directory for instrumented sources, one subdirectory per session
    /// [default: directory of the compile output]
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Coverage output file written by the instrumented program
    #[arg(short = 'o', long = "output", value_name = "FILE", default_value = DEFAULT_OUTPUT_FILE)]
    pub output: String,

    /// Prebuilt covcollect archive
    #[arg(long, value_name = "FILE", env = "FUNCCOVER_RUNTIME")]
    pub runtime: Option<PathBuf>,

    /// Directory of standard-library archives, used when patching link
    #[arg(long, value_name = "DIR", env = "FUNCCOVER_STDLIB")]
    pub stdlib: Option<PathBuf>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Write the Go runtime package source into DIR and exit
    #[arg(long, value_name = "DIR", group = "task")]
    pub emit_runtime: Option<PathBuf>,

    /// Summarize a coverage file written by an instrumented program and exit
    #[arg(long, value_name = "FILE", group = "task")]
    pub report: Option<PathBuf>,

    /// Check a staging directory against its session manifest and exit
    #[arg(long, value_name = "DIR", group = "task")]
    pub verify: Option<PathBuf>,

    /// Tool to run, followed by its arguments
    #[arg(
        required_unless_present_any = ["emit_runtime", "report", "verify"],
        conflicts_with_all = ["emit_runtime", "report", "verify"],
        num_args = 1..,
        trailing_var_arg = true,
        value_name = "TOOL"
    )]
    pub tool: Vec<OsString>,
}

/// Standalone work requested instead of wrapping a tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// Write the runtime source
    EmitRuntime(PathBuf),
    /// Summarize a coverage file
    Report(PathBuf),
    /// Verify staged sources
    Verify(PathBuf),
}

impl Cli {
    /// Standalone task, if one was requested.
    #[must_use]
    pub fn task(&self) -> Option<Task> {
        if let Some(dir) = &self.emit_runtime {
            return Some(Task::EmitRuntime(dir.clone()));
        }
        if let Some(file) = &self.report {
            return Some(Task::Report(file.clone()));
        }
        self.verify.clone().map(Task::Verify)
    }

    /// Build the interceptor configuration from parsed flags.
    #[must_use]
    pub fn to_config(&self) -> InterceptConfig {
        let mut config = InterceptConfig::new()
            .with_period(self.period)
            .with_output_file(self.output.clone())
            .with_verbosity(Verbosity::from_count(self.verbose));
        if let Some(dir) = &self.dir {
            config = config.with_staging_dir(dir.clone());
        }
        if let Some(runtime) = &self.runtime {
            config = config.with_runtime_archive(runtime.clone());
        }
        if let Some(stdlib) = &self.stdlib {
            config = config.with_stdlib_dir(stdlib.clone());
        }
        config
    }
}

/// Parse a collection period. `0` disables collection.
fn parse_period(value: &str) -> Result<Duration, String> {
    if value.trim() == "0" {
        return Ok(Duration::ZERO);
    }
    humantime::parse_duration(value).map_err(|e| format!("invalid duration '{value}': {e}"))
}

/// Long flags accepted with a single dash, and whether they take a value.
const LONG_FLAGS: &[(&str, bool)] = &[
    ("period", true),
    ("dir", true),
    ("output", true),
    ("runtime", true),
    ("stdlib", true),
    ("emit-runtime", true),
    ("report", true),
    ("verify", true),
    ("verbose", false),
    ("help", false),
    ("version", false),
];

/// Rewrite Go-style flags for clap and separate the tool command.
///
/// `-name` and `-name=value` become `--name` / `--name=value` for known
/// long flags; `-o=value` becomes `--output=value`. A `--` is inserted before
/// the first operand so the tool's own flags are never parsed as ours.
/// Unknown flags stay in front of it, where clap rejects them.
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator,
    I::Item: Into<OsString>,
{
    let mut args = args.into_iter().map(Into::into);
    let mut out: Vec<OsString> = args.next().into_iter().collect();

    while let Some(arg) = args.next() {
        let Some(text) = arg.to_str().map(str::to_owned) else {
            out.push(OsString::from("--"));
            out.push(arg);
            break;
        };

        if text == "--" {
            out.push(arg);
            break;
        }
        if !text.starts_with('-') || text == "-" {
            out.push(OsString::from("--"));
            out.push(arg);
            break;
        }

        let bare = text.trim_start_matches('-');
        let (name, inline_value) = match bare.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (bare, None),
        };
        let name = if name == "o" { "output" } else { name };

        match LONG_FLAGS.iter().find(|(flag, _)| *flag == name) {
            Some((flag, takes_value)) => {
                match inline_value {
                    Some(value) => out.push(OsString::from(format!("--{flag}={value}"))),
                    None => out.push(OsString::from(format!("--{flag}"))),
                }
                if *takes_value && inline_value.is_none() {
                    if let Some(value) = args.next() {
                        out.push(value);
                    }
                }
            }
            // short flags such as -v / -vv, or unknown flags clap will report
            None => out.push(arg),
        }
    }

    out.extend(args);
    out
}
