//! funccover: `go build -toolexec` wrapper adding function coverage
//!
//! ## Usage
//!
//! ```bash
//! go build -toolexec "funccover -runtime $RT/covcollect.a -stdlib $GOROOT/pkg/linux_amd64" .
//! go build -toolexec "funccover -period 1s -o app.cover" ./cmd/app
//! ```

use clap::Parser;
use funccover::{logging, normalize_args, Cli, Verbosity};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = match Cli::try_parse_from(normalize_args(std::env::args_os())) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };
    logging::init(Verbosity::from_count(cli.verbose));

    match funccover::run(&cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("funccover: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}
