//! Standalone tasks run instead of wrapping a tool.

use crate::commands::Task;
use crate::error::{CliError, CliResult};
use covcollect::CoverageProfile;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Run a task, writing its human-readable output to `out`.
///
/// # Errors
///
/// Fails if the task's input cannot be read or is invalid, or if writing
/// fails.
pub fn run_task(task: &Task, out: &mut impl Write) -> CliResult<()> {
    match task {
        Task::EmitRuntime(dir) => emit_runtime(dir, out),
        Task::Report(file) => report(file, out),
        Task::Verify(dir) => verify(dir, out),
    }
}

fn emit_runtime(dir: &Path, out: &mut impl Write) -> CliResult<()> {
    let path = funccover_gen::runtime::write_runtime(dir)?;
    info!(path = %path.display(), "wrote runtime source");
    writeln!(out, "{}", path.display())?;
    Ok(())
}

fn report(file: &Path, out: &mut impl Write) -> CliResult<()> {
    let profile = CoverageProfile::read(file)?;
    let summary = profile.summary();
    writeln!(
        out,
        "{}: {}/{} functions covered ({:.1}%)",
        file.display(),
        summary.covered_functions,
        summary.total_functions,
        summary.coverage_percent
    )?;
    let mut uncovered = profile.uncovered().peekable();
    if uncovered.peek().is_some() {
        writeln!(out, "uncovered:")?;
        for record in uncovered {
            writeln!(out, "  {} (line {})", record.name, record.line)?;
        }
    }
    Ok(())
}

fn verify(dir: &Path, out: &mut impl Write) -> CliResult<()> {
    let manifest = funccover_core::manifest::verify(dir).map_err(CliError::Verify)?;
    writeln!(
        out,
        "{}: {} staged files match session {}",
        dir.display(),
        manifest.files.len(),
        manifest.session_id
    )?;
    Ok(())
}
