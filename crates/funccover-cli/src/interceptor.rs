//! Toolchain interception
//!
//! Decides what to do with one forwarded invocation, patches sources and
//! import manifests as needed, then runs the real tool.

use crate::config::InterceptConfig;
use crate::error::{CliError, CliResult};
use crate::invocation::{ToolInvocation, ToolKind};
use funccover_core::{importcfg, BuildSession, SessionConfig, SessionId};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use tracing::{debug, info};

/// Runs forwarded toolchain invocations.
#[derive(Debug, Clone)]
pub struct Interceptor {
    config: InterceptConfig,
}

impl Interceptor {
    /// Create an interceptor.
    #[must_use]
    pub const fn new(config: InterceptConfig) -> Self {
        Self { config }
    }

    /// Interceptor settings.
    #[must_use]
    pub const fn config(&self) -> &InterceptConfig {
        &self.config
    }

    /// Apply instrumentation or manifest patching, returning the
    /// invocation to execute.
    ///
    /// # Errors
    ///
    /// Fails when instrumentation fails, when the entry package has no
    /// entry unit, or when a required archive location is not configured.
    pub fn prepare(&self, invocation: ToolInvocation) -> CliResult<ToolInvocation> {
        debug!(
            tool = %invocation.tool.to_string_lossy(),
            kind = invocation.kind.as_str(),
            "classified invocation"
        );
        match invocation.kind {
            ToolKind::Compile if invocation.is_entry_compile() => self.prepare_compile(invocation),
            ToolKind::Link => self.prepare_link(invocation),
            _ => Ok(invocation),
        }
    }

    fn prepare_compile(&self, mut invocation: ToolInvocation) -> CliResult<ToolInvocation> {
        let runtime = self.config.runtime_archive()?;
        let (Some(output), Some(cfg)) = (invocation.output.clone(), invocation.importcfg.clone())
        else {
            return Ok(invocation);
        };
        let cwd = std::env::current_dir()?;

        let sources: Vec<(usize, PathBuf)> = invocation
            .source_paths()
            .map(|(index, path)| (index, cwd.join(path)))
            .collect();

        // An explicit -dir is shared by every package in the build, so each
        // session stages into its own subdirectory.
        let staging_dir = match (&self.config.staging_dir, sources.iter().map(|(_, p)| p).min()) {
            (Some(dir), Some(first)) => dir.join(SessionId::from_path(first).as_str()),
            (Some(dir), None) => dir.clone(),
            (None, _) => cwd
                .join(&output)
                .parent()
                .map_or_else(|| cwd.clone(), Path::to_path_buf),
        };

        let session_config = SessionConfig::new(&staging_dir)
            .with_period(self.config.period)
            .with_output_file(self.config.output_file.clone());
        let mut session = BuildSession::new(session_config);
        for (_, path) in &sources {
            session.add_unit(path)?;
        }
        info!(
            units = session.unit_count(),
            staging = %staging_dir.display(),
            "instrumenting entry package"
        );

        let package = session.instrument()?;
        if package.entry_unit.is_none() {
            return Err(CliError::NoEntryUnit {
                package: invocation.package.clone().unwrap_or_default(),
            });
        }
        let staged = session.write(&package)?;

        let cfg = cwd.join(cfg);
        importcfg::append(&cfg, &[importcfg::runtime_entry(runtime)])?;
        info!(importcfg = %cfg.display(), "added runtime to import manifest");

        for (index, absolute) in sources {
            if let Some(unit) = staged.iter().find(|unit| unit.source == absolute) {
                invocation.replace_arg(index, unit.staged.clone());
            }
        }
        info!(
            session = %package.session_id,
            functions = package.counters.len(),
            "instrumentation complete"
        );
        Ok(invocation)
    }

    fn prepare_link(&self, invocation: ToolInvocation) -> CliResult<ToolInvocation> {
        let Some(cfg) = &invocation.importcfg else {
            debug!("link without -importcfg, forwarding unchanged");
            return Ok(invocation);
        };
        let runtime = self.config.runtime_archive()?;
        let stdlib = self.config.stdlib_dir()?;
        let entries = importcfg::link_entries(runtime, stdlib);
        importcfg::append(cfg, &entries)?;
        info!(importcfg = %cfg.display(), entries = entries.len(), "patched link manifest");
        Ok(invocation)
    }

    /// Prepare and execute an invocation, returning the tool's exit code.
    ///
    /// # Errors
    ///
    /// Fails when preparation fails or the tool cannot be started.
    pub fn run(&self, invocation: ToolInvocation) -> CliResult<u8> {
        let invocation = self.prepare(invocation)?;
        let status = execute(&invocation)?;
        let code = exit_code(status);
        debug!(code, "tool exited");
        Ok(code)
    }
}

/// Run the tool with inherited stdio, blocking until it exits.
fn execute(invocation: &ToolInvocation) -> CliResult<ExitStatus> {
    Command::new(&invocation.tool)
        .args(&invocation.args)
        .status()
        .map_err(|source| CliError::Spawn {
            tool: invocation.tool.clone(),
            source,
        })
}

/// Map an exit status to a process exit code.
fn exit_code(status: ExitStatus) -> u8 {
    if let Some(code) = status.code() {
        return u8::try_from(code).unwrap_or(1);
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return u8::try_from(128 + signal).unwrap_or(1);
        }
    }
    1
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use tempfile::TempDir;

    fn invocation(args: &[&str]) -> ToolInvocation {
        ToolInvocation::parse(args.iter().map(OsString::from).collect()).unwrap()
    }

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn interceptor(stage: &Path) -> Interceptor {
        Interceptor::new(
            InterceptConfig::new()
                .with_staging_dir(stage)
                .with_runtime_archive("/rt/covcollect.a")
                .with_stdlib_dir("/go/pkg/linux_amd64"),
        )
    }

    #[test]
    fn test_passthrough_is_untouched() {
        let inv = invocation(&["/go/tool/asm", "-p", "main", "-o", "x.o", "a.s"]);
        let prepared = Interceptor::new(InterceptConfig::new()).prepare(inv.clone()).unwrap();
        assert_eq!(prepared, inv);
    }

    #[test]
    fn test_non_entry_compile_is_untouched() {
        let inv = invocation(&["compile", "-o", "/b/x.a", "-p", "fmt", "-importcfg", "/b/cfg", "print.go"]);
        let prepared = Interceptor::new(InterceptConfig::new()).prepare(inv.clone()).unwrap();
        assert_eq!(prepared, inv);
    }

    #[test]
    fn test_entry_compile_is_staged() {
        let dir = TempDir::new().unwrap();
        let stage = dir.path().join("stage");
        let main = write(dir.path(), "main.go", "package main\n\nfunc main() {\n\thelper()\n}\n");
        let helper = write(dir.path(), "helper.go", "package main\n\nfunc helper() {}\n");
        let cfg = write(dir.path(), "importcfg", "packagefile fmt=/std/fmt.a");

        let inv = invocation(&[
            "compile",
            "-o",
            dir.path().join("_pkg_.a").to_str().unwrap(),
            "-p",
            "main",
            "-importcfg",
            cfg.to_str().unwrap(),
            "-pack",
            main.to_str().unwrap(),
            helper.to_str().unwrap(),
        ]);
        let prepared = interceptor(&stage).prepare(inv).unwrap();

        let session_dir = stage.join(SessionId::from_path(&helper).as_str());
        assert_eq!(prepared.args[7], session_dir.join("main.go").into_os_string());
        assert_eq!(prepared.args[8], session_dir.join("helper.go").into_os_string());
        let staged = std::fs::read_to_string(session_dir.join("main.go")).unwrap();
        assert!(staged.contains("defer cover_"));
        assert_eq!(
            std::fs::read_to_string(&cfg).unwrap(),
            "packagefile fmt=/std/fmt.a\npackagefile covcollect=/rt/covcollect.a\n"
        );
    }

    #[test]
    fn test_entry_compile_without_main_fails() {
        let dir = TempDir::new().unwrap();
        let lib = write(dir.path(), "lib.go", "package main\n\nfunc helper() {}\n");
        let cfg = write(dir.path(), "importcfg", "");
        let inv = invocation(&[
            "compile",
            "-o",
            "/b/_pkg_.a",
            "-p",
            "main",
            "-importcfg",
            cfg.to_str().unwrap(),
            lib.to_str().unwrap(),
        ]);
        let err = interceptor(&dir.path().join("stage")).prepare(inv).unwrap_err();
        assert!(matches!(err, CliError::NoEntryUnit { .. }));
        assert_eq!(std::fs::read_to_string(&cfg).unwrap(), "");
    }

    #[test]
    fn test_entry_compile_requires_runtime() {
        let inv = invocation(&["compile", "-o", "/b/x.a", "-p", "main", "-importcfg", "/b/cfg", "main.go"]);
        let err = Interceptor::new(InterceptConfig::new()).prepare(inv).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_link_patches_manifest() {
        let dir = TempDir::new().unwrap();
        let cfg = write(dir.path(), "importcfg.link", "packagefile main=/b/main.a\n");
        let inv = invocation(&["link", "-o", "a.out", "-importcfg", cfg.to_str().unwrap(), "/b/main.a"]);
        let prepared = interceptor(dir.path()).prepare(inv.clone()).unwrap();
        assert_eq!(prepared, inv);

        let text = std::fs::read_to_string(&cfg).unwrap();
        assert!(text.contains("packagefile covcollect=/rt/covcollect.a\n"));
        assert!(text.contains("packagefile fmt=/go/pkg/linux_amd64/fmt.a\n"));
        assert!(text.contains("packagefile internal/race=/go/pkg/linux_amd64/internal/race.a\n"));
    }

    #[test]
    fn test_link_without_importcfg() {
        let inv = invocation(&["link", "-o", "a.out", "/b/main.a"]);
        let prepared = Interceptor::new(InterceptConfig::new()).prepare(inv.clone()).unwrap();
        assert_eq!(prepared, inv);
    }

    #[cfg(unix)]
    #[test]
    fn test_run_forwards_exit_code() {
        let inv = invocation(&["sh", "-c", "exit 7"]);
        let code = Interceptor::new(InterceptConfig::new()).run(inv).unwrap();
        assert_eq!(code, 7);
    }

    #[test]
    fn test_run_missing_tool() {
        let inv = invocation(&["/definitely/not/a/tool"]);
        let err = Interceptor::new(InterceptConfig::new()).run(inv).unwrap_err();
        assert!(matches!(err, CliError::Spawn { .. }));
    }
}
