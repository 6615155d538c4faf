//! Import configuration (`-importcfg`) patching.
//!
//! The file is line oriented; the toolchain resolves each imported package
//! through a `packagefile <name>=<archive>` line. Patching only ever appends,
//! and every append starts on a fresh line. Repeated patching appends again.

use crate::error::{FuncCoverError, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

pub use funccover_gen::builder::RUNTIME_PACKAGE;

/// Standard-library packages the runtime archive depends on at link time.
pub const RUNTIME_STDLIB_DEPS: &[&str] = &[
    "fmt",
    "bufio",
    "os",
    "time",
    "bytes",
    "errors",
    "io",
    "unicode/utf8",
    "unicode",
    "strconv",
    "internal/fmtsort",
    "reflect",
    "sync",
    "math",
    "syscall",
    "internal/testlog",
    "internal/oserror",
    "internal/poll",
    "sync/atomic",
    "internal/syscall/execenv",
    "internal/syscall/unix",
    "internal/reflectlite",
    "math/bits",
    "sort",
    "internal/race",
];

/// One `packagefile` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageFile {
    /// Import path
    pub name: String,
    /// Archive location
    pub archive: PathBuf,
}

impl PackageFile {
    pub fn new(name: impl Into<String>, archive: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            archive: archive.into(),
        }
    }

    /// `packagefile <name>=<archive>`
    pub fn line(&self) -> String {
        format!("packagefile {}={}", self.name, self.archive.display())
    }

    fn parse(line: &str) -> Option<Self> {
        let (name, archive) = line.strip_prefix("packagefile ")?.split_once('=')?;
        Some(Self::new(name.trim(), archive.trim()))
    }
}

/// Entry resolving the runtime package at compile time.
pub fn runtime_entry(runtime_archive: &Path) -> PackageFile {
    PackageFile::new(RUNTIME_PACKAGE, runtime_archive)
}

/// Entries needed at link time: the runtime plus its standard-library
/// dependencies, each at `<stdlib_dir>/<name>.a`.
pub fn link_entries(runtime_archive: &Path, stdlib_dir: &Path) -> Vec<PackageFile> {
    std::iter::once(runtime_entry(runtime_archive))
        .chain(
            RUNTIME_STDLIB_DEPS
                .iter()
                .map(|name| PackageFile::new(*name, stdlib_dir.join(format!("{name}.a")))),
        )
        .collect()
}

/// Append entries to the importcfg at `path`.
///
/// # Errors
///
/// Returns [`FuncCoverError::ImportCfg`] if the file cannot be read or
/// written. A missing file is an error; the toolchain always creates it.
pub fn append(path: &Path, entries: &[PackageFile]) -> Result<()> {
    let wrap = |source| FuncCoverError::ImportCfg {
        path: path.to_path_buf(),
        source,
    };

    let existing = std::fs::read(path).map_err(wrap)?;
    let mut text = String::new();
    if existing.last().is_some_and(|b| *b != b'\n') {
        text.push('\n');
    }
    for entry in entries {
        text.push_str(&entry.line());
        text.push('\n');
    }

    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .open(path)
        .map_err(wrap)?;
    file.write_all(text.as_bytes()).map_err(wrap)?;
    debug!(importcfg = %path.display(), entries = entries.len(), "patched import configuration");
    Ok(())
}

/// Read the `packagefile` entries of an importcfg, in file order.
///
/// # Errors
///
/// Returns [`FuncCoverError::ImportCfg`] if the file cannot be read.
pub fn read_entries(path: &Path) -> Result<Vec<PackageFile>> {
    let text = std::fs::read_to_string(path).map_err(|source| FuncCoverError::ImportCfg {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(text.lines().filter_map(PackageFile::parse).collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_runtime_imports_are_link_dependencies() {
        let file = crate::syntax::parse(funccover_gen::runtime::RUNTIME_SOURCE).unwrap();
        assert_eq!(file.package, RUNTIME_PACKAGE);
        let imports: Vec<_> = file.imports.iter().flat_map(|d| &d.specs).collect();
        assert!(!imports.is_empty());
        for spec in imports {
            assert!(
                RUNTIME_STDLIB_DEPS.contains(&spec.path.as_str()),
                "{} missing from link dependencies",
                spec.path
            );
        }
    }

    #[test]
    fn test_line_format() {
        let entry = PackageFile::new("covcollect", "/opt/cov/covcollect.a");
        assert_eq!(entry.line(), "packagefile covcollect=/opt/cov/covcollect.a");
    }

    #[test]
    fn test_append_starts_on_fresh_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("importcfg");
        std::fs::write(&path, "# import config\npackagefile fmt=/x/fmt.a").unwrap();

        append(&path, &[runtime_entry(Path::new("/rt/covcollect.a"))]).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "# import config\npackagefile fmt=/x/fmt.a\npackagefile covcollect=/rt/covcollect.a\n"
        );
    }

    #[test]
    fn test_append_to_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("importcfg");
        std::fs::write(&path, "").unwrap();
        append(&path, &[runtime_entry(Path::new("/rt/covcollect.a"))]).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "packagefile covcollect=/rt/covcollect.a\n"
        );
    }

    #[test]
    fn test_link_entries() {
        let entries = link_entries(Path::new("/rt/covcollect.a"), Path::new("/go/pkg/linux_amd64"));
        assert_eq!(entries.len(), RUNTIME_STDLIB_DEPS.len() + 1);
        assert_eq!(entries[0].name, "covcollect");
        assert_eq!(
            entries[8].line(),
            "packagefile unicode/utf8=/go/pkg/linux_amd64/unicode/utf8.a"
        );
    }

    #[test]
    fn test_repeated_append_duplicates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("importcfg");
        std::fs::write(&path, "packagefile runtime=/go/runtime.a\n").unwrap();
        let entries = [runtime_entry(Path::new("/rt/covcollect.a"))];
        append(&path, &entries).unwrap();
        append(&path, &entries).unwrap();

        let read = read_entries(&path).unwrap();
        assert_eq!(read.len(), 3);
        assert_eq!(read[1], read[2]);
    }

    #[test]
    fn test_missing_importcfg_is_error() {
        let dir = TempDir::new().unwrap();
        let err = append(&dir.path().join("absent"), &[]).unwrap_err();
        assert!(matches!(err, FuncCoverError::ImportCfg { .. }));
    }
}
