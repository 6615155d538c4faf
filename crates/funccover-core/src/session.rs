//! Build sessions: one package compilation, instrumented as a whole.
//!
//! A [`BuildSession`] owns the source units of one compile invocation. Units
//! are visited in path order so that counter indices, the session id and the
//! staged output are deterministic.

use crate::augmenter::augment;
use crate::error::{FuncCoverError, Result};
use crate::inserter::insert_counters;
use crate::locator::{locate, FunctionRecord};
use crate::manifest::SessionManifest;
use funccover_gen::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Default coverage output file.
pub const DEFAULT_OUTPUT_FILE: &str = "cover.out";

/// Settings for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Periodic collection interval; zero disables it
    pub period: Duration,
    /// Coverage file written by the instrumented program
    pub output_file: String,
    /// Directory receiving staged units
    pub staging_dir: PathBuf,
}

impl SessionConfig {
    /// Config staging into `staging_dir` with default output and no period.
    pub fn new(staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            period: Duration::ZERO,
            output_file: DEFAULT_OUTPUT_FILE.to_string(),
            staging_dir: staging_dir.into(),
        }
    }

    /// Set the periodic collection interval.
    #[must_use]
    pub const fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Set the coverage output file.
    #[must_use]
    pub fn with_output_file(mut self, output_file: impl Into<String>) -> Self {
        self.output_file = output_file.into();
        self
    }
}

/// Short identifier namespacing generated symbols.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// First 6 bytes of SHA-256 over the unit path, as 12 lowercase hex digits.
    pub fn from_path(path: &Path) -> Self {
        let digest = Sha256::digest(path.to_string_lossy().as_bytes());
        Self(digest[..6].iter().map(|b| format!("{b:02x}")).collect())
    }

    /// The hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One row of the session-wide counter table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterEntry {
    /// Counter index
    pub index: usize,
    /// Function name
    pub name: String,
    /// Line of the body's opening brace
    pub line: u32,
    /// Unit declaring the function
    pub unit: PathBuf,
}

/// Output of [`BuildSession::instrument`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentedPackage {
    /// Session id used in `cover_<id>`
    pub session_id: SessionId,
    /// Instrumented text per original unit path
    pub units: BTreeMap<PathBuf, String>,
    /// Counter table in index order
    pub counters: Vec<CounterEntry>,
    /// Unit declaring the entry function, if any
    pub entry_unit: Option<PathBuf>,
    /// Coverage file named in generated code
    pub output_file: String,
}

/// A unit written to the staging directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedUnit {
    /// Original unit path
    pub source: PathBuf,
    /// Staged copy
    pub staged: PathBuf,
}

impl InstrumentedPackage {
    /// Write every unit into `dir` under its base name, followed by the
    /// session manifest.
    ///
    /// # Errors
    ///
    /// Fails if two units share a base name or any write fails.
    pub fn write_to(&self, dir: &Path) -> Result<Vec<StagedUnit>> {
        let mut by_name: BTreeMap<&std::ffi::OsStr, &Path> = BTreeMap::new();
        for path in self.units.keys() {
            let name = path.file_name().ok_or_else(|| {
                FuncCoverError::Internal(format!("unit '{}' has no file name", path.display()))
            })?;
            if let Some(first) = by_name.insert(name, path) {
                return Err(FuncCoverError::DuplicateBaseName {
                    name: name.to_string_lossy().into_owned(),
                    first: first.to_path_buf(),
                    second: path.clone(),
                });
            }
        }

        std::fs::create_dir_all(dir).map_err(|source| FuncCoverError::Write {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut staged = Vec::with_capacity(self.units.len());
        for (name, source) in by_name {
            let target = dir.join(name);
            let text = &self.units[source];
            std::fs::write(&target, text).map_err(|e| FuncCoverError::Write {
                path: target.clone(),
                source: e,
            })?;
            debug!(unit = %source.display(), staged = %target.display(), "staged unit");
            staged.push(StagedUnit {
                source: source.to_path_buf(),
                staged: target,
            });
        }
        staged.sort_by(|a, b| a.source.cmp(&b.source));

        SessionManifest::for_package(self, &staged).write(dir)?;
        info!(
            dir = %dir.display(),
            units = staged.len(),
            counters = self.counters.len(),
            "wrote instrumented package"
        );
        Ok(staged)
    }
}

/// Source units of one package compilation.
#[derive(Debug, Clone)]
pub struct BuildSession {
    config: SessionConfig,
    units: BTreeMap<PathBuf, String>,
}

impl BuildSession {
    /// Create an empty session.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            units: BTreeMap::new(),
        }
    }

    /// Session settings.
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Number of units added so far.
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Read a unit from disk.
    ///
    /// # Errors
    ///
    /// Returns [`FuncCoverError::Read`] if the file is missing, unreadable
    /// or not UTF-8.
    pub fn add_unit(&mut self, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|source| FuncCoverError::Read {
            path: path.clone(),
            source,
        })?;
        self.add_source(path, content);
        Ok(())
    }

    /// Add a unit whose content is already in memory.
    pub fn add_source(&mut self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.units.insert(path.into(), content.into());
    }

    /// Instrument every unit.
    ///
    /// # Errors
    ///
    /// Fails on parse errors, on more than one entry unit, or when the
    /// session has no units.
    pub fn instrument(&self) -> Result<InstrumentedPackage> {
        let first = self.units.keys().next().ok_or(FuncCoverError::NoSources)?;
        let session_id = SessionId::from_path(first);
        let table = table_symbol(session_id.as_str())?;
        info!(session = %session_id, units = self.units.len(), "instrumenting package");

        let mut analyses = Vec::with_capacity(self.units.len());
        for (path, source) in &self.units {
            let analysis = locate(source).map_err(|source| FuncCoverError::Parse {
                path: path.clone(),
                source,
            })?;
            let has_entry = analysis.has_entry();
            analyses.push((path, source, analysis.records, has_entry));
        }

        let mut entry_unit: Option<&PathBuf> = None;
        for (path, _, _, has_entry) in &analyses {
            if !has_entry {
                continue;
            }
            if let Some(first) = entry_unit {
                return Err(FuncCoverError::DuplicateEntry {
                    first: first.clone(),
                    second: (*path).clone(),
                });
            }
            entry_unit = Some(*path);
        }

        let mut cursor = 0;
        let mut units = BTreeMap::new();
        let mut counters = Vec::new();
        let mut table_records: Vec<FunctionRecord> = Vec::new();
        for (path, source, records, has_entry) in &analyses {
            let exit_flush = has_entry.then_some(self.config.output_file.as_str());
            let inserted = insert_counters(source, records, &table, cursor, exit_flush)?;
            debug!(
                unit = %path.display(),
                first = cursor,
                count = inserted.next_index - cursor,
                "inserted counters"
            );
            counters.extend(records.iter().enumerate().map(|(offset, record)| CounterEntry {
                index: cursor + offset,
                name: record.name.clone(),
                line: record.line,
                unit: (*path).clone(),
            }));
            table_records.extend(records.iter().cloned());
            cursor = inserted.next_index;
            units.insert((*path).clone(), inserted.text);
        }

        if let Some(entry) = entry_unit {
            let text = units.get_mut(entry).ok_or_else(|| {
                FuncCoverError::Internal(format!("entry unit '{}' vanished", entry.display()))
            })?;
            *text = augment(
                text,
                &table,
                &table_records,
                &self.config.output_file,
                self.config.period,
            )?;
            debug!(unit = %entry.display(), "added coverage table declaration");
        }

        Ok(InstrumentedPackage {
            session_id,
            units,
            counters,
            entry_unit: entry_unit.cloned(),
            output_file: self.config.output_file.clone(),
        })
    }

    /// Write an instrumented package into the configured staging directory.
    ///
    /// # Errors
    ///
    /// See [`InstrumentedPackage::write_to`].
    pub fn write(&self, package: &InstrumentedPackage) -> Result<Vec<StagedUnit>> {
        package.write_to(&self.config.staging_dir)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MAIN: &str = "package main\n\nimport \"fmt\"\n\nfunc main() {\n\tfmt.Println(helper())\n}\n";
    const HELPER: &str = "package main\n\nfunc helper() int {\n\treturn 1\n}\n\nfunc unused() {}\n";

    fn session() -> BuildSession {
        let mut session = BuildSession::new(SessionConfig::new("/tmp/unused"));
        session.add_source("/src/main.go", MAIN);
        session.add_source("/src/helper.go", HELPER);
        session
    }

    #[test]
    fn test_session_id_format() {
        let id = SessionId::from_path(Path::new("/src/helper.go"));
        assert_eq!(id.as_str().len(), 12);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(id, SessionId::from_path(Path::new("/src/helper.go")));
        assert_ne!(id, SessionId::from_path(Path::new("/src/main.go")));
    }

    #[test]
    fn test_counters_follow_path_order() {
        let package = session().instrument().unwrap();
        let names: Vec<_> = package.counters.iter().map(|c| c.name.as_str()).collect();
        // helper.go sorts before main.go
        assert_eq!(names, vec!["helper", "unused", "main"]);
        let indices: Vec<_> = package.counters.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(package.session_id, SessionId::from_path(Path::new("/src/helper.go")));
    }

    #[test]
    fn test_entry_unit_gets_declaration() {
        let package = session().instrument().unwrap();
        assert_eq!(package.entry_unit.as_deref(), Some(Path::new("/src/main.go")));
        let symbol = format!("cover_{}", package.session_id);

        let main = &package.units[Path::new("/src/main.go")];
        assert!(main.contains(&format!("var {symbol} = covcollect.Cover{{")));
        assert!(main.contains(&format!("{symbol}.Counts[2] = true; defer {symbol}.Collect(\"cover.out\"); ")));
        assert!(main.contains("import (\"covcollect\"; \"fmt\")"));

        let helper = &package.units[Path::new("/src/helper.go")];
        assert!(helper.contains(&format!("{symbol}.Counts[0] = true;")));
        assert!(helper.contains(&format!("{symbol}.Counts[1] = true;")));
        assert!(!helper.contains("covcollect"));
        assert!(!helper.contains("defer"));
    }

    #[test]
    fn test_no_entry_unit() {
        let mut session = BuildSession::new(SessionConfig::new("/tmp/unused"));
        session.add_source("/src/lib.go", "package main\nfunc f() {}\n");
        let package = session.instrument().unwrap();
        assert!(package.entry_unit.is_none());
        let text = &package.units[Path::new("/src/lib.go")];
        assert!(text.contains(".Counts[0] = true;"));
        assert!(!text.contains("covcollect"));
    }

    #[test]
    fn test_duplicate_entry_rejected() {
        let mut session = BuildSession::new(SessionConfig::new("/tmp/unused"));
        session.add_source("/src/a.go", "package main\nfunc main() {}\n");
        session.add_source("/src/b.go", "package main\nfunc main() {}\n");
        let err = session.instrument().unwrap_err();
        assert!(matches!(err, FuncCoverError::DuplicateEntry { .. }));
    }

    #[test]
    fn test_empty_session_rejected() {
        let session = BuildSession::new(SessionConfig::new("/tmp/unused"));
        assert!(matches!(session.instrument(), Err(FuncCoverError::NoSources)));
    }

    #[test]
    fn test_parse_error_names_unit() {
        let mut session = BuildSession::new(SessionConfig::new("/tmp/unused"));
        session.add_source("/src/bad.go", "package main\nfunc main() {\n");
        let err = session.instrument().unwrap_err();
        assert!(err.to_string().contains("/src/bad.go"));
    }

    #[test]
    fn test_add_unit_missing_file() {
        let mut session = BuildSession::new(SessionConfig::new("/tmp/unused"));
        let err = session.add_unit("/definitely/not/here.go").unwrap_err();
        assert!(matches!(err, FuncCoverError::Read { .. }));
        assert_eq!(session.unit_count(), 0);
    }

    #[test]
    fn test_period_and_output_flow_into_declaration() {
        let config = SessionConfig::new("/tmp/unused")
            .with_period(Duration::from_secs(2))
            .with_output_file("out/cov.txt");
        let mut session = BuildSession::new(config);
        session.add_source("/src/main.go", "package main\nfunc main() {}\n");
        let package = session.instrument().unwrap();
        let main = &package.units[Path::new("/src/main.go")];
        assert!(main.contains(".PeriodicalCollect(\"2s\", \"out/cov.txt\")"));
        assert!(main.contains(".Collect(\"out/cov.txt\")"));
        assert_eq!(package.output_file, "out/cov.txt");
    }

    #[test]
    fn test_write_stages_units_and_manifest() {
        let dir = TempDir::new().unwrap();
        let mut session = BuildSession::new(SessionConfig::new(dir.path().join("stage")));
        let src = TempDir::new().unwrap();
        let main_path = src.path().join("main.go");
        std::fs::write(&main_path, MAIN.replace("helper()", "1")).unwrap();
        session.add_unit(&main_path).unwrap();

        let package = session.instrument().unwrap();
        let staged = session.write(&package).unwrap();
        assert_eq!(staged.len(), 1);
        assert_eq!(staged[0].source, main_path);
        assert_eq!(staged[0].staged, dir.path().join("stage").join("main.go"));
        let written = std::fs::read_to_string(&staged[0].staged).unwrap();
        assert_eq!(written, package.units[&main_path]);
        assert!(dir.path().join("stage").join(crate::manifest::MANIFEST_FILE).exists());
    }

    #[test]
    fn test_write_rejects_duplicate_base_names() {
        let dir = TempDir::new().unwrap();
        let mut session = BuildSession::new(SessionConfig::new(dir.path()));
        session.add_source("/a/util.go", "package main\nfunc a() {}\n");
        session.add_source("/b/util.go", "package main\nfunc b() {}\n");
        let package = session.instrument().unwrap();
        let err = session.write(&package).unwrap_err();
        assert!(matches!(err, FuncCoverError::DuplicateBaseName { .. }));
        assert!(!dir.path().join("util.go").exists());
    }
}
