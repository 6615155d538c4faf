//! Session manifest.
//!
//! Written next to the staged units as `funccover.manifest.json`. It maps
//! every counter back to the unit that declares it (the coverage file only
//! carries names and lines) and records a BLAKE3 hash of every staged file so
//! that stale or hand-edited staging directories are detected.

use crate::error::{FuncCoverError, Result};
use crate::session::{CounterEntry, InstrumentedPackage, StagedUnit};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the manifest inside the staging directory.
pub const MANIFEST_FILE: &str = "funccover.manifest.json";

/// A staged file and its content hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedFile {
    /// Original unit path
    pub source: PathBuf,
    /// File name inside the staging directory
    pub staged_name: String,
    /// BLAKE3 hash of the staged contents
    pub hash: String,
}

/// Manifest describing one instrumented package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionManifest {
    /// Version of manifest format
    pub manifest_version: u32,
    /// Session id (`cover_<id>`)
    pub session_id: String,
    /// Coverage file named in generated code
    pub output_file: String,
    /// Unit declaring the entry function
    pub entry_unit: Option<PathBuf>,
    /// Counter table in index order
    pub counters: Vec<CounterEntry>,
    /// Staged files in source order
    pub files: Vec<StagedFile>,
}

impl SessionManifest {
    /// Current manifest format version.
    pub const VERSION: u32 = 1;

    /// Describe a package whose units were staged as `staged`.
    pub fn for_package(package: &InstrumentedPackage, staged: &[StagedUnit]) -> Self {
        let files = staged
            .iter()
            .filter_map(|unit| {
                let text = package.units.get(&unit.source)?;
                Some(StagedFile {
                    source: unit.source.clone(),
                    staged_name: unit
                        .staged
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                    hash: hash_contents(text),
                })
            })
            .collect();
        Self {
            manifest_version: Self::VERSION,
            session_id: package.session_id.to_string(),
            output_file: package.output_file.clone(),
            entry_unit: package.entry_unit.clone(),
            counters: package.counters.clone(),
            files,
        }
    }

    /// Write the manifest into `dir`.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written.
    pub fn write(&self, dir: &Path) -> Result<()> {
        let path = dir.join(MANIFEST_FILE);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json).map_err(|source| FuncCoverError::Write { path, source })
    }

    /// Read the manifest from `dir`.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed.
    pub fn read(dir: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(dir.join(MANIFEST_FILE))?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Counter entry for a coverage-file row.
    pub fn counter(&self, index: usize) -> Option<&CounterEntry> {
        self.counters.get(index)
    }
}

/// BLAKE3 hash of file contents, hex encoded.
pub fn hash_contents(contents: &str) -> String {
    blake3::hash(contents.as_bytes()).to_hex().to_string()
}

/// Check every staged file in `dir` against the manifest.
///
/// # Errors
///
/// Returns [`FuncCoverError::HashMismatch`] for the first modified file, or
/// an I/O error if a file or the manifest is missing.
pub fn verify(dir: &Path) -> Result<SessionManifest> {
    let manifest = SessionManifest::read(dir)?;
    for file in &manifest.files {
        let path = dir.join(&file.staged_name);
        let contents = std::fs::read_to_string(&path)?;
        let actual = hash_contents(&contents);
        if actual != file.hash {
            return Err(FuncCoverError::HashMismatch {
                path,
                expected: file.hash.clone(),
                actual,
            });
        }
    }
    Ok(manifest)
}
