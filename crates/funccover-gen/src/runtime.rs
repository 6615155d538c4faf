//! Go source of the collection runtime.
//!
//! The generated declaration names `covcollect.Cover` and calls its
//! `Collect` and `PeriodicalCollect` methods; this is the package that
//! provides them. Compile it into the archive passed as `-runtime`.

use crate::error::{GenError, Result};
use std::path::{Path, PathBuf};

/// File name of the runtime package source.
pub const RUNTIME_FILE: &str = "covcollect.go";

/// Runtime package source.
pub const RUNTIME_SOURCE: &str = include_str!("../runtime/covcollect.go");

/// Write the runtime source into `dir`, creating it if needed.
///
/// # Errors
///
/// Returns [`GenError::Write`] if the directory or file cannot be written.
pub fn write_runtime(dir: &Path) -> Result<PathBuf> {
    let path = dir.join(RUNTIME_FILE);
    let wrap = |source| GenError::Write {
        path: path.clone(),
        source,
    };
    std::fs::create_dir_all(dir).map_err(wrap)?;
    std::fs::write(&path, RUNTIME_SOURCE).map_err(wrap)?;
    Ok(path)
}
