//! Counter table and collection.
//!
//! A [`Cover`] holds one execution flag per instrumented function. Instrumented
//! code flips flags with [`Cover::hit`]; [`Cover::collect`] rewrites the
//! coverage file with one `name:line:flag` line per function, in table order.
//!
//! ## State machine
//!
//! ```text
//! Idle ──collect()──► Collecting ──file written──► Idle
//! ```
//!
//! At most one collection is in flight: the periodic loop and the exit guard
//! may both call [`Cover::collect`], and the internal lock serializes them.

use crate::error::{CollectError, CollectResult};
use crate::period::parse_period;
use crate::profile::CoverageRecord;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error};

/// Process-wide coverage state: names, lines and one flag per function
#[derive(Debug)]
pub struct Cover {
    names: Vec<String>,
    lines: Vec<u32>,
    counts: Vec<AtomicBool>,
    /// Held while a collection writes the output file
    collecting: Mutex<()>,
}

impl Cover {
    /// Create a table with every flag cleared.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::TableMismatch`] if `names` and `lines` differ in length.
    pub fn new(names: Vec<String>, lines: Vec<u32>) -> CollectResult<Self> {
        let flags = vec![false; names.len()];
        Self::from_parts(names, lines, flags)
    }

    /// Create a table from explicit flags.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::TableMismatch`] if the three sequences differ in length.
    pub fn from_parts(names: Vec<String>, lines: Vec<u32>, flags: Vec<bool>) -> CollectResult<Self> {
        if names.len() != lines.len() || names.len() != flags.len() {
            return Err(CollectError::TableMismatch {
                names: names.len(),
                lines: lines.len(),
                flags: flags.len(),
            });
        }
        Ok(Self {
            names,
            lines,
            counts: flags.into_iter().map(AtomicBool::new).collect(),
            collecting: Mutex::new(()),
        })
    }

    /// Number of tracked functions
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether the table tracks no functions
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Mark function `index` as executed.
    ///
    /// Every writer stores the same value, so relaxed ordering is enough.
    /// Indices outside the table are ignored.
    #[inline]
    pub fn hit(&self, index: usize) {
        if let Some(flag) = self.counts.get(index) {
            flag.store(true, Ordering::Relaxed);
        }
    }

    /// Whether function `index` has executed
    #[must_use]
    pub fn is_hit(&self, index: usize) -> bool {
        self.counts
            .get(index)
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Snapshot the table as coverage records
    #[must_use]
    pub fn records(&self) -> Vec<CoverageRecord> {
        self.rows()
            .map(|(name, line, hit)| CoverageRecord::new(name, line, hit))
            .collect()
    }

    fn rows(&self) -> impl Iterator<Item = (&str, u32, bool)> + '_ {
        self.names
            .iter()
            .zip(&self.lines)
            .zip(&self.counts)
            .map(|((name, line), flag)| (name.as_str(), *line, flag.load(Ordering::Relaxed)))
    }

    /// Write the table in coverage-file format.
    ///
    /// # Errors
    ///
    /// Propagates any error from `writer`.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for (name, line, hit) in self.rows() {
            writeln!(writer, "{name}:{line}:{hit}")?;
        }
        Ok(())
    }

    /// Overwrite `path` with the current table.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::Create`] or [`CollectError::Write`] if the file
    /// cannot be produced.
    pub fn collect(&self, path: impl AsRef<Path>) -> CollectResult<()> {
        let path = path.as_ref();
        let _collecting = self
            .collecting
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let file = File::create(path).map_err(|source| CollectError::Create {
            path: path.to_path_buf(),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)
            .and_then(|()| writer.flush())
            .map_err(|source| CollectError::Write {
                path: path.to_path_buf(),
                source,
            })?;

        debug!(path = %path.display(), functions = self.len(), "coverage collected");
        Ok(())
    }

    /// Collect every `period` until the process exits.
    ///
    /// Returns `Ok(())` immediately when `period` is unparsable or not
    /// strictly positive. Otherwise it only returns when a collection fails.
    ///
    /// # Errors
    ///
    /// Returns the first collection error.
    pub fn periodic_collect(&self, period: &str, path: impl AsRef<Path>) -> CollectResult<()> {
        match parse_period(period) {
            Some(interval) => self.run_periodic(interval, path.as_ref()),
            None => {
                debug!(period, "periodic collection disabled");
                Ok(())
            }
        }
    }

    fn run_periodic(&self, interval: Duration, path: &Path) -> CollectResult<()> {
        let mut deadline = Instant::now() + interval;
        loop {
            thread::sleep(deadline.saturating_duration_since(Instant::now()));
            self.collect(path)?;
            deadline += interval;
        }
    }

    /// Run [`Cover::periodic_collect`] on a background thread.
    ///
    /// Returns `Ok(None)` without spawning when the period disables collection.
    /// The thread is never cancelled; it lives until process exit.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::Spawn`] if the thread cannot be started.
    pub fn spawn_periodic_collect(
        self: &Arc<Self>,
        period: &str,
        path: impl Into<PathBuf>,
    ) -> CollectResult<Option<JoinHandle<CollectResult<()>>>> {
        let Some(interval) = parse_period(period) else {
            debug!(period, "periodic collection disabled");
            return Ok(None);
        };

        let cover = Arc::clone(self);
        let path = path.into();
        let handle = thread::Builder::new()
            .name("covcollect-periodic".to_string())
            .spawn(move || cover.run_periodic(interval, &path))
            .map_err(CollectError::Spawn)?;
        Ok(Some(handle))
    }

    /// Exit hook: collect once into `path` when the returned guard drops.
    #[must_use]
    pub fn collect_on_drop(self: &Arc<Self>, path: impl Into<PathBuf>) -> CollectGuard {
        CollectGuard {
            cover: Arc::clone(self),
            path: path.into(),
        }
    }
}

/// Collects the owning table when dropped
#[derive(Debug)]
pub struct CollectGuard {
    cover: Arc<Cover>,
    path: PathBuf,
}

impl Drop for CollectGuard {
    fn drop(&mut self) {
        if let Err(err) = self.cover.collect(&self.path) {
            error!(%err, "final coverage collection failed");
        }
    }
}
