//! covcollect: function coverage collection runtime
//!
//! Instrumented programs own one [`Cover`] table. Every instrumented function
//! sets its flag on entry; the table is persisted to a coverage file by a
//! background periodic loop and/or an exit hook.
//!
//! ```rust,no_run
//! use covcollect::Cover;
//! use std::sync::Arc;
//!
//! let cover = Arc::new(Cover::new(vec!["main".into()], vec![7]).unwrap());
//! let _periodic = cover.spawn_periodic_collect("500ms", "cover.out").unwrap();
//! let _exit = cover.collect_on_drop("cover.out");
//! cover.hit(0);
//! ```
//!
//! Coverage file format, one line per function in table order:
//!
//! ```text
//! <name>:<line>:<true|false>
//! ```

#![warn(missing_docs)]

mod cover;
mod error;
mod period;
mod profile;

pub use cover::{CollectGuard, Cover};
pub use error::{CollectError, CollectResult};
pub use period::parse_period;
pub use profile::{CoverageProfile, CoverageRecord, CoverageSummary};
