//! funccover-core: source-level function coverage instrumentation for Go
//!
//! The pipeline for one package compilation:
//!
//! 1. [`locator`] parses each unit ([`lexer`], [`syntax`]) and lists its
//!    top-level functions.
//! 2. [`inserter`] splices a counter statement after every function's
//!    opening brace, numbering counters across the whole package.
//! 3. [`augmenter`] adds the runtime import and the coverage table
//!    declaration to the unit holding `main`.
//! 4. [`session`] drives the above in a deterministic order and stages the
//!    result; [`manifest`] records what was staged.
//!
//! [`importcfg`] patches the toolchain's import configuration so the
//! compiler and linker can resolve the runtime package.
//!
//! ```rust,no_run
//! use funccover_core::{BuildSession, SessionConfig};
//!
//! let mut session = BuildSession::new(SessionConfig::new("/tmp/stage"));
//! session.add_unit("main.go")?;
//! let package = session.instrument()?;
//! session.write(&package)?;
//! # Ok::<(), funccover_core::FuncCoverError>(())
//! ```

pub mod augmenter;
pub mod error;
pub mod importcfg;
pub mod inserter;
pub mod lexer;
pub mod locator;
pub mod manifest;
pub mod session;
pub mod span;
pub mod syntax;

pub use error::{FuncCoverError, ParseError, Result};
pub use locator::{FunctionRecord, ENTRY_FUNCTION, ENTRY_PACKAGE};
pub use manifest::{SessionManifest, MANIFEST_FILE};
pub use session::{
    BuildSession, CounterEntry, InstrumentedPackage, SessionConfig, SessionId, StagedUnit,
    DEFAULT_OUTPUT_FILE,
};
