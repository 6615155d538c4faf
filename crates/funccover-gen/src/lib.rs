//! funccover-gen: typed Go code generation for coverage instrumentation
//!
//! Every piece of Go text the instrumenter injects is built through the
//! [`hir`] types and rendered by [`codegen`]. Identifiers are validated on
//! construction, string literals are always escaped, and rendering is
//! deterministic.
//!
//! ```rust,no_run
//! use funccover_gen::prelude::*;
//!
//! let table = table_symbol("0a1b2c3d4e5f").unwrap();
//! let counter = inline_stmt(&counter_stmt(&table, 0));
//! assert_eq!(counter, "cover_0a1b2c3d4e5f.Counts[0] = true; ");
//! ```

#![warn(missing_docs)]

pub mod builder;
pub mod codegen;
pub mod error;
pub mod hir;
pub mod runtime;

pub use error::{GenError, Result};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::builder::{
        counter_stmt, exit_flush_stmt, go_duration, runtime_import, table_symbol,
        CoverDeclBuilder, RUNTIME_PACKAGE,
    };
    pub use crate::codegen::{generate, inline_stmt, quote, render_expr, render_import, render_stmt};
    pub use crate::error::{GenError, Result};
    pub use crate::hir::*;
    pub use crate::runtime::{write_runtime, RUNTIME_FILE, RUNTIME_SOURCE};
}
