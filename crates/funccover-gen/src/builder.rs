//! Fluent builders for the Go code the instrumentation injects.
//!
//! # Example
//!
//! ```rust,no_run
//! use funccover_gen::prelude::*;
//! use std::time::Duration;
//!
//! let fragment = CoverDeclBuilder::new("cover_0a1b2c3d4e5f").unwrap()
//!     .output_file("cover.out")
//!     .period(Duration::from_secs(2))
//!     .function("main", 7)
//!     .build();
//! let go = generate(&fragment);
//! ```

use crate::hir::*;
use crate::Result;
use std::time::Duration;

/// Import path and package name of the collection runtime.
pub const RUNTIME_PACKAGE: &str = "covcollect";

/// Builder for the coverage table declaration and its periodic-flush hook.
#[derive(Debug, Clone)]
pub struct CoverDeclBuilder {
    table: Identifier,
    output_file: String,
    period: Duration,
    names: Vec<String>,
    lines: Vec<u32>,
}

impl CoverDeclBuilder {
    /// Start a declaration for the table variable `table`.
    pub fn new(table: impl Into<String>) -> Result<Self> {
        Ok(Self {
            table: Identifier::new(table)?,
            output_file: String::new(),
            period: Duration::ZERO,
            names: Vec::new(),
            lines: Vec::new(),
        })
    }

    /// Coverage file path handed to the runtime.
    #[must_use]
    pub fn output_file(mut self, path: impl Into<String>) -> Self {
        self.output_file = path.into();
        self
    }

    /// Periodic flush interval. Zero disables the init hook.
    #[must_use]
    pub const fn period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Record one instrumented function.
    #[must_use]
    pub fn function(mut self, name: impl Into<String>, line: u32) -> Self {
        self.names.push(name.into());
        self.lines.push(line);
        self
    }

    /// Record several functions in counter order.
    #[must_use]
    pub fn functions<S: Into<String>>(self, entries: impl IntoIterator<Item = (S, u32)>) -> Self {
        entries
            .into_iter()
            .fold(self, |builder, (name, line)| builder.function(name, line))
    }

    /// Build the fragment:
    ///
    /// ```go
    /// var cover_X = covcollect.Cover{Len: N, Lines: ..., Names: ..., Counts: ...}
    /// func init() { go cover_X.PeriodicalCollect("2s", "cover.out") }
    /// ```
    #[must_use]
    pub fn build(self) -> GoFragment {
        let len = self.names.len();
        let table_value = Expr::StructLit {
            ty: Box::new(runtime_selector("Cover")),
            fields: vec![
                (Identifier::new_unchecked("Len"), Expr::Int(len as u64)),
                (
                    Identifier::new_unchecked("Lines"),
                    Expr::SliceLit {
                        elem: Identifier::new_unchecked("uint32"),
                        elems: self.lines.iter().map(|l| Expr::Int(u64::from(*l))).collect(),
                    },
                ),
                (
                    Identifier::new_unchecked("Names"),
                    Expr::SliceLit {
                        elem: Identifier::new_unchecked("string"),
                        elems: self.names.into_iter().map(Expr::Str).collect(),
                    },
                ),
                (
                    Identifier::new_unchecked("Counts"),
                    Expr::SliceLit {
                        elem: Identifier::new_unchecked("bool"),
                        elems: vec![Expr::Bool(false); len],
                    },
                ),
            ],
        };

        let mut fragment = GoFragment::new();
        fragment.decls.push(Decl::Var {
            name: self.table.clone(),
            value: table_value,
        });

        if !self.period.is_zero() {
            let call = Expr::Ident(self.table)
                .dot_unchecked("PeriodicalCollect")
                .call(vec![
                    Expr::Str(go_duration(self.period)),
                    Expr::Str(self.output_file),
                ]);
            fragment.decls.push(Decl::Func {
                name: Identifier::new_unchecked("init"),
                body: vec![Stmt::Go(call)],
            });
        }
        fragment
    }
}

/// `table.Counts[index] = true`
#[must_use]
pub fn counter_stmt(table: &Identifier, index: usize) -> Stmt {
    Stmt::Assign {
        target: Expr::Ident(table.clone())
            .dot_unchecked("Counts")
            .index(Expr::Int(index as u64)),
        value: Expr::Bool(true),
    }
}

/// `defer table.Collect("<output_file>")`
#[must_use]
pub fn exit_flush_stmt(table: &Identifier, output_file: &str) -> Stmt {
    Stmt::Defer(
        Expr::Ident(table.clone())
            .dot_unchecked("Collect")
            .call(vec![Expr::Str(output_file.to_string())]),
    )
}

/// Unnamed import of the collection runtime.
#[must_use]
pub fn runtime_import() -> ImportSpec {
    ImportSpec {
        name: None,
        path: RUNTIME_PACKAGE.to_string(),
    }
}

/// Name of the table variable for a session id: `cover_<id>`.
pub fn table_symbol(session_id: &str) -> Result<Identifier> {
    Identifier::new(format!("cover_{session_id}"))
}

/// Render a duration the way Go's `time.ParseDuration` reads it back.
///
/// Whole seconds render as `Ns`, otherwise the coarsest exact unit among
/// `ms`, `us` and `ns` is used.
#[must_use]
pub fn go_duration(period: Duration) -> String {
    let nanos = period.as_nanos();
    if nanos % 1_000_000_000 == 0 {
        format!("{}s", nanos / 1_000_000_000)
    } else if nanos % 1_000_000 == 0 {
        format!("{}ms", nanos / 1_000_000)
    } else if nanos % 1_000 == 0 {
        format!("{}us", nanos / 1_000)
    } else {
        format!("{nanos}ns")
    }
}

fn runtime_selector(name: &'static str) -> Expr {
    Expr::Ident(Identifier::new_unchecked(RUNTIME_PACKAGE)).dot_unchecked(name)
}

/// Expression builder helpers.
impl Expr {
    /// Create a boolean literal.
    #[must_use]
    pub const fn bool(v: bool) -> Self {
        Self::Bool(v)
    }

    /// Create an integer literal.
    #[must_use]
    pub const fn int(v: u64) -> Self {
        Self::Int(v)
    }

    /// Create a string literal.
    #[must_use]
    pub fn str(s: impl Into<String>) -> Self {
        Self::Str(s.into())
    }

    /// Create an identifier reference.
    pub fn ident(name: impl Into<String>) -> Result<Self> {
        Ok(Self::Ident(Identifier::new(name)?))
    }

    /// Selector: `self.field`
    pub fn dot(self, field: impl Into<String>) -> Result<Self> {
        Ok(Self::Selector {
            operand: Box::new(self),
            field: Identifier::new(field)?,
        })
    }

    fn dot_unchecked(self, field: &'static str) -> Self {
        Self::Selector {
            operand: Box::new(self),
            field: Identifier::new_unchecked(field),
        }
    }

    /// Index: `self[idx]`
    #[must_use]
    pub fn index(self, idx: Expr) -> Self {
        Self::Index {
            operand: Box::new(self),
            index: Box::new(idx),
        }
    }

    /// Function call.
    #[must_use]
    pub fn call(self, args: Vec<Expr>) -> Self {
        Self::Call {
            callee: Box::new(self),
            args,
        }
    }
}
