//! Intermediate representation for generated Go code.
//!
//! Only the constructs the instrumentation emits are modelled: package-level
//! `var` and `func` declarations, a handful of statements, and the expressions
//! needed to build a coverage table literal. Same HIR always renders the same
//! text.

use serde::{Deserialize, Serialize};

/// A sequence of package-level declarations appended to a source file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoFragment {
    /// Declarations in emission order
    pub decls: Vec<Decl>,
}

impl GoFragment {
    /// Create an empty fragment.
    #[must_use]
    pub const fn new() -> Self {
        Self { decls: Vec::new() }
    }
}

/// Package-level declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decl {
    /// `var name = value`
    Var {
        /// Variable name
        name: Identifier,
        /// Initializer
        value: Expr,
    },
    /// `func name() { body }`
    Func {
        /// Function name
        name: Identifier,
        /// Body statements
        body: Vec<Stmt>,
    },
}

/// Go statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stmt {
    /// `target = value`
    Assign {
        /// Assignment target
        target: Expr,
        /// New value
        value: Expr,
    },
    /// Expression statement
    Expr(Expr),
    /// `defer call`
    Defer(Expr),
    /// `go call`
    Go(Expr),
}

/// Go expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expr {
    /// `true` / `false`
    Bool(bool),
    /// Unsigned integer literal
    Int(u64),
    /// Interpreted string literal (escaped on output)
    Str(String),
    /// Identifier reference
    Ident(Identifier),
    /// Selector: `operand.field`
    Selector {
        /// Operand
        operand: Box<Expr>,
        /// Selected field or method
        field: Identifier,
    },
    /// Index: `operand[index]`
    Index {
        /// Indexed expression
        operand: Box<Expr>,
        /// Index
        index: Box<Expr>,
    },
    /// Call: `callee(args)`
    Call {
        /// Function expression
        callee: Box<Expr>,
        /// Arguments
        args: Vec<Expr>,
    },
    /// Slice literal: `[]elem{...}`
    SliceLit {
        /// Element type name
        elem: Identifier,
        /// Elements
        elems: Vec<Expr>,
    },
    /// Keyed struct literal: `ty{Field: value, ...}`
    StructLit {
        /// Struct type expression
        ty: Box<Expr>,
        /// Keyed fields in order
        fields: Vec<(Identifier, Expr)>,
    },
}

/// Import spec: `[name] "path"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSpec {
    /// Optional local package name
    pub name: Option<Identifier>,
    /// Import path (unquoted)
    pub path: String,
}

impl ImportSpec {
    /// Create an unnamed import.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is empty or contains characters Go rejects.
    pub fn new(path: impl Into<String>) -> crate::Result<Self> {
        let path = path.into();
        if path.is_empty() {
            return Err(crate::GenError::InvalidImportPath {
                path,
                reason: "import path cannot be empty".to_string(),
            });
        }
        if let Some(c) = path
            .chars()
            .find(|c| c.is_whitespace() || c.is_control() || "!\"#$%&'()*,:;<=>?[\\]^`{|}".contains(*c))
        {
            return Err(crate::GenError::InvalidImportPath {
                path,
                reason: format!("invalid character '{c}'"),
            });
        }
        Ok(Self { name: None, path })
    }
}

/// Validated Go identifier.
///
/// Identifiers are checked at construction time: non-empty, ASCII letters,
/// digits and `_` only, not starting with a digit, not a keyword.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Identifier(String);

impl Identifier {
    /// Go keywords that cannot be used as identifiers.
    pub const KEYWORDS: &'static [&'static str] = &[
        "break",
        "case",
        "chan",
        "const",
        "continue",
        "default",
        "defer",
        "else",
        "fallthrough",
        "for",
        "func",
        "go",
        "goto",
        "if",
        "import",
        "interface",
        "map",
        "package",
        "range",
        "return",
        "select",
        "struct",
        "switch",
        "type",
        "var",
    ];

    /// Create a new identifier, validating it.
    ///
    /// # Errors
    ///
    /// Returns an error if the identifier is empty, starts with a digit,
    /// contains characters other than ASCII alphanumerics and `_`, or is a
    /// keyword.
    pub fn new(name: impl Into<String>) -> crate::Result<Self> {
        let name = name.into();

        if name.is_empty() {
            return Err(crate::GenError::InvalidIdentifier {
                name,
                reason: "identifier cannot be empty".to_string(),
            });
        }

        if name.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(crate::GenError::InvalidIdentifier {
                name,
                reason: "identifier cannot start with a digit".to_string(),
            });
        }

        if let Some(c) = name.chars().find(|c| !c.is_ascii_alphanumeric() && *c != '_') {
            return Err(crate::GenError::InvalidIdentifier {
                name,
                reason: format!("invalid character '{c}'"),
            });
        }

        if Self::KEYWORDS.contains(&name.as_str()) {
            return Err(crate::GenError::InvalidIdentifier {
                name,
                reason: "keyword".to_string(),
            });
        }

        Ok(Self(name))
    }

    /// Create an identifier without validation, for names known valid at
    /// compile time.
    #[must_use]
    pub fn new_unchecked(name: &'static str) -> Self {
        Self(name.to_string())
    }

    /// Get the identifier string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn identifier_valid() {
        assert!(Identifier::new("cover_0a1b2c3d4e5f").is_ok());
        assert!(Identifier::new("_x").is_ok());
        assert!(Identifier::new("Counts").is_ok());
    }

    #[test]
    fn identifier_invalid_keyword() {
        let err = Identifier::new("func").unwrap_err();
        assert!(err.to_string().contains("keyword"));
    }

    #[test]
    fn identifier_invalid_starts_digit() {
        let err = Identifier::new("1cover").unwrap_err();
        assert!(err.to_string().contains("digit"));
    }

    #[test]
    fn identifier_invalid_empty() {
        let err = Identifier::new("").unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn identifier_invalid_chars() {
        let err = Identifier::new("cover-x").unwrap_err();
        assert!(err.to_string().contains("invalid character"));
    }

    #[test]
    fn import_spec_rejects_bad_paths() {
        assert!(ImportSpec::new("").is_err());
        assert!(ImportSpec::new("has space").is_err());
        assert!(ImportSpec::new("quo\"te").is_err());
        assert!(ImportSpec::new("github.com/acme/covcollect").is_ok());
    }
}
