//! Lexical analysis for Go source units.
//!
//! The lexer recognizes just enough of Go to find declarations reliably:
//! comments, all literal forms (so braces inside strings are never
//! mistaken for blocks), keywords that start declarations, delimiters and
//! operators. Newlines are not tokens of their own; instead the [`Lexer`]
//! applies Go's automatic semicolon insertion and yields an implicit
//! [`TokenKind::Semi`] where the Go grammar would see one.
//!
//! # Example
//!
//! ```rust
//! use funccover_core::lexer::{Lexer, TokenKind};
//!
//! let kinds: Vec<_> = Lexer::new("package main\n").map(|t| t.kind).collect();
//! assert_eq!(kinds, vec![
//!     TokenKind::Package,
//!     TokenKind::Ident,
//!     TokenKind::Semi,
//!     TokenKind::Eof,
//! ]);
//! ```

use crate::error::ParseError;
use crate::span::{LineIndex, Span};
use logos::Logos;

/// Token kinds for Go source.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\f]+")]
#[logos(skip r"//[^\n]*")]
pub enum TokenKind {
    // Declaration keywords
    #[token("package")]
    Package,
    #[token("import")]
    Import,
    #[token("func")]
    Func,
    #[token("type")]
    Type,
    #[token("var")]
    Var,
    #[token("const")]
    Const,
    #[token("struct")]
    Struct,
    #[token("interface")]
    Interface,

    // Keywords that end a statement before a newline
    #[token("break")]
    #[token("continue")]
    #[token("fallthrough")]
    #[token("return")]
    Jump,

    /// Any other keyword
    #[token("case")]
    #[token("chan")]
    #[token("default")]
    #[token("defer")]
    #[token("else")]
    #[token("for")]
    #[token("go")]
    #[token("goto")]
    #[token("if")]
    #[token("map")]
    #[token("range")]
    #[token("select")]
    #[token("switch")]
    Keyword,

    #[regex(r"[\p{L}_][\p{L}\p{Nd}_]*")]
    Ident,

    /// Integer, floating-point or imaginary literal in any base
    #[regex(r"[0-9]([0-9a-zA-Z_.]|[eEpP][+-])*")]
    #[regex(r"\.[0-9]([0-9a-zA-Z_]|[eE][+-])*")]
    Number,

    /// Interpreted string literal
    #[regex(r#""([^"\\\n]|\\[^\n])*""#)]
    String,

    /// Raw string literal
    #[regex(r"`[^`]*`")]
    RawString,

    /// Rune literal
    #[regex(r"'([^'\\\n]|\\[^\n])+'")]
    Rune,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,

    /// Explicit `;`, or one inserted at a line break
    #[token(";")]
    Semi,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("...")]
    Ellipsis,

    /// `++` / `--`
    #[token("++")]
    #[token("--")]
    IncDec,

    #[token("+")]
    #[token("-")]
    #[token("*")]
    #[token("/")]
    #[token("%")]
    #[token("&")]
    #[token("|")]
    #[token("^")]
    #[token("<<")]
    #[token(">>")]
    #[token("&^")]
    #[token("+=")]
    #[token("-=")]
    #[token("*=")]
    #[token("/=")]
    #[token("%=")]
    #[token("&=")]
    #[token("|=")]
    #[token("^=")]
    #[token("<<=")]
    #[token(">>=")]
    #[token("&^=")]
    #[token("&&")]
    #[token("||")]
    #[token("<-")]
    #[token("==")]
    #[token("!=")]
    #[token("<")]
    #[token("<=")]
    #[token(">")]
    #[token(">=")]
    #[token("=")]
    #[token(":=")]
    #[token("!")]
    #[token("~")]
    #[token(":")]
    Operator,

    /// Line break (consumed by semicolon insertion, never yielded)
    #[token("\n")]
    Newline,

    /// General comment spanning a line break; acts like a newline
    #[token("/*", general_comment)]
    MultiLineComment,

    /// General comment without closing `*/`
    UnclosedComment,

    /// End of file marker (added by the [`Lexer`] wrapper)
    Eof,

    /// Lexer error
    Error,
}

/// Skip a `/* ... */` comment. Comments containing a newline are kept so
/// that semicolon insertion sees them.
fn general_comment(lexer: &mut logos::Lexer<TokenKind>) -> logos::Filter<TokenKind> {
    let remainder = lexer.remainder();
    match remainder.find("*/") {
        Some(end) => {
            let multi_line = remainder[..end].contains('\n');
            lexer.bump(end + 2);
            if multi_line {
                logos::Filter::Emit(TokenKind::MultiLineComment)
            } else {
                logos::Filter::Skip
            }
        }
        None => {
            lexer.bump(remainder.len());
            logos::Filter::Emit(TokenKind::UnclosedComment)
        }
    }
}

impl TokenKind {
    /// Whether a line break after this token inserts a semicolon.
    pub const fn ends_statement(self) -> bool {
        matches!(
            self,
            Self::Ident
                | Self::Number
                | Self::String
                | Self::RawString
                | Self::Rune
                | Self::Jump
                | Self::IncDec
                | Self::RParen
                | Self::RBracket
                | Self::RBrace
        )
    }

    /// Opening delimiter.
    pub const fn is_open(self) -> bool {
        matches!(self, Self::LParen | Self::LBracket | Self::LBrace)
    }

    /// Closing delimiter.
    pub const fn is_close(self) -> bool {
        matches!(self, Self::RParen | Self::RBracket | Self::RBrace)
    }

    /// Closing delimiter matching an opening one.
    pub const fn closer(self) -> Option<Self> {
        match self {
            Self::LParen => Some(Self::RParen),
            Self::LBracket => Some(Self::RBracket),
            Self::LBrace => Some(Self::RBrace),
            _ => None,
        }
    }

    /// Human-readable description for diagnostics.
    pub const fn description(self) -> &'static str {
        match self {
            Self::Package => "'package'",
            Self::Import => "'import'",
            Self::Func => "'func'",
            Self::Type => "'type'",
            Self::Var => "'var'",
            Self::Const => "'const'",
            Self::Struct => "'struct'",
            Self::Interface => "'interface'",
            Self::Jump | Self::Keyword => "keyword",
            Self::Ident => "identifier",
            Self::Number => "number",
            Self::String | Self::RawString => "string literal",
            Self::Rune => "rune literal",
            Self::LParen => "'('",
            Self::RParen => "')'",
            Self::LBracket => "'['",
            Self::RBracket => "']'",
            Self::LBrace => "'{'",
            Self::RBrace => "'}'",
            Self::Semi => "';'",
            Self::Comma => "','",
            Self::Dot => "'.'",
            Self::Ellipsis => "'...'",
            Self::IncDec | Self::Operator => "operator",
            Self::Newline | Self::MultiLineComment => "newline",
            Self::UnclosedComment => "unterminated comment",
            Self::Eof => "end of file",
            Self::Error => "invalid token",
        }
    }
}

/// A token with its kind and source span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Whether this semicolon was inserted at a line break.
    pub const fn is_implicit(&self) -> bool {
        matches!(self.kind, TokenKind::Semi) && self.span.is_empty()
    }
}

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Go lexer with automatic semicolon insertion.
#[derive(Clone)]
pub struct Lexer<'src> {
    inner: logos::Lexer<'src, TokenKind>,
    source: &'src str,
    line_index: LineIndex,
    last: Option<TokenKind>,
    finished: bool,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source.
    ///
    /// A leading byte-order mark is skipped; spans still index `source`.
    pub fn new(source: &'src str) -> Self {
        let mut inner = TokenKind::lexer(source);
        if source.starts_with(BYTE_ORDER_MARK) {
            inner.bump(BYTE_ORDER_MARK.len_utf8());
        }
        Self {
            inner,
            source,
            line_index: LineIndex::new(source),
            last: None,
            finished: false,
        }
    }

    /// Source text of a span.
    pub fn slice(&self, span: &Span) -> &'src str {
        &self.source[span.start..span.end]
    }

    fn span(&self, start: usize, end: usize) -> Span {
        let (line, col) = self.line_index.line_col(start);
        Span::new(start, end, line, col)
    }

    /// Semicolon to insert before a line break at `offset`, if any.
    fn implicit_semi(&mut self, offset: usize) -> Option<Token> {
        let insert = self.last.is_some_and(TokenKind::ends_statement);
        if insert {
            self.last = Some(TokenKind::Semi);
            Some(Token::new(TokenKind::Semi, self.span(offset, offset)))
        } else {
            None
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.finished {
                return None;
            }

            match self.inner.next() {
                Some(Ok(TokenKind::Newline | TokenKind::MultiLineComment)) => {
                    let start = self.inner.span().start;
                    if let Some(semi) = self.implicit_semi(start) {
                        return Some(semi);
                    }
                }
                Some(Ok(kind)) => {
                    let range = self.inner.span();
                    self.last = Some(kind);
                    return Some(Token::new(kind, self.span(range.start, range.end)));
                }
                Some(Err(())) => {
                    let range = self.inner.span();
                    self.last = Some(TokenKind::Error);
                    return Some(Token::new(TokenKind::Error, self.span(range.start, range.end)));
                }
                None => {
                    let end = self.source.len();
                    if let Some(semi) = self.implicit_semi(end) {
                        return Some(semi);
                    }
                    self.finished = true;
                    return Some(Token::new(TokenKind::Eof, self.span(end, end)));
                }
            }
        }
    }
}

/// Tokenize a whole unit, failing on the first invalid token.
///
/// The returned vector always ends with [`TokenKind::Eof`].
pub fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    for token in lexer {
        match token.kind {
            TokenKind::Error => {
                let text = source.get(token.span.start..token.span.end).unwrap_or("");
                let message = if text.starts_with(['"', '\'']) {
                    "unterminated literal".to_string()
                } else if text.starts_with('`') {
                    "unterminated raw string".to_string()
                } else {
                    format!("invalid token {text:?}")
                };
                return Err(ParseError::new(token.span.line, message));
            }
            TokenKind::UnclosedComment => {
                return Err(ParseError::new(token.span.line, "unterminated comment"));
            }
            _ => tokens.push(token),
        }
    }
    Ok(tokens)
}
