//! Top-level structure of a Go source unit.
//!
//! [`parse`] reads the package clause, every import declaration and every
//! function declaration header. Everything else (types, variables, function
//! bodies) is skipped as balanced token runs, which is enough to validate
//! delimiter structure and to locate the spans the instrumenter edits.

use crate::error::ParseError;
use crate::lexer::{tokenize, Token, TokenKind};
use crate::span::Span;

/// Parsed top-level view of one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Package name from the package clause
    pub package: String,
    /// Span of the package name
    pub package_span: Span,
    /// Import declarations in source order
    pub imports: Vec<ImportDecl>,
    /// Function declarations in source order
    pub funcs: Vec<FuncDecl>,
}

/// One `import` declaration, single or grouped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    /// Span of the `import` keyword
    pub keyword: Span,
    /// Parenthesized group delimiters, if grouped
    pub group: Option<ImportGroup>,
    /// Specs in source order
    pub specs: Vec<ImportSpecNode>,
}

/// Delimiters of `import ( ... )`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportGroup {
    /// The `(` token
    pub open: Span,
    /// The `)` token
    pub close: Span,
}

/// One import spec: `[name] "path"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpecNode {
    /// Local name (`.` and `_` included), if present
    pub name: Option<String>,
    /// Import path without quotes
    pub path: String,
    /// From the name (or path) to the end of the path literal
    pub span: Span,
}

/// Header of one top-level `func` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncDecl {
    /// Function or method name
    pub name: String,
    /// Whether a receiver is declared
    pub is_method: bool,
    /// Span of the `func` keyword
    pub keyword: Span,
    /// The body's opening `{`; `None` for external (body-less) functions
    pub body_open: Option<Span>,
    /// The body's closing `}`
    pub body_close: Option<Span>,
}

/// Parse a unit's top-level structure.
pub fn parse(source: &str) -> Result<SourceFile, ParseError> {
    let tokens = tokenize(source)?;
    Parser {
        source,
        tokens,
        pos: 0,
    }
    .file()
}

struct Parser<'src> {
    source: &'src str,
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Token {
        // tokenize guarantees a trailing Eof, and the cursor never passes it
        self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn bump(&mut self) -> Token {
        let token = self.peek();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn text(&self, span: Span) -> &str {
        &self.source[span.start..span.end]
    }

    fn expect(&mut self, kind: TokenKind, context: &str) -> Result<Token, ParseError> {
        let token = self.peek();
        if token.kind == kind {
            Ok(self.bump())
        } else {
            Err(self.unexpected(token, &format!("expected {} {context}", kind.description())))
        }
    }

    fn unexpected(&self, token: Token, message: &str) -> ParseError {
        ParseError::new(
            token.span.line,
            format!("{message}, found {}", token.kind.description()),
        )
    }

    /// Statement terminator: `;`, or nothing before a closer or end of file.
    fn terminator(&mut self, context: &str) -> Result<(), ParseError> {
        match self.peek().kind {
            TokenKind::Semi => {
                self.bump();
                Ok(())
            }
            TokenKind::Eof | TokenKind::RParen | TokenKind::RBrace => Ok(()),
            _ => Err(self.unexpected(self.peek(), &format!("expected ';' after {context}"))),
        }
    }

    fn file(mut self) -> Result<SourceFile, ParseError> {
        let package = self.peek();
        if package.kind != TokenKind::Package {
            return Err(self.unexpected(package, "expected package clause"));
        }
        self.bump();
        let name = self.expect(TokenKind::Ident, "after 'package'")?;
        self.terminator("package clause")?;

        let mut file = SourceFile {
            package: self.text(name.span).to_string(),
            package_span: name.span,
            imports: Vec::new(),
            funcs: Vec::new(),
        };

        loop {
            let token = self.peek();
            match token.kind {
                TokenKind::Eof => break,
                TokenKind::Semi => {
                    self.bump();
                }
                TokenKind::Import => {
                    let decl = self.import_decl()?;
                    file.imports.push(decl);
                }
                TokenKind::Func => {
                    let decl = self.func_decl()?;
                    file.funcs.push(decl);
                }
                TokenKind::Var | TokenKind::Const | TokenKind::Type => {
                    self.bump();
                    self.skip_to_terminator()?;
                }
                _ => return Err(self.unexpected(token, "expected declaration")),
            }
        }
        Ok(file)
    }

    fn import_decl(&mut self) -> Result<ImportDecl, ParseError> {
        let keyword = self.bump().span;
        if self.peek().kind != TokenKind::LParen {
            let spec = self.import_spec()?;
            self.terminator("import declaration")?;
            return Ok(ImportDecl {
                keyword,
                group: None,
                specs: vec![spec],
            });
        }

        let open = self.bump().span;
        let mut specs = Vec::new();
        loop {
            match self.peek().kind {
                TokenKind::RParen => break,
                TokenKind::Semi => {
                    self.bump();
                }
                _ => {
                    specs.push(self.import_spec()?);
                    self.terminator("import spec")?;
                }
            }
        }
        let close = self.bump().span;
        self.terminator("import declaration")?;
        Ok(ImportDecl {
            keyword,
            group: Some(ImportGroup { open, close }),
            specs,
        })
    }

    fn import_spec(&mut self) -> Result<ImportSpecNode, ParseError> {
        let first = self.peek();
        let name = match first.kind {
            TokenKind::Ident | TokenKind::Dot => {
                self.bump();
                Some(self.text(first.span).to_string())
            }
            _ => None,
        };
        let path = self.peek();
        if !matches!(path.kind, TokenKind::String | TokenKind::RawString) {
            return Err(self.unexpected(path, "expected import path"));
        }
        self.bump();
        let literal = self.text(path.span);
        Ok(ImportSpecNode {
            name,
            path: literal[1..literal.len() - 1].to_string(),
            span: first.span.merge(path.span),
        })
    }

    fn func_decl(&mut self) -> Result<FuncDecl, ParseError> {
        let keyword = self.bump().span;

        let is_method = self.peek().kind == TokenKind::LParen;
        if is_method {
            self.skip_balanced()?;
        }

        let name = self.expect(TokenKind::Ident, "function name")?;
        if self.peek().kind == TokenKind::LBracket {
            self.skip_balanced()?;
        }
        if self.peek().kind != TokenKind::LParen {
            return Err(self.unexpected(self.peek(), "expected parameter list"));
        }
        self.skip_balanced()?;

        // Result type runs until the body or the end of the declaration.
        let mut decl = FuncDecl {
            name: self.text(name.span).to_string(),
            is_method,
            keyword,
            body_open: None,
            body_close: None,
        };
        loop {
            let token = self.peek();
            match token.kind {
                TokenKind::LBrace => {
                    decl.body_open = Some(token.span);
                    decl.body_close = Some(self.skip_balanced()?);
                    self.terminator("function body")?;
                    return Ok(decl);
                }
                TokenKind::Semi | TokenKind::Eof => {
                    self.terminator("function declaration")?;
                    return Ok(decl);
                }
                TokenKind::Struct | TokenKind::Interface => {
                    self.bump();
                    if self.peek().kind == TokenKind::LBrace {
                        self.skip_balanced()?;
                    }
                }
                TokenKind::LParen | TokenKind::LBracket => {
                    self.skip_balanced()?;
                }
                kind if kind.is_close() => {
                    return Err(self.unexpected(token, "unbalanced delimiter in result type"));
                }
                _ => {
                    self.bump();
                }
            }
        }
    }

    /// Skip a delimited run starting at the current opener; returns the
    /// closer's span.
    fn skip_balanced(&mut self) -> Result<Span, ParseError> {
        let open = self.bump();
        let mut stack = vec![open];
        loop {
            let token = self.bump();
            match token.kind {
                TokenKind::Eof => {
                    let unclosed = stack.last().copied().unwrap_or(open);
                    return Err(ParseError::new(
                        unclosed.span.line,
                        format!("unclosed delimiter {}", unclosed.kind.description()),
                    ));
                }
                kind if kind.is_open() => stack.push(token),
                kind if kind.is_close() => {
                    let opener = stack.pop().unwrap_or(open);
                    if opener.kind.closer() != Some(kind) {
                        return Err(ParseError::new(
                            token.span.line,
                            format!(
                                "mismatched delimiter {} for {} on line {}",
                                kind.description(),
                                opener.kind.description(),
                                opener.span.line
                            ),
                        ));
                    }
                    if stack.is_empty() {
                        return Ok(token.span);
                    }
                }
                _ => {}
            }
        }
    }

    /// Skip a non-function declaration up to its terminating `;`.
    fn skip_to_terminator(&mut self) -> Result<(), ParseError> {
        loop {
            let token = self.peek();
            match token.kind {
                TokenKind::Semi => {
                    self.bump();
                    return Ok(());
                }
                TokenKind::Eof => return Ok(()),
                kind if kind.is_open() => {
                    self.skip_balanced()?;
                }
                kind if kind.is_close() => {
                    return Err(self.unexpected(token, "unbalanced delimiter"));
                }
                _ => {
                    self.bump();
                }
            }
        }
    }
}
