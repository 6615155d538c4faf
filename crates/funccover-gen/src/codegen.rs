//! Go source rendering.
//!
//! Package-level declarations render in gofmt layout. Statements also have a
//! single-line form, [`inline_stmt`], for splicing into existing source
//! without moving any line.

use crate::hir::*;
use std::fmt::Write as _;

/// Render a fragment as text to append after a file's last declaration.
///
/// Every declaration is preceded by a blank line and terminated by a newline.
#[must_use]
pub fn generate(fragment: &GoFragment) -> String {
    let mut out = String::new();
    for decl in &fragment.decls {
        out.push('\n');
        write_decl(&mut out, decl);
        out.push('\n');
    }
    out
}

fn write_decl(out: &mut String, decl: &Decl) {
    match decl {
        Decl::Var { name, value } => {
            let _ = write!(out, "var {name} = ");
            match value {
                Expr::StructLit { ty, fields } if !fields.is_empty() => {
                    out.push_str(&render_expr(ty));
                    out.push_str("{\n");
                    for (field, value) in fields {
                        let _ = writeln!(out, "\t{field}: {},", render_expr(value));
                    }
                    out.push('}');
                }
                other => out.push_str(&render_expr(other)),
            }
        }
        Decl::Func { name, body } => {
            let _ = write!(out, "func {name}() {{");
            if body.is_empty() {
                out.push('}');
                return;
            }
            out.push('\n');
            for stmt in body {
                let _ = writeln!(out, "\t{}", render_stmt(stmt));
            }
            out.push('}');
        }
    }
}

/// Render a statement on one line, without terminator.
#[must_use]
pub fn render_stmt(stmt: &Stmt) -> String {
    match stmt {
        Stmt::Assign { target, value } => {
            format!("{} = {}", render_expr(target), render_expr(value))
        }
        Stmt::Expr(expr) => render_expr(expr),
        Stmt::Defer(expr) => format!("defer {}", render_expr(expr)),
        Stmt::Go(expr) => format!("go {}", render_expr(expr)),
    }
}

/// Render a statement for splicing after an opening brace: `stmt; `.
///
/// The explicit semicolon keeps the following tokens on the same line valid.
#[must_use]
pub fn inline_stmt(stmt: &Stmt) -> String {
    format!("{}; ", render_stmt(stmt))
}

/// Render an expression on one line.
#[must_use]
pub fn render_expr(expr: &Expr) -> String {
    let mut out = String::new();
    write_expr(&mut out, expr);
    out
}

fn write_expr(out: &mut String, expr: &Expr) {
    match expr {
        Expr::Bool(v) => out.push_str(if *v { "true" } else { "false" }),
        Expr::Int(v) => {
            let _ = write!(out, "{v}");
        }
        Expr::Str(s) => out.push_str(&quote(s)),
        Expr::Ident(id) => out.push_str(id.as_str()),
        Expr::Selector { operand, field } => {
            write_expr(out, operand);
            out.push('.');
            out.push_str(field.as_str());
        }
        Expr::Index { operand, index } => {
            write_expr(out, operand);
            out.push('[');
            write_expr(out, index);
            out.push(']');
        }
        Expr::Call { callee, args } => {
            write_expr(out, callee);
            out.push('(');
            write_list(out, args.iter());
            out.push(')');
        }
        Expr::SliceLit { elem, elems } => {
            let _ = write!(out, "[]{elem}{{");
            write_list(out, elems.iter());
            out.push('}');
        }
        Expr::StructLit { ty, fields } => {
            write_expr(out, ty);
            out.push('{');
            for (i, (field, value)) in fields.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                let _ = write!(out, "{field}: ");
                write_expr(out, value);
            }
            out.push('}');
        }
    }
}

fn write_list<'a>(out: &mut String, items: impl Iterator<Item = &'a Expr>) {
    for (i, item) in items.enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_expr(out, item);
    }
}

/// Render an import spec: `"path"` or `name "path"`.
#[must_use]
pub fn render_import(spec: &ImportSpec) -> String {
    match &spec.name {
        Some(name) => format!("{name} {}", quote(&spec.path)),
        None => quote(&spec.path),
    }
}

/// Quote a string as a Go interpreted string literal.
#[must_use]
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if u32::from(c) < 0x20 || c == '\u{7f}' => {
                let _ = write!(out, "\\x{:02x}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::builder::*;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    #[test]
    fn quote_escapes() {
        assert_eq!(quote("cover.out"), r#""cover.out""#);
        assert_eq!(quote(r#"a"b\c"#), r#""a\"b\\c""#);
        assert_eq!(quote("x\ny\t\u{1}"), r#""x\ny\t\x01""#);
        assert_eq!(quote("héllo"), "\"héllo\"");
    }

    #[test]
    fn counter_statement_inline() {
        let table = table_symbol("abc").unwrap();
        assert_eq!(inline_stmt(&counter_stmt(&table, 4)), "cover_abc.Counts[4] = true; ");
    }

    #[test]
    fn exit_flush_statement() {
        let table = table_symbol("abc").unwrap();
        assert_eq!(
            render_stmt(&exit_flush_stmt(&table, "out/cover.out")),
            r#"defer cover_abc.Collect("out/cover.out")"#
        );
    }

    #[test]
    fn declaration_block_layout() {
        let fragment = CoverDeclBuilder::new("cover_abc")
            .unwrap()
            .output_file("cover.out")
            .period(Duration::from_secs(2))
            .function("main", 7)
            .function("helper", 12)
            .build();

        let expected = "\nvar cover_abc = covcollect.Cover{\n\
            \tLen: 2,\n\
            \tLines: []uint32{7, 12},\n\
            \tNames: []string{\"main\", \"helper\"},\n\
            \tCounts: []bool{false, false},\n\
            }\n\
            \nfunc init() {\n\
            \tgo cover_abc.PeriodicalCollect(\"2s\", \"cover.out\")\n\
            }\n";
        assert_eq!(generate(&fragment), expected);
    }

    #[test]
    fn empty_table_renders_empty_slices() {
        let fragment = CoverDeclBuilder::new("cover_e").unwrap().build();
        let go = generate(&fragment);
        assert!(go.contains("\tLen: 0,\n"));
        assert!(go.contains("[]uint32{}"));
        assert!(!go.contains("func init"));
    }

    #[test]
    fn import_rendering() {
        assert_eq!(render_import(&runtime_import()), "\"covcollect\"");
        let named = ImportSpec {
            name: Some(Identifier::new("cc").unwrap()),
            path: "covcollect".to_string(),
        };
        assert_eq!(render_import(&named), "cc \"covcollect\"");
    }

    #[test]
    fn empty_func_body() {
        let fragment = GoFragment {
            decls: vec![Decl::Func {
                name: Identifier::new("noop").unwrap(),
                body: vec![],
            }],
        };
        assert_eq!(generate(&fragment), "\nfunc noop() {}\n");
    }
}
