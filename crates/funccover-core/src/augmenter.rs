//! Entry-unit augmentation: runtime import and coverage table declaration.
//!
//! Runs in two phases. The import phase edits the parsed import
//! declarations structurally and splices the result back with `;`
//! separators so that no existing line moves. The declaration phase appends
//! the block rendered by `funccover-gen`.

use crate::error::{FuncCoverError, Result};
use crate::locator::FunctionRecord;
use crate::syntax::{parse, ImportDecl, SourceFile};
use funccover_gen::prelude::*;
use std::time::Duration;
use tracing::debug;

/// Add the runtime import and append the coverage table declaration.
///
/// `records` is the session-wide table in counter order.
///
/// # Errors
///
/// Returns [`FuncCoverError::Internal`] if the instrumented text no longer
/// parses.
pub fn augment(
    source: &str,
    table: &Identifier,
    records: &[FunctionRecord],
    output_file: &str,
    period: Duration,
) -> Result<String> {
    let mut text = add_runtime_import(source)?;
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
    text.push_str(&declaration_block(table, records, output_file, period)?);
    Ok(text)
}

/// Render the coverage table declaration and, for a positive period, the
/// `init` hook that starts periodic collection.
pub fn declaration_block(
    table: &Identifier,
    records: &[FunctionRecord],
    output_file: &str,
    period: Duration,
) -> Result<String> {
    let fragment = CoverDeclBuilder::new(table.as_str())?
        .output_file(output_file)
        .period(period)
        .functions(records.iter().map(|r| (r.name.as_str(), r.line)))
        .build();
    Ok(generate(&fragment))
}

/// Ensure an unnamed import of the runtime package.
///
/// # Errors
///
/// Returns [`FuncCoverError::Internal`] if `source` does not parse.
pub fn add_runtime_import(source: &str) -> Result<String> {
    let file = parse(source).map_err(|e| {
        FuncCoverError::Internal(format!("instrumented unit does not parse: {e}"))
    })?;

    let spec = runtime_import();
    if has_import(&file, &spec) {
        debug!("runtime import already present");
        return Ok(source.to_string());
    }

    let edit = import_edit(source, &file, &spec);
    let mut text = String::with_capacity(source.len() + edit.text.len());
    text.push_str(&source[..edit.start]);
    text.push_str(&edit.text);
    text.push_str(&source[edit.end..]);
    Ok(text)
}

/// Replacement of `start..end` by `text`.
#[derive(Debug, PartialEq, Eq)]
struct Edit {
    start: usize,
    end: usize,
    text: String,
}

impl Edit {
    fn insert(at: usize, text: String) -> Self {
        Self {
            start: at,
            end: at,
            text,
        }
    }
}

fn has_import(file: &SourceFile, spec: &ImportSpec) -> bool {
    file.imports
        .iter()
        .flat_map(|decl| &decl.specs)
        .any(|existing| existing.name.is_none() && existing.path == spec.path)
}

fn import_edit(source: &str, file: &SourceFile, spec: &ImportSpec) -> Edit {
    let rendered = render_import(spec);

    if let Some((decl, group)) = file
        .imports
        .iter()
        .find_map(|decl| decl.group.map(|group| (decl, group)))
    {
        return match decl.specs.iter().find(|s| s.path > spec.path) {
            Some(next) => Edit::insert(next.span.start, format!("{rendered}; ")),
            None => match decl.specs.last() {
                Some(last) => Edit::insert(last.span.end, format!("; {rendered}")),
                None => Edit::insert(group.open.end, rendered),
            },
        };
    }

    if let Some(ImportDecl { specs, .. }) = file.imports.first() {
        if let Some(existing) = specs.first() {
            let mut entries = [
                (
                    existing.path.as_str(),
                    source[existing.span.start..existing.span.end].to_string(),
                ),
                (spec.path.as_str(), rendered),
            ];
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let [(_, first), (_, second)] = entries;
            return Edit {
                start: existing.span.start,
                end: existing.span.end,
                text: format!("({first}; {second})"),
            };
        }
    }

    Edit::insert(file.package_span.end, format!("; import {rendered}"))
}
