//! Counter insertion.
//!
//! A single pass over the original text that splices a counter statement
//! after each function's opening brace. Inserted text never contains a
//! newline, so diagnostics keep their original line numbers.

use crate::error::{FuncCoverError, Result};
use crate::locator::FunctionRecord;
use funccover_gen::prelude::*;

/// Output of [`insert_counters`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertedUnit {
    /// Rewritten text
    pub text: String,
    /// Counter index following the last one used
    pub next_index: usize,
}

/// Insert one counter statement per record, numbering from `start_index`.
///
/// When `exit_flush` names an output file, the entry function additionally
/// receives a deferred collection of the table into that file.
///
/// # Errors
///
/// Returns [`FuncCoverError::StaleRecords`] if offsets are not strictly
/// increasing, exceed the text or split a character.
pub fn insert_counters(
    source: &str,
    records: &[FunctionRecord],
    table: &Identifier,
    start_index: usize,
    exit_flush: Option<&str>,
) -> Result<InsertedUnit> {
    let mut text = String::with_capacity(source.len() + records.len() * 48);
    let mut copied = 0;
    let mut index = start_index;

    for record in records {
        let offset = record.insertion_offset;
        if index > start_index && offset <= copied {
            return Err(FuncCoverError::StaleRecords(format!(
                "offset {offset} of '{}' is not after the previous insertion",
                record.name
            )));
        }
        if offset > source.len() || !source.is_char_boundary(offset) {
            return Err(FuncCoverError::StaleRecords(format!(
                "offset {offset} of '{}' is outside the source",
                record.name
            )));
        }

        text.push_str(&source[copied..offset]);
        text.push_str(&inline_stmt(&counter_stmt(table, index)));
        if let Some(output_file) = exit_flush.filter(|_| record.is_entry()) {
            text.push_str(&inline_stmt(&exit_flush_stmt(table, output_file)));
        }
        copied = offset;
        index += 1;
    }
    text.push_str(&source[copied..]);

    Ok(InsertedUnit {
        text,
        next_index: index,
    })
}
