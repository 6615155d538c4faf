//! Byte spans and line lookup.

use serde::{Deserialize, Serialize};

/// Precomputed line starts for O(log n) offset to line/column lookup.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offset of each line start; `line_starts[0] == 0`.
    line_starts: Vec<usize>,
}

impl LineIndex {
    /// Build a line index from source text.
    pub fn new(source: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(offset, _)| offset + 1))
            .collect();
        Self { line_starts }
    }

    /// 1-indexed line and column (in bytes) of `offset`.
    pub fn line_col(&self, offset: usize) -> (u32, u32) {
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        };
        let line = (line_idx + 1) as u32;
        let col = (offset - self.line_starts[line_idx] + 1) as u32;
        (line, col)
    }

    /// 1-indexed line of `offset`.
    pub fn line(&self, offset: usize) -> u32 {
        self.line_col(offset).0
    }

    /// Number of lines.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

/// A contiguous byte range of a source unit with the line/column of its start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Byte offset of the start (inclusive)
    pub start: usize,
    /// Byte offset of the end (exclusive)
    pub end: usize,
    /// 1-indexed line of the start
    pub line: u32,
    /// 1-indexed column of the start
    pub col: u32,
}

impl Span {
    /// Create a new span.
    pub const fn new(start: usize, end: usize, line: u32, col: u32) -> Self {
        Self {
            start,
            end,
            line,
            col,
        }
    }

    /// Length in bytes.
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the span covers no bytes (inserted semicolons, EOF).
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Smallest span covering both `self` and `other`.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        let (first, _) = if self.start <= other.start {
            (self, other)
        } else {
            (other, self)
        };
        Self {
            start: first.start,
            end: self.end.max(other.end),
            line: first.line,
            col: first.col,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col() {
        let index = LineIndex::new("package main\n\nfunc main() {\n}\n");
        assert_eq!(index.line_col(0), (1, 1));
        assert_eq!(index.line_col(8), (1, 9));
        assert_eq!(index.line_col(13), (2, 1));
        assert_eq!(index.line_col(14), (3, 1));
        assert_eq!(index.line(26), 3);
        assert_eq!(index.line_count(), 5);
    }

    #[test]
    fn test_line_at_eof_without_newline() {
        let index = LineIndex::new("a\nb");
        assert_eq!(index.line_col(3), (2, 2));
    }

    #[test]
    fn test_span_merge() {
        let a = Span::new(4, 8, 1, 5);
        let b = Span::new(10, 12, 2, 1);
        let merged = b.merge(a);
        assert_eq!(merged, Span::new(4, 12, 1, 5));
        assert_eq!(merged.len(), 8);
        assert!(!merged.is_empty());
    }
}
