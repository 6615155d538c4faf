//! Reading coverage files back.
//!
//! The file format is one `name:line:flag` line per function, as written by
//! [`Cover::collect`](crate::Cover::collect).

use crate::error::{CollectError, CollectResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One row of a coverage file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageRecord {
    /// Function name
    pub name: String,
    /// Source line of the function body
    pub line: u32,
    /// Whether the function executed
    pub hit: bool,
}

impl CoverageRecord {
    /// Create a new record
    #[must_use]
    pub fn new(name: impl Into<String>, line: u32, hit: bool) -> Self {
        Self {
            name: name.into(),
            line,
            hit,
        }
    }

    /// Parse a single `name:line:flag` line
    fn parse(line: &str) -> Option<Self> {
        let mut fields = line.rsplitn(3, ':');
        let hit = match fields.next()? {
            "true" => true,
            "false" => false,
            _ => return None,
        };
        let line_number = fields.next()?.parse().ok()?;
        let name = fields.next().filter(|name| !name.is_empty())?;
        Some(Self::new(name, line_number, hit))
    }
}

/// Coverage summary statistics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoverageSummary {
    /// Number of tracked functions
    pub total_functions: usize,
    /// Number of functions that executed
    pub covered_functions: usize,
    /// Coverage percentage
    pub coverage_percent: f64,
}

/// Parsed contents of a coverage file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageProfile {
    records: Vec<CoverageRecord>,
}

impl CoverageProfile {
    /// Build a profile from records
    #[must_use]
    pub fn from_records(records: Vec<CoverageRecord>) -> Self {
        Self { records }
    }

    /// Parse coverage-file text. Blank lines are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::MalformedLine`] for the first line that is not
    /// `name:line:flag`.
    pub fn parse(text: &str) -> CollectResult<Self> {
        let records = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| {
                CoverageRecord::parse(line).ok_or_else(|| CollectError::MalformedLine {
                    line_number: idx + 1,
                    content: line.to_string(),
                })
            })
            .collect::<CollectResult<Vec<_>>>()?;
        Ok(Self { records })
    }

    /// Read and parse a coverage file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn read(path: impl AsRef<Path>) -> CollectResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// All records in table order
    #[must_use]
    pub fn records(&self) -> &[CoverageRecord] {
        &self.records
    }

    /// Records of functions that executed
    pub fn covered(&self) -> impl Iterator<Item = &CoverageRecord> {
        self.records.iter().filter(|r| r.hit)
    }

    /// Records of functions that never executed
    pub fn uncovered(&self) -> impl Iterator<Item = &CoverageRecord> {
        self.records.iter().filter(|r| !r.hit)
    }

    /// Summary statistics
    #[must_use]
    pub fn summary(&self) -> CoverageSummary {
        let total_functions = self.records.len();
        let covered_functions = self.covered().count();
        let coverage_percent = if total_functions == 0 {
            100.0 // Vacuously true
        } else {
            covered_functions as f64 / total_functions as f64 * 100.0
        };
        CoverageSummary {
            total_functions,
            covered_functions,
            coverage_percent,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_written_format() {
        let profile = CoverageProfile::parse("a:10:true\nb:20:false\nc:30:true\n").unwrap();
        assert_eq!(
            profile.records(),
            &[
                CoverageRecord::new("a", 10, true),
                CoverageRecord::new("b", 20, false),
                CoverageRecord::new("c", 30, true),
            ]
        );
    }

    #[test]
    fn test_summary() {
        let profile = CoverageProfile::parse("a:1:true\nb:2:false\nc:3:false\nd:4:true\n").unwrap();
        let summary = profile.summary();
        assert_eq!(summary.total_functions, 4);
        assert_eq!(summary.covered_functions, 2);
        assert!((summary.coverage_percent - 50.0).abs() < f64::EPSILON);
        let uncovered: Vec<_> = profile.uncovered().map(|r| r.name.as_str()).collect();
        assert_eq!(uncovered, vec!["b", "c"]);
    }

    #[test]
    fn test_empty_profile_is_fully_covered() {
        let profile = CoverageProfile::parse("").unwrap();
        assert!(profile.records().is_empty());
        assert!((profile.summary().coverage_percent - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_malformed_flag_rejected() {
        let err = CoverageProfile::parse("a:1:true\nb:2:1\n").unwrap_err();
        assert!(matches!(err, CollectError::MalformedLine { line_number: 2, .. }));
    }

    #[test]
    fn test_malformed_line_number_rejected() {
        let err = CoverageProfile::parse("a:x:true\n").unwrap_err();
        assert!(matches!(err, CollectError::MalformedLine { line_number: 1, .. }));
    }

    #[test]
    fn test_missing_name_rejected() {
        assert!(CoverageProfile::parse(":3:true\n").is_err());
        assert!(CoverageProfile::parse("3:true\n").is_err());
    }

    #[test]
    fn test_blank_lines_ignored() {
        let profile = CoverageProfile::parse("\na:1:false\n\n").unwrap();
        assert_eq!(profile.records().len(), 1);
    }
}
