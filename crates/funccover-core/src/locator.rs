//! Function discovery.
//!
//! Produces the ordered table of top-level functions that receive a counter.

use crate::error::ParseError;
use crate::syntax::{parse, SourceFile};
use serde::{Deserialize, Serialize};

/// Package that holds the program entry point.
pub const ENTRY_PACKAGE: &str = "main";

/// Name of the program entry function.
pub const ENTRY_FUNCTION: &str = "main";

/// One instrumentable function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionRecord {
    /// Function name
    pub name: String,
    /// Line of the body's opening brace
    pub line: u32,
    /// Byte offset just past the opening brace
    pub insertion_offset: usize,
}

impl FunctionRecord {
    /// Whether this is the program entry function.
    pub fn is_entry(&self) -> bool {
        self.name == ENTRY_FUNCTION
    }
}

/// Result of locating functions in one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitAnalysis {
    /// Package name from the package clause
    pub package: String,
    /// Top-level functions with bodies, in declaration order
    pub records: Vec<FunctionRecord>,
}

impl UnitAnalysis {
    /// Whether the unit declares the entry function.
    pub fn has_entry(&self) -> bool {
        self.records.iter().any(FunctionRecord::is_entry)
    }
}

/// Parse `source` and list its instrumentable functions.
///
/// Methods and body-less declarations are skipped; function literals are
/// never seen because bodies are not descended into.
pub fn locate(source: &str) -> Result<UnitAnalysis, ParseError> {
    let file = parse(source)?;
    Ok(analyze(&file))
}

/// List the instrumentable functions of an already parsed unit.
pub fn analyze(file: &SourceFile) -> UnitAnalysis {
    let records = file
        .funcs
        .iter()
        .filter(|func| !func.is_method)
        .filter_map(|func| {
            func.body_open.map(|brace| FunctionRecord {
                name: func.name.clone(),
                line: brace.line,
                insertion_offset: brace.end,
            })
        })
        .collect();
    UnitAnalysis {
        package: file.package.clone(),
        records,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const SOURCE: &str = "package main

import \"fmt\"

type T struct{}

func (T) String() string { return \"t\" }

//go:noescape
func asm(x int)

func helper() {
	defer func() {}()
}

func main() {
	fmt.Println(T{})
	helper()
}
";

    #[test]
    fn test_records_in_declaration_order() {
        let analysis = locate(SOURCE).unwrap();
        assert_eq!(analysis.package, "main");
        let names: Vec<_> = analysis.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["helper", "main"]);
        assert_eq!(analysis.records[0].line, 12);
        assert_eq!(analysis.records[1].line, 16);
        assert!(analysis.has_entry());
    }

    #[test]
    fn test_insertion_offset_follows_brace() {
        let analysis = locate(SOURCE).unwrap();
        for record in &analysis.records {
            assert_eq!(&SOURCE[record.insertion_offset - 1..record.insertion_offset], "{");
        }
        let offsets: Vec<_> = analysis.records.iter().map(|r| r.insertion_offset).collect();
        assert!(offsets.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_no_entry_in_library_unit() {
        let analysis = locate("package util\nfunc Helper() {}\n").unwrap();
        assert_eq!(analysis.package, "util");
        assert!(!analysis.has_entry());
        assert_eq!(analysis.records.len(), 1);
    }

    #[test]
    fn test_main_method_is_not_entry() {
        let analysis = locate("package main\ntype S struct{}\nfunc (S) main() {}\n").unwrap();
        assert!(analysis.records.is_empty());
        assert!(!analysis.has_entry());
    }

    #[test]
    fn test_leading_byte_order_mark() {
        let source = "\u{feff}package main\nfunc main() {}\n";
        let analysis = locate(source).unwrap();
        assert!(analysis.has_entry());
        let record = &analysis.records[0];
        assert_eq!(record.line, 2);
        assert_eq!(&source[record.insertion_offset - 1..record.insertion_offset], "{");
    }

    #[test]
    fn test_parse_error_propagates() {
        let err = locate("package main\nfunc main() {\n").unwrap_err();
        assert_eq!(err.line, 2);
    }
}
