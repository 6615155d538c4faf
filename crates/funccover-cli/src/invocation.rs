//! Parsed view of one forwarded toolchain invocation.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// Which toolchain stage is being run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    /// Per-package compiler
    Compile,
    /// Final linker
    Link,
    /// Anything else (asm, vet, cgo, ...)
    Passthrough,
}

impl ToolKind {
    /// Classify a tool by its base name, ignoring any executable suffix.
    #[must_use]
    pub fn classify(tool: &Path) -> Self {
        match tool.file_stem().and_then(OsStr::to_str) {
            Some("compile") => Self::Compile,
            Some("link") => Self::Link,
            _ => Self::Passthrough,
        }
    }

    /// Lowercase name for logging
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Compile => "compile",
            Self::Link => "link",
            Self::Passthrough => "passthrough",
        }
    }
}

/// One toolchain invocation as received from `go build -toolexec`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    /// Path of the real tool
    pub tool: OsString,
    /// Arguments after the tool path, possibly rewritten
    pub args: Vec<OsString>,
    /// Stage classification
    pub kind: ToolKind,
    /// `-o` value
    pub output: Option<PathBuf>,
    /// `-p` value
    pub package: Option<String>,
    /// `-importcfg` value
    pub importcfg: Option<PathBuf>,
    /// Positions in `args` of `.go` operands
    pub source_indices: Vec<usize>,
}

impl ToolInvocation {
    /// Parse `<tool> <args...>`. Returns `None` for an empty command.
    #[must_use]
    pub fn parse(command: Vec<OsString>) -> Option<Self> {
        let mut command = command.into_iter();
        let tool = command.next()?;
        let args: Vec<OsString> = command.collect();
        let kind = ToolKind::classify(Path::new(&tool));

        let mut invocation = Self {
            tool,
            args,
            kind,
            output: None,
            package: None,
            importcfg: None,
            source_indices: Vec::new(),
        };
        invocation.scan();
        Some(invocation)
    }

    fn scan(&mut self) {
        let mut i = 0;
        while i < self.args.len() {
            let Some(arg) = self.args[i].to_str() else {
                break;
            };
            if arg == "--" {
                i += 1;
                break;
            }
            if !arg.starts_with('-') || arg == "-" {
                break;
            }

            let (name, inline) = match arg.trim_start_matches('-').split_once('=') {
                Some((name, value)) => (name.to_string(), Some(value.to_string())),
                None => (arg.trim_start_matches('-').to_string(), None),
            };

            let known = matches!(name.as_str(), "o" | "p" | "importcfg");
            let value = match inline {
                Some(value) => Some(value),
                None => match self.args.get(i + 1).and_then(|next| next.to_str()) {
                    Some(next) if known || takes_value(next) => {
                        i += 1;
                        Some(next.to_string())
                    }
                    _ => None,
                },
            };

            match (name.as_str(), value) {
                ("o", Some(value)) => self.output = Some(PathBuf::from(value)),
                ("p", Some(value)) => self.package = Some(value),
                ("importcfg", Some(value)) => self.importcfg = Some(PathBuf::from(value)),
                _ => {}
            }
            i += 1;
        }

        self.source_indices = (i..self.args.len())
            .filter(|&idx| Path::new(&self.args[idx]).extension() == Some(OsStr::new("go")))
            .collect();
    }

    /// `.go` operands in argument order.
    pub fn source_paths(&self) -> impl Iterator<Item = (usize, &Path)> {
        self.source_indices
            .iter()
            .map(|&idx| (idx, Path::new(&self.args[idx])))
    }

    /// Replace the argument at `index`.
    pub fn replace_arg(&mut self, index: usize, value: impl Into<OsString>) {
        if let Some(slot) = self.args.get_mut(index) {
            *slot = value.into();
        }
    }

    /// True for a compile of the entry package with every field needed to
    /// instrument it.
    #[must_use]
    pub fn is_entry_compile(&self) -> bool {
        self.kind == ToolKind::Compile
            && self.output.is_some()
            && self.importcfg.is_some()
            && self.package.as_deref() == Some(funccover_core::ENTRY_PACKAGE)
    }
}

/// Whether an unknown flag should consume `next` as its value.
fn takes_value(next: &str) -> bool {
    !next.starts_with('-') && !next.ends_with(".go")
}
