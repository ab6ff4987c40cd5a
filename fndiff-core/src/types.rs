//! Shared data models: comparison settings, loaded buffers and function entries.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::Result;
use crate::span::{Span, SpanKind};

/// Default bound on the number of pragma branch choices explored per file.
pub const DEFAULT_CHOICE_LIMIT: usize = 500;

/// Name of the pseudo-function covering everything outside function bodies.
pub const OUTSIDE_FUNCTIONS: &str = "#DATA DECLARATIONS OUTSIDE OF FUNCTIONS#";

/// Settings for one comparison, passed explicitly to every stage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    /// Extract the whole declaration (return type, name, parameters) rather
    /// than only the body between braces.
    pub full_function: bool,
    /// Treat `/* ... */` as nestable.
    pub nested_comments: bool,
    /// Recognize `//` line comments.
    pub line_comments: bool,
    /// Upper bound on explored pragma branch choices.
    pub choice_limit: usize,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            full_function: true,
            nested_comments: true,
            line_comments: true,
            choice_limit: DEFAULT_CHOICE_LIMIT,
        }
    }
}

/// Rendering options shared by the exporters.
#[derive(Clone, Debug, Default)]
pub struct ExportConfig {
    /// Include unchanged functions in text output.
    pub show_all: bool,
    pub pretty_print: bool,
}

impl ExportConfig {
    pub fn new(show_all: bool, pretty_print: bool) -> Self {
        Self {
            show_all,
            pretty_print,
        }
    }
}

/// The bytes of one input file.
///
/// A file that does not exist loads as an empty buffer with `missing` set,
/// so that whole-file additions and deletions still produce per-function
/// reports.
#[derive(Clone, Debug, Default)]
pub struct SourceBuffer {
    pub path: String,
    pub bytes: Vec<u8>,
    pub missing: bool,
}

impl SourceBuffer {
    pub fn new(path: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            bytes: bytes.into(),
            missing: false,
        }
    }

    /// Placeholder for an input that could not be found.
    pub fn missing(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            bytes: Vec::new(),
            missing: true,
        }
    }

    /// Read a file fully into memory.
    pub fn load(path: &Path) -> Result<Self> {
        let shown = path.display().to_string();
        match fs::read(path) {
            Ok(bytes) => Ok(Self::new(shown, bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!("File {} is missing", shown);
                Ok(Self::missing(shown))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// One function's extent within a file buffer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionEntry {
    pub name: String,
    pub span: Span,
}

impl FunctionEntry {
    /// Build an entry for `[start, end)` of a buffer of length `len`.
    pub fn new(name: impl Into<String>, start: usize, end: usize, len: usize) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            span: Span::new(start, end, SpanKind::Other, len)?,
        })
    }

    pub fn start(&self) -> usize {
        self.span.start()
    }

    pub fn end(&self) -> usize {
        self.span.end()
    }
}
