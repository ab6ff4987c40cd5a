//! fndiff core - function-granular structural diff engine.
//!
//! Compares two versions of a C-family source file function by function.
//! Whitespace and comment edits are ignored; any change to a string or
//! character literal is caught. No grammar is involved: literals and
//! comments are located by a small scanner, functions by bracket structure.
//!
//! # Features
//!
//! - **Item scanning**: literals, nestable comments and escapes as spans
//! - **Function extraction**: definitions found across `#if` branch choices
//! - **Literal-checked comparison**: whitespace-insensitive region scan
//! - **Multiple export formats**: line-per-event text, JSON
//!
//! # Usage
//!
//! ```
//! use fndiff_core::{diff_sources, ChangeType, DiffConfig, SourceBuffer};
//!
//! let old = SourceBuffer::new("old.c", "int f() { return \"a\"; }\n");
//! let new = SourceBuffer::new("new.c", "int f() { return \"b\"; }\n");
//! let result = diff_sources(&old, &new, &DiffConfig::default())?;
//! assert_eq!(result.changes[0].kind, ChangeType::Changed);
//! # Ok::<(), fndiff_core::DiffError>(())
//! ```

pub mod differ;
pub mod error;
pub mod exporter;
pub mod matcher;
pub mod normalizer;
pub mod parser;
pub mod scanner;
pub mod span;
pub mod types;

pub use differ::{
    diff_files, diff_sources, ChangeType, Divergence, DivergenceReason, FileDiffResult,
    FunctionChange, Verdict,
};
pub use error::{DiffError, Result};
pub use parser::{find_functions, Extraction};
pub use span::{Span, SpanKind, SpanSet};
pub use types::{DiffConfig, ExportConfig, FunctionEntry, SourceBuffer, OUTSIDE_FUNCTIONS};
