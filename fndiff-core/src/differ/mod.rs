//! Function-granular diff engine.
//!
//! Compares two versions of a source file function by function, ignoring
//! whitespace and comment edits while still catching any change inside a
//! string or character literal.
//!
//! # Features
//!
//! - **Name matching**: each old function is paired with the first new
//!   function of the same name; unpaired ones are deleted or added
//! - **Literal cross-check**: literals are compared byte for byte before the
//!   whitespace-insensitive scan runs
//! - **File-scope pass**: everything outside functions (globals, macros,
//!   includes) is compared as one pseudo-function
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use fndiff_core::{diff_files, DiffConfig};
//!
//! let result = diff_files(Path::new("old.c"), Path::new("new.c"), &DiffConfig::default())?;
//! for change in &result.changes {
//!     println!("{} {}", change.name, change.kind.as_str());
//! }
//! # Ok::<(), fndiff_core::DiffError>(())
//! ```

pub mod changes;
pub mod comparator;
pub mod driver;

// Re-export types for lib.rs
pub use changes::{ChangeType, DiffSummary, FileDiffResult, FunctionChange};
pub use comparator::{compare_regions, Divergence, DivergenceReason, Region, Verdict};
pub use driver::{diff_files, diff_functions, diff_outside_functions, diff_sources, normalize};
