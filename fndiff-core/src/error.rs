//! Error types for fndiff-core.

use thiserror::Error;

/// Result type alias for fndiff-core operations.
pub type Result<T> = std::result::Result<T, DiffError>;

/// Fatal conditions that abort a comparison.
///
/// Recoverable conditions (missing input files, unterminated literals,
/// duplicate or overlapping functions) never surface here; they are logged
/// and recorded as notices on the result instead.
#[derive(Error, Debug)]
pub enum DiffError {
    /// A `/*` comment runs past the end of the buffer.
    #[error("No matching closing comment for comment opened at line {line}")]
    UnterminatedComment {
        /// Line of the comment opener.
        line: usize,
    },

    /// A span was constructed with a reversed or out-of-bounds range.
    #[error("Invalid span [{start}, {end}) for buffer of length {len}")]
    InvalidSpan {
        /// Requested start offset.
        start: usize,
        /// Requested end offset.
        end: usize,
        /// Length of the buffer the span points into.
        len: usize,
    },

    /// The normalized buffer does not line up with its original.
    #[error("The size of the original ({original}) and processed ({normalized}) buffers do not match")]
    LengthMismatch {
        /// Length of the original buffer.
        original: usize,
        /// Length of the normalized buffer.
        normalized: usize,
    },

    /// Conditional compilation directives are not balanced.
    #[error("Unbalanced pragma at line {line}: {message}")]
    UnbalancedPragma {
        /// Line of the offending directive.
        line: usize,
        /// What is wrong with it.
        message: String,
    },

    /// Function boundaries could not be determined for any pragma choice.
    #[error("Cannot extract functions: {message}")]
    Extraction {
        /// Description of the last parse failure.
        message: String,
    },

    /// IO error reading an input file.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
