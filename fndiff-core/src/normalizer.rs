//! Blanking of scanned spans.
//!
//! The normalized buffer always has the same length as its source so that
//! offsets found in one are valid in the other.

use crate::error::{DiffError, Result};
use crate::span::SpanSet;

/// Filler written over blanked spans. It is whitespace, so the comparator
/// skips it.
pub const FILLER: u8 = b' ';

/// Overwrite every span of `items` in place.
pub fn clear(buffer: &mut [u8], items: &SpanSet) -> Result<()> {
    let len = buffer.len();
    for span in items {
        if span.end() > len {
            return Err(DiffError::InvalidSpan {
                start: span.start(),
                end: span.end(),
                len,
            });
        }
        buffer[span.start()..span.end()].fill(FILLER);
    }
    Ok(())
}

/// Copy of `buffer` with every span of `items` blanked.
pub fn cleared(buffer: &[u8], items: &SpanSet) -> Result<Vec<u8>> {
    let mut copy = buffer.to_vec();
    clear(&mut copy, items)?;
    Ok(copy)
}
