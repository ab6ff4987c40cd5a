//! Balanced-depth matching of opener/closer pairs.
//!
//! Used for nestable comments by the scanner and for `()`, `[]` and `{}` by
//! the function extractor, which runs on a buffer whose literals and comments
//! are already blanked.

/// Find the end of the construct opened at `start`.
///
/// `buffer[start..]` must begin with `opening`. Returns the offset just past
/// the closer that brings the nesting depth back to zero, or `None` if the
/// buffer ends first. At each position the opener is tested before the
/// closer.
pub fn match_pair(buffer: &[u8], start: usize, opening: &[u8], closing: &[u8]) -> Option<usize> {
    if opening.is_empty() || closing.is_empty() || !buffer.get(start..)?.starts_with(opening) {
        return None;
    }

    let mut depth = 1usize;
    let mut index = start + opening.len();

    while index < buffer.len() {
        let rest = &buffer[index..];
        if rest.starts_with(opening) {
            depth += 1;
            index += opening.len();
        } else if rest.starts_with(closing) {
            depth -= 1;
            index += closing.len();
            if depth == 0 {
                return Some(index);
            }
        } else {
            index += 1;
        }
    }

    None
}

/// Single-byte convenience over [`match_pair`].
pub fn match_bracket(buffer: &[u8], start: usize, opening: u8, closing: u8) -> Option<usize> {
    match_pair(buffer, start, &[opening], &[closing])
}
