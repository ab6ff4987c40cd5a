//! Helper functions for raw buffer navigation.

/// Bytes that end an identifier-like token.
const DELIMITERS: &[u8] = b"!@#$%^&*()-+=|\\`~[]{};:'\"<>,.?/ \t\r\n";

/// Check whether a byte separates tokens.
pub fn is_delimiter(c: u8) -> bool {
    DELIMITERS.contains(&c)
}

/// Whitespace as the tokenizer sees it.
pub fn is_space(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\n' | b'\r')
}

/// Advance past whitespace starting at `index`.
pub fn skip_spaces(buffer: &[u8], mut index: usize) -> usize {
    while index < buffer.len() && is_space(buffer[index]) {
        index += 1;
    }
    index
}

/// Get line number (1-indexed) of a byte offset.
///
/// Offsets at or past the end report the last line.
pub fn line_number(buffer: &[u8], offset: usize) -> usize {
    let end = offset.min(buffer.len());
    bytecount::count(&buffer[..end], b'\n') + 1
}

/// Offset of the first byte of the line containing `index`.
pub fn line_start(buffer: &[u8], index: usize) -> usize {
    let index = index.min(buffer.len());
    buffer[..index]
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |p| p + 1)
}
