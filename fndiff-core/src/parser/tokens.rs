//! Delimiter-based tokenizer.
//!
//! Not a lexer for any particular language: a token is either one delimiter
//! byte or a run of non-delimiter bytes, with a few two-byte operators glued
//! back together so that `->` or `+=` read as one token. A lone `#` absorbs
//! the following word, so `#  ifdef` reads as `#ifdef`.

use super::helpers::{is_delimiter, skip_spaces};

/// Two-byte operators that are read as a single token.
const COMPOUND_OPERATORS: &[&[u8; 2]] = &[
    b"<=", b">=", b"==", b"!=", b"+=", b"-=", b"*=", b"/=", b"%=", b"&=", b"|=", b"^=", b"~=",
    b"<<", b">>", b"->", b"++", b"--", b"||", b"&&", b"/*", b"*/",
];

/// A token and where it sits in the buffer (`[start, end)`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn is(&self, text: &str) -> bool {
        self.text == text
    }

    pub fn is_identifier(&self) -> bool {
        is_identifier(&self.text)
    }
}

/// Non-empty and free of delimiters.
pub fn is_identifier(text: &str) -> bool {
    !text.is_empty() && !text.bytes().any(is_delimiter)
}

/// Bounds of the next simple token at or after `index`.
fn simple_token(buffer: &[u8], index: usize) -> Option<(usize, usize)> {
    let start = skip_spaces(buffer, index);
    if start >= buffer.len() {
        return None;
    }
    if is_delimiter(buffer[start]) {
        return Some((start, start + 1));
    }
    let end = buffer[start..]
        .iter()
        .position(|&b| is_delimiter(b))
        .map_or(buffer.len(), |p| start + p);
    Some((start, end))
}

fn joins(buffer: &[u8], first: (usize, usize), second: (usize, usize)) -> bool {
    if first.1 - first.0 != 1 {
        return false;
    }
    if buffer[first.0] == b'#' {
        return true;
    }
    second.1 - second.0 == 1
        && second.0 == first.1
        && COMPOUND_OPERATORS.contains(&&[buffer[first.0], buffer[second.0]])
}

/// Read the token starting at or after `index`.
pub fn next_token(buffer: &[u8], index: usize) -> Option<Token> {
    let first = simple_token(buffer, index)?;
    let mut token = Token {
        text: String::from_utf8_lossy(&buffer[first.0..first.1]).into_owned(),
        start: first.0,
        end: first.1,
    };

    if let Some(second) = simple_token(buffer, first.1) {
        if joins(buffer, first, second) {
            token
                .text
                .push_str(&String::from_utf8_lossy(&buffer[second.0..second.1]));
            token.end = second.1;
        }
    }

    Some(token)
}

/// Sequential token reader that can be repositioned.
pub struct Tokenizer<'a> {
    buffer: &'a [u8],
    index: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(buffer: &'a [u8], index: usize) -> Self {
        Self { buffer, index }
    }

    pub fn seek(&mut self, index: usize) {
        self.index = index;
    }

    /// Advance to the next token equal to `target` and return it.
    pub fn skip_to(&mut self, target: &str) -> Option<Token> {
        Iterator::find(self, |token| token.is(target))
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let token = next_token(self.buffer, self.index)?;
        self.index = token.end;
        Some(token)
    }
}
