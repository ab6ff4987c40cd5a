//! Lexical item scanner.
//!
//! Locates string literals, character literals, comments and escape sequences
//! in a raw buffer without parsing the language. The scan is a small state
//! machine driven by a single transition function:
//!
//! | State       | Leaves when                                   |
//! |-------------|-----------------------------------------------|
//! | `Normal`    | a quote, comment opener or `\` is seen        |
//! | `InString`  | the next unescaped `"` (or end of buffer)     |
//! | `InChar`    | the next unescaped `'` (or end of buffer)     |
//! | `InComment` | the matching `*/` (fatal if absent), or `\n`  |
//! | `InEscape`  | always, after two bytes                       |
//!
//! Every kind is always recognized, so that a quote inside a comment never
//! opens a literal; [`ScanOptions`] only decides which kinds are recorded.

use crate::error::{DiffError, Result};
use crate::matcher::match_pair;
use crate::parser::helpers::line_number;
use crate::span::{SpanKind, SpanSet};
use crate::types::DiffConfig;

/// Which span kinds to record, and how to recognize comments.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanOptions {
    pub literals: bool,
    pub comments: bool,
    pub escapes: bool,
    pub nested_comments: bool,
    pub line_comments: bool,
}

impl ScanOptions {
    /// Recognition rules from the config, recording nothing yet.
    pub fn from_config(config: &DiffConfig) -> Self {
        Self {
            nested_comments: config.nested_comments,
            line_comments: config.line_comments,
            ..Self::default()
        }
    }

    pub fn record_literals(mut self) -> Self {
        self.literals = true;
        self
    }

    pub fn record_comments(mut self) -> Self {
        self.comments = true;
        self
    }

    pub fn record_escapes(mut self) -> Self {
        self.escapes = true;
        self
    }

    /// Record every kind.
    pub fn record_all(self) -> Self {
        self.record_literals().record_comments().record_escapes()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ScanState {
    Normal,
    InString { start: usize },
    InChar { start: usize },
    InComment { start: usize, block: bool },
    InEscape { start: usize },
}

struct Scanner<'a> {
    buffer: &'a [u8],
    options: ScanOptions,
    index: usize,
    items: SpanSet,
}

impl<'a> Scanner<'a> {
    fn new(buffer: &'a [u8], start: usize, options: ScanOptions) -> Self {
        Self {
            buffer,
            options,
            index: start.min(buffer.len()),
            items: SpanSet::new(),
        }
    }

    fn peek(&self, offset: usize) -> Option<u8> {
        self.buffer.get(self.index + offset).copied()
    }

    fn record(&mut self, start: usize, end: usize, kind: SpanKind) -> Result<()> {
        let wanted = match kind {
            SpanKind::StringLiteral | SpanKind::CharLiteral => self.options.literals,
            SpanKind::Comment => self.options.comments,
            SpanKind::EscapeSequence => self.options.escapes,
            _ => false,
        };
        if wanted {
            self.items.add(start, end, kind, self.buffer.len())?;
        }
        Ok(())
    }

    /// Consume input for the current state and return the next one.
    fn transition(&mut self, state: ScanState) -> Result<ScanState> {
        match state {
            ScanState::Normal => {
                let start = self.index;
                let next = match (self.peek(0), self.peek(1)) {
                    (Some(b'"'), _) => ScanState::InString { start },
                    (Some(b'\''), _) => ScanState::InChar { start },
                    (Some(b'/'), Some(b'*')) => ScanState::InComment { start, block: true },
                    (Some(b'/'), Some(b'/')) if self.options.line_comments => {
                        ScanState::InComment { start, block: false }
                    }
                    (Some(b'\\'), _) => ScanState::InEscape { start },
                    _ => {
                        self.index += 1;
                        ScanState::Normal
                    }
                };
                Ok(next)
            }
            ScanState::InString { start } => {
                self.index = self.close_literal(start, b'"');
                self.record(start, self.index, SpanKind::StringLiteral)?;
                Ok(ScanState::Normal)
            }
            ScanState::InChar { start } => {
                self.index = self.close_literal(start, b'\'');
                self.record(start, self.index, SpanKind::CharLiteral)?;
                Ok(ScanState::Normal)
            }
            ScanState::InComment { start, block: true } => {
                self.index = self.close_block_comment(start)?;
                self.record(start, self.index, SpanKind::Comment)?;
                Ok(ScanState::Normal)
            }
            ScanState::InComment { start, block: false } => {
                self.index = self.buffer[start..]
                    .iter()
                    .position(|&b| b == b'\n')
                    .map_or(self.buffer.len(), |p| start + p);
                self.record(start, self.index, SpanKind::Comment)?;
                Ok(ScanState::Normal)
            }
            ScanState::InEscape { start } => {
                // The skip happens even when escapes are not recorded: it keeps
                // `\"` outside a literal from opening one.
                self.index = (start + 2).min(self.buffer.len());
                self.record(start, self.index, SpanKind::EscapeSequence)?;
                Ok(ScanState::Normal)
            }
        }
    }

    /// Offset just past the closing quote of the literal opened at `start`.
    fn close_literal(&self, start: usize, quote: u8) -> usize {
        match find_closing_quote(self.buffer, start, quote) {
            Some(end) => end,
            None => {
                tracing::warn!(
                    "Unterminated {} literal at line {}, treating it as running to end of buffer",
                    if quote == b'"' { "string" } else { "character" },
                    line_number(self.buffer, start)
                );
                self.buffer.len()
            }
        }
    }

    fn close_block_comment(&self, start: usize) -> Result<usize> {
        let end = if self.options.nested_comments {
            match_pair(self.buffer, start, b"/*", b"*/")
        } else {
            self.buffer[start + 2..]
                .windows(2)
                .position(|w| w == b"*/")
                .map(|p| start + 2 + p + 2)
        };
        end.ok_or_else(|| DiffError::UnterminatedComment {
            line: line_number(self.buffer, start),
        })
    }

    fn run(mut self) -> Result<SpanSet> {
        let mut state = ScanState::Normal;
        while self.index < self.buffer.len() || state != ScanState::Normal {
            state = self.transition(state)?;
        }
        Ok(self.items)
    }
}

/// Find the closing `quote` of a literal whose opening quote is at `start`.
///
/// Each raw occurrence of the quote is checked by counting the backslashes
/// immediately before it: an even run means the quote is real, an odd run
/// means it is escaped. Returns the offset just past the closing quote.
pub fn find_closing_quote(buffer: &[u8], start: usize, quote: u8) -> Option<usize> {
    let mut from = start + 1;
    while from < buffer.len() {
        let at = from + buffer[from..].iter().position(|&b| b == quote)?;
        let backslashes = buffer[start + 1..at]
            .iter()
            .rev()
            .take_while(|&&b| b == b'\\')
            .count();
        if backslashes % 2 == 0 {
            return Some(at + 1);
        }
        from = at + 1;
    }
    None
}

/// Scan `buffer` from `start` to the end, returning the requested items in
/// discovery order.
pub fn scan_items(buffer: &[u8], start: usize, options: ScanOptions) -> Result<SpanSet> {
    Scanner::new(buffer, start, options).run()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all() -> ScanOptions {
        ScanOptions::from_config(&DiffConfig::default()).record_all()
    }

    fn texts<'a>(buffer: &'a [u8], items: &SpanSet) -> Vec<&'a str> {
        items
            .iter()
            .map(|s| std::str::from_utf8(s.slice(buffer)).unwrap())
            .collect()
    }

    #[test]
    fn test_finds_literals_and_comments() {
        let buffer = b"int f() { /* c */ return g(\"s\", 'x'); }";
        let items = scan_items(buffer, 0, all()).unwrap();

        assert_eq!(texts(buffer, &items), vec!["/* c */", "\"s\"", "'x'"]);
        let kinds: Vec<_> = items.iter().map(|s| s.kind()).collect();
        assert_eq!(
            kinds,
            vec![SpanKind::Comment, SpanKind::StringLiteral, SpanKind::CharLiteral]
        );
    }

    #[test]
    fn test_escaped_quote_does_not_close() {
        let buffer = br#"s = "a\"b"; t = 1;"#;
        let items = scan_items(buffer, 0, all()).unwrap();
        assert_eq!(texts(buffer, &items), vec![r#""a\"b""#]);
    }

    #[test]
    fn test_doubled_backslash_closes() {
        let buffer = br#"s = "a\\"; t = '\\';"#;
        let items = scan_items(buffer, 0, all()).unwrap();
        assert_eq!(texts(buffer, &items), vec![r#""a\\""#, r#"'\\'"#]);
    }

    #[test]
    fn test_unterminated_literal_runs_to_end() {
        let buffer = b"x = \"never closed;\n";
        let items = scan_items(buffer, 0, all()).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items.get(0).map(|s| s.end()), Some(buffer.len()));
    }

    #[test]
    fn test_nested_comment_is_one_item() {
        let buffer = b"/* outer /* inner */ still-outer */ int x;";
        let items = scan_items(buffer, 0, all()).unwrap();
        assert_eq!(
            texts(buffer, &items),
            vec!["/* outer /* inner */ still-outer */"]
        );
    }

    #[test]
    fn test_non_nested_comment_ends_at_first_closer() {
        let mut options = all();
        options.nested_comments = false;
        let buffer = b"/* a /* b */ c;";
        let items = scan_items(buffer, 0, options).unwrap();
        assert_eq!(texts(buffer, &items), vec!["/* a /* b */"]);
    }

    #[test]
    fn test_unterminated_comment_is_fatal() {
        let err = scan_items(b"int x;\n/* never closes", 0, all()).unwrap_err();
        assert!(matches!(err, DiffError::UnterminatedComment { line: 2 }));

        let mut options = all();
        options.nested_comments = false;
        assert!(scan_items(b"/* never closes", 0, options).is_err());
    }

    #[test]
    fn test_quote_inside_comment_is_ignored() {
        let buffer = b"/* don't */ x = 'y';";
        let options = ScanOptions::from_config(&DiffConfig::default()).record_literals();
        let items = scan_items(buffer, 0, options).unwrap();
        assert_eq!(texts(buffer, &items), vec!["'y'"]);
    }

    #[test]
    fn test_line_comments() {
        let buffer = b"x = 1; // it's fine\ny = 2;";
        let items = scan_items(buffer, 0, all()).unwrap();
        assert_eq!(texts(buffer, &items), vec!["// it's fine"]);

        let mut options = all();
        options.line_comments = false;
        let items = scan_items(buffer, 0, options).unwrap();
        // Without line comments the apostrophe opens a character literal.
        assert_eq!(items.get(0).map(|s| s.kind()), Some(SpanKind::CharLiteral));
    }

    #[test]
    fn test_escape_outside_literal_skips_two_bytes() {
        // `\"` outside a literal must not open a string.
        let buffer = b"a \\\" b \"s\"";
        let items = scan_items(buffer, 0, all()).unwrap();
        assert_eq!(texts(buffer, &items), vec!["\\\"", "\"s\""]);

        let literals_only = ScanOptions::from_config(&DiffConfig::default()).record_literals();
        let items = scan_items(buffer, 0, literals_only).unwrap();
        assert_eq!(texts(buffer, &items), vec!["\"s\""]);
    }

    #[test]
    fn test_trailing_backslash_is_clamped() {
        let buffer = b"x \\";
        let items = scan_items(buffer, 0, all()).unwrap();
        assert_eq!(items.get(0).map(|s| (s.start(), s.end())), Some((2, 3)));
    }

    #[test]
    fn test_scan_from_offset() {
        let buffer = b"\"a\" \"b\"";
        let items = scan_items(buffer, 3, all()).unwrap();
        assert_eq!(texts(buffer, &items), vec!["\"b\""]);
    }

    #[test]
    fn test_find_closing_quote() {
        assert_eq!(find_closing_quote(b"\"abc\"", 0, b'"'), Some(5));
        assert_eq!(find_closing_quote(br#""a\"""#, 0, b'"'), Some(5));
        assert_eq!(find_closing_quote(b"\"abc", 0, b'"'), None);
    }
}
