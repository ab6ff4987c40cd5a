//! Tagged byte ranges and the ordered collections the scanner produces.

use serde::{Deserialize, Serialize};

use crate::error::{DiffError, Result};

/// What a span covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpanKind {
    StringLiteral,
    CharLiteral,
    Comment,
    Other,
    EscapeSequence,
    PragmaIf,
    PragmaElse,
    PragmaEndif,
    PragmaOther,
}

impl SpanKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpanKind::StringLiteral => "string",
            SpanKind::CharLiteral => "char",
            SpanKind::Comment => "comment",
            SpanKind::Other => "other",
            SpanKind::EscapeSequence => "escape",
            SpanKind::PragmaIf => "pragma-if",
            SpanKind::PragmaElse => "pragma-else",
            SpanKind::PragmaEndif => "pragma-endif",
            SpanKind::PragmaOther => "pragma-other",
        }
    }

    /// String and character constants.
    pub fn is_literal(&self) -> bool {
        matches!(self, SpanKind::StringLiteral | SpanKind::CharLiteral)
    }

    /// Conditional-compilation control directives (`#if`, `#else`, `#endif`).
    pub fn is_pragma_control(&self) -> bool {
        matches!(
            self,
            SpanKind::PragmaIf | SpanKind::PragmaElse | SpanKind::PragmaEndif
        )
    }
}

/// A half-open range `[start, end)` into a buffer, tagged with its kind.
///
/// Fields are private so a span can only come from [`Span::new`], which
/// rejects reversed and out-of-bounds ranges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    start: usize,
    end: usize,
    kind: SpanKind,
}

impl Span {
    /// Build a span over a buffer of length `len`.
    pub fn new(start: usize, end: usize, kind: SpanKind, len: usize) -> Result<Self> {
        if start > end || end > len {
            return Err(DiffError::InvalidSpan { start, end, len });
        }
        Ok(Self { start, end, kind })
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn kind(&self) -> SpanKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether the span lies entirely inside `[start, end)`.
    pub fn within(&self, start: usize, end: usize) -> bool {
        self.start >= start && self.end <= end
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Bytes covered by the span.
    pub fn slice<'a>(&self, buffer: &'a [u8]) -> &'a [u8] {
        &buffer[self.start..self.end]
    }
}

/// Spans in discovery order (left to right).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanSet {
    spans: Vec<Span>,
}

impl SpanSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and append a span.
    pub fn add(&mut self, start: usize, end: usize, kind: SpanKind, len: usize) -> Result<()> {
        self.spans.push(Span::new(start, end, kind, len)?);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Span> {
        self.spans.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Span> {
        self.spans.get(index)
    }

    /// Spans lying entirely inside `[start, end)`, order preserved.
    pub fn restrict(&self, start: usize, end: usize) -> SpanSet {
        self.filter(|span| span.within(start, end))
    }

    /// Spans of exactly one kind.
    pub fn of_kind(&self, kind: SpanKind) -> SpanSet {
        self.filter(|span| span.kind == kind)
    }

    pub fn filter<F>(&self, predicate: F) -> SpanSet
    where
        F: Fn(&Span) -> bool,
    {
        SpanSet {
            spans: self.spans.iter().copied().filter(|s| predicate(s)).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a SpanSet {
    type Item = &'a Span;
    type IntoIter = std::slice::Iter<'a, Span>;

    fn into_iter(self) -> Self::IntoIter {
        self.spans.iter()
    }
}

impl FromIterator<Span> for SpanSet {
    fn from_iter<I: IntoIterator<Item = Span>>(iter: I) -> Self {
        SpanSet {
            spans: iter.into_iter().collect(),
        }
    }
}
