//! Whitespace-insensitive region comparison.
//!
//! Literals are checked first against the original bytes, one pair at a
//! time. Only when every literal agrees are the normalized regions (literals
//! and comments blanked) scanned in lock-step, skipping whitespace runs on
//! each side independently.

use serde::{Deserialize, Serialize};

use crate::error::{DiffError, Result};
use crate::span::{Span, SpanSet};

/// Which check found the first difference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DivergenceReason {
    LiteralLength,
    LiteralKind,
    LiteralContent,
    LiteralCount,
    Content,
}

impl DivergenceReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DivergenceReason::LiteralLength => "literal length",
            DivergenceReason::LiteralKind => "literal kind",
            DivergenceReason::LiteralContent => "literal content",
            DivergenceReason::LiteralCount => "literal count",
            DivergenceReason::Content => "content",
        }
    }
}

/// First point of mismatch, as offsets into each original buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Divergence {
    pub old_offset: usize,
    pub new_offset: usize,
    pub reason: DivergenceReason,
}

/// Result of comparing two regions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Same,
    Different(Divergence),
}

impl Verdict {
    pub fn is_same(&self) -> bool {
        matches!(self, Verdict::Same)
    }
}

/// One side of a comparison: a region of a file in both its original and
/// normalized forms, plus the literals found in the original.
#[derive(Clone, Copy, Debug)]
pub struct Region<'a> {
    original: &'a [u8],
    normalized: &'a [u8],
    literals: &'a SpanSet,
    start: usize,
    end: usize,
}

impl<'a> Region<'a> {
    /// Checks that both buffers line up and that `[start, end)` fits them.
    pub fn new(
        original: &'a [u8],
        normalized: &'a [u8],
        literals: &'a SpanSet,
        start: usize,
        end: usize,
    ) -> Result<Self> {
        if original.len() != normalized.len() {
            return Err(DiffError::LengthMismatch {
                original: original.len(),
                normalized: normalized.len(),
            });
        }
        if start > end || end > original.len() {
            return Err(DiffError::InvalidSpan {
                start,
                end,
                len: original.len(),
            });
        }
        Ok(Self {
            original,
            normalized,
            literals,
            start,
            end,
        })
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    fn region_literals(&self) -> Vec<Span> {
        self.literals
            .restrict(self.start, self.end)
            .iter()
            .filter(|s| s.kind().is_literal())
            .copied()
            .collect()
    }

    /// Next non-whitespace offset at or after `index`, bounded by the region.
    fn skip_whitespace(&self, mut index: usize) -> usize {
        while index < self.end && matches!(self.normalized[index], b' ' | b'\t' | b'\n') {
            index += 1;
        }
        index
    }
}

fn different(old_offset: usize, new_offset: usize, reason: DivergenceReason) -> Verdict {
    Verdict::Different(Divergence {
        old_offset,
        new_offset,
        reason,
    })
}

/// Pairwise literal check. `None` means every literal agrees.
fn compare_literals(old: &Region, new: &Region) -> Option<Verdict> {
    let old_literals = old.region_literals();
    let new_literals = new.region_literals();

    for (a, b) in old_literals.iter().zip(new_literals.iter()) {
        let reason = if a.len() != b.len() {
            DivergenceReason::LiteralLength
        } else if a.kind() != b.kind() {
            DivergenceReason::LiteralKind
        } else if a.slice(old.original) != b.slice(new.original) {
            DivergenceReason::LiteralContent
        } else {
            continue;
        };
        return Some(different(a.start(), b.start(), reason));
    }

    let shared = old_literals.len().min(new_literals.len());
    if old_literals.len() == new_literals.len() {
        return None;
    }

    // The longer side points at its first unmatched literal, the shorter one
    // just past its last literal.
    let offset = |literals: &[Span], region: &Region| match literals.get(shared) {
        Some(unmatched) => unmatched.start(),
        None => literals.last().map_or(region.start, Span::end),
    };
    Some(different(
        offset(&old_literals, old),
        offset(&new_literals, new),
        DivergenceReason::LiteralCount,
    ))
}

/// Compare two regions. On difference, reports the first divergent offset in
/// each original buffer.
pub fn compare_regions(old: &Region, new: &Region) -> Verdict {
    if let Some(verdict) = compare_literals(old, new) {
        return verdict;
    }

    let mut i = old.start;
    let mut j = new.start;
    loop {
        i = old.skip_whitespace(i);
        j = new.skip_whitespace(j);

        match (i < old.end, j < new.end) {
            (false, false) => return Verdict::Same,
            (true, true) if old.normalized[i] == new.normalized[j] => {
                i += 1;
                j += 1;
            }
            _ => return different(i, j, DivergenceReason::Content),
        }
    }
}
