//! Conditional-compilation handling.
//!
//! Function boundaries cannot be found by bracket matching when `#if` branches
//! each open or close a brace. Instead the extractor tries several branch
//! selections ("choices"), blanking the branches a choice does not take, and
//! merges what it finds.
//!
//! The directives of a file form an alternating tree: a sequence of `#if`
//! groups, each group holding one branch per `#if`/`#elif`/`#else`, and each
//! branch holding its own sequence of nested groups. A choice assigns one
//! selector per nesting depth; a group at depth `d` keeps branch
//! `min(selector[d], branches - 1)`.

use super::helpers::{line_number, line_start};
use super::tokens::next_token;
use crate::error::{DiffError, Result};
use crate::span::{SpanKind, SpanSet};

/// Classify a directive by its first token, or `None` for ordinary code.
pub fn classify(token: &str) -> Option<SpanKind> {
    let kind = match token {
        "#if" | "#ifdef" | "#ifndef" => SpanKind::PragmaIf,
        "#else" | "#elif" => SpanKind::PragmaElse,
        "#endif" => SpanKind::PragmaEndif,
        t if t.starts_with('#') => SpanKind::PragmaOther,
        _ => return None,
    };
    Some(kind)
}

/// Find every directive line. Each span runs from the start of the line up to
/// (not including) its newline.
pub fn find_directives(buffer: &[u8]) -> Result<SpanSet> {
    let mut directives = SpanSet::new();
    let mut start = 0;

    while start < buffer.len() {
        let end = buffer[start..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(buffer.len(), |p| start + p);

        let line = &buffer[start..end];
        if let Some(kind) = next_token(line, 0).and_then(|token| classify(&token.text)) {
            directives.add(start, end, kind, buffer.len())?;
        }

        start = end + 1;
    }

    Ok(directives)
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Branch {
    start: usize,
    end: usize,
    groups: Vec<Group>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Group {
    branches: Vec<Branch>,
}

/// Parsed `#if` structure of one buffer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PragmaTree {
    groups: Vec<Group>,
}

struct TreeParser<'a> {
    buffer: &'a [u8],
    controls: Vec<(usize, SpanKind)>,
    index: usize,
}

impl TreeParser<'_> {
    fn error(&self, at: usize, message: &str) -> DiffError {
        DiffError::UnbalancedPragma {
            line: line_number(self.buffer, at),
            message: message.to_string(),
        }
    }

    /// Consecutive groups until an `#else`/`#endif` or the end.
    fn parse_sequence(&mut self) -> Result<Vec<Group>> {
        let mut groups = Vec::new();
        while let Some(&(_, kind)) = self.controls.get(self.index) {
            if kind != SpanKind::PragmaIf {
                break;
            }
            groups.push(self.parse_group()?);
        }
        Ok(groups)
    }

    /// One `#if ... #endif` group; `index` points at the `#if`.
    fn parse_group(&mut self) -> Result<Group> {
        let (opened_at, _) = self.controls[self.index];
        let mut branch_start = opened_at;
        let mut branches = Vec::new();
        self.index += 1;

        loop {
            let groups = self.parse_sequence()?;
            let Some(&(at, kind)) = self.controls.get(self.index) else {
                return Err(self.error(opened_at, "#if without matching #endif"));
            };

            branches.push(Branch {
                start: branch_start,
                end: at,
                groups,
            });
            self.index += 1;

            if kind == SpanKind::PragmaEndif {
                return Ok(Group { branches });
            }
            branch_start = at;
        }
    }
}

impl PragmaTree {
    /// Build the tree from the control directives among `directives`.
    ///
    /// `buffer` is the unblanked source, so that error lines survive blanked
    /// line continuations and multi-line comments.
    pub fn parse(buffer: &[u8], directives: &SpanSet) -> Result<Self> {
        let mut parser = TreeParser {
            buffer,
            controls: directives
                .iter()
                .filter(|span| span.kind().is_pragma_control())
                .map(|span| (line_start(buffer, span.start()), span.kind()))
                .collect(),
            index: 0,
        };

        let groups = parser.parse_sequence()?;
        if let Some(&(at, _)) = parser.controls.get(parser.index) {
            return Err(parser.error(at, "#else or #endif without #if"));
        }

        Ok(Self { groups })
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Maximum nesting depth and maximum branch count of any group.
    pub fn depth_width(&self) -> (usize, usize) {
        fn walk(groups: &[Group]) -> (usize, usize) {
            let mut result = (0, 0);
            for group in groups {
                let mut inner = (0, group.branches.len());
                for branch in &group.branches {
                    let (depth, width) = walk(&branch.groups);
                    inner = (inner.0.max(depth), inner.1.max(width));
                }
                result = (result.0.max(inner.0 + 1), result.1.max(inner.1));
            }
            result
        }
        walk(&self.groups)
    }

    /// Number of distinct selector assignments, `width ^ depth`, saturating.
    pub fn choice_count(&self) -> usize {
        let (depth, width) = self.depth_width();
        (0..depth).fold(1usize, |acc, _| acc.saturating_mul(width))
    }

    /// Decode a choice index into one selector per depth, most significant
    /// first.
    pub fn selectors(&self, choice: usize) -> Vec<usize> {
        let (depth, width) = self.depth_width();
        let mut selectors = vec![0; depth];
        let mut rest = choice;
        for slot in selectors.iter_mut().rev() {
            *slot = rest % width.max(1);
            rest /= width.max(1);
        }
        selectors
    }

    /// Text ranges of every branch the choice does not take.
    pub fn unselected(&self, choice: usize, len: usize) -> Result<SpanSet> {
        fn walk(
            groups: &[Group],
            selectors: &[usize],
            depth: usize,
            len: usize,
            out: &mut SpanSet,
        ) -> Result<()> {
            for group in groups {
                let wanted = selectors.get(depth).copied().unwrap_or(0);
                let chosen = wanted.min(group.branches.len().saturating_sub(1));
                for (i, branch) in group.branches.iter().enumerate() {
                    if i == chosen {
                        walk(&branch.groups, selectors, depth + 1, len, out)?;
                    } else {
                        out.add(branch.start, branch.end, SpanKind::Other, len)?;
                    }
                }
            }
            Ok(())
        }

        let mut out = SpanSet::new();
        walk(&self.groups, &self.selectors(choice), 0, len, &mut out)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(source: &str) -> Result<PragmaTree> {
        let directives = find_directives(source.as_bytes())?;
        PragmaTree::parse(source.as_bytes(), &directives)
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("#ifdef"), Some(SpanKind::PragmaIf));
        assert_eq!(classify("#elif"), Some(SpanKind::PragmaElse));
        assert_eq!(classify("#endif"), Some(SpanKind::PragmaEndif));
        assert_eq!(classify("#include"), Some(SpanKind::PragmaOther));
        assert_eq!(classify("int"), None);
    }

    #[test]
    fn test_find_directives() {
        let source = b"#include <a.h>\nint x;\n  #  if X\n#endif\n";
        let directives = find_directives(source).unwrap();
        let kinds: Vec<_> = directives.iter().map(|s| s.kind()).collect();
        assert_eq!(
            kinds,
            vec![SpanKind::PragmaOther, SpanKind::PragmaIf, SpanKind::PragmaEndif]
        );
        assert_eq!(directives.get(0).map(|s| (s.start(), s.end())), Some((0, 14)));
    }

    #[test]
    fn test_no_conditionals_has_one_choice() {
        let tree = tree("#define X 1\nint f() { }\n").unwrap();
        assert!(tree.is_empty());
        assert_eq!(tree.choice_count(), 1);
        assert!(tree.unselected(0, 10).unwrap().is_empty());
    }

    #[test]
    fn test_if_else_selects_each_branch() {
        let source = "#if A\nint f() {\n#else\nint f(int x) {\n#endif\n}\n";
        let tree = tree(source).unwrap();
        assert_eq!(tree.depth_width(), (1, 2));
        assert_eq!(tree.choice_count(), 2);

        let first = tree.unselected(0, source.len()).unwrap();
        assert_eq!(first.len(), 1);
        let span = first.get(0).unwrap();
        assert!(String::from_utf8_lossy(span.slice(source.as_bytes())).starts_with("#else"));

        let second = tree.unselected(1, source.len()).unwrap();
        let span = second.get(0).unwrap();
        assert!(String::from_utf8_lossy(span.slice(source.as_bytes())).starts_with("#if A"));
    }

    #[test]
    fn test_nested_groups_depth() {
        let source = "#if A\n#if B\n#elif C\n#else\n#endif\n#endif\n";
        let tree = tree(source).unwrap();
        assert_eq!(tree.depth_width(), (2, 3));
        assert_eq!(tree.choice_count(), 9);
        assert_eq!(tree.selectors(5), vec![1, 2]);
    }

    #[test]
    fn test_selector_is_clamped_to_branch_count() {
        let source = "#if A\na\n#endif\n#if B\nb\n#elif C\nc\n#else\nd\n#endif\n";
        let tree = tree(source).unwrap();
        assert_eq!(tree.choice_count(), 3);
        // Choice 2 asks for the third branch; the single-branch group keeps its only one.
        let removed = tree.unselected(2, source.len()).unwrap();
        assert_eq!(removed.len(), 2);
    }

    #[test]
    fn test_unbalanced_directives() {
        let err = tree("int a;\n#if A\nint x;\n").unwrap_err();
        assert!(matches!(err, DiffError::UnbalancedPragma { line: 2, .. }));

        let err = tree("#endif\n").unwrap_err();
        assert!(matches!(err, DiffError::UnbalancedPragma { line: 1, .. }));
    }
}
