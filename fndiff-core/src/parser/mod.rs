//! Function extraction.
//!
//! Finds named function definitions in a raw source buffer without a
//! language grammar: literals, comments and escapes are blanked, directive
//! lines are resolved per pragma choice, and the remaining bracket structure
//! is walked token by token. Results of every choice that parses are merged
//! by name.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{DiffError, Result};
use crate::normalizer::clear;
use crate::scanner::{scan_items, ScanOptions};
use crate::span::{SpanKind, SpanSet};
use crate::types::{DiffConfig, FunctionEntry};

pub mod functions;
pub mod helpers;
pub mod pragmas;
pub mod tokens;

use pragmas::{find_directives, PragmaTree};

/// Notice recorded when one file defines the same name twice.
pub const DUPLICATE_NAMES_NOTICE: &str =
    "WARNING: duplicate function names found: RESULTS CAN BE INCORRECT";

/// Notice recorded when merged function spans overlap.
pub const OVERLAP_NOTICE: &str =
    "WARNING: function declarations overlapped: RESULTS can show more changed functions than necessary";

/// Functions found in one buffer plus any non-fatal warnings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    pub functions: Vec<FunctionEntry>,
    pub notices: Vec<String>,
}

/// A buffer with everything choice-independent already blanked.
struct Prepared {
    blanked: Vec<u8>,
    directives: SpanSet,
    tree: PragmaTree,
}

impl Prepared {
    fn new(buffer: &[u8], config: &DiffConfig) -> Result<Self> {
        let mut blanked = buffer.to_vec();
        let items = scan_items(buffer, 0, ScanOptions::from_config(config).record_all())?;
        clear(&mut blanked, &items)?;

        let directives = find_directives(&blanked)?;
        clear(&mut blanked, &directives.of_kind(SpanKind::PragmaOther))?;
        let tree = PragmaTree::parse(buffer, &directives)?;

        Ok(Self {
            blanked,
            directives,
            tree,
        })
    }

    /// Functions visible when the branches of `choice` are taken.
    fn extract(&self, choice: usize, full_function: bool) -> Result<Vec<FunctionEntry>> {
        let mut buffer = self.blanked.clone();
        let unselected = self.tree.unselected(choice, buffer.len())?;
        clear(&mut buffer, &unselected)?;
        clear(&mut buffer, &self.directives)?;
        functions::walk_functions(&buffer, full_function)
    }
}

/// Fold one choice's functions into the merged list. The n-th definition of
/// a name pairs with the n-th merged entry of that name and widens it to
/// cover both extents; unpaired definitions are appended.
fn merge(merged: &mut Vec<FunctionEntry>, found: Vec<FunctionEntry>, len: usize) -> Result<()> {
    let mut occurrences: HashMap<String, usize> = HashMap::new();
    for entry in found {
        let nth = occurrences.entry(entry.name.clone()).or_insert(0);
        let existing = merged.iter_mut().filter(|m| m.name == entry.name).nth(*nth);
        *nth += 1;

        match existing {
            Some(existing) => {
                let start = existing.start().min(entry.start());
                let end = existing.end().max(entry.end());
                *existing = FunctionEntry::new(entry.name, start, end, len)?;
            }
            None => merged.push(entry),
        }
    }
    Ok(())
}

fn has_duplicates(functions: &[FunctionEntry]) -> bool {
    functions
        .iter()
        .enumerate()
        .any(|(i, f)| functions[i + 1..].iter().any(|g| g.name == f.name))
}

fn has_overlaps(functions: &[FunctionEntry]) -> bool {
    functions
        .iter()
        .enumerate()
        .any(|(i, f)| functions[i + 1..].iter().any(|g| g.span.overlaps(&f.span)))
}

/// Extract every function definition from `buffer`.
///
/// Each pragma choice up to `config.choice_limit` is tried; choices that fail
/// to parse are skipped, and only when none parses is the last parse error
/// returned. Unterminated comments and unbalanced directives are fatal
/// regardless of choice.
pub fn find_functions(buffer: &[u8], config: &DiffConfig) -> Result<Extraction> {
    let prepared = Prepared::new(buffer, config)?;
    let mut extraction = Extraction::default();

    let total = prepared.tree.choice_count();
    let limit = config.choice_limit.max(1);
    let choices = if total > limit {
        let notice = format!(
            "WARNING: search space for pragmas is too large (number_of_choices = {}), reducing it to {}: RESULTS CAN BE INCORRECT",
            total, limit
        );
        tracing::warn!("{}", notice);
        extraction.notices.push(notice);
        limit
    } else {
        total
    };

    let mut parsed = 0;
    let mut last_error = None;
    for choice in 0..choices {
        match prepared.extract(choice, config.full_function) {
            Ok(found) => {
                parsed += 1;
                merge(&mut extraction.functions, found, buffer.len())?;
            }
            Err(e) => {
                tracing::debug!("Parse error in pragma choice {}: {}", choice, e);
                last_error = Some(e);
            }
        }
    }

    if parsed == 0 {
        return Err(last_error.unwrap_or_else(|| DiffError::Extraction {
            message: "no pragma choice could be parsed".to_string(),
        }));
    }

    if has_duplicates(&extraction.functions) {
        tracing::warn!("{}", DUPLICATE_NAMES_NOTICE);
        extraction.notices.push(DUPLICATE_NAMES_NOTICE.to_string());
    }
    if has_overlaps(&extraction.functions) {
        tracing::warn!("{}", OVERLAP_NOTICE);
        extraction.notices.push(OVERLAP_NOTICE.to_string());
    }

    tracing::debug!(
        "Extracted {} functions from {} of {} pragma choices",
        extraction.functions.len(),
        parsed,
        choices
    );

    Ok(extraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(extraction: &Extraction) -> Vec<&str> {
        extraction.functions.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_literals_and_comments_do_not_confuse_walk() {
        let source = b"/* f() { */\nchar *s = \"g() {\";\nint h(void) { return '}'; }\n";
        let extraction = find_functions(source, &DiffConfig::default()).unwrap();
        assert_eq!(names(&extraction), vec!["h"]);
        assert!(extraction.notices.is_empty());
    }

    #[test]
    fn test_directives_are_blanked() {
        let source = b"#include <stdio.h>\n#define CALL(x) x()\nint main() { return 0; }\n";
        let extraction = find_functions(source, &DiffConfig::default()).unwrap();
        assert_eq!(names(&extraction), vec!["main"]);
        let main = &extraction.functions[0];
        assert!(source[main.start()..].starts_with(b"int main"));
    }

    #[test]
    fn test_pragma_branches_both_contribute() {
        let source = b"#ifdef A\nint a(void) {\n#else\nint b(void) {\n#endif\n  return 0;\n}\n";
        let extraction = find_functions(source, &DiffConfig::default()).unwrap();
        assert_eq!(names(&extraction), vec!["a", "b"]);
        assert_eq!(extraction.notices, vec![OVERLAP_NOTICE.to_string()]);
    }

    #[test]
    fn test_merge_widens_extent() {
        let source = b"int f(void)\n{\n#if A\n  x();\n}\n#else\n}\n#endif\n";
        let extraction = find_functions(source, &DiffConfig::default()).unwrap();
        assert_eq!(names(&extraction), vec!["f"]);
        let f = &extraction.functions[0];
        // The `#else` branch closes later, so the merged span reaches it.
        let last_brace = source.iter().rposition(|&b| b == b'}').unwrap();
        assert_eq!(f.end(), last_brace + 1);
    }

    #[test]
    fn test_duplicate_names_are_reported() {
        let source = b"int f() { return 1; }\nint f() { return 2; }\n";
        let extraction = find_functions(source, &DiffConfig::default()).unwrap();
        assert_eq!(names(&extraction), vec!["f", "f"]);
        assert_eq!(extraction.notices, vec![DUPLICATE_NAMES_NOTICE.to_string()]);
    }

    #[test]
    fn test_choice_limit_notice() {
        let source = b"#if A\n#elif B\n#else\n#endif\nint f() { }\n";
        let config = DiffConfig {
            choice_limit: 2,
            ..DiffConfig::default()
        };
        let extraction = find_functions(source, &config).unwrap();
        assert_eq!(names(&extraction), vec!["f"]);
        assert_eq!(extraction.notices.len(), 1);
        assert!(extraction.notices[0].contains("number_of_choices = 3"));
    }

    #[test]
    fn test_unbalanced_pragma_is_fatal() {
        let err = find_functions(b"#if A\nint f() { }\n", &DiffConfig::default()).unwrap_err();
        assert!(matches!(err, DiffError::UnbalancedPragma { .. }));
    }

    #[test]
    fn test_unbalanced_pragma_line_counts_blanked_newlines() {
        let sources: [&[u8]; 2] = [
            b"#define A \\\n    1\n#endif\n",
            b"/* one\n   two */\n#endif\n",
        ];
        for source in sources {
            let err = find_functions(source, &DiffConfig::default()).unwrap_err();
            assert!(
                matches!(err, DiffError::UnbalancedPragma { line: 3, .. }),
                "{:?}",
                err
            );
        }
    }

    #[test]
    fn test_no_choice_parses() {
        let err = find_functions(b"int f() {\n", &DiffConfig::default()).unwrap_err();
        assert!(matches!(err, DiffError::Extraction { .. }));
    }

    #[test]
    fn test_unterminated_comment_is_fatal() {
        let err = find_functions(b"int f() { }\n/* open", &DiffConfig::default()).unwrap_err();
        assert!(matches!(err, DiffError::UnterminatedComment { line: 2 }));
    }
}
