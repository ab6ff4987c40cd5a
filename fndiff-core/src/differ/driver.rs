//! Per-file-pair driver: extract, match by name, compare, report.

use std::path::Path;
use std::time::Instant;

use crate::differ::changes::{ChangeType, FileDiffResult, FunctionChange};
use crate::differ::comparator::{compare_regions, Region, Verdict};
use crate::error::Result;
use crate::normalizer::cleared;
use crate::parser::find_functions;
use crate::parser::helpers::line_number;
use crate::scanner::{scan_items, ScanOptions};
use crate::span::SpanSet;
use crate::types::{DiffConfig, FunctionEntry, SourceBuffer, OUTSIDE_FUNCTIONS};

/// A buffer in comparable form: its literals, and a copy with literals and
/// then comments blanked.
#[derive(Clone, Debug)]
pub struct NormalizedBuffer {
    pub literals: SpanSet,
    pub normalized: Vec<u8>,
}

/// Blank literals, then the comments found in the literal-blanked copy.
pub fn normalize(buffer: &[u8], config: &DiffConfig) -> Result<NormalizedBuffer> {
    let options = ScanOptions::from_config(config);

    let literals = scan_items(buffer, 0, options.record_literals())?;
    let without_literals = cleared(buffer, &literals)?;

    let comments = scan_items(&without_literals, 0, options.record_comments())?;
    let normalized = cleared(&without_literals, &comments)?;

    Ok(NormalizedBuffer {
        literals,
        normalized,
    })
}

/// One side of a comparison. `text` is what gets compared; `source` is the
/// unmodified file, which line numbers are counted in. Both have the same
/// length.
struct Side<'a> {
    text: &'a [u8],
    source: &'a [u8],
    norm: &'a NormalizedBuffer,
    start: usize,
    end: usize,
}

impl<'a> Side<'a> {
    fn region(&self) -> Result<Region<'a>> {
        Region::new(
            self.text,
            &self.norm.normalized,
            &self.norm.literals,
            self.start,
            self.end,
        )
    }

    fn line(&self, offset: usize) -> usize {
        line_number(self.source, offset)
    }
}

/// Outcome of comparing the extents of `old` and `new`.
fn compare_extents(name: &str, old: &Side, new: &Side) -> Result<FunctionChange> {
    let change = match compare_regions(&old.region()?, &new.region()?) {
        Verdict::Same => FunctionChange::create(ChangeType::Same, name)
            .with_old_line(old.line(old.start))
            .with_new_line(new.line(new.start)),
        Verdict::Different(divergence) => {
            tracing::debug!(
                "Function \"{}\" differs ({}) at offsets ({}, {})",
                name,
                divergence.reason.as_str(),
                divergence.old_offset,
                divergence.new_offset
            );
            FunctionChange::create(ChangeType::Changed, name)
                .with_old_line(old.line(divergence.old_offset))
                .with_new_line(new.line(divergence.new_offset))
                .with_reason(divergence.reason)
        }
    };

    Ok(change)
}

/// Compare the functions of two buffers by name.
///
/// Each old function is paired with the first new function of the same name.
/// Changed, same and deleted entries follow the old file's order; added
/// entries follow, in the new file's order.
pub fn diff_functions(
    old: &[u8],
    new: &[u8],
    old_functions: &[FunctionEntry],
    new_functions: &[FunctionEntry],
    config: &DiffConfig,
) -> Result<Vec<FunctionChange>> {
    let old_norm = normalize(old, config)?;
    let new_norm = normalize(new, config)?;
    let mut changes = Vec::new();

    for entry in old_functions {
        match new_functions.iter().find(|f| f.name == entry.name) {
            Some(other) => changes.push(compare_extents(
                &entry.name,
                &Side {
                    text: old,
                    source: old,
                    norm: &old_norm,
                    start: entry.start(),
                    end: entry.end(),
                },
                &Side {
                    text: new,
                    source: new,
                    norm: &new_norm,
                    start: other.start(),
                    end: other.end(),
                },
            )?),
            None => changes.push(
                FunctionChange::create(ChangeType::Deleted, entry.name.as_str())
                    .with_old_line(line_number(old, entry.start())),
            ),
        }
    }

    for entry in new_functions {
        if !old_functions.iter().any(|f| f.name == entry.name) {
            changes.push(
                FunctionChange::create(ChangeType::Added, entry.name.as_str())
                    .with_new_line(line_number(new, entry.start())),
            );
        }
    }

    Ok(changes)
}

/// Copy of `buffer` with every function extent blanked.
fn blank_functions(buffer: &[u8], functions: &[FunctionEntry]) -> Result<Vec<u8>> {
    let spans: SpanSet = functions.iter().map(|f| f.span).collect();
    cleared(buffer, &spans)
}

/// Compare everything outside function extents as one pseudo-function.
pub fn diff_outside_functions(
    old: &[u8],
    new: &[u8],
    old_functions: &[FunctionEntry],
    new_functions: &[FunctionEntry],
    config: &DiffConfig,
) -> Result<FunctionChange> {
    let old_rest = blank_functions(old, old_functions)?;
    let new_rest = blank_functions(new, new_functions)?;
    let old_norm = normalize(&old_rest, config)?;
    let new_norm = normalize(&new_rest, config)?;

    // Blanking flattens function bodies onto one line; count lines in the
    // untouched buffers.
    compare_extents(
        OUTSIDE_FUNCTIONS,
        &Side {
            text: &old_rest,
            source: old,
            norm: &old_norm,
            start: 0,
            end: old_rest.len(),
        },
        &Side {
            text: &new_rest,
            source: new,
            norm: &new_norm,
            start: 0,
            end: new_rest.len(),
        },
    )
}

/// Compare two in-memory sources.
pub fn diff_sources(old: &SourceBuffer, new: &SourceBuffer, config: &DiffConfig) -> Result<FileDiffResult> {
    let start = Instant::now();
    let mut result = FileDiffResult::new(old.path.as_str(), new.path.as_str());

    for source in [old, new] {
        if source.missing {
            result.add_notice(format!("File {} is missing", source.path));
        }
    }

    let old_extraction = find_functions(&old.bytes, config)?;
    let new_extraction = find_functions(&new.bytes, config)?;
    tracing::debug!(
        "Found {} functions in {} and {} in {}",
        old_extraction.functions.len(),
        old.path,
        new_extraction.functions.len(),
        new.path
    );

    result.notices.extend(old_extraction.notices);
    result.notices.extend(new_extraction.notices);

    let changes = diff_functions(
        &old.bytes,
        &new.bytes,
        &old_extraction.functions,
        &new_extraction.functions,
        config,
    )?;
    for change in changes {
        result.add_change(change);
    }

    result.add_change(diff_outside_functions(
        &old.bytes,
        &new.bytes,
        &old_extraction.functions,
        &new_extraction.functions,
        config,
    )?);

    result.finalize(start.elapsed().as_secs_f64() * 1000.0);
    Ok(result)
}

/// Load two files and compare them. A file that does not exist compares as
/// empty.
pub fn diff_files(old: &Path, new: &Path, config: &DiffConfig) -> Result<FileDiffResult> {
    let old = SourceBuffer::load(old)?;
    let new = SourceBuffer::load(new)?;
    diff_sources(&old, &new, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DiffError;
    use std::fs;
    use tempfile::TempDir;

    fn diff(a: &str, b: &str) -> FileDiffResult {
        diff_with(a, b, &DiffConfig::default())
    }

    fn diff_with(a: &str, b: &str, config: &DiffConfig) -> FileDiffResult {
        diff_sources(
            &SourceBuffer::new("a.c", a),
            &SourceBuffer::new("b.c", b),
            config,
        )
        .unwrap()
    }

    fn kind_of(result: &FileDiffResult, name: &str) -> Option<ChangeType> {
        result.find(name).map(|c| c.kind)
    }

    const SAMPLE: &str = r#"#include <stdio.h>

static int counter = 0; /* shared */

/* Print a greeting. */
static void greet(const char *who)
{
    printf("hello, %s\n", who);
    counter++;
}

#ifdef VERBOSE
int report(void) {
    return printf("%d\n", counter);
#else
int report(void) {
    return counter;
#endif
}

int main(int argc, char **argv)
{
    greet(argc > 1 ? argv[1] : "world");
    return report() == 0 ? '\0' : 1;
}
"#;

    #[test]
    fn test_identical_files_are_same_everywhere() {
        let result = diff(SAMPLE, SAMPLE);
        assert!(!result.has_changes());
        let names: Vec<_> = result.changes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["greet", "report", "main", OUTSIDE_FUNCTIONS]);
        assert!(result.changes.iter().all(|c| c.kind == ChangeType::Same));
    }

    #[test]
    fn test_comment_change_is_same() {
        let result = diff("int f(){ return 1; /*x*/ }", "int f(){ return 1; /*y*/ }");
        assert_eq!(kind_of(&result, "f"), Some(ChangeType::Same));
        assert!(!result.has_changes());
    }

    #[test]
    fn test_whitespace_change_is_same() {
        let reformatted = SAMPLE
            .replace("    ", "\t")
            .replace('(', "( ")
            .replace(';', "\n;");
        let result = diff(SAMPLE, &reformatted);
        assert!(!result.has_changes(), "{:?}", result.changes);
    }

    #[test]
    fn test_literal_change_is_changed() {
        let result = diff("int f(){ return \"a\"; }", "int f(){ return \"b\"; }");
        let f = result.find("f").unwrap();
        assert_eq!(f.kind, ChangeType::Changed);
        assert_eq!((f.old_line, f.new_line), (Some(1), Some(1)));
    }

    #[test]
    fn test_changed_reports_divergence_lines() {
        let a = "int f()\n{\n  a();\n  b();\n}\n";
        let b = "int f()\n{\n  a();\n\n  c();\n}\n";
        let f = diff(a, b).find("f").cloned().unwrap();
        assert_eq!(f.kind, ChangeType::Changed);
        assert_eq!((f.old_line, f.new_line), (Some(4), Some(5)));
    }

    #[test]
    fn test_file_scope_lines_count_function_bodies() {
        let a = "int f()\n{\n  a();\n  b();\n}\nint x = 1;\n";
        let b = "int f()\n{\n  a();\n  b();\n}\nint x = 2;\n";
        let result = diff(a, b);
        let outside = result.find(OUTSIDE_FUNCTIONS).unwrap();
        assert_eq!(outside.kind, ChangeType::Changed);
        assert_eq!((outside.old_line, outside.new_line), (Some(6), Some(6)));
        assert_eq!(kind_of(&result, "f"), Some(ChangeType::Same));
    }

    #[test]
    fn test_file_scope_change_after_last_function() {
        let edited = format!("{}static int limit = 4;\n", SAMPLE);
        let original = format!("{}static int limit = 3;\n", SAMPLE);
        let result = diff(&original, &edited);
        let outside = result.find(OUTSIDE_FUNCTIONS).unwrap();
        let line = SAMPLE.lines().count() + 1;
        assert_eq!((outside.old_line, outside.new_line), (Some(line), Some(line)));
    }

    #[test]
    fn test_deleted_and_added_lines() {
        let a = "int f() { }\n\nint g(void)\n{\n  return 0;\n}\n";
        let b = "int f() { }\nint x;\n\n\nvoid h(void) { }\n";
        let result = diff(a, b);

        let g = result.find("g").unwrap();
        assert_eq!(g.kind, ChangeType::Deleted);
        assert_eq!(g.old_line, Some(3));

        let h = result.find("h").unwrap();
        assert_eq!(h.kind, ChangeType::Added);
        assert_eq!(h.new_line, Some(5));

        // `int x;` lives outside every function.
        assert_eq!(kind_of(&result, OUTSIDE_FUNCTIONS), Some(ChangeType::Changed));
        assert_eq!(kind_of(&result, "f"), Some(ChangeType::Same));
    }

    #[test]
    fn test_report_order() {
        let a = "void a() { }\nvoid b() { }\n";
        let b = "void c() { }\nvoid b() { x(); }\n";
        let result = diff(a, b);
        let order: Vec<_> = result.changes.iter().map(|c| (c.name.as_str(), c.kind)).collect();
        assert_eq!(
            order,
            vec![
                ("a", ChangeType::Deleted),
                ("b", ChangeType::Changed),
                ("c", ChangeType::Added),
                (OUTSIDE_FUNCTIONS, ChangeType::Same),
            ]
        );
    }

    #[test]
    fn test_nested_comment_setting() {
        let a = "/* outer /* inner */ one */\nint f() { }\n";
        let b = "/* outer /* inner */ two */\nint f() { }\n";
        assert!(!diff(a, b).has_changes());

        let config = DiffConfig {
            nested_comments: false,
            ..DiffConfig::default()
        };
        assert!(diff_with(a, b, &config).has_changes());
    }

    #[test]
    fn test_unterminated_comment_is_fatal() {
        let err = diff_sources(
            &SourceBuffer::new("a.c", "int f() { }\n/* never closes"),
            &SourceBuffer::new("b.c", "int f() { }\n"),
            &DiffConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, DiffError::UnterminatedComment { line: 2 }));
    }

    #[test]
    fn test_duplicate_names_match_first() {
        // Both old definitions of `f` pair with the first new one, and the
        // second new `f` is never reported on its own.
        let a = "int f() { return 1; }\nint f() { return 2; }\n";
        let b = "int f() { return 1; }\nint f() { return 3; }\n";
        let result = diff(a, b);

        let fs: Vec<_> = result.changes.iter().filter(|c| c.name == "f").collect();
        assert_eq!(fs.len(), 2);
        assert_eq!(fs[0].kind, ChangeType::Same);
        assert_eq!(fs[1].kind, ChangeType::Changed);
        assert!(result
            .notices
            .iter()
            .any(|n| n.contains("duplicate function names")));
    }

    #[test]
    fn test_body_only_ignores_signature() {
        let a = "int f(int a) { return a; }\n";
        let b = "long f(int a) { return a; }\n";
        assert_eq!(kind_of(&diff(a, b), "f"), Some(ChangeType::Changed));

        let config = DiffConfig {
            full_function: false,
            ..DiffConfig::default()
        };
        let result = diff_with(a, b, &config);
        assert_eq!(kind_of(&result, "f"), Some(ChangeType::Same));
        // The signature now counts as file-scope text.
        assert_eq!(kind_of(&result, OUTSIDE_FUNCTIONS), Some(ChangeType::Changed));
    }

    #[test]
    fn test_normalize_keeps_length() {
        let source = b"f(\"/* not a comment */\"); /* \"not a string\" */";
        let normalized = normalize(source, &DiffConfig::default()).unwrap();
        assert_eq!(normalized.normalized.len(), source.len());
        assert_eq!(normalized.literals.len(), 1);
        assert!(normalized.normalized.starts_with(b"f("));
        assert!(normalized.normalized[2..].iter().all(|&b| b == b' ' || b == b')' || b == b';'));
    }

    #[test]
    fn test_diff_files_with_missing_file() {
        let dir = TempDir::new().unwrap();
        let old = dir.path().join("old.c");
        let new = dir.path().join("new.c");
        fs::write(&old, "int f() { }\nint g() { }\n").unwrap();

        let result = diff_files(&old, &new, &DiffConfig::default()).unwrap();
        assert_eq!(result.notices, vec![format!("File {} is missing", new.display())]);
        assert_eq!(result.filter_kind(ChangeType::Deleted).len(), 2);
        assert_eq!(result.summary.deleted, 2);

        let result = diff_files(&new, &old, &DiffConfig::default()).unwrap();
        assert_eq!(result.summary.added, 2);
    }
}
