//! Line-per-event text exporter.

use crate::differ::{ChangeType, FileDiffResult, FunctionChange};
use crate::parser::helpers::line_number;
use crate::types::{ExportConfig, FunctionEntry};

fn line(line: Option<usize>) -> String {
    line.map_or_else(|| "?".to_string(), |l| l.to_string())
}

/// Render one change, or `None` for an unchanged function when those are
/// hidden.
pub fn format_change(change: &FunctionChange, show_all: bool) -> Option<String> {
    let text = match change.kind {
        ChangeType::Changed => format!(
            "Function \"{}\" is changed at lines ({}, {})",
            change.name,
            line(change.old_line),
            line(change.new_line)
        ),
        ChangeType::Same if !show_all => return None,
        ChangeType::Same => format!("Function \"{}\" is the same", change.name),
        ChangeType::Deleted => format!(
            "Function \"{}\" is deleted at line {}",
            change.name,
            line(change.old_line)
        ),
        ChangeType::Added => format!(
            "Function \"{}\" is added at line {}",
            change.name,
            line(change.new_line)
        ),
    };
    Some(text)
}

/// Notices first, in the order they were raised, then one line per change.
pub fn export(result: &FileDiffResult, config: &ExportConfig) -> String {
    result
        .notices
        .iter()
        .cloned()
        .chain(
            result
                .changes
                .iter()
                .filter_map(|c| format_change(c, config.show_all)),
        )
        .collect::<Vec<_>>()
        .join("\n")
}

/// `Function "<name>" [<first line>, <last line>]`.
pub fn format_function(buffer: &[u8], entry: &FunctionEntry) -> String {
    format!(
        "Function \"{}\" [{}, {}]",
        entry.name,
        line_number(buffer, entry.start()),
        line_number(buffer, entry.end().saturating_sub(1))
    )
}
