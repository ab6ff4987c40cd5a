//! Change types and result structures for function-level diffs.

use serde::{Deserialize, Serialize};

use super::comparator::DivergenceReason;

/// Type of change detected for one function.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Changed,
    Same,
    Deleted,
    Added,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Changed => "changed",
            ChangeType::Same => "same",
            ChangeType::Deleted => "deleted",
            ChangeType::Added => "added",
        }
    }
}

/// Outcome for one function name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionChange {
    /// Type of change
    pub kind: ChangeType,

    /// Function name as extracted
    pub name: String,

    /// Line in the old file: the divergence for `changed`, the start
    /// otherwise. Absent for `added`.
    pub old_line: Option<usize>,

    /// Line in the new file, same conventions. Absent for `deleted`.
    pub new_line: Option<usize>,

    /// Which check found the first difference (only for `changed`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<DivergenceReason>,
}

impl FunctionChange {
    /// Create a change with no line information yet.
    pub fn create(kind: ChangeType, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            old_line: None,
            new_line: None,
            reason: None,
        }
    }

    pub fn with_old_line(mut self, line: usize) -> Self {
        self.old_line = Some(line);
        self
    }

    pub fn with_new_line(mut self, line: usize) -> Self {
        self.new_line = Some(line);
        self
    }

    pub fn with_reason(mut self, reason: DivergenceReason) -> Self {
        self.reason = Some(reason);
        self
    }

    /// Everything except `same` counts as a difference.
    pub fn is_difference(&self) -> bool {
        self.kind != ChangeType::Same
    }
}

/// Per-kind counters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    pub changed: u32,
    pub same: u32,
    pub deleted: u32,
    pub added: u32,
}

impl DiffSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the counter for one change.
    pub fn record(&mut self, kind: ChangeType) {
        match kind {
            ChangeType::Changed => self.changed += 1,
            ChangeType::Same => self.same += 1,
            ChangeType::Deleted => self.deleted += 1,
            ChangeType::Added => self.added += 1,
        }
    }

    /// Generate human-readable summary string.
    pub fn text(&self) -> String {
        let parts: Vec<String> = [
            (self.changed, "changed"),
            (self.deleted, "deleted"),
            (self.added, "added"),
        ]
        .iter()
        .filter(|(count, _)| *count > 0)
        .map(|(count, label)| format!("{} {}", count, label))
        .collect();

        if parts.is_empty() {
            "No changes".to_string()
        } else {
            format!("functions: {}", parts.join(", "))
        }
    }
}

/// Complete result of comparing one file pair.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FileDiffResult {
    /// Path of the old input
    pub old_path: String,

    /// Path of the new input
    pub new_path: String,

    /// One entry per function, file-scope pseudo-function last
    pub changes: Vec<FunctionChange>,

    /// Non-fatal warnings in the order they were raised
    pub notices: Vec<String>,

    /// Summary statistics
    pub summary: DiffSummary,

    /// Human-readable summary text
    pub summary_text: String,

    /// Duration of diff operation in milliseconds
    pub duration_ms: f64,
}

impl FileDiffResult {
    pub fn new(old_path: impl Into<String>, new_path: impl Into<String>) -> Self {
        Self {
            old_path: old_path.into(),
            new_path: new_path.into(),
            ..Self::default()
        }
    }

    /// Add a change and update summary.
    pub fn add_change(&mut self, change: FunctionChange) {
        self.summary.record(change.kind);
        self.changes.push(change);
    }

    pub fn add_notice(&mut self, notice: impl Into<String>) {
        self.notices.push(notice.into());
    }

    /// Finalize the result with timing and summary text.
    pub fn finalize(&mut self, duration_ms: f64) {
        self.duration_ms = duration_ms;
        self.summary_text = self.summary.text();
    }

    /// Check if any function differs.
    pub fn has_changes(&self) -> bool {
        self.changes.iter().any(FunctionChange::is_difference)
    }

    /// Get change count, `same` entries excluded.
    pub fn change_count(&self) -> usize {
        self.changes.iter().filter(|c| c.is_difference()).count()
    }

    /// Filter changes by kind.
    pub fn filter_kind(&self, kind: ChangeType) -> Vec<&FunctionChange> {
        self.changes.iter().filter(|c| c.kind == kind).collect()
    }

    /// First recorded outcome for a function name.
    pub fn find(&self, name: &str) -> Option<&FunctionChange> {
        self.changes.iter().find(|c| c.name == name)
    }
}
