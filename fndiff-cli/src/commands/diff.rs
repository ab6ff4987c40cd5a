//! Diff command - function-by-function comparison of two source files
//!
//! Loads both inputs, optionally lists the functions found in each, and
//! reports which functions changed, disappeared or appeared.

use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use serde::Serialize;

use fndiff_core::exporter::{json, text};
use fndiff_core::parser::helpers::line_number;
use fndiff_core::{
    diff_sources, find_functions, ChangeType, DiffConfig, ExportConfig, FileDiffResult,
    SourceBuffer,
};

use crate::output::{JsonOutput, OutputConfig, OutputFormat, Outputter};

const STARTED: &str = "Processing functions in two files started";
const FINISHED: &str = "Processing functions in two files finished";

/// One extracted function as shown by `--list-functions`.
#[derive(Debug, Clone, Serialize)]
pub struct ListedFunction {
    pub name: String,
    pub first_line: usize,
    pub last_line: usize,
    #[serde(skip)]
    text: String,
}

/// Functions extracted from both inputs.
#[derive(Debug, Default, Serialize)]
pub struct FunctionListing {
    pub old: Vec<ListedFunction>,
    pub new: Vec<ListedFunction>,
}

fn list_functions(source: &SourceBuffer, config: &DiffConfig) -> anyhow::Result<Vec<ListedFunction>> {
    let extraction = find_functions(&source.bytes, config)
        .with_context(|| format!("Failed to extract functions from {}", source.path))?;
    Ok(extraction
        .functions
        .iter()
        .map(|entry| ListedFunction {
            name: entry.name.clone(),
            first_line: line_number(&source.bytes, entry.start()),
            last_line: line_number(&source.bytes, entry.end().saturating_sub(1)),
            text: text::format_function(&source.bytes, entry),
        })
        .collect())
}

/// Everything the diff command prints.
#[derive(Debug, Serialize)]
pub struct DiffReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub functions: Option<FunctionListing>,
    #[serde(flatten)]
    pub result: FileDiffResult,
    #[serde(skip)]
    show_all: bool,
}

impl DiffReport {
    fn export_config(&self, config: &OutputConfig) -> ExportConfig {
        ExportConfig::new(self.show_all, !config.compact)
    }

    fn colorize(kind: ChangeType, line: String) -> String {
        match kind {
            ChangeType::Changed => line.yellow().to_string(),
            ChangeType::Deleted => line.red().to_string(),
            ChangeType::Added => line.green().to_string(),
            ChangeType::Same => line.dimmed().to_string(),
        }
    }
}

impl Outputter for DiffReport {
    fn to_text(&self, config: &OutputConfig) -> String {
        let mut lines = Vec::new();

        if let Some(listing) = &self.functions {
            lines.extend(listing.old.iter().map(|f| f.text.clone()));
            lines.extend(listing.new.iter().map(|f| f.text.clone()));
        }

        if !config.use_colors() {
            let body = text::export(&self.result, &self.export_config(config));
            if !body.is_empty() {
                lines.push(body);
            }
            return lines.join("\n");
        }

        for notice in &self.result.notices {
            lines.push(notice.yellow().to_string());
        }
        for change in &self.result.changes {
            if let Some(line) = text::format_change(change, self.show_all) {
                lines.push(Self::colorize(change.kind, line));
            }
        }
        lines.join("\n")
    }

    fn to_json(&self, config: &OutputConfig) -> String {
        if self.functions.is_some() {
            return JsonOutput::format(self, config);
        }
        json::export(&self.result, &self.export_config(config))
            .unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
    }
}

/// Run the diff command.
pub fn run(
    old: &Path,
    new: &Path,
    config: &DiffConfig,
    show_all: bool,
    list: bool,
    format: OutputFormat,
    color_override: Option<bool>,
) -> anyhow::Result<()> {
    let output_config = OutputConfig::auto_detect_with_color_override(format, color_override);
    let text_mode = format == OutputFormat::Text;

    let old_source = SourceBuffer::load(old)
        .with_context(|| format!("Failed to read {}", old.display()))?;
    let new_source = SourceBuffer::load(new)
        .with_context(|| format!("Failed to read {}", new.display()))?;

    if text_mode {
        println!("{}", STARTED);
    }

    let functions = if list {
        Some(FunctionListing {
            old: list_functions(&old_source, config)?,
            new: list_functions(&new_source, config)?,
        })
    } else {
        None
    };

    let result = diff_sources(&old_source, &new_source, config)?;
    tracing::debug!("{} ({:.2}ms)", result.summary_text, result.duration_ms);

    let report = DiffReport {
        functions,
        result,
        show_all,
    };
    report.output(&output_config);

    if text_mode {
        println!("{}", FINISHED);
    }
    Ok(())
}
