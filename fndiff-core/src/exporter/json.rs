//! JSON format exporter.

use crate::differ::FileDiffResult;
use crate::types::ExportConfig;

/// Export a diff result to JSON. Unchanged functions are always included.
pub fn export(result: &FileDiffResult, config: &ExportConfig) -> Result<String, serde_json::Error> {
    if config.pretty_print {
        serde_json::to_string_pretty(result)
    } else {
        serde_json::to_string(result)
    }
}
