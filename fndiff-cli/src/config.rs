//! fndiff configuration loading from `.fndiff.toml`.
//!
//! Configuration is optional: without a file every setting keeps its
//! default, and command-line flags override whatever the file says.
//!
//! # Example Configuration
//!
//! ```toml
//! [diff]
//! show_all = false
//! full_function = true
//! nested_comments = true
//! line_comments = true
//! choice_limit = 500
//!
//! [output]
//! format = "text"
//! color = true
//! ```

use fndiff_core::DiffConfig;
use serde::Deserialize;
use std::path::Path;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = ".fndiff.toml";

/// Root configuration structure loaded from `.fndiff.toml`.
///
/// All sections are optional and will use defaults if not specified.
#[derive(Debug, Deserialize, Default)]
pub struct FndiffConfig {
    /// Comparison and reporting settings.
    #[serde(default)]
    pub diff: DiffSettings,

    /// Output formatting preferences.
    #[serde(default)]
    pub output: OutputSettings,
}

/// The `[diff]` section: engine settings plus whether unchanged functions
/// are reported.
#[derive(Debug, Deserialize, Default)]
pub struct DiffSettings {
    /// Print unchanged functions too.
    #[serde(default)]
    pub show_all: bool,

    /// Passed to the core as-is.
    #[serde(flatten)]
    pub engine: DiffConfig,
}

/// Output formatting preferences.
///
/// Note: This is distinct from the runtime `OutputConfig` in the output module,
/// which handles actual rendering. These settings provide user preferences.
#[derive(Debug, Deserialize, Default)]
pub struct OutputSettings {
    /// Default output format.
    ///
    /// Valid values: `text`, `json`
    /// Default: `text`
    #[serde(default)]
    pub format: Option<String>,

    /// Whether to use colored output.
    ///
    /// Defaults to `true` when stdout is a TTY.
    #[serde(default)]
    pub color: Option<bool>,
}

impl FndiffConfig {
    /// Load configuration from `.fndiff.toml` in the given directory.
    ///
    /// If the config file doesn't exist or can't be parsed, returns defaults.
    /// Parse errors are logged as warnings but don't cause failures.
    pub fn load(root: &Path) -> Self {
        let config_path = root.join(CONFIG_FILE);
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse {}: {}", CONFIG_FILE, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}", CONFIG_FILE, e);
                }
            }
        }
        Self::default()
    }

    /// Get the default output format from config.
    pub fn default_format(&self) -> Option<&str> {
        self.output.format.as_deref()
    }

    /// Get the color override from config.
    pub fn use_color(&self) -> Option<bool> {
        self.output.color
    }
}
