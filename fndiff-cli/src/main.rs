//! fndiff CLI - function-granular diff for C-family source files
//!
//! Reports which functions changed between two versions of a file while
//! ignoring whitespace and comment edits.

use std::path::{Path, PathBuf};

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use config::FndiffConfig;
use output::OutputFormat;

/// Parse and validate the pragma search space bound (must be at least 1)
fn parse_choice_limit(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if value == 0 {
        return Err("search space must be at least 1".to_string());
    }
    Ok(value)
}

/// Compare two versions of a source file function by function.
///
/// Whitespace and comment edits are ignored; any change to a string or
/// character literal is reported.
#[derive(Parser)]
#[command(name = "fndiff")]
#[command(author, version)]
#[command(about = "Function-granular diff for C-family source files")]
#[command(after_help = "Examples:
  fndiff old/main.c new/main.c              Report changed functions
  fndiff a.c b.c --show-all                 Also list unchanged functions
  fndiff a.c b.c --format json              Machine-readable report")]
pub struct Cli {
    /// Old version of the file
    old: PathBuf,

    /// New version of the file
    new: PathBuf,

    /// Print unchanged functions too
    #[arg(long)]
    show_all: bool,

    /// Compare function bodies only, ignoring the declaration
    #[arg(long)]
    body_only: bool,

    /// Treat comments as non-nesting
    #[arg(long)]
    not_nested: bool,

    /// Treat `//` as ordinary code
    #[arg(long)]
    no_line_comments: bool,

    /// Upper bound on pragma branch choices explored per file
    #[arg(long = "vs", value_name = "N", value_parser = parse_choice_limit)]
    choice_limit: Option<usize>,

    /// List every extracted function of both files before comparing
    #[arg(long)]
    list_functions: bool,

    /// Output format (overrides config default)
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Enable verbose output (debug logging)
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    // Load configuration from .fndiff.toml
    let config = FndiffConfig::load(Path::new("."));

    // Resolve output format: CLI flag > config default > Text
    let format = cli.format.unwrap_or_else(|| {
        config
            .default_format()
            .and_then(|f| f.parse().ok())
            .unwrap_or_default()
    });

    // Apply color override from config if set
    if let Some(use_color) = config.use_color() {
        colored::control::set_override(use_color);
    }

    // CLI flags override the config file
    let show_all = cli.show_all || config.diff.show_all;
    let mut diff_config = config.diff.engine.clone();
    if cli.body_only {
        diff_config.full_function = false;
    }
    if cli.not_nested {
        diff_config.nested_comments = false;
    }
    if cli.no_line_comments {
        diff_config.line_comments = false;
    }
    if let Some(limit) = cli.choice_limit {
        diff_config.choice_limit = limit;
    }

    commands::diff::run(
        &cli.old,
        &cli.new,
        &diff_config,
        show_all,
        cli.list_functions,
        format,
        config.use_color(),
    )
}
