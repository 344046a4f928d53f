//! `hdiff diff` command implementation.

use std::path::PathBuf;

use clap::Args;
use hdiff_config::{CliSettings, Config};
use hdiff_engine::{DiffOptions, DiffResponse};
use serde_json::Value;

use super::{build_dispatcher, read_input, write_result};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the diff command.
#[derive(Args)]
pub(crate) struct DiffArgs {
    /// Original HTML file.
    old: PathBuf,

    /// Changed HTML file.
    new: PathBuf,

    /// Path to configuration file (default: auto-discover hdiff.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Engine to use (overrides config).
    #[arg(short, long, env = "HDIFF_ENGINE")]
    engine: Option<String>,

    /// Engine option as KEY=VALUE. VALUE is read as JSON when it parses.
    #[arg(long = "option", value_name = "KEY=VALUE")]
    options: Vec<String>,

    /// Minimum percentage of shared words to diff two blocks in place
    /// (overrides config).
    #[arg(long)]
    match_threshold: Option<u32>,

    /// Replace changed tables whole instead of diffing cell by cell.
    #[arg(long)]
    no_table_diffing: bool,

    /// Disable the sanitizer cache.
    #[arg(long)]
    no_cache: bool,

    /// Sanitizer cache directory (overrides config).
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Print a JSON response instead of bare HTML.
    #[arg(long)]
    json: bool,

    /// Write the result to a file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl DiffArgs {
    /// Execute the diff command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, reading the inputs or the diff
    /// itself fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let options = parse_options(&self.options)?;

        let cli_settings = CliSettings {
            engine: self.engine,
            match_threshold: self.match_threshold,
            use_table_diffing: self.no_table_diffing.then_some(false),
            cache_enabled: self.no_cache.then_some(false),
            cache_dir: self.cache_dir,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let old = read_input(&self.old)?;
        let new = read_input(&self.new)?;

        let dispatcher = build_dispatcher(&config);
        let html_diff =
            dispatcher.dispatch_with_options(&config.engine.default, &old, &new, &options)?;

        let text = if self.json {
            serde_json::to_string_pretty(&DiffResponse { html_diff })?
        } else {
            html_diff
        };
        write_result(&output, self.output.as_deref(), &text)
    }
}

/// Parse repeated `--option KEY=VALUE` arguments.
fn parse_options(raw: &[String]) -> Result<DiffOptions, CliError> {
    raw.iter().map(String::as_str).map(parse_option).collect()
}

/// Parse one `KEY=VALUE` pair. `VALUE` is JSON if it parses, else a string.
fn parse_option(arg: &str) -> Result<(String, Value), CliError> {
    let Some((key, value)) = arg.split_once('=') else {
        return Err(CliError::Validation(format!(
            "Invalid option \"{arg}\": expected KEY=VALUE"
        )));
    };
    let key = key.trim();
    if key.is_empty() {
        return Err(CliError::Validation(format!(
            "Invalid option \"{arg}\": empty key"
        )));
    }

    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_owned()));
    Ok((key.to_owned(), value))
}
