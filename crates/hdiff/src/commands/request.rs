//! `hdiff request` command implementation.
//!
//! Reads a JSON request of the shape
//! `{"engine": "...", "htmlOld": "...", "htmlNew": "...", "options": {}}`
//! and prints `{"htmlDiff": "..."}`.

use std::io;
use std::path::PathBuf;

use clap::Args;
use hdiff_config::Config;
use hdiff_engine::{DiffRequest, DiffResponse};

use super::{build_dispatcher, read_input};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the request command.
#[derive(Args)]
pub(crate) struct RequestArgs {
    /// JSON request file (default: read stdin).
    input: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover hdiff.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl RequestArgs {
    /// Execute the request command.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is not valid JSON or the diff fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = Config::load(self.config.as_deref(), None)?;

        let raw = match &self.input {
            Some(path) => read_input(path)?,
            None => io::read_to_string(io::stdin())?,
        };
        let request = parse_request(&raw, &config)?;

        let dispatcher = build_dispatcher(&config);
        let html_diff = dispatcher.dispatch_request(&request)?;

        output.result(&serde_json::to_string(&DiffResponse { html_diff })?)?;
        Ok(())
    }
}

/// Parse a request, filling in the configured default engine.
fn parse_request(raw: &str, config: &Config) -> Result<DiffRequest, CliError> {
    let mut request: DiffRequest = serde_json::from_str(raw)?;
    if request.engine.is_empty() {
        request.engine.clone_from(&config.engine.default);
    }
    Ok(request)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_request_defaults_engine() {
        let raw = r#"{"htmlOld": "<p>a</p>", "htmlNew": "<p>b</p>"}"#;
        let request = parse_request(raw, &Config::default()).unwrap();

        assert_eq!(request.engine, "caxy_htmldiff");
        assert_eq!(request.html_old, "<p>a</p>");
        assert_eq!(request.html_new, "<p>b</p>");
        assert!(request.options.is_empty());
    }

    #[test]
    fn test_parse_request_keeps_engine_and_options() {
        let raw = r#"{"engine": "other", "htmlOld": "", "htmlNew": "", "options": {"match_threshold": 50}}"#;
        let request = parse_request(raw, &Config::default()).unwrap();

        assert_eq!(request.engine, "other");
        assert_eq!(request.options.get("match_threshold"), Some(&json!(50)));
    }

    #[test]
    fn test_parse_request_invalid_json() {
        let err = parse_request("{htmlOld:", &Config::default()).unwrap_err();
        assert!(matches!(err, CliError::Json(_)));
        assert!(err.to_string().starts_with("Invalid JSON: "));
    }

    #[test]
    fn test_request_round_trip_through_dispatcher() {
        let config = Config::default();
        let request = parse_request(
            r#"{"htmlOld": "<ol><li>A</li><li>B</li></ol>", "htmlNew": "<ol><li>B</li></ol>"}"#,
            &config,
        )
        .unwrap();

        let html_diff = build_dispatcher(&config).dispatch_request(&request).unwrap();
        assert_eq!(
            html_diff,
            concat!(
                r#"<ol class="diff-list"><li class="removed"><del class="diffdel">A</del></li>"#,
                r#"<li class="replacement">B</li></ol>"#
            )
        );
    }

    #[test]
    fn test_unknown_engine_message() {
        let config = Config::default();
        let request = parse_request(r#"{"engine": "nope"}"#, &config).unwrap();

        let err: CliError = build_dispatcher(&config)
            .dispatch_request(&request)
            .unwrap_err()
            .into();
        assert_eq!(err.to_string(), r#"No engine with name "nope" registered."#);
    }
}
