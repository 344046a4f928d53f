//! `hdiff engines` command implementation.

use std::path::PathBuf;

use clap::Args;
use hdiff_config::Config;
use hdiff_engine::{DiffDispatcher, DiffEngine};
use serde_json::{Map, Value, json};

use super::build_dispatcher;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the engines command.
#[derive(Args)]
pub(crate) struct EnginesArgs {
    /// Path to configuration file (default: auto-discover hdiff.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print engines as JSON.
    #[arg(long)]
    json: bool,
}

impl EnginesArgs {
    /// Execute the engines command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or stdout is not writable.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = Config::load(self.config.as_deref(), None)?;
        let dispatcher = build_dispatcher(&config);

        if self.json {
            output.result(&serde_json::to_string_pretty(&engines_json(&dispatcher))?)?;
            return Ok(());
        }

        for (name, engine) in dispatcher.list() {
            if name == config.engine.default {
                output.highlight(&format!("{name} (default)"))?;
            } else {
                output.highlight(&name)?;
            }
            for line in describe(engine.as_ref()) {
                output.detail(&line)?;
            }
        }
        Ok(())
    }
}

/// Registered engines keyed by name, with metadata and options.
fn engines_json(dispatcher: &DiffDispatcher) -> Value {
    let engines: Map<String, Value> = dispatcher
        .list()
        .into_iter()
        .map(|(name, engine)| {
            let entry = json!({
                "metadata": engine.metadata(),
                "options": engine.available_options(),
            });
            (name, entry)
        })
        .collect();
    Value::Object(engines)
}

/// Human-readable lines describing one engine.
fn describe(engine: &dyn DiffEngine) -> Vec<String> {
    let metadata = engine.metadata();
    let mut lines = vec![
        format!("  {}: {}", metadata.pretty_name, metadata.description),
        format!("  {}", metadata.url),
    ];

    for (option, spec) in engine.available_options() {
        lines.push(format!(
            "  --option {option}=<{}> (default {})",
            spec.kind, spec.default
        ));
    }
    lines
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_engines_json() {
        let dispatcher = build_dispatcher(&Config::default());

        assert_eq!(
            engines_json(&dispatcher),
            json!({
                "caxy_htmldiff": {
                    "metadata": {
                        "url": "https://github.com/caxy/php-htmldiff",
                        "prettyName": "caxy/php-htmldiff",
                        "description": "This is the diffing engine that is currently used in cdpACCESS."
                    },
                    "options": {
                        "match_threshold": {"type": "number", "default": 80},
                        "use_table_diffing": {"type": "boolean", "default": true}
                    }
                }
            })
        );
    }

    #[test]
    fn test_describe() {
        let dispatcher = build_dispatcher(&Config::default());
        let engine = dispatcher.get("caxy_htmldiff").unwrap();

        assert_eq!(
            describe(engine.as_ref()),
            vec![
                "  caxy/php-htmldiff: This is the diffing engine that is currently used in cdpACCESS."
                    .to_owned(),
                "  https://github.com/caxy/php-htmldiff".to_owned(),
                "  --option match_threshold=<number> (default 80)".to_owned(),
                "  --option use_table_diffing=<boolean> (default true)".to_owned(),
            ]
        );
    }
}
