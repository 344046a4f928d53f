//! CLI command implementations.

pub(crate) mod diff;
pub(crate) mod engines;
pub(crate) mod lists;
pub(crate) mod request;

use std::path::Path;
use std::sync::Arc;

use hdiff_cache::FileCache;
use hdiff_config::{Config, EngineConfig};
use hdiff_engine::{CaxyHtmlDiff, DiffDispatcher, DiffEngine, DiffSettings, encoding};
use hdiff_sanitizer::{DefaultSanitizer, HtmlSanitizer};

pub(crate) use diff::DiffArgs;
pub(crate) use engines::EnginesArgs;
pub(crate) use lists::ListsArgs;
pub(crate) use request::RequestArgs;

use crate::error::CliError;
use crate::output::Output;

/// Engine defaults from the `[engine]` section.
fn diff_settings(engine: &EngineConfig) -> DiffSettings {
    DiffSettings {
        match_threshold: engine.match_threshold,
        use_table_diffing: engine.use_table_diffing,
        insert_space_in_replace: engine.insert_space_in_replace,
        special_case_chars: engine.special_chars(),
    }
}

/// Sanitizer from the `[sanitizer]` section, cached on disk if enabled.
fn sanitizer(config: &Config) -> DefaultSanitizer {
    let resolved = &config.sanitizer_resolved;
    let sanitizer = DefaultSanitizer::new().with_tag_transforms(resolved.tag_transforms.clone());

    match resolved.active_cache_dir() {
        Some(dir) => {
            tracing::info!(cache_dir = %dir.display(), "Sanitizer cache enabled");
            sanitizer.with_cache(&FileCache::new(dir.to_path_buf()))
        }
        None => sanitizer,
    }
}

/// Build the dispatcher with every available engine.
pub(crate) fn build_dispatcher(config: &Config) -> DiffDispatcher {
    let sanitizer: Arc<dyn HtmlSanitizer> = Arc::new(sanitizer(config));
    let caxy = CaxyHtmlDiff::new()
        .with_settings(diff_settings(&config.engine))
        .with_sanitizer(sanitizer);

    let engines: Vec<Arc<dyn DiffEngine>> = vec![Arc::new(caxy)];
    DiffDispatcher::with_engines(engines)
}

/// Read an input file, dropping bytes that are not valid UTF-8.
fn read_input(path: &Path) -> Result<String, CliError> {
    let bytes = std::fs::read(path)?;
    Ok(encoding::normalize(&bytes))
}

/// Write a result to `path`, or to stdout when no path is given.
fn write_result(output: &Output, path: Option<&Path>, text: &str) -> Result<(), CliError> {
    match path {
        Some(path) => {
            std::fs::write(path, text)?;
            output.info(&format!("Wrote {}", path.display()));
        }
        None => output.result(text)?,
    }
    Ok(())
}
