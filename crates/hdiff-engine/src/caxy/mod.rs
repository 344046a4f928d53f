//! Reference diff engine in the style of `caxy/php-htmldiff`.
//!
//! Both inputs are sanitized and parsed, the trees are diffed block by block
//! (structural elements item by item, text word by word), ordered lists in
//! the result are annotated by [`ListDiffPostProcessor`] and the output is
//! normalized to valid UTF-8.
//!
//! Insertions are marked with `<ins class="diffins">`, deletions with
//! `<del class="diffdel">`, and the two halves of an in-place replacement
//! with `class="diffmod"`.

mod render;
mod tokens;

use std::collections::BTreeMap;
use std::sync::Arc;

use hdiff_html::HtmlParser;
use hdiff_sanitizer::{DefaultSanitizer, HtmlSanitizer};

use crate::encoding;
use crate::engine::DiffEngine;
use crate::error::EngineError;
use crate::lists::ListDiffPostProcessor;
use crate::options::{DiffOptions, EngineMetadata, OptionSpec};

use self::render::Renderer;

/// Registry name of [`CaxyHtmlDiff`].
pub const CAXY_ENGINE_NAME: &str = "caxy_htmldiff";

/// Option: minimum percentage of shared words for two elements to be
/// diffed in place.
pub const MATCH_THRESHOLD: &str = "match_threshold";

/// Option: whether tables are diffed cell by cell.
pub const USE_TABLE_DIFFING: &str = "use_table_diffing";

/// Tunable behavior of [`CaxyHtmlDiff`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffSettings {
    /// Minimum percentage (0-100) of the shorter element's words that must be
    /// shared for two changed elements to be diffed in place.
    pub match_threshold: u32,
    /// Diff tables cell by cell instead of replacing them whole.
    pub use_table_diffing: bool,
    /// Put a space between the deleted and inserted halves of a replacement.
    pub insert_space_in_replace: bool,
    /// Characters that always form a token of their own.
    pub special_case_chars: Vec<char>,
}

impl Default for DiffSettings {
    fn default() -> Self {
        Self {
            match_threshold: 80,
            use_table_diffing: true,
            insert_space_in_replace: true,
            special_case_chars: vec!['.', ',', '(', ')', '\'', ':', '-', '_'],
        }
    }
}

/// Token-level HTML diff engine.
pub struct CaxyHtmlDiff {
    settings: DiffSettings,
    sanitizer: Arc<dyn HtmlSanitizer>,
    lists: ListDiffPostProcessor,
}

impl CaxyHtmlDiff {
    /// Create an engine with default settings and the default sanitizer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            settings: DiffSettings::default(),
            sanitizer: Arc::new(DefaultSanitizer::new()),
            lists: ListDiffPostProcessor::new(),
        }
    }

    /// Set the defaults used when a call does not pass options.
    #[must_use]
    pub fn with_settings(mut self, settings: DiffSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Set the sanitizer applied to both inputs.
    #[must_use]
    pub fn with_sanitizer(mut self, sanitizer: Arc<dyn HtmlSanitizer>) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    /// Default settings of this engine.
    #[must_use]
    pub fn settings(&self) -> &DiffSettings {
        &self.settings
    }

    /// Settings for one call: defaults overridden by `options`.
    fn settings_for(&self, options: &DiffOptions) -> Result<DiffSettings, EngineError> {
        let mut settings = self.settings.clone();

        if let Some(threshold) = options.get_number(MATCH_THRESHOLD)? {
            if !(0.0..=100.0).contains(&threshold) {
                return Err(EngineError::InvalidOption {
                    option: MATCH_THRESHOLD.to_owned(),
                    message: format!("must be between 0 and 100, got {threshold}"),
                });
            }
            // In range, so the conversion is exact after rounding.
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let threshold = threshold.round() as u32;
            settings.match_threshold = threshold;
        }
        if let Some(use_table_diffing) = options.get_bool(USE_TABLE_DIFFING)? {
            settings.use_table_diffing = use_table_diffing;
        }

        Ok(settings)
    }
}

impl Default for CaxyHtmlDiff {
    fn default() -> Self {
        Self::new()
    }
}

impl DiffEngine for CaxyHtmlDiff {
    fn name(&self) -> &str {
        CAXY_ENGINE_NAME
    }

    fn diff(&self, old: &str, new: &str, options: &DiffOptions) -> Result<String, EngineError> {
        let settings = self.settings_for(options)?;

        let old = self.sanitizer.sanitize(old);
        let new = self.sanitizer.sanitize(new);

        let parser = HtmlParser::new();
        let old_tree = parser.parse(&old)?;
        let new_tree = parser.parse(&new)?;

        let mut raw = String::with_capacity(old.len() + new.len());
        Renderer::new(&settings).diff_children(&old_tree, &new_tree, &mut raw);

        let processed = self.lists.process(&raw);
        Ok(encoding::normalize(processed.as_bytes()))
    }

    fn available_options(&self) -> BTreeMap<&'static str, OptionSpec> {
        BTreeMap::from([
            (MATCH_THRESHOLD, OptionSpec::number(self.settings.match_threshold)),
            (
                USE_TABLE_DIFFING,
                OptionSpec::boolean(self.settings.use_table_diffing),
            ),
        ])
    }

    fn metadata(&self) -> EngineMetadata {
        EngineMetadata {
            url: "https://github.com/caxy/php-htmldiff".to_owned(),
            pretty_name: "caxy/php-htmldiff".to_owned(),
            description: "This is the diffing engine that is currently used in cdpACCESS.".to_owned(),
        }
    }
}
