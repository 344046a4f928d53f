//! The diff engine capability.

use std::collections::BTreeMap;

use crate::error::EngineError;
use crate::options::{DiffOptions, EngineMetadata, OptionSpec};

/// A named backend that renders the difference between two HTML documents.
///
/// Engines are registered in a [`DiffDispatcher`](crate::DiffDispatcher)
/// under [`name`](DiffEngine::name) and shared between threads.
pub trait DiffEngine: Send + Sync {
    /// Stable identifier used as the registry key.
    fn name(&self) -> &str;

    /// Render the diff between `old` and `new` as a single HTML fragment.
    ///
    /// Either input may be empty. Calling twice with the same arguments
    /// yields the same output for a well-behaved engine.
    ///
    /// # Errors
    ///
    /// Returns an error for option values the engine cannot use or input it
    /// cannot process.
    fn diff(&self, old: &str, new: &str, options: &DiffOptions) -> Result<String, EngineError>;

    /// Options understood by [`diff`](DiffEngine::diff), with their defaults.
    fn available_options(&self) -> BTreeMap<&'static str, OptionSpec>;

    /// Presentation metadata.
    fn metadata(&self) -> EngineMetadata;
}
