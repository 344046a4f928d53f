//! Error types for diff engines and the dispatcher.

use hdiff_html::HtmlError;

/// Error raised by a [`DiffEngine`](crate::DiffEngine).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum EngineError {
    /// An option value has the wrong type or is out of range.
    #[error("Invalid value for option \"{option}\": {message}")]
    InvalidOption {
        /// Option name.
        option: String,
        /// What is wrong with the value.
        message: String,
    },

    /// Input could not be parsed as HTML.
    #[error(transparent)]
    Html(#[from] HtmlError),
}

/// Error raised by the [`DiffDispatcher`](crate::DiffDispatcher).
///
/// The three variants are the caller-visible failure classes: an unknown
/// engine name, a malformed removal target and a failure inside the engine.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DispatchError {
    /// No engine is registered under the requested name.
    #[error("No engine with name \"{name}\" registered.")]
    UnknownEngine {
        /// Requested engine name.
        name: String,
    },

    /// A removal target is neither an engine name nor an engine.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The selected engine failed.
    #[error(transparent)]
    Engine(#[from] EngineError),
}
