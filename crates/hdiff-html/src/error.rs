//! Error types for HTML parsing.

/// Error raised while parsing an HTML fragment.
///
/// The parser recovers from malformed markup the way browsers do; the only
/// input it refuses is input it cannot represent safely.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum HtmlError {
    /// Elements nest deeper than the parser accepts.
    #[error("HTML nesting exceeds {limit} elements")]
    TooDeep { limit: usize },
}
