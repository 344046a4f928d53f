//! HTML sanitization for hdiff.
//!
//! Diff engines only see markup that went through an [`HtmlSanitizer`]:
//! dangerous elements are gone, presentational tags are normalized and
//! attributes are reduced to a safe allowlist. Both sides of a diff are
//! sanitized the same way, so purely cosmetic differences (`<b>` versus
//! `<strong>`) do not show up as changes.
//!
//! # Example
//!
//! ```
//! use hdiff_sanitizer::{DefaultSanitizer, HtmlSanitizer};
//!
//! let sanitizer = DefaultSanitizer::new();
//! let clean = sanitizer.sanitize(r#"<p onclick="x()">Hi <b>there</b><script>x()</script></p>"#);
//! assert_eq!(clean, "<p>Hi <strong>there</strong></p>");
//! ```

mod key;
mod sanitizer;

pub use key::content_hash;
pub use sanitizer::DefaultSanitizer;

/// Bucket name used for sanitized output.
pub const CACHE_BUCKET: &str = "sanitized";

/// Makes untrusted HTML safe and uniform before diffing.
///
/// Sanitization is total: implementations never fail, they degrade to a
/// conservative result instead.
pub trait HtmlSanitizer: Send + Sync {
    /// Return the sanitized form of `html`.
    fn sanitize(&self, html: &str) -> String;
}
