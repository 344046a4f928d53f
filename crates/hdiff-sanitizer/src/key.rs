//! Cache key computation for sanitized output.

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

/// Hex SHA-256 of `html`, used as the cache key of its sanitized form.
#[must_use]
pub fn content_hash(html: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(html.as_bytes());
    hex::encode(hasher.finalize())
}

/// Etag describing the sanitizer settings.
///
/// Entries written under different tag transforms never match.
pub(crate) fn settings_etag(tag_transforms: &BTreeMap<String, String>) -> String {
    let transforms = tag_transforms
        .iter()
        .map(|(from, to)| format!("{from}={to}"))
        .collect::<Vec<_>>()
        .join(",");
    format!("v1;{transforms}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash() {
        let a = content_hash("<p>a</p>");

        assert_eq!(a, content_hash("<p>a</p>"));
        assert_ne!(a, content_hash("<p>b</p>"));
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_settings_etag_depends_on_transforms() {
        let mut transforms = BTreeMap::new();
        let empty = settings_etag(&transforms);
        transforms.insert("b".to_owned(), "strong".to_owned());

        assert_eq!(empty, "v1;");
        assert_eq!(settings_etag(&transforms), "v1;b=strong");
    }
}
