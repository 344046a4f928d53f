//! Allowlist-based sanitizer.

use std::collections::BTreeMap;

use hdiff_cache::{Cache, CacheBucket, NullCacheBucket};
use hdiff_html::{HtmlError, HtmlParser, HtmlSerializer, TreeNode, escape_text};

use crate::key::{content_hash, settings_etag};
use crate::{CACHE_BUCKET, HtmlSanitizer};

/// Elements removed together with everything inside them.
const DROPPED_ELEMENTS: &[&str] = &[
    "applet", "base", "button", "embed", "form", "frame", "frameset", "head", "iframe", "input",
    "link", "meta", "noscript", "object", "script", "select", "style", "template", "textarea",
    "title",
];

/// Elements kept as they are. Anything else is unwrapped.
const ALLOWED_ELEMENTS: &[&str] = &[
    "a", "abbr", "article", "b", "big", "blockquote", "br", "caption", "cite", "code", "col",
    "colgroup", "dd", "del", "div", "dl", "dt", "em", "figcaption", "figure", "h1", "h2", "h3",
    "h4", "h5", "h6", "hr", "i", "img", "ins", "li", "ol", "p", "pre", "q", "s", "section",
    "small", "span", "strike", "strong", "sub", "sup", "table", "tbody", "td", "tfoot", "th",
    "thead", "tr", "u", "ul",
];

const ALLOWED_ATTRIBUTES: &[&str] = &[
    "alt", "class", "colspan", "height", "href", "id", "reversed", "rowspan", "src", "start",
    "style", "title", "type", "width",
];

/// Attributes holding a URL.
const URL_ATTRIBUTES: &[&str] = &["href", "src"];

/// Default [`HtmlSanitizer`].
///
/// Removes scripting and form elements with their content, unwraps elements
/// outside the allowlist, renames tags per the configured transforms and
/// keeps only allowlisted attributes. Event handlers and `javascript:` URLs
/// never survive.
///
/// Results can be memoized in a [`Cache`] keyed by the SHA-256 of the input.
pub struct DefaultSanitizer {
    tag_transforms: BTreeMap<String, String>,
    cache: Box<dyn CacheBucket>,
    etag: String,
}

impl DefaultSanitizer {
    /// Create a sanitizer with the default transforms (`b` → `strong`,
    /// `i` → `em`) and no cache.
    #[must_use]
    pub fn new() -> Self {
        let tag_transforms: BTreeMap<String, String> = [("b", "strong"), ("i", "em")]
            .into_iter()
            .map(|(from, to)| (from.to_owned(), to.to_owned()))
            .collect();
        let etag = settings_etag(&tag_transforms);
        Self {
            tag_transforms,
            cache: Box::new(NullCacheBucket),
            etag,
        }
    }

    /// Replace the tag transforms.
    #[must_use]
    pub fn with_tag_transforms(mut self, tag_transforms: BTreeMap<String, String>) -> Self {
        self.etag = settings_etag(&tag_transforms);
        self.tag_transforms = tag_transforms;
        self
    }

    /// Memoize sanitized output in `cache`.
    #[must_use]
    pub fn with_cache(mut self, cache: &dyn Cache) -> Self {
        self.cache = cache.bucket(CACHE_BUCKET);
        self
    }

    fn clean(&self, html: &str) -> Result<String, HtmlError> {
        let mut tree = HtmlParser::new().parse(html)?;
        self.clean_children(&mut tree);
        Ok(HtmlSerializer::new().serialize(&tree))
    }

    fn clean_children(&self, node: &mut TreeNode) {
        let mut idx = 0;
        while let Some(child) = node.children.get_mut(idx) {
            if child.is_comment() || DROPPED_ELEMENTS.contains(&child.tag.as_str()) {
                node.remove_child(idx);
                continue;
            }

            if let Some(target) = self.tag_transforms.get(&child.tag) {
                child.tag.clone_from(target);
            }
            self.clean_children(child);

            if ALLOWED_ELEMENTS.contains(&child.tag.as_str()) {
                clean_attributes(child);
                idx += 1;
            } else {
                let count = child.children.len();
                node.unwrap_child(idx);
                idx += count;
            }
        }
    }
}

impl Default for DefaultSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlSanitizer for DefaultSanitizer {
    fn sanitize(&self, html: &str) -> String {
        let key = content_hash(html);
        if let Some(cached) = self.cache.get(&key, &self.etag) {
            tracing::trace!(%key, "Sanitizer cache hit");
            return cached;
        }

        match self.clean(html) {
            Ok(clean) => {
                self.cache.set(&key, &self.etag, &clean);
                clean
            }
            Err(e) => {
                tracing::warn!("Failed to parse HTML for sanitization, escaping as text: {e}");
                escape_text(html)
            }
        }
    }
}

fn clean_attributes(node: &mut TreeNode) {
    node.attrs.retain(|(name, value)| {
        ALLOWED_ATTRIBUTES.contains(&name.as_str())
            && !(URL_ATTRIBUTES.contains(&name.as_str()) && is_script_url(value))
    });
}

/// Whether a URL would execute script when followed.
///
/// Browsers ignore whitespace and control characters inside the scheme, so
/// they are ignored here too.
fn is_script_url(value: &str) -> bool {
    let scheme = value
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .take(11)
        .collect::<String>()
        .to_ascii_lowercase();
    scheme.starts_with("javascript:") || scheme.starts_with("vbscript:")
}

#[cfg(test)]
mod tests {
    use hdiff_cache::FileCache;
    use pretty_assertions::assert_eq;

    use super::*;

    fn sanitize(html: &str) -> String {
        DefaultSanitizer::new().sanitize(html)
    }

    #[test]
    fn test_keeps_plain_markup() {
        let html = r#"<ol start="2"><li class="a">One</li></ol><p>Two <em>x</em></p>"#;
        assert_eq!(sanitize(html), html);
    }

    #[test]
    fn test_drops_script_with_content() {
        assert_eq!(
            sanitize("<p>before<script>alert(1)</script> after</p>"),
            "<p>before after</p>"
        );
    }

    #[test]
    fn test_drops_style_and_form_controls() {
        assert_eq!(
            sanitize("<style>p{}</style><p>x<input value=\"y\"><button>Go</button></p>"),
            "<p>x</p>"
        );
    }

    #[test]
    fn test_applies_default_transforms() {
        assert_eq!(
            sanitize("<p><b>bold</b> and <i>italic</i></p>"),
            "<p><strong>bold</strong> and <em>italic</em></p>"
        );
    }

    #[test]
    fn test_custom_transforms() {
        let mut transforms = BTreeMap::new();
        transforms.insert("u".to_owned(), "span".to_owned());
        let sanitizer = DefaultSanitizer::new().with_tag_transforms(transforms);

        assert_eq!(
            sanitizer.sanitize("<p><u>x</u><b>y</b></p>"),
            "<p><span>x</span><b>y</b></p>"
        );
    }

    #[test]
    fn test_unwraps_unknown_elements() {
        assert_eq!(
            sanitize("<html><body><custom-box>a <em>b</em></custom-box> c</body></html>"),
            "a <em>b</em> c"
        );
    }

    #[test]
    fn test_unwrap_keeps_following_siblings_clean() {
        assert_eq!(
            sanitize("<font>a<font>b</font></font><p onclick=\"x\">c</p>"),
            "ab<p>c</p>"
        );
    }

    #[test]
    fn test_filters_attributes() {
        assert_eq!(
            sanitize(r#"<p id="x" onclick="steal()" data-foo="1" style="color:red">t</p>"#),
            r#"<p id="x" style="color:red">t</p>"#
        );
    }

    #[test]
    fn test_drops_script_urls() {
        assert_eq!(
            sanitize(r#"<a href=" Java&#x09;Script:alert(1)">x</a><a href="https://e.com">y</a>"#),
            r#"<a>x</a><a href="https://e.com">y</a>"#
        );
    }

    #[test]
    fn test_drops_comments() {
        assert_eq!(sanitize("<p>a<!-- hidden -->b</p>"), "<p>ab</p>");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(sanitize(""), "");
    }

    #[test]
    fn test_cache_hit_returns_stored_value() {
        let tmp = tempfile::TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path().join("cache"));
        let sanitizer = DefaultSanitizer::new().with_cache(&cache);
        let html = "<p><b>x</b></p>";

        assert_eq!(sanitizer.sanitize(html), "<p><strong>x</strong></p>");

        // Overwrite the entry to prove the second call reads it back.
        cache
            .bucket(CACHE_BUCKET)
            .set(&content_hash(html), &sanitizer.etag, "<p>cached</p>");
        assert_eq!(sanitizer.sanitize(html), "<p>cached</p>");
    }

    #[test]
    fn test_cache_miss_on_other_transforms() {
        let tmp = tempfile::TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path().join("cache"));
        let html = "<p><b>x</b></p>";

        DefaultSanitizer::new().with_cache(&cache).sanitize(html);
        let plain = DefaultSanitizer::new()
            .with_tag_transforms(BTreeMap::new())
            .with_cache(&cache);

        assert_eq!(plain.sanitize(html), "<p><b>x</b></p>");
    }

    #[test]
    fn test_deep_nesting_is_escaped() {
        let html = format!("{}x{}", "<span>".repeat(20_000), "</span>".repeat(20_000));
        let out = sanitize(&html);

        assert!(out.starts_with("&lt;span&gt;&lt;span&gt;"));
        assert!(!out.contains('<'));
    }
}
