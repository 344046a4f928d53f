//! Ordered-list classification of diff output.
//!
//! After a diff, an `<ol>` may contain items that only exist as deletion
//! markup. Browsers still number those items, so consumers need to know
//! which items are gone and which surviving item takes over the number of
//! a removed run. [`ListDiffPostProcessor`] annotates each list with
//! `diff-list` and each direct item with one of:
//!
//! - `removed`: all visible text of the item is deletion markup
//! - `replacement`: first surviving item after one or more removed items
//! - `normal`: everything else

#![allow(clippy::unused_self)] // Unit struct methods have &self for API consistency

use std::sync::LazyLock;

use hdiff_html::{HtmlError, HtmlParser, HtmlSerializer, TreeNode};
use regex::Regex;

/// Class appended to every ordered list.
pub const LIST_CLASS: &str = "diff-list";
/// Class of an item whose content was deleted entirely.
pub const REMOVED_CLASS: &str = "removed";
/// Class of the first surviving item after removed items.
pub const REPLACEMENT_CLASS: &str = "replacement";
/// Class of any other item.
pub const NORMAL_CLASS: &str = "normal";

static OL_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<ol[\s>/]").expect("invalid regex"));

static LINE_THROUGH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)text-decoration:\s*line-through;").expect("invalid regex")
});

/// Characters ignored when deciding whether a marker holds any text.
const MARKER_TRIM: &[char] = &[' ', '\n', '\r', '\t', '\0', '\u{a0}'];

/// Characters ignored when comparing deleted text with the item text.
const COMPARE_TRIM: &[char] = &[' ', '\t', '\n', '\r', '\0', '\u{b}'];

/// Annotates ordered lists in diff HTML for renumbering and styling.
pub struct ListDiffPostProcessor;

impl ListDiffPostProcessor {
    /// Create a new post-processor.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Return `diff_html` with list classes applied.
    ///
    /// Input without an ordered list is returned unchanged. If the fragment
    /// cannot be parsed the input is returned unchanged as well.
    #[must_use]
    pub fn process(&self, diff_html: &str) -> String {
        if !OL_START.is_match(diff_html) {
            return diff_html.to_owned();
        }

        match self.annotate(diff_html) {
            Ok(html) => html,
            Err(e) => {
                tracing::debug!("List post-processing skipped, returning diff unchanged: {e}");
                diff_html.to_owned()
            }
        }
    }

    fn annotate(&self, diff_html: &str) -> Result<String, HtmlError> {
        let mut tree = HtmlParser::new().parse(diff_html)?;
        tree.for_each_element_mut("ol", &mut classify_list);
        Ok(HtmlSerializer::new().serialize(&tree))
    }
}

impl Default for ListDiffPostProcessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Classify the direct `<li>` children of one list.
fn classify_list(list: &mut TreeNode) {
    list.append_class(LIST_CLASS);

    let mut pending_renumber_after_removal = false;
    for item in list.children.iter_mut().filter(|child| child.tag == "li") {
        let class = if is_deleted_list_item(item) {
            pending_renumber_after_removal = true;
            REMOVED_CLASS
        } else if pending_renumber_after_removal {
            pending_renumber_after_removal = false;
            REPLACEMENT_CLASS
        } else {
            NORMAL_CLASS
        };
        item.append_class(class);
    }
}

/// Whether every bit of the item's text sits in deletion markup.
///
/// Deletion markup is `<del>` and `<span>` styled with a line-through. The
/// comparison is literal, so an item without any text counts as deleted.
fn is_deleted_list_item(item: &TreeNode) -> bool {
    let struck = item.descendants("span").into_iter().filter(|span| {
        span.get_attr("style")
            .is_some_and(|style| LINE_THROUGH.is_match(style))
    });
    let markers = struck.chain(item.descendants("del"));

    let mut deleted = String::new();
    for marker in markers {
        let text = marker.text_content();
        if !text.trim_matches(MARKER_TRIM).is_empty() {
            deleted.push_str(&text);
        }
    }

    deleted.trim_matches(COMPARE_TRIM) == item.text_content().trim_matches(COMPARE_TRIM)
}
