//! HTML serializer for [`TreeNode`] trees.

#![allow(clippy::unused_self)] // Unit struct methods have &self for API consistency

use crate::tree::TreeNode;

/// Elements that never have content or an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose text is emitted without escaping.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "iframe", "noembed", "noframes", "noscript", "plaintext", "script", "style", "xmp",
];

/// Whether `tag` is an HTML void element.
#[must_use]
pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// Serialize a [`TreeNode`] tree back to an HTML fragment.
pub struct HtmlSerializer;

impl HtmlSerializer {
    /// Create a new serializer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Serialize a tree to an HTML string.
    ///
    /// A fragment root is not emitted itself: only its text and children are,
    /// so parsing then serializing never introduces a wrapper element.
    pub fn serialize(&self, tree: &TreeNode) -> String {
        let mut out = String::with_capacity(4096);

        if tree.is_fragment() {
            out.push_str(&escape_text(&tree.text));
            for child in &tree.children {
                serialize_node(child, &mut out);
            }
        } else {
            serialize_node(tree, &mut out);
        }

        out
    }
}

impl Default for HtmlSerializer {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialize a single node, its content and its tail.
///
/// Recurses once per nesting level; trees from [`HtmlParser`] are at most
/// [`MAX_DEPTH`] deep.
///
/// [`HtmlParser`]: crate::HtmlParser
/// [`MAX_DEPTH`]: crate::MAX_DEPTH
pub fn serialize_node(node: &TreeNode, out: &mut String) {
    if node.is_comment() {
        out.push_str("<!--");
        out.push_str(&node.text);
        out.push_str("-->");
    } else {
        write_start_tag(node, out);

        if !is_void_element(&node.tag) {
            if RAW_TEXT_ELEMENTS.contains(&node.tag.as_str()) {
                out.push_str(&node.text);
            } else {
                out.push_str(&escape_text(&node.text));
            }
            for child in &node.children {
                serialize_node(child, out);
            }
            write_end_tag(node, out);
        }
    }

    out.push_str(&escape_text(&node.tail));
}

/// Write `<tag attr="value">` for a node.
pub fn write_start_tag(node: &TreeNode, out: &mut String) {
    out.push('<');
    out.push_str(&node.tag);
    for (key, value) in &node.attrs {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape_attr(value));
        out.push('"');
    }
    out.push('>');
}

/// Write `</tag>` for a node. Void elements have no end tag.
pub fn write_end_tag(node: &TreeNode, out: &mut String) {
    if is_void_element(&node.tag) {
        return;
    }
    out.push_str("</");
    out.push_str(&node.tag);
    out.push('>');
}

/// Escape text content.
#[must_use]
pub fn escape_text(text: &str) -> String {
    escape_html(text, false)
}

/// Escape an attribute value for a double-quoted attribute.
#[must_use]
pub fn escape_attr(text: &str) -> String {
    escape_html(text, true)
}

fn escape_html(text: &str, in_attribute: bool) -> String {
    let mut result = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => result.push_str("&amp;"),
            '<' if !in_attribute => result.push_str("&lt;"),
            '>' if !in_attribute => result.push_str("&gt;"),
            '"' if in_attribute => result.push_str("&quot;"),
            _ => result.push(ch),
        }
    }
    result
}
