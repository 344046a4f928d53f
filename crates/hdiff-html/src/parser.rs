//! Recovering HTML fragment parser.
//!
//! Fragments are parsed with `scraper` (html5ever) in a `<body>` context, so
//! any markup a browser accepts produces the same tree a browser would build:
//! bare `<` in text stays text, `script`/`style` bodies are raw text,
//! `textarea`/`title` bodies are RCDATA, and optional or misnested end tags
//! are recovered. The html5ever tree is then copied into owned [`TreeNode`]s.

#![allow(clippy::unused_self)] // Unit struct methods have &self for API consistency

use ego_tree::iter::Edge;
use scraper::{Html, Node};

use crate::error::HtmlError;
use crate::tree::TreeNode;

/// Deepest element nesting accepted in a fragment.
///
/// Deeper input is rejected instead of built, so walks over the tree stay
/// within the stack.
pub const MAX_DEPTH: usize = 256;

/// Parse HTML fragments into a [`TreeNode`] tree.
pub struct HtmlParser;

impl HtmlParser {
    /// Create a new parser.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Parse an HTML fragment.
    ///
    /// The returned node is a synthetic fragment root (see
    /// [`TreeNode::fragment`]); the fragment's top-level content are its
    /// children. Input is always treated as UTF-8: doctypes are ignored and
    /// processing instructions such as an `<?xml encoding="UTF-8"?>` hint
    /// are dropped.
    ///
    /// # Errors
    ///
    /// Returns `HtmlError::TooDeep` if elements nest deeper than
    /// [`MAX_DEPTH`].
    pub fn parse(&self, html: &str) -> Result<TreeNode, HtmlError> {
        let document = Html::parse_fragment(html);
        if !document.errors.is_empty() {
            tracing::trace!(count = document.errors.len(), "Recovered from HTML parse errors");
        }

        // Fragment content lives under the synthetic <html> element.
        let Some(context) = document
            .tree
            .root()
            .children()
            .find(|node| node.value().is_element())
        else {
            return Ok(TreeNode::fragment());
        };

        let mut stack = vec![TreeNode::fragment()];
        for edge in context.traverse().skip(1) {
            match edge {
                Edge::Open(node) => match node.value() {
                    Node::Element(element) => {
                        if stack.len() > MAX_DEPTH {
                            return Err(HtmlError::TooDeep { limit: MAX_DEPTH });
                        }
                        let attrs = element
                            .attrs()
                            .map(|(name, value)| (name.to_owned(), value.to_owned()))
                            .collect();
                        stack.push(TreeNode::new(element.name()).with_attrs(attrs));
                    }
                    Node::Text(text) => append_text(&mut stack, text),
                    Node::Comment(comment) => {
                        // html5ever turns `<?...?>` into a bogus comment.
                        if comment.starts_with('?') {
                            tracing::trace!("Dropping processing instruction from HTML fragment");
                        } else {
                            attach(&mut stack, TreeNode::comment(&**comment));
                        }
                    }
                    _ => {}
                },
                Edge::Close(node) => {
                    if node.value().is_element() {
                        pop_into_parent(&mut stack);
                    }
                }
            }
        }

        while stack.len() > 1 {
            pop_into_parent(&mut stack);
        }
        Ok(stack.pop().unwrap_or_default())
    }
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Append text to the open element's text or its last child's tail.
fn append_text(stack: &mut [TreeNode], text: &str) {
    let Some(node) = stack.last_mut() else {
        return;
    };
    if let Some(last_child) = node.children.last_mut() {
        last_child.tail.push_str(text);
    } else {
        node.text.push_str(text);
    }
}

/// Add a finished node as the last child of the open element.
fn attach(stack: &mut [TreeNode], node: TreeNode) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    }
}

/// Close the innermost open element, never the fragment root.
fn pop_into_parent(stack: &mut Vec<TreeNode>) {
    if stack.len() > 1
        && let Some(node) = stack.pop()
    {
        attach(stack, node);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn parse(html: &str) -> TreeNode {
        HtmlParser::new().parse(html).unwrap()
    }

    #[test]
    fn test_parse_simple_element() {
        let tree = parse("<p>Hello</p>");

        assert!(tree.is_fragment());
        assert_eq!(tree.children.len(), 1);
        assert_eq!(tree.children[0].tag, "p");
        assert_eq!(tree.children[0].text, "Hello");
    }

    #[test]
    fn test_parse_nested_elements() {
        let tree = parse("<p><strong>Bold</strong> text</p>");

        let p_node = &tree.children[0];
        assert!(p_node.text.is_empty());
        let strong_node = &p_node.children[0];
        assert_eq!(strong_node.tag, "strong");
        assert_eq!(strong_node.text, "Bold");
        assert_eq!(strong_node.tail, " text");
    }

    #[test]
    fn test_parse_top_level_text() {
        let tree = parse("before <em>x</em> after");

        assert_eq!(tree.text, "before ");
        assert_eq!(tree.children[0].tail, " after");
    }

    #[test]
    fn test_parse_empty_input() {
        let tree = parse("");

        assert!(tree.is_fragment());
        assert!(tree.children.is_empty());
        assert!(tree.text.is_empty());
    }

    #[test]
    fn test_parse_lowercases_tags() {
        let tree = parse("<OL CLASS=\"a\"><LI>x</LI></OL>");

        let ol = &tree.children[0];
        assert_eq!(ol.tag, "ol");
        assert_eq!(ol.get_attr("class"), Some("a"));
        assert_eq!(ol.children[0].tag, "li");
    }

    #[test]
    fn test_parse_keeps_attribute_order() {
        let tree = parse(r#"<a title="t" href="/x" class="c">x</a>"#);

        let names: Vec<&str> = tree.children[0]
            .attrs
            .iter()
            .map(|(name, _)| name.as_str())
            .collect();
        assert_eq!(names, vec!["title", "href", "class"]);
    }

    #[test]
    fn test_parse_void_elements() {
        let tree = parse("<p>Before<br>After<img src=\"a.png\">End</p>");

        let p_node = &tree.children[0];
        assert_eq!(p_node.text, "Before");
        assert_eq!(p_node.children.len(), 2);
        assert_eq!(p_node.children[0].tag, "br");
        assert_eq!(p_node.children[0].tail, "After");
        assert_eq!(p_node.children[1].get_attr("src"), Some("a.png"));
        assert_eq!(p_node.children[1].tail, "End");
    }

    #[test]
    fn test_parse_implied_list_item_end() {
        let tree = parse("<ol><li>One<li>Two</ol>");

        let ol = &tree.children[0];
        assert_eq!(ol.children.len(), 2);
        assert_eq!(ol.children[0].text, "One");
        assert_eq!(ol.children[1].text, "Two");
    }

    #[test]
    fn test_parse_nested_list_items_not_closed_by_inner_list() {
        let tree = parse("<ol><li>A<ol><li>A1<li>A2</ol></li><li>B</li></ol>");

        let outer = &tree.children[0];
        assert_eq!(outer.children.len(), 2);
        let inner = &outer.children[0].children[0];
        assert_eq!(inner.tag, "ol");
        assert_eq!(inner.children.len(), 2);
        assert_eq!(outer.children[1].text, "B");
    }

    #[test]
    fn test_parse_implied_paragraph_end() {
        let tree = parse("<p>One<p>Two<div>Three</div>");

        assert_eq!(tree.children.len(), 3);
        assert_eq!(tree.children[0].text, "One");
        assert_eq!(tree.children[1].text, "Two");
        assert_eq!(tree.children[2].tag, "div");
    }

    #[test]
    fn test_parse_stray_end_tag_ignored() {
        let tree = parse("<p>text</span></p>");

        assert_eq!(tree.children.len(), 1);
        assert_eq!(tree.children[0].text, "text");
    }

    #[test]
    fn test_parse_misnested_end_tag_closes_inner() {
        let tree = parse("<div><span>a</div>b");

        let div = &tree.children[0];
        assert_eq!(div.children[0].tag, "span");
        assert_eq!(div.children[0].text, "a");
        assert_eq!(div.tail, "b");
    }

    #[test]
    fn test_parse_unclosed_elements_at_eof() {
        let tree = parse("<ol><li>open");

        assert_eq!(tree.children[0].children[0].text, "open");
    }

    #[test]
    fn test_parse_html_entities() {
        let tree = parse("<p>Hello&nbsp;World&mdash;&amp;&#65;</p>");

        assert_eq!(tree.children[0].text, "Hello\u{00a0}World\u{2014}&A");
    }

    #[test]
    fn test_parse_bare_ampersand() {
        let tree = parse("<p>Q&A</p>");

        assert_eq!(tree.children[0].text, "Q&A");
    }

    #[test]
    fn test_parse_entities_in_attributes() {
        let tree = parse(r#"<a title="&quot;x&quot; &amp; y &lt;z&gt;" href="?a=1&b=2">x</a>"#);

        let a = &tree.children[0];
        assert_eq!(a.get_attr("title"), Some("\"x\" & y <z>"));
        assert_eq!(a.get_attr("href"), Some("?a=1&b=2"));
    }

    #[test]
    fn test_parse_bare_less_than_is_text() {
        let tree = parse("<ol><li>1 < 2</li><li>B</li></ol>");

        let ol = &tree.children[0];
        assert_eq!(ol.children.len(), 2);
        assert_eq!(ol.children[0].text, "1 < 2");
        assert!(ol.children[0].children.is_empty());
    }

    #[test]
    fn test_parse_raw_text_elements() {
        let tree = parse("<script>if (a<b) {}</script><style>p > a {}</style>");

        assert_eq!(tree.children[0].tag, "script");
        assert_eq!(tree.children[0].text, "if (a<b) {}");
        assert!(tree.children[0].children.is_empty());
        assert_eq!(tree.children[1].text, "p > a {}");
    }

    #[test]
    fn test_parse_rcdata_elements() {
        let tree = parse("<textarea><b>&amp;</textarea>");

        let textarea = &tree.children[0];
        assert_eq!(textarea.text, "<b>&");
        assert!(textarea.children.is_empty());
    }

    #[test]
    fn test_parse_drops_processing_instruction() {
        let tree = parse(r#"<?xml encoding="UTF-8"?><p>x</p><?php echo 1; ?>"#);

        assert_eq!(tree.children.len(), 1);
        assert_eq!(tree.children[0].tag, "p");
    }

    #[test]
    fn test_parse_keeps_comments() {
        let tree = parse("<p>a<!-- note -->b</p>");

        let p_node = &tree.children[0];
        assert!(p_node.children[0].is_comment());
        assert_eq!(p_node.children[0].text, " note ");
        assert_eq!(p_node.text_content(), "ab");
    }

    #[test]
    fn test_parse_valueless_attribute() {
        let tree = parse("<ol reversed start=3><li>x</li></ol>");

        let ol = &tree.children[0];
        assert_eq!(ol.get_attr("reversed"), Some(""));
        assert_eq!(ol.get_attr("start"), Some("3"));
    }

    #[test]
    fn test_parse_self_closing_elements() {
        let tree = parse("<p>Before<br />After</p>");

        let p_node = &tree.children[0];
        assert_eq!(p_node.children[0].tag, "br");
        assert_eq!(p_node.children[0].tail, "After");
    }

    #[test]
    fn test_parse_nesting_at_limit() {
        let html = format!("{}x{}", "<span>".repeat(MAX_DEPTH), "</span>".repeat(MAX_DEPTH));
        let tree = parse(&html);

        let mut depth = 0;
        let mut node = &tree;
        while let Some(child) = node.children.first() {
            depth += 1;
            node = child;
        }
        assert_eq!(depth, MAX_DEPTH);
        assert_eq!(node.text, "x");
    }

    #[test]
    fn test_parse_rejects_deep_nesting() {
        let html = format!("{}{}", "<span>".repeat(20_000), "</span>".repeat(20_000));
        let err = HtmlParser::new().parse(&html).unwrap_err();

        assert!(matches!(err, HtmlError::TooDeep { limit: MAX_DEPTH }));
    }
}
