//! Tree node representation for HTML fragments.

/// Tag of the synthetic node that holds a parsed fragment.
pub const FRAGMENT_TAG: &str = "#fragment";

/// Tag used for comment nodes. The comment body is stored in `text`.
pub const COMMENT_TAG: &str = "!--";

/// Node in a parsed HTML tree.
///
/// Text follows the `ElementTree` model: `text` is the content before the first
/// child, `tail` is the content after this node's end tag and before the next
/// sibling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeNode {
    /// Lower-cased element tag name.
    pub tag: String,
    /// Direct text content.
    pub text: String,
    /// Text after the element.
    pub tail: String,
    /// Attributes in source order.
    pub attrs: Vec<(String, String)>,
    /// Child nodes.
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Create a new tree node with the given tag.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Create an empty fragment root.
    #[must_use]
    pub fn fragment() -> Self {
        Self::new(FRAGMENT_TAG)
    }

    /// Create a comment node.
    #[must_use]
    pub fn comment(body: impl Into<String>) -> Self {
        Self::new(COMMENT_TAG).with_text(body)
    }

    /// Set text content.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set tail content.
    #[must_use]
    pub fn with_tail(mut self, tail: impl Into<String>) -> Self {
        self.tail = tail.into();
        self
    }

    /// Set attributes.
    #[must_use]
    pub fn with_attrs(mut self, attrs: Vec<(String, String)>) -> Self {
        self.attrs = attrs;
        self
    }

    /// Add a single attribute.
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Set children.
    #[must_use]
    pub fn with_children(mut self, children: Vec<TreeNode>) -> Self {
        self.children = children;
        self
    }

    /// Whether this node is a comment.
    #[must_use]
    pub fn is_comment(&self) -> bool {
        self.tag == COMMENT_TAG
    }

    /// Whether this node is the synthetic fragment root.
    #[must_use]
    pub fn is_fragment(&self) -> bool {
        self.tag == FRAGMENT_TAG
    }

    /// Get an attribute value.
    #[must_use]
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(slot) = self.attrs.iter_mut().find(|(key, _)| *key == name) {
            slot.1 = value;
        } else {
            self.attrs.push((name, value));
        }
    }

    /// Remove an attribute, returning its value.
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let idx = self.attrs.iter().position(|(key, _)| key == name)?;
        Some(self.attrs.remove(idx).1)
    }

    /// Append a token to the `class` attribute, keeping existing classes.
    pub fn append_class(&mut self, token: &str) {
        let classes = match self.get_attr("class") {
            Some(existing) if !existing.is_empty() => format!("{existing} {token}"),
            _ => token.to_owned(),
        };
        self.set_attr("class", classes);
    }

    /// Text content of this node and all descendants, excluding the tail.
    ///
    /// Comments do not contribute.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if self.is_comment() {
            return;
        }
        out.push_str(&self.text);
        for child in &self.children {
            child.collect_text(out);
            out.push_str(&child.tail);
        }
    }

    /// Whitespace-normalized text content used for similarity matching.
    #[must_use]
    pub fn text_signature(&self) -> String {
        self.text_content()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// All descendant elements with the given tag, in document order.
    ///
    /// The node itself is not included.
    #[must_use]
    pub fn descendants(&self, tag: &str) -> Vec<&TreeNode> {
        let mut found = Vec::new();
        let mut pending: Vec<&TreeNode> = self.children.iter().rev().collect();
        while let Some(node) = pending.pop() {
            if node.tag == tag {
                found.push(node);
            }
            pending.extend(node.children.iter().rev());
        }
        found
    }

    /// Visit every element with the given tag in document order.
    ///
    /// An element is visited before its descendants, so a callback that only
    /// edits attributes sees nested matches afterwards in their own right.
    pub fn for_each_element_mut<F>(&mut self, tag: &str, f: &mut F)
    where
        F: FnMut(&mut TreeNode),
    {
        let mut pending: Vec<&mut TreeNode> = vec![self];
        while let Some(node) = pending.pop() {
            if node.tag == tag {
                f(node);
            }
            pending.extend(node.children.iter_mut().rev());
        }
    }

    /// Remove the child at `idx` together with its content.
    ///
    /// The child's tail is kept in the text flow of this node.
    pub fn remove_child(&mut self, idx: usize) -> TreeNode {
        let mut child = self.children.remove(idx);
        let tail = std::mem::take(&mut child.tail);
        self.push_text_at(idx, &tail);
        child
    }

    /// Replace the child at `idx` with its own children.
    ///
    /// Text of the unwrapped element stays where it was in the flow.
    pub fn unwrap_child(&mut self, idx: usize) {
        let mut child = self.children.remove(idx);
        let text = std::mem::take(&mut child.text);
        let tail = std::mem::take(&mut child.tail);
        let grandchildren = std::mem::take(&mut child.children);
        let count = grandchildren.len();

        self.push_text_at(idx, &text);
        self.children.splice(idx..idx, grandchildren);
        self.push_text_at(idx + count, &tail);
    }

    /// Append text to the flow position right before child `idx`.
    fn push_text_at(&mut self, idx: usize, text: &str) {
        if text.is_empty() {
            return;
        }
        match idx.checked_sub(1).and_then(|prev| self.children.get_mut(prev)) {
            Some(prev) => prev.tail.push_str(text),
            None => self.text.push_str(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_content_with_children() {
        let strong = TreeNode::new("strong").with_text("Bold").with_tail(" text");
        let node = TreeNode::new("p")
            .with_text("A ")
            .with_children(vec![strong])
            .with_tail(" ignored");
        assert_eq!(node.text_content(), "A Bold text");
    }

    #[test]
    fn test_text_content_skips_comments() {
        let comment = TreeNode::comment("hidden").with_tail("after");
        let node = TreeNode::new("li").with_text("before ").with_children(vec![comment]);
        assert_eq!(node.text_content(), "before after");
    }

    #[test]
    fn test_text_signature_normalizes_whitespace() {
        let node = TreeNode::new("p").with_text("  Hello \n\t World ");
        assert_eq!(node.text_signature(), "Hello World");
    }

    #[test]
    fn test_append_class_without_existing() {
        let mut node = TreeNode::new("ol");
        node.append_class("diff-list");
        assert_eq!(node.get_attr("class"), Some("diff-list"));
    }

    #[test]
    fn test_append_class_keeps_existing() {
        let mut node = TreeNode::new("li").with_attr("class", "first");
        node.append_class("normal");
        assert_eq!(node.get_attr("class"), Some("first normal"));
    }

    #[test]
    fn test_append_class_empty_attribute() {
        let mut node = TreeNode::new("li").with_attr("class", "");
        node.append_class("removed");
        assert_eq!(node.get_attr("class"), Some("removed"));
    }

    #[test]
    fn test_set_attr_keeps_order() {
        let mut node = TreeNode::new("a")
            .with_attr("href", "#")
            .with_attr("class", "x");
        node.set_attr("href", "/page");
        assert_eq!(
            node.attrs,
            vec![
                ("href".to_owned(), "/page".to_owned()),
                ("class".to_owned(), "x".to_owned()),
            ]
        );
    }

    #[test]
    fn test_descendants_document_order() {
        let inner = TreeNode::new("ol").with_children(vec![TreeNode::new("li").with_text("b")]);
        let outer = TreeNode::new("ol").with_children(vec![
            TreeNode::new("li").with_text("a").with_children(vec![inner]),
        ]);
        let root = TreeNode::fragment().with_children(vec![outer]);

        let lists = root.descendants("ol");
        assert_eq!(lists.len(), 2);
        assert_eq!(lists[0].text_content(), "ab");
        assert_eq!(lists[1].text_content(), "b");
    }

    #[test]
    fn test_for_each_element_mut_document_order() {
        let inner = TreeNode::new("ol").with_attr("id", "2");
        let outer = TreeNode::new("ol")
            .with_attr("id", "1")
            .with_children(vec![TreeNode::new("li").with_children(vec![inner])]);
        let last = TreeNode::new("ol").with_attr("id", "3");
        let mut root = TreeNode::fragment().with_children(vec![outer, last]);

        let mut seen = Vec::new();
        root.for_each_element_mut("ol", &mut |ol| {
            seen.push(ol.get_attr("id").unwrap_or_default().to_owned());
            ol.append_class("seen");
        });

        assert_eq!(seen, vec!["1", "2", "3"]);
        assert_eq!(root.descendants("ol")[1].get_attr("class"), Some("seen"));
    }

    #[test]
    fn test_walks_handle_deep_trees() {
        let mut node = TreeNode::new("ol");
        for _ in 0..10_000 {
            node = TreeNode::new("span").with_children(vec![node]);
        }
        let mut root = TreeNode::fragment().with_children(vec![node]);

        assert_eq!(root.descendants("ol").len(), 1);
        let mut count = 0;
        root.for_each_element_mut("span", &mut |_| count += 1);
        assert_eq!(count, 10_000);

        // Unnest before drop, which recurses.
        let mut pending = std::mem::take(&mut root.children);
        while let Some(mut next) = pending.pop() {
            pending.append(&mut next.children);
        }
    }

    #[test]
    fn test_remove_child_keeps_tail() {
        let script = TreeNode::new("script").with_text("x()").with_tail(" world");
        let mut p = TreeNode::new("p")
            .with_text("hello")
            .with_children(vec![script]);
        p.remove_child(0);
        assert_eq!(p.text, "hello world");
        assert!(p.children.is_empty());
    }

    #[test]
    fn test_unwrap_child_keeps_flow() {
        let em = TreeNode::new("em").with_text("inner").with_tail(" tail");
        let font = TreeNode::new("font")
            .with_text("a ")
            .with_children(vec![em])
            .with_tail(" b");
        let mut p = TreeNode::new("p")
            .with_text("start ")
            .with_children(vec![font]);

        p.unwrap_child(0);

        assert_eq!(p.text, "start a ");
        assert_eq!(p.children.len(), 1);
        assert_eq!(p.children[0].tag, "em");
        assert_eq!(p.children[0].tail, " tail b");
        assert_eq!(p.text_content(), "start a inner tail b");
    }

    #[test]
    fn test_unwrap_empty_child_moves_text_to_previous_tail() {
        let first = TreeNode::new("br").with_tail("x");
        let span = TreeNode::new("span").with_text("y").with_tail("z");
        let mut p = TreeNode::new("p").with_children(vec![first, span]);

        p.unwrap_child(1);

        assert_eq!(p.children.len(), 1);
        assert_eq!(p.children[0].tail, "xyz");
    }
}
