//! Block-aware diff rendering.
//!
//! Children of two matching nodes are compared as sequences of items (text
//! runs and elements). Unchanged items are copied, removed and added items
//! are rendered with their structure intact and their text marked, and
//! changed items of the same kind are paired and diffed again: containers
//! item by item, everything else word by word.

use hdiff_html::{
    TreeNode, escape_text, is_void_element, serialize_node, write_end_tag, write_start_tag,
};
use similar::{Algorithm, DiffOp, DiffTag, capture_diff_slices};

use super::DiffSettings;
use super::tokens::{Token, Tokenizer, is_media_element};

/// Class of deletions and insertions in otherwise unchanged content.
const DEL_CLASS: &str = "diffdel";
const INS_CLASS: &str = "diffins";
/// Class of both halves of a replacement.
const MOD_CLASS: &str = "diffmod";

/// Elements whose children are always diffed as a sequence.
const CONTAINER_ELEMENTS: &[&str] = &["article", "blockquote", "div", "dl", "ol", "section", "ul"];

/// Table structure, diffed cell by cell when table diffing is on.
const TABLE_ELEMENTS: &[&str] = &["caption", "table", "tbody", "td", "tfoot", "th", "thead", "tr"];

/// Elements of which a child turns a list item or cell into a container.
const BLOCK_ELEMENTS: &[&str] = &[
    "blockquote", "div", "dl", "figure", "h1", "h2", "h3", "h4", "h5", "h6", "hr", "ol", "p",
    "pre", "section", "table", "ul",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Deleted,
    Inserted,
}

impl Mark {
    fn tag(self) -> &'static str {
        match self {
            Self::Deleted => "del",
            Self::Inserted => "ins",
        }
    }

    fn class(self) -> &'static str {
        match self {
            Self::Deleted => DEL_CLASS,
            Self::Inserted => INS_CLASS,
        }
    }
}

/// A piece of a node's content at block level.
#[derive(Debug, Clone, Copy)]
enum Item<'a> {
    Text(&'a str),
    Element(&'a TreeNode),
}

/// Comparison key of an [`Item`].
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum ItemKey {
    Text(String),
    Element(String),
}

fn items(node: &TreeNode) -> Vec<Item<'_>> {
    let mut items = Vec::new();
    if !node.text.is_empty() {
        items.push(Item::Text(&node.text));
    }
    for child in &node.children {
        if !child.is_comment() {
            items.push(Item::Element(child));
        }
        if !child.tail.is_empty() {
            items.push(Item::Text(&child.tail));
        }
    }
    items
}

fn item_key(item: &Item<'_>) -> ItemKey {
    match item {
        Item::Text(text) => ItemKey::Text(text.split_whitespace().collect::<Vec<_>>().join(" ")),
        Item::Element(node) => ItemKey::Element(outer_html(node)),
    }
}

/// Serialized element without its tail.
fn outer_html(node: &TreeNode) -> String {
    let mut html = String::new();
    serialize_node(node, &mut html);
    let tail_len = escape_text(&node.tail).len();
    html.truncate(html.len() - tail_len);
    html
}

/// Renders the diff of two parsed fragments.
pub(crate) struct Renderer<'s> {
    settings: &'s DiffSettings,
    tokenizer: Tokenizer,
}

impl<'s> Renderer<'s> {
    pub(crate) fn new(settings: &'s DiffSettings) -> Self {
        Self {
            settings,
            tokenizer: Tokenizer::new(&settings.special_case_chars),
        }
    }

    /// Render the diff of the children of `old` and `new`.
    pub(crate) fn diff_children(&self, old: &TreeNode, new: &TreeNode, out: &mut String) {
        let old_items = items(old);
        let new_items = items(new);
        let old_keys: Vec<ItemKey> = old_items.iter().map(item_key).collect();
        let new_keys: Vec<ItemKey> = new_items.iter().map(item_key).collect();

        for op in capture_diff_slices(Algorithm::Myers, &old_keys, &new_keys) {
            let (tag, old_range, new_range) = op.as_tag_tuple();
            match tag {
                DiffTag::Equal => {
                    for item in &new_items[new_range] {
                        write_item(item, out);
                    }
                }
                DiffTag::Delete => {
                    for item in &old_items[old_range] {
                        write_marked_item(item, Mark::Deleted, out);
                    }
                }
                DiffTag::Insert => {
                    for item in &new_items[new_range] {
                        write_marked_item(item, Mark::Inserted, out);
                    }
                }
                DiffTag::Replace => {
                    self.diff_replaced(&old_items[old_range], &new_items[new_range], out);
                }
            }
        }
    }

    /// Pair up replaced items where possible, mark the rest.
    fn diff_replaced(&self, old: &[Item<'_>], new: &[Item<'_>], out: &mut String) {
        let mut cursor = 0;

        for (pos, new_item) in new.iter().enumerate() {
            match *new_item {
                Item::Element(new_node) => {
                    let matched = old
                        .get(cursor..)
                        .unwrap_or_default()
                        .iter()
                        .position(|item| {
                            matches!(item, Item::Element(old_node) if self.can_pair(old_node, new_node))
                        });

                    if let Some(offset) = matched {
                        let idx = cursor + offset;
                        for item in old.get(cursor..idx).unwrap_or_default() {
                            write_marked_item(item, Mark::Deleted, out);
                        }
                        if let Some(Item::Element(old_node)) = old.get(idx) {
                            self.diff_pair(old_node, new_node, out);
                        }
                        cursor = idx + 1;
                        continue;
                    }

                    // Show an old element that nothing later pairs with
                    // before its replacement.
                    if let Some(Item::Element(old_node)) = old.get(cursor)
                        && !new.get(pos + 1..).unwrap_or_default().iter().any(|later| {
                            matches!(later, Item::Element(n) if self.can_pair(old_node, n))
                        })
                    {
                        write_marked_item(&Item::Element(old_node), Mark::Deleted, out);
                        cursor += 1;
                    }
                    write_marked_item(new_item, Mark::Inserted, out);
                }
                Item::Text(new_text) => {
                    if let Some(Item::Text(old_text)) = old.get(cursor) {
                        self.diff_tokens(
                            &self.tokenizer.text_tokens(old_text),
                            &self.tokenizer.text_tokens(new_text),
                            out,
                        );
                        cursor += 1;
                    } else {
                        write_marked_item(new_item, Mark::Inserted, out);
                    }
                }
            }
        }

        for item in old.get(cursor..).unwrap_or_default() {
            write_marked_item(item, Mark::Deleted, out);
        }
    }

    fn is_structural(&self, tag: &str) -> bool {
        CONTAINER_ELEMENTS.contains(&tag)
            || (self.settings.use_table_diffing && TABLE_ELEMENTS.contains(&tag))
    }

    /// Whether a changed old element should be diffed against a new one.
    ///
    /// Structural elements pair on tag alone. Others also need enough words
    /// in common: at least `match_threshold` percent of the shorter text.
    fn can_pair(&self, old: &TreeNode, new: &TreeNode) -> bool {
        if old.tag != new.tag || is_void_element(&new.tag) {
            return false;
        }
        if new.tag == "table" && !self.settings.use_table_diffing {
            return false;
        }
        self.is_structural(&new.tag) || self.similar_enough(old, new)
    }

    fn similar_enough(&self, old: &TreeNode, new: &TreeNode) -> bool {
        let old_text = old.text_signature();
        let new_text = new.text_signature();
        let old_words: Vec<&str> = old_text.split_whitespace().collect();
        let new_words: Vec<&str> = new_text.split_whitespace().collect();

        let shorter = old_words.len().min(new_words.len());
        if shorter == 0 {
            return old_words.len() == new_words.len();
        }

        let common: usize = capture_diff_slices(Algorithm::Myers, &old_words, &new_words)
            .iter()
            .map(|op| match op {
                DiffOp::Equal { len, .. } => *len,
                _ => 0,
            })
            .sum();
        common * 100 >= self.settings.match_threshold as usize * shorter
    }

    fn is_container(&self, node: &TreeNode) -> bool {
        match node.tag.as_str() {
            "li" | "dd" | "td" | "th" => has_block_child(node),
            tag => self.is_structural(tag),
        }
    }

    /// Render a paired element with the new element's tags.
    fn diff_pair(&self, old: &TreeNode, new: &TreeNode, out: &mut String) {
        write_start_tag(new, out);
        if self.is_container(old) || self.is_container(new) {
            self.diff_children(old, new, out);
        } else {
            self.diff_tokens(
                &self.tokenizer.content_tokens(old),
                &self.tokenizer.content_tokens(new),
                out,
            );
        }
        write_end_tag(new, out);
    }

    /// Word-level diff of two token sequences.
    fn diff_tokens(&self, old: &[Token], new: &[Token], out: &mut String) {
        for op in capture_diff_slices(Algorithm::Myers, old, new) {
            let (tag, old_range, new_range) = op.as_tag_tuple();
            match tag {
                DiffTag::Equal => write_tokens(&new[new_range], out),
                DiffTag::Delete => {
                    write_deleted_tokens(&old[old_range], DEL_CLASS, out);
                }
                DiffTag::Insert => write_inserted_tokens(&new[new_range], INS_CLASS, out),
                DiffTag::Replace => {
                    let wrote = write_deleted_tokens(&old[old_range], MOD_CLASS, out);
                    if wrote && self.settings.insert_space_in_replace {
                        out.push(' ');
                    }
                    write_inserted_tokens(&new[new_range], MOD_CLASS, out);
                }
            }
        }
    }
}

fn has_block_child(node: &TreeNode) -> bool {
    node.children
        .iter()
        .any(|child| BLOCK_ELEMENTS.contains(&child.tag.as_str()))
}

fn write_item(item: &Item<'_>, out: &mut String) {
    match item {
        Item::Text(text) => out.push_str(&escape_text(text)),
        Item::Element(node) => out.push_str(&outer_html(node)),
    }
}

fn write_marked_item(item: &Item<'_>, mark: Mark, out: &mut String) {
    match item {
        Item::Text(text) => write_marked_text(text, mark, mark.class(), out),
        Item::Element(node) => write_marked_element(node, mark, out),
    }
}

/// Render an element that exists on one side only.
///
/// Structure is kept and text is wrapped, so a removed list item stays a
/// list item. Void elements other than media are dropped from deletions.
fn write_marked_element(node: &TreeNode, mark: Mark, out: &mut String) {
    if is_void_element(&node.tag) {
        if is_media_element(node) {
            let mut media = String::new();
            write_start_tag(node, &mut media);
            wrap(mark.tag(), mark.class(), &media, out);
        } else if mark == Mark::Inserted {
            write_start_tag(node, out);
        }
        return;
    }

    write_start_tag(node, out);
    write_marked_text(&node.text, mark, mark.class(), out);
    for child in &node.children {
        if !child.is_comment() {
            write_marked_element(child, mark, out);
        }
        write_marked_text(&child.tail, mark, mark.class(), out);
    }
    write_end_tag(node, out);
}

/// Wrap text in a marker. Deleted whitespace disappears, inserted
/// whitespace is kept unwrapped.
fn write_marked_text(text: &str, mark: Mark, class: &str, out: &mut String) {
    if text.trim().is_empty() {
        if mark == Mark::Inserted {
            out.push_str(&escape_text(text));
        }
        return;
    }
    wrap(mark.tag(), class, &escape_text(text), out);
}

fn wrap(tag: &str, class: &str, inner_html: &str, out: &mut String) {
    out.push('<');
    out.push_str(tag);
    out.push_str(" class=\"");
    out.push_str(class);
    out.push_str("\">");
    out.push_str(inner_html);
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn write_tokens(tokens: &[Token], out: &mut String) {
    for token in tokens {
        match token {
            Token::Text(text) => out.push_str(&escape_text(text)),
            Token::Open(html) | Token::Close(html) | Token::Media(html) | Token::Void(html) => {
                out.push_str(html);
            }
        }
    }
}

/// Write deleted tokens. Tags are dropped except media, which is wrapped.
///
/// Returns whether anything visible was written.
fn write_deleted_tokens(tokens: &[Token], class: &str, out: &mut String) -> bool {
    let mut wrote = false;
    let mut text = String::new();

    for token in tokens {
        match token {
            Token::Text(t) => text.push_str(t),
            Token::Media(html) => {
                flush_deleted(&mut text, class, out);
                wrap("del", class, html, out);
                wrote = true;
            }
            Token::Open(_) | Token::Close(_) | Token::Void(_) => {}
        }
    }
    wrote |= flush_deleted(&mut text, class, out);
    wrote
}

fn flush_deleted(text: &mut String, class: &str, out: &mut String) -> bool {
    let wrote = !text.trim().is_empty();
    if wrote {
        wrap("del", class, &escape_text(text), out);
    }
    text.clear();
    wrote
}

/// Write inserted tokens. Tags are kept so the new markup stays balanced.
fn write_inserted_tokens(tokens: &[Token], class: &str, out: &mut String) {
    let mut text = String::new();

    for token in tokens {
        match token {
            Token::Text(t) => text.push_str(t),
            Token::Media(html) => {
                write_marked_text(&text, Mark::Inserted, class, out);
                text.clear();
                wrap("ins", class, html, out);
            }
            Token::Open(html) | Token::Close(html) | Token::Void(html) => {
                write_marked_text(&text, Mark::Inserted, class, out);
                text.clear();
                out.push_str(html);
            }
        }
    }
    write_marked_text(&text, Mark::Inserted, class, out);
}
