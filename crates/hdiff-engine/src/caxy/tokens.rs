//! Inline tokens for word-level diffing.

use hdiff_html::{TreeNode, is_void_element, write_start_tag};

/// Void elements that carry content of their own and are diffed as such.
const MEDIA_ELEMENTS: &[&str] = &["img"];

/// One unit of inline content.
///
/// Tag tokens hold serialized markup; text tokens hold unescaped text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum Token {
    Text(String),
    Open(String),
    Close(String),
    /// Media element such as `<img>`, shown as content when changed.
    Media(String),
    /// Other void element such as `<br>`.
    Void(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Space,
    Special,
    Word,
}

/// Splits text into words, whitespace runs and special characters.
#[derive(Debug, Clone)]
pub(crate) struct Tokenizer {
    special: Vec<char>,
}

impl Tokenizer {
    pub(crate) fn new(special: &[char]) -> Self {
        Self {
            special: special.to_vec(),
        }
    }

    fn classify(&self, ch: char) -> CharClass {
        if ch.is_whitespace() {
            CharClass::Space
        } else if self.special.contains(&ch) {
            CharClass::Special
        } else {
            CharClass::Word
        }
    }

    /// Split `text` into tokens. Concatenating the tokens yields `text`.
    pub(crate) fn split<'t>(&self, text: &'t str) -> Vec<&'t str> {
        let mut tokens = Vec::new();
        let mut start = 0;
        let mut current: Option<CharClass> = None;

        for (idx, ch) in text.char_indices() {
            let class = self.classify(ch);
            if let Some(prev) = current
                && (prev != class || class == CharClass::Special)
            {
                tokens.push(&text[start..idx]);
                start = idx;
            }
            current = Some(class);
        }
        if start < text.len() {
            tokens.push(&text[start..]);
        }
        tokens
    }

    /// Text tokens for a plain string.
    pub(crate) fn text_tokens(&self, text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        self.push_text(text, &mut tokens);
        tokens
    }

    /// Tokens for the content of `node`: its text and descendants, not the
    /// node's own tags.
    pub(crate) fn content_tokens(&self, node: &TreeNode) -> Vec<Token> {
        let mut tokens = Vec::new();
        self.push_content(node, &mut tokens);
        tokens
    }

    fn push_content(&self, node: &TreeNode, tokens: &mut Vec<Token>) {
        self.push_text(&node.text, tokens);
        for child in &node.children {
            if !child.is_comment() {
                self.push_element(child, tokens);
            }
            self.push_text(&child.tail, tokens);
        }
    }

    fn push_element(&self, node: &TreeNode, tokens: &mut Vec<Token>) {
        let mut start = String::new();
        write_start_tag(node, &mut start);

        if is_void_element(&node.tag) {
            if MEDIA_ELEMENTS.contains(&node.tag.as_str()) {
                tokens.push(Token::Media(start));
            } else {
                tokens.push(Token::Void(start));
            }
            return;
        }

        tokens.push(Token::Open(start));
        self.push_content(node, tokens);
        tokens.push(Token::Close(format!("</{}>", node.tag)));
    }

    fn push_text(&self, text: &str, tokens: &mut Vec<Token>) {
        tokens.extend(
            self.split(text)
                .into_iter()
                .map(|token| Token::Text(token.to_owned())),
        );
    }
}

/// Whether `node` is a media element.
pub(crate) fn is_media_element(node: &TreeNode) -> bool {
    MEDIA_ELEMENTS.contains(&node.tag.as_str())
}

#[cfg(test)]
mod tests {
    use hdiff_html::HtmlParser;
    use pretty_assertions::assert_eq;

    use super::*;

    fn default_tokenizer() -> Tokenizer {
        Tokenizer::new(&['.', ',', '(', ')', '\'', ':', '-', '_'])
    }

    #[test]
    fn test_split_words_and_whitespace() {
        let tokens = default_tokenizer().split("Hello  big\nworld");
        assert_eq!(tokens, vec!["Hello", "  ", "big", "\n", "world"]);
    }

    #[test]
    fn test_split_special_chars_stand_alone() {
        let tokens = default_tokenizer().split("end.) (x-y's");
        assert_eq!(
            tokens,
            vec!["end", ".", ")", " ", "(", "x", "-", "y", "'", "s"]
        );
    }

    #[test]
    fn test_split_without_special_chars() {
        let tokens = Tokenizer::new(&[]).split("a-b, c");
        assert_eq!(tokens, vec!["a-b,", " ", "c"]);
    }

    #[test]
    fn test_split_empty_and_unicode() {
        let tokenizer = default_tokenizer();
        assert!(tokenizer.split("").is_empty());
        assert_eq!(tokenizer.split("Grüße,✓"), vec!["Grüße", ",", "✓"]);
    }

    #[test]
    fn test_content_tokens() {
        let tree = HtmlParser::new()
            .parse(r#"<p>Go <a href="/x">home</a><br><img src="i.png"></p>"#)
            .unwrap();
        let tokens = default_tokenizer().content_tokens(&tree.children[0]);

        assert_eq!(
            tokens,
            vec![
                Token::Text("Go".to_owned()),
                Token::Text(" ".to_owned()),
                Token::Open(r#"<a href="/x">"#.to_owned()),
                Token::Text("home".to_owned()),
                Token::Close("</a>".to_owned()),
                Token::Void("<br>".to_owned()),
                Token::Media(r#"<img src="i.png">"#.to_owned()),
            ]
        );
    }
}
