//! Lenient HTML fragment handling for hdiff.
//!
//! Diff output is an HTML *fragment*, frequently produced by tools that do
//! not guarantee well-formed markup. This crate parses such fragments into an
//! owned [`TreeNode`] tree, lets callers inspect and edit it, and serializes it
//! back without adding a document wrapper.
//!
//! - [`HtmlParser`]: browser-grade recovering parser built on `scraper`
//! - [`HtmlSerializer`]: HTML serializer (void elements, explicit end tags)
//! - [`TreeNode`]: element node with text/tail content model
//!
//! # Example
//!
//! ```
//! use hdiff_html::{HtmlParser, HtmlSerializer};
//!
//! let mut tree = HtmlParser::new().parse("<ol><li>One<li>Two</ol>").unwrap();
//! tree.for_each_element_mut("ol", &mut |ol| ol.append_class("numbered"));
//!
//! let html = HtmlSerializer::new().serialize(&tree);
//! assert_eq!(html, r#"<ol class="numbered"><li>One</li><li>Two</li></ol>"#);
//! ```

mod error;
mod parser;
mod serializer;
mod tree;

pub use error::HtmlError;
pub use parser::{HtmlParser, MAX_DEPTH};
pub use serializer::{
    HtmlSerializer, escape_attr, escape_text, is_void_element, serialize_node, write_end_tag,
    write_start_tag,
};
pub use tree::{COMMENT_TAG, FRAGMENT_TAG, TreeNode};
