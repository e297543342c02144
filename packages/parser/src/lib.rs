//! # Blockpost Parser
//!
//! Reads stored post HTML back into a tree. The parser is tolerant: stored
//! content comes from a browser editor and is not guaranteed to be well
//! formed, so it repairs instead of failing and reports each repair.

pub mod ast;
pub mod entities;
pub mod error;
pub mod normalize;
pub mod parser;
pub mod schema;
pub mod slug;
pub mod tokenizer;


pub use ast::{Attribute, Element, Fragment, Node, Span};
pub use entities::{decode_entities, escape_attr, escape_text};
pub use error::{ParseError, ParseErrors, ParseResult};
pub use normalize::normalize;
pub use parser::{parse, parse_with_diagnostics, Parser};
pub use schema::CalloutColor;
pub use slug::{slugify, SlugRegistry};
pub use tokenizer::{tokenize, Token};

#[cfg(feature = "pretty-errors")]
pub use error::format_errors;

/// Plain text of an HTML fragment with tags removed and entities decoded
pub fn plain_text(html: &str) -> String {
    parse(html).text_content()
}
