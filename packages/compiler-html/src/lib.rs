//! # Blockpost HTML Compiler
//!
//! Serializes a block document into the HTML string handed to post storage.
//! Output is deterministic and follows block order; compilation cannot fail.

mod compiler;

#[cfg(test)]
mod tests;

pub use compiler::{
    compile_document, heading_anchors, CompileOptions, HeadingAnchor, TOC_EMPTY, TOC_TITLE,
};
