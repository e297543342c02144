//! # Blockpost Renderer
//!
//! Turns stored post HTML back into a styled virtual DOM: normalizes legacy
//! encodings, repairs malformed markup, anchors headings, rebuilds tables of
//! contents and hands mermaid blocks to a diagram renderer.
//!
//! The renderer only knows the HTML conventions in `blockpost_parser::schema`;
//! it never sees the editor's block model.

pub mod diagram;
pub mod navigation;
pub mod render;
pub mod vdom;


pub use diagram::{ClientSideDiagrams, Diagram, DiagramError, DiagramRenderer, NoDiagrams};
pub use navigation::{DocumentViewport, NavigationOutcome, TocNavigator, Viewport};
pub use render::{
    assign_anchors, classify_div, BlockRole, DivKind, HeadingAnchor, RenderedBlock,
    RenderedDocument, Renderer, DIAGRAM_ERROR, EMPTY_CONTENT,
};
pub use vdom::VNode;
