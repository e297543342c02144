//! Diagram rendering collaborator.
//!
//! Code blocks tagged `language-mermaid` are handed to a [`DiagramRenderer`].
//! A failure only affects that block.

use blockpost_parser::escape_text;
use thiserror::Error;

/// Rendered diagram markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagram {
    pub svg: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiagramError {
    #[error("Syntax error in diagram: {0}")]
    Syntax(String),

    #[error("No diagram renderer available")]
    Unavailable,

    #[error("Diagram render failed: {0}")]
    Failed(String),
}

pub trait DiagramRenderer {
    /// Render `source`; `unique_id` is distinct for every diagram on a page
    fn render(&self, unique_id: &str, source: &str) -> Result<Diagram, DiagramError>;
}

impl<F> DiagramRenderer for F
where
    F: Fn(&str, &str) -> Result<Diagram, DiagramError>,
{
    fn render(&self, unique_id: &str, source: &str) -> Result<Diagram, DiagramError> {
        self(unique_id, source)
    }
}

/// Renderer for hosts without a diagram engine; every diagram fails
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDiagrams;

impl DiagramRenderer for NoDiagrams {
    fn render(&self, _unique_id: &str, _source: &str) -> Result<Diagram, DiagramError> {
        Err(DiagramError::Unavailable)
    }
}

/// Leaves diagrams to a client-side script: emits `<pre class="mermaid">`
#[derive(Debug, Default, Clone, Copy)]
pub struct ClientSideDiagrams;

impl DiagramRenderer for ClientSideDiagrams {
    fn render(&self, unique_id: &str, source: &str) -> Result<Diagram, DiagramError> {
        if source.trim().is_empty() {
            return Err(DiagramError::Syntax("empty diagram".to_string()));
        }
        Ok(Diagram {
            svg: format!(
                "<pre class=\"mermaid\" id=\"{unique_id}\">{}</pre>",
                escape_text(source)
            ),
        })
    }
}
