//! # Content Renderer
//!
//! Stored post HTML → styled virtual DOM.
//!
//! ```text
//! normalize → parse → assign heading anchors → render each top-level node
//! ```
//!
//! Nothing here fails: malformed markup is repaired by the parser, and a
//! diagram that cannot be rendered becomes an inline error panel while the
//! rest of the post renders normally.

use crate::diagram::DiagramRenderer;
use crate::vdom::VNode;
use blockpost_parser::schema::{
    style_property, BLOCK_TYPE_ATTR, CALLOUT_BLOCK, DIAGRAM_LANGUAGE, TOC_BACKGROUND, TOC_BLOCK,
};
use blockpost_parser::{normalize, parse, CalloutColor, Element, Fragment, Node, SlugRegistry};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, instrument, warn};

pub const EMPTY_CONTENT: &str = "No content available";
pub const DIAGRAM_ERROR: &str = "Mermaid render error";
pub const TOC_TITLE: &str = "Table of Contents";
pub const TOC_EMPTY: &str = "No headings found";

const DEFAULT_ICON: &str = "💡";

/// Anchor target of one rendered heading
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadingAnchor {
    pub level: u8,
    pub id: String,
    pub text: String,
}

/// What a top-level rendered node represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BlockRole {
    Heading(u8),
    Paragraph,
    Quote,
    List,
    Table,
    Figure,
    Code,
    Diagram,
    DiagramError,
    Callout(CalloutColor),
    TableOfContents,
    Separator,
    Passthrough,
    Text,
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedBlock {
    pub role: BlockRole,
    pub node: VNode,
}

impl RenderedBlock {
    fn new(role: BlockRole, node: VNode) -> Self {
        Self { role, node }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedDocument {
    pub blocks: Vec<RenderedBlock>,
    pub headings: Vec<HeadingAnchor>,
}

impl RenderedDocument {
    fn placeholder() -> Self {
        let node = VNode::element("p")
            .with_class("post-empty")
            .with_child(VNode::text(EMPTY_CONTENT));
        Self {
            blocks: vec![RenderedBlock::new(BlockRole::Placeholder, node)],
            headings: Vec::new(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self.blocks.as_slice(), [block] if block.role == BlockRole::Placeholder)
    }

    /// Entries of every table of contents on the page
    pub fn toc_entries(&self) -> &[HeadingAnchor] {
        &self.headings
    }

    /// Rendered element carrying anchor `id`
    pub fn find_anchor(&self, id: &str) -> Option<&VNode> {
        self.blocks.iter().find_map(|b| b.node.find_by_id(id))
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for block in &self.blocks {
            block.node.write_html(&mut out);
        }
        out
    }
}

/// How a `div` is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DivKind {
    Callout(CalloutColor),
    TableOfContents,
    Generic,
}

/// Classify a `div` by its `data-block-type`, falling back to the inline
/// styles written before that attribute existed
pub fn classify_div(el: &Element) -> DivKind {
    let style = el.style();
    let background = style_property(style, "background-color");

    match el.attr(BLOCK_TYPE_ATTR) {
        Some(CALLOUT_BLOCK) => {
            let color = el
                .attr("data-color")
                .and_then(CalloutColor::from_name)
                .unwrap_or_else(|| CalloutColor::from_background(background.unwrap_or("")));
            return DivKind::Callout(color);
        }
        Some(TOC_BLOCK) => return DivKind::TableOfContents,
        _ => {}
    }

    match background {
        Some(bg) if style_property(style, "border-left").is_some() => {
            DivKind::Callout(CalloutColor::from_background(bg))
        }
        Some(bg) if bg.eq_ignore_ascii_case(TOC_BACKGROUND) => DivKind::TableOfContents,
        _ => DivKind::Generic,
    }
}

fn heading_level(tag: &str) -> Option<u8> {
    match tag.as_bytes() {
        [b'h', level @ b'1'..=b'6'] => Some(level - b'0'),
        _ => None,
    }
}

/// Anchor ids for the top-level headings of `fragment`.
///
/// Existing ids are kept and reserved first, so rendering already-anchored
/// output again yields the same ids. Later headings repeating an id get a
/// suffixed one.
pub fn assign_anchors(fragment: &Fragment) -> Vec<HeadingAnchor> {
    let headings: Vec<(u8, &Element)> = fragment
        .elements()
        .filter_map(|el| heading_level(&el.tag).map(|level| (level, el)))
        .collect();

    let mut slugs = SlugRegistry::new();
    for (_, el) in &headings {
        if let Some(id) = el.attr("id").filter(|id| !id.is_empty()) {
            slugs.reserve(id);
        }
    }

    let mut kept = HashSet::new();
    headings
        .into_iter()
        .map(|(level, el)| {
            let text = el.text_content().trim().to_string();
            let id = match el.attr("id").filter(|id| !id.is_empty()) {
                Some(id) if kept.insert(id) => id.to_string(),
                Some(id) => slugs.claim(id),
                None => slugs.claim(&text),
            };
            HeadingAnchor { level, id, text }
        })
        .collect()
}

pub struct Renderer<'a> {
    diagrams: &'a dyn DiagramRenderer,
}

struct RenderState<'h> {
    headings: &'h [HeadingAnchor],
    next_heading: usize,
    diagrams: usize,
}

impl<'a> Renderer<'a> {
    pub fn new(diagrams: &'a dyn DiagramRenderer) -> Self {
        Self { diagrams }
    }

    /// Render stored post HTML
    #[instrument(skip_all, fields(bytes = html.len()))]
    pub fn render(&self, html: &str) -> RenderedDocument {
        if html.trim().is_empty() {
            return RenderedDocument::placeholder();
        }

        let normalized = normalize(html);
        let fragment = parse(&normalized);
        let headings = assign_anchors(&fragment);

        let mut state = RenderState {
            headings: &headings,
            next_heading: 0,
            diagrams: 0,
        };
        let mut blocks = Vec::new();
        for node in &fragment.nodes {
            match node {
                Node::Element(el) => blocks.push(self.render_element(el, &mut state)),
                Node::Text { content } if !content.trim().is_empty() => {
                    blocks.push(RenderedBlock::new(BlockRole::Text, VNode::text(content.clone())))
                }
                _ => {}
            }
        }

        if blocks.is_empty() {
            return RenderedDocument::placeholder();
        }

        debug!(blocks = blocks.len(), headings = headings.len(), "rendered post");
        RenderedDocument { blocks, headings }
    }

    fn render_element(&self, el: &Element, state: &mut RenderState) -> RenderedBlock {
        if let Some(level) = heading_level(&el.tag) {
            let anchor = state.headings.get(state.next_heading);
            state.next_heading += 1;
            let mut node = VNode::from_element(el)
                .with_class("post-heading")
                .with_class(&format!("post-h{level}"));
            if let Some(anchor) = anchor {
                node = node.with_attr("id", anchor.id.clone());
            }
            return RenderedBlock::new(BlockRole::Heading(level), node);
        }

        let (role, class) = match el.tag.as_str() {
            "p" => (BlockRole::Paragraph, Some("post-paragraph")),
            "blockquote" => (BlockRole::Quote, Some("post-quote")),
            "ul" | "ol" => (BlockRole::List, Some("post-list")),
            "table" => (BlockRole::Table, Some("post-table")),
            "figure" => (BlockRole::Figure, Some("post-figure")),
            "hr" => (BlockRole::Separator, Some("post-separator")),
            "pre" => return self.render_pre(el, state),
            "div" => match classify_div(el) {
                DivKind::Callout(color) => return render_callout(el, color),
                DivKind::TableOfContents => return render_toc(state.headings),
                DivKind::Generic => (BlockRole::Passthrough, None),
            },
            _ => (BlockRole::Passthrough, None),
        };

        let node = self.render_nested(el, state);
        match class {
            Some(class) => RenderedBlock::new(role, node.with_class(class)),
            None => RenderedBlock::new(role, node),
        }
    }

    fn render_pre(&self, el: &Element, state: &mut RenderState) -> RenderedBlock {
        if let Some(source) = diagram_source(el) {
            return self.render_diagram(source, state);
        }

        let language = el.find("code").and_then(code_language).unwrap_or_default();
        let mut node = VNode::from_element(el).with_class("post-code");
        if !language.is_empty() {
            node = node.with_attr("data-language", language);
        }
        RenderedBlock::new(BlockRole::Code, node)
    }

    fn render_diagram(&self, source: String, state: &mut RenderState) -> RenderedBlock {
        let unique_id = format!("diagram-{}", state.diagrams);
        state.diagrams += 1;
        match self.diagrams.render(&unique_id, source.trim()) {
            Ok(diagram) => RenderedBlock::new(
                BlockRole::Diagram,
                VNode::element("div")
                    .with_class("post-diagram")
                    .with_attr("data-diagram", unique_id)
                    .with_child(VNode::raw(diagram.svg)),
            ),
            Err(err) => {
                warn!(diagram = %unique_id, error = %err, "diagram render failed");
                RenderedBlock::new(
                    BlockRole::DiagramError,
                    VNode::error(DIAGRAM_ERROR, Some(source)),
                )
            }
        }
    }

    /// Convert `el` unchanged except for diagram sources found anywhere below it
    fn render_nested(&self, el: &Element, state: &mut RenderState) -> VNode {
        let children = el
            .children
            .iter()
            .filter_map(|child| match child {
                Node::Element(child) => Some(match diagram_source(child) {
                    Some(source) => self.render_diagram(source, state).node,
                    None => self.render_nested(child, state),
                }),
                other => VNode::from_node(other),
            })
            .collect();
        VNode::shallow(el).with_children(children)
    }
}

fn code_language(code: &Element) -> Option<String> {
    code.classes()
        .find_map(|class| class.strip_prefix("language-"))
        .map(str::to_string)
}

/// Source of a `pre > code.language-mermaid` or bare `code.language-mermaid`
fn diagram_source(el: &Element) -> Option<String> {
    let code = match el.tag.as_str() {
        "pre" => el.find("code")?,
        "code" => el,
        _ => return None,
    };
    (code_language(code)? == DIAGRAM_LANGUAGE).then(|| code.text_content())
}

fn render_callout(el: &Element, color: CalloutColor) -> RenderedBlock {
    let icon = el
        .find("span")
        .map(|span| span.text_content())
        .filter(|icon| !icon.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ICON.to_string());
    let body = match el.child_elements().find(|child| child.tag == "div") {
        Some(content) => VNode::convert_children(content),
        None => el
            .children
            .iter()
            .filter(|node| node.as_element().map_or(true, |child| child.tag != "span"))
            .filter_map(VNode::from_node)
            .collect(),
    };

    let node = VNode::element("div")
        .with_class("post-callout")
        .with_class(&format!("post-callout-{}", color.as_str()))
        .with_attr(BLOCK_TYPE_ATTR, CALLOUT_BLOCK)
        .with_child(
            VNode::element("div")
                .with_class("post-callout-icon")
                .with_child(VNode::text(icon)),
        )
        .with_child(
            VNode::element("div")
                .with_class("post-callout-body")
                .with_children(body),
        );
    RenderedBlock::new(BlockRole::Callout(color), node)
}

/// Table of contents rebuilt from the page's headings
fn render_toc(headings: &[HeadingAnchor]) -> RenderedBlock {
    let title = VNode::element("div")
        .with_class("post-toc-title")
        .with_child(VNode::text(TOC_TITLE));

    let entries: Vec<VNode> = if headings.is_empty() {
        vec![VNode::element("p")
            .with_class("post-toc-empty")
            .with_child(VNode::text(TOC_EMPTY))]
    } else {
        headings
            .iter()
            .map(|anchor| {
                VNode::element("a")
                    .with_attr("href", format!("#{}", anchor.id))
                    .with_class("post-toc-entry")
                    .with_class(&format!("post-toc-level-{}", anchor.level))
                    .with_attr("data-anchor", anchor.id.clone())
                    .with_child(VNode::text(anchor.text.clone()))
            })
            .collect()
    };

    let node = VNode::element("nav")
        .with_class("post-toc")
        .with_attr(BLOCK_TYPE_ATTR, TOC_BLOCK)
        .with_child(title)
        .with_child(
            VNode::element("div")
                .with_class("post-toc-entries")
                .with_children(entries),
        );
    RenderedBlock::new(BlockRole::TableOfContents, node)
}
