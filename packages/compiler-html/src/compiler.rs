use blockpost_editor::{Block, BlockKind, Document, HeadingLevel, TableData};
use blockpost_parser::schema::{BLOCK_TYPE_ATTR, CALLOUT_BLOCK, TOC_BACKGROUND, TOC_BLOCK};
use blockpost_parser::{escape_attr, escape_text, plain_text, CalloutColor, SlugRegistry};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

pub const TOC_TITLE: &str = "Table of Contents";
pub const TOC_EMPTY: &str = "No headings found";

const TABLE_STYLE: &str = "border-collapse: collapse; width: 100%;";
const CELL_STYLE: &str = "border: 1px solid #d1d5db; padding: 8px;";
const HEADER_CELL_STYLE: &str =
    "border: 1px solid #d1d5db; padding: 8px; background-color: #f3f4f6; font-weight: 600;";

/// Options for HTML compilation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompileOptions {
    /// Put each block (and table row) on its own line
    pub pretty: bool,
    /// Indentation string
    pub indent: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            pretty: false,
            indent: "  ".to_string(),
        }
    }
}

struct Context {
    options: CompileOptions,
    depth: usize,
    buffer: String,
}

impl Context {
    fn new(options: CompileOptions) -> Self {
        Self {
            options,
            depth: 0,
            buffer: String::new(),
        }
    }

    fn add(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn add_line(&mut self, text: &str) {
        if self.options.pretty {
            self.add_indent();
        }
        self.add(text);
        if self.options.pretty {
            self.add("\n");
        }
    }

    fn add_indent(&mut self) {
        let indent = self.options.indent.clone();
        for _ in 0..self.depth {
            self.add(&indent);
        }
    }

    fn indent(&mut self) {
        self.depth += 1;
    }

    fn dedent(&mut self) {
        if self.depth > 0 {
            self.depth -= 1;
        }
    }

    fn get_output(self) -> String {
        self.buffer
    }
}

/// Anchor of one heading block, computed once per compilation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingAnchor {
    pub level: HeadingLevel,
    pub text: String,
    pub slug: String,
}

/// Anchors for every heading of `document`, in document order
pub fn heading_anchors(document: &Document) -> Vec<HeadingAnchor> {
    let mut slugs = SlugRegistry::new();
    document
        .headings()
        .map(|(level, block)| {
            let text = plain_text(block.content()).trim().to_string();
            let slug = slugs.claim(&text);
            HeadingAnchor { level, text, slug }
        })
        .collect()
}

/// Compile a block document to a single HTML string
#[instrument(skip_all, fields(blocks = document.len()))]
pub fn compile_document(document: &Document, options: CompileOptions) -> String {
    let anchors = heading_anchors(document);
    let mut ctx = Context::new(options);
    let mut next_heading = anchors.iter();

    for block in document.blocks() {
        compile_block(block, &anchors, &mut next_heading, &mut ctx);
    }

    debug!(headings = anchors.len(), "compiled document");
    ctx.get_output()
}

fn compile_block<'a>(
    block: &Block,
    anchors: &'a [HeadingAnchor],
    next_heading: &mut impl Iterator<Item = &'a HeadingAnchor>,
    ctx: &mut Context,
) {
    match &block.kind {
        BlockKind::Paragraph { content } => ctx.add_line(&format!("<p>{content}</p>")),

        BlockKind::Heading { level, content } => {
            // headings() and blocks() walk the same order
            let slug = next_heading.next().map(|a| a.slug.as_str()).unwrap_or_default();
            compile_heading(*level, content, slug, ctx)
        }

        BlockKind::Code { language, content } => ctx.add_line(&format!(
            "<pre><code class=\"language-{}\">{}</code></pre>",
            language.as_str(),
            content
        )),

        BlockKind::Image { src, caption } => compile_image(src, caption, ctx),

        BlockKind::Table(table) => compile_table(table, ctx),

        BlockKind::BulletedList { content } | BlockKind::NumberedList { content } => {
            ctx.add_line(content)
        }

        BlockKind::Callout {
            content,
            icon,
            color,
        } => compile_callout(content, icon, *color, ctx),

        BlockKind::Quote { content } => {
            ctx.add_line(&format!("<blockquote>{}</blockquote>", escape_text(content)))
        }

        BlockKind::TableOfContents => compile_toc(anchors, ctx),

        BlockKind::Separator => ctx.add_line("<hr />"),
    }
}

fn compile_heading(level: HeadingLevel, content: &str, slug: &str, ctx: &mut Context) {
    let level = level.level();
    ctx.add_line(&format!(
        "<h{level} id=\"{}\">{content}</h{level}>",
        escape_attr(slug)
    ));
}

fn compile_image(src: &str, caption: &str, ctx: &mut Context) {
    let mut html = format!(
        "<figure><img src=\"{}\" alt=\"{}\" />",
        escape_attr(src),
        escape_attr(caption)
    );
    if !caption.is_empty() {
        html.push_str(&format!("<figcaption>{}</figcaption>", escape_text(caption)));
    }
    html.push_str("</figure>");
    ctx.add_line(&html);
}

fn compile_table(table: &TableData, ctx: &mut Context) {
    ctx.add_line(&format!("<table style=\"{TABLE_STYLE}\">"));
    ctx.indent();
    for (i, row) in table.data().iter().enumerate() {
        let header = i == 0 && table.has_header();
        let (tag, style) = if header {
            ("th", HEADER_CELL_STYLE)
        } else {
            ("td", CELL_STYLE)
        };
        let cells: String = row
            .iter()
            .map(|cell| format!("<{tag} style=\"{style}\">{}</{tag}>", escape_text(cell)))
            .collect();
        ctx.add_line(&format!("<tr>{cells}</tr>"));
    }
    ctx.dedent();
    ctx.add_line("</table>");
}

fn compile_callout(content: &str, icon: &str, color: CalloutColor, ctx: &mut Context) {
    ctx.add_line(&format!(
        "<div {BLOCK_TYPE_ATTR}=\"{CALLOUT_BLOCK}\" data-color=\"{}\" style=\"display: flex; gap: 12px; padding: 16px; border-radius: 8px; border-left: 4px solid {}; background-color: {};\"><span>{}</span><div>{}</div></div>",
        color.as_str(),
        color.border(),
        color.background(),
        escape_text(icon),
        escape_text(content)
    ));
}

fn compile_toc(anchors: &[HeadingAnchor], ctx: &mut Context) {
    ctx.add_line(&format!(
        "<div {BLOCK_TYPE_ATTR}=\"{TOC_BLOCK}\" style=\"background-color: {TOC_BACKGROUND}; padding: 16px; border-radius: 8px;\">"
    ));
    ctx.indent();
    ctx.add_line(&format!("<p style=\"font-weight: 600;\">{TOC_TITLE}</p>"));
    if anchors.is_empty() {
        ctx.add_line(&format!("<p style=\"color: #6b7280;\">{TOC_EMPTY}</p>"));
    }
    for anchor in anchors {
        let indent = (anchor.level.level() as usize - 1) * 16;
        ctx.add_line(&format!(
            "<a href=\"#{}\" style=\"display: block; padding-left: {indent}px;\">{}</a>",
            escape_attr(&anchor.slug),
            escape_text(&anchor.text)
        ));
    }
    ctx.dedent();
    ctx.add_line("</div>");
}
