//! # Block Model
//!
//! A post is an ordered list of typed blocks. Each block has an immutable id
//! and a kind-specific payload. Rich-text payloads (paragraphs, headings,
//! lists) hold HTML fragments; everything else holds plain text.

use blockpost_parser::{escape_text, plain_text};
pub use blockpost_parser::CalloutColor;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque, immutable block identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Mints `{crc32(key)}-{n}` ids for the blocks of one document
#[derive(Debug, Clone)]
pub(crate) struct BlockIds {
    prefix: String,
    minted: u32,
}

impl BlockIds {
    pub(crate) fn for_document(key: &str) -> Self {
        Self {
            prefix: format!("{:08x}", crc32fast::hash(key.as_bytes())),
            minted: 0,
        }
    }

    pub(crate) fn mint(&mut self) -> BlockId {
        self.minted += 1;
        BlockId(format!("{}-{}", self.prefix, self.minted))
    }
}

/// Payload-free block discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlockType {
    Paragraph,
    Heading1,
    Heading2,
    Heading3,
    Code,
    Image,
    Table,
    BulletedList,
    NumberedList,
    Callout,
    Quote,
    TableOfContents,
    Separator,
}

impl BlockType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Paragraph => "paragraph",
            BlockType::Heading1 => "heading1",
            BlockType::Heading2 => "heading2",
            BlockType::Heading3 => "heading3",
            BlockType::Code => "code",
            BlockType::Image => "image",
            BlockType::Table => "table",
            BlockType::BulletedList => "bulletedList",
            BlockType::NumberedList => "numberedList",
            BlockType::Callout => "callout",
            BlockType::Quote => "quote",
            BlockType::TableOfContents => "tableOfContents",
            BlockType::Separator => "separator",
        }
    }

    pub fn heading_level(&self) -> Option<HeadingLevel> {
        match self {
            BlockType::Heading1 => Some(HeadingLevel::H1),
            BlockType::Heading2 => Some(HeadingLevel::H2),
            BlockType::Heading3 => Some(HeadingLevel::H3),
            _ => None,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, BlockType::BulletedList | BlockType::NumberedList)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    pub fn level(&self) -> u8 {
        match self {
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
        }
    }

    pub fn block_type(&self) -> BlockType {
        match self {
            HeadingLevel::H1 => BlockType::Heading1,
            HeadingLevel::H2 => BlockType::Heading2,
            HeadingLevel::H3 => BlockType::Heading3,
        }
    }
}

impl TryFrom<u8> for HeadingLevel {
    type Error = String;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            1 => Ok(HeadingLevel::H1),
            2 => Ok(HeadingLevel::H2),
            3 => Ok(HeadingLevel::H3),
            other => Err(format!("heading level must be 1-3, got {other}")),
        }
    }
}

impl From<HeadingLevel> for u8 {
    fn from(level: HeadingLevel) -> Self {
        level.level()
    }
}

/// Languages offered for code blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeLanguage {
    #[default]
    Javascript,
    Python,
    Java,
    Cpp,
    Csharp,
    Go,
    Rust,
    Typescript,
    Php,
    Ruby,
    Swift,
    Kotlin,
    Sql,
    Html,
    Css,
    Bash,
    Json,
    Yaml,
    Markdown,
    Mermaid,
    Plaintext,
}

impl CodeLanguage {
    pub const ALL: [CodeLanguage; 21] = [
        CodeLanguage::Javascript,
        CodeLanguage::Python,
        CodeLanguage::Java,
        CodeLanguage::Cpp,
        CodeLanguage::Csharp,
        CodeLanguage::Go,
        CodeLanguage::Rust,
        CodeLanguage::Typescript,
        CodeLanguage::Php,
        CodeLanguage::Ruby,
        CodeLanguage::Swift,
        CodeLanguage::Kotlin,
        CodeLanguage::Sql,
        CodeLanguage::Html,
        CodeLanguage::Css,
        CodeLanguage::Bash,
        CodeLanguage::Json,
        CodeLanguage::Yaml,
        CodeLanguage::Markdown,
        CodeLanguage::Mermaid,
        CodeLanguage::Plaintext,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CodeLanguage::Javascript => "javascript",
            CodeLanguage::Python => "python",
            CodeLanguage::Java => "java",
            CodeLanguage::Cpp => "cpp",
            CodeLanguage::Csharp => "csharp",
            CodeLanguage::Go => "go",
            CodeLanguage::Rust => "rust",
            CodeLanguage::Typescript => "typescript",
            CodeLanguage::Php => "php",
            CodeLanguage::Ruby => "ruby",
            CodeLanguage::Swift => "swift",
            CodeLanguage::Kotlin => "kotlin",
            CodeLanguage::Sql => "sql",
            CodeLanguage::Html => "html",
            CodeLanguage::Css => "css",
            CodeLanguage::Bash => "bash",
            CodeLanguage::Json => "json",
            CodeLanguage::Yaml => "yaml",
            CodeLanguage::Markdown => "markdown",
            CodeLanguage::Mermaid => "mermaid",
            CodeLanguage::Plaintext => "plaintext",
        }
    }
}

impl FromStr for CodeLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CodeLanguage::ALL
            .into_iter()
            .find(|lang| lang.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown code language: {s}"))
    }
}

pub const DEFAULT_CALLOUT_ICON: &str = "💡";
pub const DEFAULT_TABLE_SIZE: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTable {
    rows: usize,
    cols: usize,
    data: Vec<Vec<String>>,
    has_header: bool,
}

/// Table grid. `data` always has `rows` rows of `cols` cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTable", into = "RawTable")]
pub struct TableData {
    rows: usize,
    cols: usize,
    data: Vec<Vec<String>>,
    has_header: bool,
}

impl TryFrom<RawTable> for TableData {
    type Error = String;

    fn try_from(raw: RawTable) -> Result<Self, Self::Error> {
        if raw.rows == 0 || raw.cols == 0 {
            return Err("table must have at least one row and one column".to_string());
        }
        if raw.data.len() != raw.rows || raw.data.iter().any(|row| row.len() != raw.cols) {
            return Err(format!(
                "table data does not match {}x{} dimensions",
                raw.rows, raw.cols
            ));
        }
        Ok(Self {
            rows: raw.rows,
            cols: raw.cols,
            data: raw.data,
            has_header: raw.has_header,
        })
    }
}

impl From<TableData> for RawTable {
    fn from(table: TableData) -> Self {
        Self {
            rows: table.rows,
            cols: table.cols,
            data: table.data,
            has_header: table.has_header,
        }
    }
}

impl Default for TableData {
    fn default() -> Self {
        Self::new(DEFAULT_TABLE_SIZE, DEFAULT_TABLE_SIZE)
    }
}

impl TableData {
    /// Empty grid with a header row; dimensions are raised to at least 1
    pub fn new(rows: usize, cols: usize) -> Self {
        let rows = rows.max(1);
        let cols = cols.max(1);
        Self {
            rows,
            cols,
            data: vec![vec![String::new(); cols]; rows],
            has_header: true,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn has_header(&self) -> bool {
        self.has_header
    }

    pub fn data(&self) -> &[Vec<String>] {
        &self.data
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.data.get(row)?.get(col).map(String::as_str)
    }

    pub fn set_cell(&mut self, row: usize, col: usize, value: impl Into<String>) -> bool {
        match self.data.get_mut(row).and_then(|r| r.get_mut(col)) {
            Some(cell) => {
                *cell = value.into();
                true
            }
            None => false,
        }
    }

    pub fn add_row(&mut self) {
        self.data.push(vec![String::new(); self.cols]);
        self.rows += 1;
    }

    pub fn add_column(&mut self) {
        for row in &mut self.data {
            row.push(String::new());
        }
        self.cols += 1;
    }

    /// Refused for the last row or an out-of-range index
    pub fn delete_row(&mut self, row: usize) -> bool {
        if self.rows <= 1 || row >= self.rows {
            return false;
        }
        self.data.remove(row);
        self.rows -= 1;
        true
    }

    /// Refused for the last column or an out-of-range index
    pub fn delete_column(&mut self, col: usize) -> bool {
        if self.cols <= 1 || col >= self.cols {
            return false;
        }
        for row in &mut self.data {
            row.remove(col);
        }
        self.cols -= 1;
        true
    }

    pub fn toggle_header(&mut self) {
        self.has_header = !self.has_header;
    }

    /// Tab-separated rows, one line per row
    pub fn to_tsv(&self) -> String {
        self.data
            .iter()
            .map(|row| row.join("\t"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn is_blank(&self) -> bool {
        self.data.iter().flatten().all(|cell| cell.trim().is_empty())
    }
}

/// Kind-specific block payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BlockKind {
    Paragraph {
        content: String,
    },
    Heading {
        level: HeadingLevel,
        content: String,
    },
    /// `content` is raw source text, not HTML
    Code {
        language: CodeLanguage,
        content: String,
    },
    Image {
        src: String,
        #[serde(default)]
        caption: String,
    },
    Table(TableData),
    /// `content` is a complete `<ul>` fragment
    BulletedList {
        content: String,
    },
    /// `content` is a complete `<ol>` fragment
    NumberedList {
        content: String,
    },
    Callout {
        content: String,
        icon: String,
        color: CalloutColor,
    },
    Quote {
        content: String,
    },
    TableOfContents,
    Separator,
}

impl BlockKind {
    /// Payload for a new block of `block_type` seeded with `content`.
    ///
    /// Images take `content` as their `src`; lists accept either a complete
    /// list fragment or plain lines to wrap.
    pub fn with_content(block_type: BlockType, content: &str) -> Self {
        let content = content.to_string();
        match block_type {
            BlockType::Paragraph => BlockKind::Paragraph { content },
            BlockType::Heading1 | BlockType::Heading2 | BlockType::Heading3 => {
                BlockKind::Heading {
                    level: block_type.heading_level().unwrap_or(HeadingLevel::H1),
                    content,
                }
            }
            BlockType::Code => BlockKind::Code {
                language: CodeLanguage::default(),
                content,
            },
            BlockType::Image => BlockKind::Image {
                src: content,
                caption: String::new(),
            },
            BlockType::Table => BlockKind::Table(TableData::default()),
            BlockType::BulletedList => BlockKind::BulletedList {
                content: list_fragment("ul", &content),
            },
            BlockType::NumberedList => BlockKind::NumberedList {
                content: list_fragment("ol", &content),
            },
            BlockType::Callout => BlockKind::Callout {
                content,
                icon: DEFAULT_CALLOUT_ICON.to_string(),
                color: CalloutColor::default(),
            },
            BlockType::Quote => BlockKind::Quote { content },
            BlockType::TableOfContents => BlockKind::TableOfContents,
            BlockType::Separator => BlockKind::Separator,
        }
    }

    pub fn block_type(&self) -> BlockType {
        match self {
            BlockKind::Paragraph { .. } => BlockType::Paragraph,
            BlockKind::Heading { level, .. } => level.block_type(),
            BlockKind::Code { .. } => BlockType::Code,
            BlockKind::Image { .. } => BlockType::Image,
            BlockKind::Table(_) => BlockType::Table,
            BlockKind::BulletedList { .. } => BlockType::BulletedList,
            BlockKind::NumberedList { .. } => BlockType::NumberedList,
            BlockKind::Callout { .. } => BlockType::Callout,
            BlockKind::Quote { .. } => BlockType::Quote,
            BlockKind::TableOfContents => BlockType::TableOfContents,
            BlockKind::Separator => BlockType::Separator,
        }
    }

    /// Text payload for kinds that carry one
    pub fn content(&self) -> Option<&str> {
        match self {
            BlockKind::Paragraph { content }
            | BlockKind::Heading { content, .. }
            | BlockKind::Code { content, .. }
            | BlockKind::BulletedList { content }
            | BlockKind::NumberedList { content }
            | BlockKind::Callout { content, .. }
            | BlockKind::Quote { content } => Some(content),
            BlockKind::Image { .. }
            | BlockKind::Table(_)
            | BlockKind::TableOfContents
            | BlockKind::Separator => None,
        }
    }

    pub fn content_mut(&mut self) -> Option<&mut String> {
        match self {
            BlockKind::Paragraph { content }
            | BlockKind::Heading { content, .. }
            | BlockKind::Code { content, .. }
            | BlockKind::BulletedList { content }
            | BlockKind::NumberedList { content }
            | BlockKind::Callout { content, .. }
            | BlockKind::Quote { content } => Some(content),
            BlockKind::Image { .. }
            | BlockKind::Table(_)
            | BlockKind::TableOfContents
            | BlockKind::Separator => None,
        }
    }
}

/// Wrap plain lines into a list fragment, or keep an existing list fragment
pub fn list_fragment(tag: &str, content: &str) -> String {
    let trimmed = content.trim_start();
    if trimmed.starts_with(&format!("<{tag}")) {
        return content.to_string();
    }
    list_from_lines(tag, &plain_text(content))
}

/// One `<li>` per non-blank line; at least one (empty) item
pub fn list_from_lines(tag: &str, text: &str) -> String {
    let mut items: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| format!("<li>{}</li>", escape_text(line)))
        .collect();
    if items.is_empty() {
        items.push("<li></li>".to_string());
    }
    format!("<{tag}>{}</{tag}>", items.concat())
}

/// One unit of post content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    id: BlockId,
    #[serde(flatten)]
    pub kind: BlockKind,
}

impl Block {
    pub fn new(id: BlockId, kind: BlockKind) -> Self {
        Self { id, kind }
    }

    pub fn id(&self) -> &BlockId {
        &self.id
    }

    pub fn block_type(&self) -> BlockType {
        self.kind.block_type()
    }

    pub fn content(&self) -> &str {
        self.kind.content().unwrap_or("")
    }

    /// Visible text: code verbatim, markup stripped for everything else
    pub fn plain_text(&self) -> String {
        match &self.kind {
            BlockKind::Code { content, .. } => content.clone(),
            BlockKind::Image { caption, .. } => caption.clone(),
            BlockKind::Table(table) => table.to_tsv(),
            kind => plain_text(kind.content().unwrap_or("")),
        }
    }

    pub fn heading_level(&self) -> Option<HeadingLevel> {
        match &self.kind {
            BlockKind::Heading { level, .. } => Some(*level),
            _ => None,
        }
    }

    /// Whether the block has no authored content
    pub fn is_empty(&self) -> bool {
        match &self.kind {
            BlockKind::Image { src, .. } => src.is_empty(),
            BlockKind::Table(table) => table.is_blank(),
            BlockKind::TableOfContents | BlockKind::Separator => false,
            _ => self.plain_text().trim().is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_dimensions_stay_in_lock_step() {
        let mut table = TableData::default();
        table.add_row();
        table.add_column();
        assert_eq!((table.rows(), table.cols()), (4, 4));
        assert!(table.delete_row(0));
        assert!(table.delete_column(3));
        assert_eq!(table.data().len(), table.rows());
        assert!(table.data().iter().all(|row| row.len() == table.cols()));
    }

    #[test]
    fn test_table_refuses_last_row_and_column() {
        let mut table = TableData::new(1, 1);
        assert!(!table.delete_row(0));
        assert!(!table.delete_column(0));
        assert_eq!((table.rows(), table.cols()), (1, 1));
    }

    #[test]
    fn test_table_out_of_range_delete_is_noop() {
        let mut table = TableData::default();
        assert!(!table.delete_row(7));
        assert!(!table.delete_column(3));
        assert_eq!((table.rows(), table.cols()), (3, 3));
    }

    #[test]
    fn test_table_deserialize_rejects_mismatch() {
        let json = r#"{"rows":2,"cols":2,"data":[["a","b"]],"hasHeader":true}"#;
        assert!(serde_json::from_str::<TableData>(json).is_err());
    }

    #[test]
    fn test_list_from_lines() {
        assert_eq!(list_from_lines("ul", "a\n\n b \n"), "<ul><li>a</li><li>b</li></ul>");
        assert_eq!(list_from_lines("ol", ""), "<ol><li></li></ol>");
        assert_eq!(list_fragment("ul", "<ul><li>x</li></ul>"), "<ul><li>x</li></ul>");
    }

    #[test]
    fn test_block_json_shape() {
        let block = Block::new(
            BlockId::new("b1"),
            BlockKind::Heading {
                level: HeadingLevel::H2,
                content: "Intro".to_string(),
            },
        );
        let json = serde_json::to_string(&block).unwrap();
        assert_eq!(json, r#"{"id":"b1","type":"heading","level":2,"content":"Intro"}"#);
    }

    #[test]
    fn test_code_language_parse() {
        assert_eq!("Mermaid".parse::<CodeLanguage>(), Ok(CodeLanguage::Mermaid));
        assert!("cobol".parse::<CodeLanguage>().is_err());
    }

    #[test]
    fn test_empty_detection() {
        let para = Block::new(BlockId::new("p"), BlockKind::with_content(BlockType::Paragraph, "<br>"));
        assert!(para.is_empty());
        let sep = Block::new(BlockId::new("s"), BlockKind::Separator);
        assert!(!sep.is_empty());
    }
}
