//! Checks run before a post is submitted

use crate::block::{Block, BlockKind};
use crate::document::Document;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    #[error("Title is required")]
    MissingTitle,

    #[error("Post has no content")]
    MissingContent,
}

/// Whether a block gives the post something to show.
///
/// Images, tables and tables of contents always count, separators never do.
pub fn has_publishable_content(block: &Block) -> bool {
    match &block.kind {
        BlockKind::Image { .. } | BlockKind::Table(_) | BlockKind::TableOfContents => true,
        BlockKind::Separator => false,
        _ => !block.plain_text().trim().is_empty(),
    }
}

/// Validate a post before submission; nothing is sent when this fails
pub fn validate_publish(title: &str, document: &Document) -> Result<(), PublishError> {
    if title.trim().is_empty() {
        debug!(key = %document.key, "publish refused: missing title");
        return Err(PublishError::MissingTitle);
    }
    if !document.blocks().iter().any(has_publishable_content) {
        debug!(key = %document.key, "publish refused: no content");
        return Err(PublishError::MissingContent);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockType;

    #[test]
    fn test_title_required() {
        let mut doc = Document::new("drafts/p");
        doc.insert_block(0, BlockType::Paragraph, "Body");
        assert_eq!(validate_publish("  ", &doc), Err(PublishError::MissingTitle));
        assert_eq!(validate_publish("Post", &doc), Ok(()));
    }

    #[test]
    fn test_blank_blocks_are_not_content() {
        let mut doc = Document::new("drafts/p");
        doc.insert_block(0, BlockType::Paragraph, "<b> </b>");
        doc.insert_block(1, BlockType::Separator, "");
        doc.insert_block(2, BlockType::Code, "   ");
        assert_eq!(validate_publish("Post", &doc), Err(PublishError::MissingContent));
    }

    #[test]
    fn test_structural_blocks_count_as_content() {
        for block_type in [BlockType::Image, BlockType::Table, BlockType::TableOfContents] {
            let mut doc = Document::new("drafts/p");
            doc.insert_block(0, block_type, "");
            assert_eq!(validate_publish("Post", &doc), Ok(()), "{:?}", block_type);
        }
    }
}
