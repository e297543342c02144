//! # Document Handle
//!
//! The ordered block sequence of one post being edited.
//!
//! A Document is owned by its edit session until it is serialized. It always
//! holds at least one block, block ids are unique and never change, and
//! every change goes through [`Document::apply`].
//!
//! ## Lifecycle
//!
//! ```text
//! Load/New → Edit → Serialize
//!    ↓        ↓         ↓
//!  Blocks  Mutations   HTML
//! ```

use crate::block::{Block, BlockId, BlockIds, BlockKind, BlockType, HeadingLevel};
use crate::mutations::Outcome;
use crate::{EditorError, Mutation, MutationResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Editable block document
#[derive(Debug, Clone)]
pub struct Document {
    /// Storage key the id seed is derived from
    pub key: String,

    /// Current version number (increments on each applied mutation)
    pub version: u64,

    pub(crate) blocks: Vec<Block>,
    pub(crate) focus: Option<BlockId>,
    ids: BlockIds,
}

/// On-disk form of a document
#[derive(Debug, Serialize, Deserialize)]
struct DocumentData {
    #[serde(default = "default_key")]
    key: String,
    blocks: Vec<Block>,
}

fn default_key() -> String {
    "untitled".to_string()
}

impl Document {
    /// New document holding a single empty paragraph
    pub fn new(key: &str) -> Self {
        let mut ids = BlockIds::for_document(key);
        let id = ids.mint();
        Self {
            key: key.to_string(),
            version: 0,
            blocks: vec![Block::new(
                id.clone(),
                BlockKind::with_content(BlockType::Paragraph, ""),
            )],
            focus: Some(id),
            ids,
        }
    }

    /// Document from existing blocks; rejects empty input and duplicate ids
    pub fn from_blocks(key: &str, blocks: Vec<Block>) -> Result<Self, EditorError> {
        if blocks.is_empty() {
            return Err(EditorError::EmptyDocument);
        }
        let mut seen = HashSet::new();
        for block in &blocks {
            if !seen.insert(block.id()) {
                return Err(EditorError::DuplicateBlockId(block.id().clone()));
            }
        }

        Ok(Self {
            key: key.to_string(),
            version: 0,
            focus: None,
            blocks,
            ids: BlockIds::for_document(key),
        })
    }

    /// Load from `{"key": ..., "blocks": [...]}`
    pub fn from_json(json: &str) -> Result<Self, EditorError> {
        let data: DocumentData = serde_json::from_str(json)?;
        Self::from_blocks(&data.key, data.blocks)
    }

    pub fn to_json(&self) -> Result<String, EditorError> {
        let data = DocumentData {
            key: self.key.clone(),
            blocks: self.blocks.clone(),
        };
        Ok(serde_json::to_string_pretty(&data)?)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Never true: a document holds at least one block
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn block(&self, id: &BlockId) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id() == id)
    }

    pub(crate) fn block_mut(&mut self, id: &BlockId) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|b| b.id() == id)
    }

    pub fn index_of(&self, id: &BlockId) -> Option<usize> {
        self.blocks.iter().position(|b| b.id() == id)
    }

    /// Heading blocks in document order
    pub fn headings(&self) -> impl Iterator<Item = (HeadingLevel, &Block)> {
        self.blocks
            .iter()
            .filter_map(|b| b.heading_level().map(|level| (level, b)))
    }

    /// Block that should receive input focus next
    pub fn focus(&self) -> Option<&BlockId> {
        self.focus.as_ref()
    }

    pub fn set_focus(&mut self, id: &BlockId) -> bool {
        if self.index_of(id).is_some() {
            self.focus = Some(id.clone());
            true
        } else {
            false
        }
    }

    /// Consume the pending focus target
    pub fn take_focus(&mut self) -> Option<BlockId> {
        self.focus.take()
    }

    /// Fresh id, never colliding with ids loaded from storage
    pub(crate) fn next_block_id(&mut self) -> BlockId {
        loop {
            let id = self.ids.mint();
            if self.index_of(&id).is_none() {
                return id;
            }
        }
    }

    /// Apply a mutation
    pub fn apply(&mut self, mutation: Mutation) -> MutationResult {
        let name = mutation.name();
        match mutation.apply(self) {
            Outcome::Applied { created } => {
                self.version += 1;
                debug!(mutation = name, version = self.version, "applied");
                MutationResult {
                    version: self.version,
                    focus: self.focus.clone(),
                    created,
                    refused: None,
                }
            }
            Outcome::Refused(reason) => {
                debug!(mutation = name, %reason, "refused");
                MutationResult {
                    version: self.version,
                    focus: self.focus.clone(),
                    created: None,
                    refused: Some(reason),
                }
            }
        }
    }

    /// Insert a block after `after_index`, returning its id
    pub fn insert_block(
        &mut self,
        after_index: usize,
        block_type: BlockType,
        initial_content: &str,
    ) -> BlockId {
        let result = self.apply(Mutation::InsertBlock {
            after_index,
            block_type,
            initial_content: initial_content.to_string(),
        });
        match result.created {
            Some(id) => id,
            // Insertion is total
            None => self.blocks[after_index.min(self.blocks.len() - 1)].id().clone(),
        }
    }

    pub fn remove_block(&mut self, index: usize) -> MutationResult {
        self.apply(Mutation::RemoveBlock { index })
    }

    pub fn remove_block_by_id(&mut self, id: &BlockId) -> MutationResult {
        self.apply(Mutation::RemoveBlockById { id: id.clone() })
    }

    pub fn update_block_content(&mut self, id: &BlockId, content: &str) -> MutationResult {
        self.apply(Mutation::UpdateBlockContent {
            id: id.clone(),
            content: content.to_string(),
        })
    }

    pub fn change_block_type(
        &mut self,
        id: &BlockId,
        block_type: BlockType,
        carry_over_text: &str,
    ) -> MutationResult {
        self.apply(Mutation::ChangeBlockType {
            id: id.clone(),
            block_type,
            carry_over_text: carry_over_text.to_string(),
        })
    }

    pub fn reorder(&mut self, from: usize, to: usize) -> MutationResult {
        self.apply(Mutation::Reorder { from, to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document_has_one_paragraph() {
        let doc = Document::new("drafts/new");
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.blocks()[0].block_type(), BlockType::Paragraph);
        assert_eq!(doc.version, 0);
        assert_eq!(doc.focus(), Some(doc.blocks()[0].id()));
    }

    #[test]
    fn test_document_version_increments_only_when_applied() {
        let mut doc = Document::new("drafts/version");
        let result = doc.remove_block(0);
        assert!(result.is_refused());
        assert_eq!(doc.version, 0);

        doc.insert_block(0, BlockType::Quote, "");
        assert_eq!(doc.version, 1);
    }

    #[test]
    fn test_from_blocks_rejects_duplicates() {
        let block = Block::new(BlockId::new("a"), BlockKind::Separator);
        let err = Document::from_blocks("k", vec![block.clone(), block]).unwrap_err();
        assert!(matches!(err, EditorError::DuplicateBlockId(_)));
        assert!(matches!(
            Document::from_blocks("k", vec![]).unwrap_err(),
            EditorError::EmptyDocument
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let mut doc = Document::new("drafts/json");
        doc.insert_block(0, BlockType::Table, "");
        let json = doc.to_json().unwrap();
        let loaded = Document::from_json(&json).unwrap();
        assert_eq!(loaded.blocks(), doc.blocks());
        assert_eq!(loaded.key, "drafts/json");
    }

    #[test]
    fn test_never_empty_after_removing_last_block() {
        let mut doc = Document::new("drafts/last");
        let id = doc.blocks()[0].id().clone();
        assert!(doc.remove_block_by_id(&id).is_refused());
        assert!(!doc.is_empty());
    }

    #[test]
    fn test_block_ids_follow_document_key() {
        let mut a = Document::new("drafts/keyed");
        let mut b = Document::new("drafts/keyed");
        let other = Document::new("drafts/other");

        assert_eq!(a.blocks()[0].id(), b.blocks()[0].id());
        assert_ne!(a.blocks()[0].id(), other.blocks()[0].id());

        let next_a = a.insert_block(0, BlockType::Paragraph, "");
        let next_b = b.insert_block(0, BlockType::Quote, "");
        assert_eq!(next_a, next_b);

        let prefix = format!("{:08x}-", crc32fast::hash(b"drafts/keyed"));
        assert_eq!(a.blocks()[0].id().as_str(), format!("{prefix}1"));
        assert_eq!(next_a.as_str(), format!("{prefix}2"));
    }

    #[test]
    fn test_new_ids_skip_loaded_ids() {
        let seed_doc = Document::new("drafts/ids");
        let loaded_id = seed_doc.blocks()[0].id().clone();
        let mut doc = Document::from_json(&seed_doc.to_json().unwrap()).unwrap();

        let id = doc.insert_block(0, BlockType::Paragraph, "");

        assert_ne!(id, loaded_id);
        assert_eq!(doc.len(), 2);
    }
}
