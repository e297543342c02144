//! # Block Mutations
//!
//! Every edit to a post is one of these commands applied to a [`Document`].
//!
//! ## Mutation Semantics
//!
//! ### Total
//! - No mutation fails. Out-of-range indices are clamped.
//! - Structural refusals (last block, last row, last column) leave the
//!   document untouched and are reported on the [`MutationResult`].
//! - Unknown block ids are no-ops.
//!
//! ### Atomic
//! - A mutation either fully applies or leaves the document unchanged.
//! - `UpdateBlockContent` with the plain text `---` turns the block into a
//!   separator in the same step.
//!
//! ### Focus
//! - Inserts focus the new block.
//! - Removals focus the predecessor (or the new first block).

use crate::block::{
    list_from_lines, Block, BlockId, BlockKind, BlockType, CalloutColor, CodeLanguage,
};
use crate::document::Document;
use blockpost_parser::{escape_text, plain_text};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Plain text that converts a block into a separator
pub const SEPARATOR_TOKEN: &str = "---";

/// Block-level editing commands
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Mutation {
    /// Insert a new block after `after_index`
    #[serde(rename_all = "camelCase")]
    InsertBlock {
        after_index: usize,
        block_type: BlockType,
        #[serde(default)]
        initial_content: String,
    },

    RemoveBlock {
        index: usize,
    },

    RemoveBlockById {
        id: BlockId,
    },

    /// Replace a block's content (atomic replacement)
    UpdateBlockContent {
        id: BlockId,
        content: String,
    },

    /// Convert a block in place (slash commands)
    #[serde(rename_all = "camelCase")]
    ChangeBlockType {
        id: BlockId,
        block_type: BlockType,
        #[serde(default)]
        carry_over_text: String,
    },

    /// Move a block (drag and drop)
    Reorder {
        from: usize,
        to: usize,
    },

    SetCell {
        id: BlockId,
        row: usize,
        col: usize,
        value: String,
    },

    AddRow {
        id: BlockId,
    },

    AddColumn {
        id: BlockId,
    },

    DeleteRow {
        id: BlockId,
        row: usize,
    },

    DeleteColumn {
        id: BlockId,
        col: usize,
    },

    ToggleHeader {
        id: BlockId,
    },

    SetCodeLanguage {
        id: BlockId,
        language: CodeLanguage,
    },

    SetImage {
        id: BlockId,
        src: String,
    },

    SetCaption {
        id: BlockId,
        caption: String,
    },

    SetCallout {
        id: BlockId,
        #[serde(default)]
        icon: Option<String>,
        #[serde(default)]
        color: Option<CalloutColor>,
    },
}

/// Why a mutation left the document untouched
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MutationError {
    #[error("Block not found: {0}")]
    BlockNotFound(BlockId),

    #[error("Cannot remove the last block")]
    LastBlock,

    #[error("Cannot delete the last table row")]
    LastRow,

    #[error("Cannot delete the last table column")]
    LastColumn,

    #[error("Index {index} is out of range")]
    OutOfRange { index: usize },

    #[error("Block {id} is not a {expected}")]
    WrongBlockType { id: BlockId, expected: &'static str },
}

/// Result of applying a mutation
#[derive(Debug, Clone, PartialEq)]
pub struct MutationResult {
    /// Document version after the mutation
    pub version: u64,

    /// Block that should receive input focus next
    pub focus: Option<BlockId>,

    /// Block created by the mutation, if any
    pub created: Option<BlockId>,

    /// Set when the mutation was refused and nothing changed
    pub refused: Option<MutationError>,
}

impl MutationResult {
    pub fn is_refused(&self) -> bool {
        self.refused.is_some()
    }
}

/// What a single mutation did
#[derive(Debug)]
pub(crate) enum Outcome {
    Applied { created: Option<BlockId> },
    Refused(MutationError),
}

impl Outcome {
    fn applied() -> Self {
        Outcome::Applied { created: None }
    }
}

impl Mutation {
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::InsertBlock { .. } => "insert_block",
            Mutation::RemoveBlock { .. } => "remove_block",
            Mutation::RemoveBlockById { .. } => "remove_block_by_id",
            Mutation::UpdateBlockContent { .. } => "update_block_content",
            Mutation::ChangeBlockType { .. } => "change_block_type",
            Mutation::Reorder { .. } => "reorder",
            Mutation::SetCell { .. } => "set_cell",
            Mutation::AddRow { .. } => "add_row",
            Mutation::AddColumn { .. } => "add_column",
            Mutation::DeleteRow { .. } => "delete_row",
            Mutation::DeleteColumn { .. } => "delete_column",
            Mutation::ToggleHeader { .. } => "toggle_header",
            Mutation::SetCodeLanguage { .. } => "set_code_language",
            Mutation::SetImage { .. } => "set_image",
            Mutation::SetCaption { .. } => "set_caption",
            Mutation::SetCallout { .. } => "set_callout",
        }
    }

    /// Apply mutation to the document
    pub(crate) fn apply(self, doc: &mut Document) -> Outcome {
        match self {
            Mutation::InsertBlock {
                after_index,
                block_type,
                initial_content,
            } => Self::apply_insert(doc, after_index, block_type, &initial_content),

            Mutation::RemoveBlock { index } => Self::apply_remove(doc, index),

            Mutation::RemoveBlockById { id } => match doc.index_of(&id) {
                Some(index) => Self::apply_remove(doc, index),
                None => Outcome::Refused(MutationError::BlockNotFound(id)),
            },

            Mutation::UpdateBlockContent { id, content } => {
                Self::apply_update_content(doc, &id, content)
            }

            Mutation::ChangeBlockType {
                id,
                block_type,
                carry_over_text,
            } => Self::apply_change_type(doc, &id, block_type, &carry_over_text),

            Mutation::Reorder { from, to } => Self::apply_reorder(doc, from, to),

            Mutation::SetCell { id, row, col, value } => {
                Self::with_table(doc, &id, |table| {
                    if table.set_cell(row, col, value) {
                        Ok(())
                    } else {
                        Err(MutationError::OutOfRange {
                            index: row.max(col),
                        })
                    }
                })
            }

            Mutation::AddRow { id } => Self::with_table(doc, &id, |table| {
                table.add_row();
                Ok(())
            }),

            Mutation::AddColumn { id } => Self::with_table(doc, &id, |table| {
                table.add_column();
                Ok(())
            }),

            Mutation::DeleteRow { id, row } => Self::with_table(doc, &id, |table| {
                if table.rows() <= 1 {
                    Err(MutationError::LastRow)
                } else if table.delete_row(row) {
                    Ok(())
                } else {
                    Err(MutationError::OutOfRange { index: row })
                }
            }),

            Mutation::DeleteColumn { id, col } => Self::with_table(doc, &id, |table| {
                if table.cols() <= 1 {
                    Err(MutationError::LastColumn)
                } else if table.delete_column(col) {
                    Ok(())
                } else {
                    Err(MutationError::OutOfRange { index: col })
                }
            }),

            Mutation::ToggleHeader { id } => Self::with_table(doc, &id, |table| {
                table.toggle_header();
                Ok(())
            }),

            Mutation::SetCodeLanguage { id, language } => {
                Self::with_kind(doc, &id, "code block", |kind| match kind {
                    BlockKind::Code { language: lang, .. } => {
                        *lang = language;
                        true
                    }
                    _ => false,
                })
            }

            Mutation::SetImage { id, src } => {
                Self::with_kind(doc, &id, "image", |kind| match kind {
                    BlockKind::Image { src: current, .. } => {
                        *current = src;
                        true
                    }
                    _ => false,
                })
            }

            Mutation::SetCaption { id, caption } => {
                Self::with_kind(doc, &id, "image", |kind| match kind {
                    BlockKind::Image {
                        caption: current, ..
                    } => {
                        *current = caption;
                        true
                    }
                    _ => false,
                })
            }

            Mutation::SetCallout { id, icon, color } => {
                Self::with_kind(doc, &id, "callout", |kind| match kind {
                    BlockKind::Callout {
                        icon: current_icon,
                        color: current_color,
                        ..
                    } => {
                        if let Some(icon) = icon {
                            *current_icon = icon;
                        }
                        if let Some(color) = color {
                            *current_color = color;
                        }
                        true
                    }
                    _ => false,
                })
            }
        }
    }

    fn apply_insert(
        doc: &mut Document,
        after_index: usize,
        block_type: BlockType,
        initial_content: &str,
    ) -> Outcome {
        let index = after_index.min(doc.blocks.len().saturating_sub(1));
        let id = doc.next_block_id();
        let block = Block::new(id.clone(), BlockKind::with_content(block_type, initial_content));
        doc.blocks.insert(index + 1, block);
        doc.focus = Some(id.clone());
        Outcome::Applied { created: Some(id) }
    }

    fn apply_remove(doc: &mut Document, index: usize) -> Outcome {
        if doc.blocks.len() <= 1 {
            return Outcome::Refused(MutationError::LastBlock);
        }
        if index >= doc.blocks.len() {
            return Outcome::Refused(MutationError::OutOfRange { index });
        }
        doc.blocks.remove(index);
        let focus_index = index.saturating_sub(1);
        doc.focus = doc.blocks.get(focus_index).map(|b| b.id().clone());
        Outcome::applied()
    }

    fn apply_update_content(doc: &mut Document, id: &BlockId, content: String) -> Outcome {
        let Some(block) = doc.block_mut(id) else {
            return Outcome::Refused(MutationError::BlockNotFound(id.clone()));
        };

        let is_code = block.block_type() == BlockType::Code;
        let holds_text = block.kind.content_mut().is_some();
        if holds_text && !is_code && plain_text(&content).trim() == SEPARATOR_TOKEN {
            debug!(block = %id, "separator token typed, converting block");
            block.kind = BlockKind::Separator;
            return Outcome::applied();
        }

        match block.kind.content_mut() {
            Some(current) => {
                *current = content;
                Outcome::applied()
            }
            None => Outcome::Refused(MutationError::WrongBlockType {
                id: id.clone(),
                expected: "text block",
            }),
        }
    }

    fn apply_change_type(
        doc: &mut Document,
        id: &BlockId,
        block_type: BlockType,
        carry_over: &str,
    ) -> Outcome {
        let Some(index) = doc.index_of(id) else {
            return Outcome::Refused(MutationError::BlockNotFound(id.clone()));
        };

        // Tables and images are inserted after the current block, which keeps
        // the carried-over text.
        if matches!(block_type, BlockType::Table | BlockType::Image) {
            if let Some(content) = doc.blocks[index].kind.content_mut() {
                *content = escape_text(carry_over).into_owned();
            }
            let new_id = doc.next_block_id();
            let kind = BlockKind::with_content(block_type, "");
            doc.blocks.insert(index + 1, Block::new(new_id.clone(), kind));
            doc.focus = Some(new_id.clone());
            return Outcome::Applied {
                created: Some(new_id),
            };
        }

        let text = carry_over.trim();
        let kind = match block_type {
            BlockType::BulletedList => BlockKind::BulletedList {
                content: list_from_lines("ul", text),
            },
            BlockType::NumberedList => BlockKind::NumberedList {
                content: list_from_lines("ol", text),
            },
            // Rich-text blocks hold HTML, carried text is plain
            BlockType::Paragraph
            | BlockType::Heading1
            | BlockType::Heading2
            | BlockType::Heading3 => BlockKind::with_content(block_type, &escape_text(text)),
            other => BlockKind::with_content(other, text),
        };

        doc.blocks[index].kind = kind;
        doc.focus = Some(id.clone());
        Outcome::applied()
    }

    fn apply_reorder(doc: &mut Document, from: usize, to: usize) -> Outcome {
        let last = doc.blocks.len().saturating_sub(1);
        let from = from.min(last);
        let to = to.min(last);
        if from != to {
            let block = doc.blocks.remove(from);
            doc.blocks.insert(to, block);
        }
        Outcome::applied()
    }

    fn with_table(
        doc: &mut Document,
        id: &BlockId,
        f: impl FnOnce(&mut crate::block::TableData) -> Result<(), MutationError>,
    ) -> Outcome {
        let Some(block) = doc.block_mut(id) else {
            return Outcome::Refused(MutationError::BlockNotFound(id.clone()));
        };
        match &mut block.kind {
            BlockKind::Table(table) => match f(table) {
                Ok(()) => Outcome::applied(),
                Err(err) => Outcome::Refused(err),
            },
            _ => Outcome::Refused(MutationError::WrongBlockType {
                id: id.clone(),
                expected: "table",
            }),
        }
    }

    fn with_kind(
        doc: &mut Document,
        id: &BlockId,
        expected: &'static str,
        f: impl FnOnce(&mut BlockKind) -> bool,
    ) -> Outcome {
        let Some(block) = doc.block_mut(id) else {
            return Outcome::Refused(MutationError::BlockNotFound(id.clone()));
        };
        if f(&mut block.kind) {
            Outcome::applied()
        } else {
            Outcome::Refused(MutationError::WrongBlockType {
                id: id.clone(),
                expected,
            })
        }
    }
}
