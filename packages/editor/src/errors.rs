//! Error types for the editor

use crate::block::BlockId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Document must contain at least one block")]
    EmptyDocument,

    #[error("Duplicate block id: {0}")]
    DuplicateBlockId(BlockId),
}
