//! Error types for storage backends

use crate::model::FileId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Storage is not configured: missing {0}")]
    MissingConfig(&'static str),

    #[error("An author is required to create a post")]
    MissingAuthor,

    #[error("Stored content file {0} is not valid UTF-8")]
    InvalidContent(FileId),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StorageError {
    pub fn post_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            kind: "Post",
            id: id.to_string(),
        }
    }

    pub fn file_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            kind: "File",
            id: id.to_string(),
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
