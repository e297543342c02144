//! Oversize content escape hatch
//!
//! Post bodies longer than the backend's attribute limit are uploaded as a
//! file and the record keeps `__STORAGE_FILE__{file_id}` instead.

use crate::backend::ImageStorage;
use crate::error::{StorageError, StorageResult};
use crate::model::FileId;
use tracing::{info, warn};

pub const STORAGE_FILE_PREFIX: &str = "__STORAGE_FILE__";

const CONTENT_MIME: &str = "application/json";

pub fn placeholder_for(id: &FileId) -> String {
    format!("{STORAGE_FILE_PREFIX}{id}")
}

/// File id referenced by stored content, if it is a placeholder
pub fn parse_placeholder(content: &str) -> Option<FileId> {
    content
        .strip_prefix(STORAGE_FILE_PREFIX)
        .filter(|id| !id.is_empty())
        .map(FileId::new)
}

/// Content as it should be written to the record
pub fn store_content<S: ImageStorage + ?Sized>(
    files: &mut S,
    content: String,
    max_inline: usize,
) -> StorageResult<String> {
    let length = content.chars().count();
    if length <= max_inline {
        return Ok(content);
    }

    warn!(length, max_inline, "content too large, storing as file");
    let id = files.upload(content.into_bytes(), CONTENT_MIME)?;
    Ok(placeholder_for(&id))
}

/// Expand a placeholder back into the content it stands for
pub fn resolve_content<S: ImageStorage + ?Sized>(files: &S, content: &str) -> StorageResult<String> {
    let Some(id) = parse_placeholder(content) else {
        return Ok(content.to_string());
    };

    info!(file = %id, "resolving stored content file");
    let bytes = files.download(&id)?;
    String::from_utf8(bytes).map_err(|_| StorageError::InvalidContent(id))
}
