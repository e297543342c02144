//! Backend connection settings

use crate::error::{StorageError, StorageResult};
use crate::model::FileId;
use serde::{Deserialize, Serialize};

/// Content longer than this many characters is stored as a file
pub const DEFAULT_MAX_INLINE_CONTENT: usize = 65_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageConfig {
    #[serde(default)]
    pub endpoint: String,

    #[serde(default)]
    pub project: String,

    #[serde(default)]
    pub database: String,

    #[serde(default)]
    pub collection: String,

    /// Bucket for cover images and oversize content
    #[serde(default)]
    pub bucket: String,

    #[serde(default = "default_max_inline_content")]
    pub max_inline_content: usize,
}

fn default_max_inline_content() -> usize {
    DEFAULT_MAX_INLINE_CONTENT
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            project: String::new(),
            database: String::new(),
            collection: String::new(),
            bucket: String::new(),
            max_inline_content: DEFAULT_MAX_INLINE_CONTENT,
        }
    }
}

impl StorageConfig {
    /// Endpoint without surrounding whitespace or a trailing slash
    pub fn endpoint(&self) -> &str {
        let endpoint = self.endpoint.trim();
        endpoint.strip_suffix('/').unwrap_or(endpoint)
    }

    /// Post operations need a database and a collection
    pub fn require_collection(&self) -> StorageResult<()> {
        if self.database.trim().is_empty() {
            return Err(StorageError::MissingConfig("database"));
        }
        if self.collection.trim().is_empty() {
            return Err(StorageError::MissingConfig("collection"));
        }
        Ok(())
    }

    /// File uploads need a bucket
    pub fn require_bucket(&self) -> StorageResult<()> {
        if self.bucket.trim().is_empty() {
            return Err(StorageError::MissingConfig("bucket"));
        }
        Ok(())
    }

    /// Public view URL of an uploaded file, if the backend is addressable
    pub fn view_url(&self, id: &FileId) -> Option<String> {
        let (endpoint, bucket, project) = (self.endpoint(), self.bucket.trim(), self.project.trim());
        if id.as_str().is_empty() || endpoint.is_empty() || bucket.is_empty() || project.is_empty() {
            return None;
        }
        Some(format!(
            "{endpoint}/storage/buckets/{bucket}/files/{id}/view?project={project}"
        ))
    }
}
