//! In-memory backend
//!
//! Holds posts and files in process. The state can be written to and read
//! back from a JSON snapshot so the CLI can keep posts between runs.

use crate::backend::{ImageStorage, PostStorage};
use crate::config::StorageConfig;
use crate::error::{StorageError, StorageResult};
use crate::model::{FileId, NewPost, Post, PostFilter, PostId, PostUpdate, Upload};
use crate::placeholder::{parse_placeholder, resolve_content, store_content};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredFile {
    id: FileId,
    mime: String,
    #[serde(with = "base64_bytes")]
    bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snapshot {
    #[serde(default)]
    next_id: u32,
    #[serde(default)]
    posts: Vec<Post>,
    #[serde(default)]
    files: Vec<StoredFile>,
}

#[derive(Debug, Clone)]
pub struct MemoryStorage {
    config: StorageConfig,
    seed: String,
    state: Snapshot,
}

impl MemoryStorage {
    pub fn new(config: StorageConfig) -> Self {
        let seed = format!(
            "{:x}",
            crc32fast::hash(format!("{}/{}", config.project, config.collection).as_bytes())
        );
        Self {
            config,
            seed,
            state: Snapshot::default(),
        }
    }

    /// Load a snapshot, starting empty if the file does not exist
    pub fn open(config: StorageConfig, path: &Path) -> StorageResult<Self> {
        let mut storage = Self::new(config);
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            storage.state = serde_json::from_str(&content)?;
            debug!(path = %path.display(), posts = storage.state.posts.len(), "loaded snapshot");
        }
        Ok(storage)
    }

    pub fn save(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(&self.state)?)?;
        Ok(())
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Number of stored files, content files included
    pub fn file_count(&self) -> usize {
        self.state.files.len()
    }

    /// Post record as stored, placeholders unexpanded
    pub fn raw_post(&self, id: &PostId) -> Option<&Post> {
        self.state.posts.iter().find(|post| &post.id == id)
    }

    fn next_id(&mut self) -> String {
        self.state.next_id += 1;
        format!("{}-{}", self.seed, self.state.next_id)
    }

    fn resolved(&self, post: &Post) -> StorageResult<Post> {
        Ok(Post {
            content: resolve_content(self, &post.content)?,
            ..post.clone()
        })
    }

    fn remove_file(&mut self, id: &FileId) {
        self.state.files.retain(|file| &file.id != id);
    }

    /// Upload a cover; on failure the file behind `stored_content` is dropped
    fn upload_cover(
        &mut self,
        image: Upload,
        stored_content: Option<&str>,
    ) -> StorageResult<FileId> {
        self.upload(image.bytes, &image.mime).map_err(|err| {
            if let Some(file) = stored_content.and_then(parse_placeholder) {
                debug!(file = %file, "dropping content file after failed cover upload");
                self.remove_file(&file);
            }
            err
        })
    }
}

impl ImageStorage for MemoryStorage {
    fn upload(&mut self, bytes: Vec<u8>, mime: &str) -> StorageResult<FileId> {
        self.config.require_bucket()?;
        let id = FileId::new(self.next_id());
        info!(file = %id, mime, size = bytes.len(), "uploaded file");
        self.state.files.push(StoredFile {
            id: id.clone(),
            mime: mime.to_string(),
            bytes,
        });
        Ok(id)
    }

    fn download(&self, id: &FileId) -> StorageResult<Vec<u8>> {
        self.state
            .files
            .iter()
            .find(|file| &file.id == id)
            .map(|file| file.bytes.clone())
            .ok_or_else(|| StorageError::file_not_found(id))
    }

    fn view_url(&self, id: &FileId) -> Option<String> {
        self.config.view_url(id)
    }
}

impl PostStorage for MemoryStorage {
    fn create_post(&mut self, post: NewPost) -> StorageResult<Post> {
        self.config.require_collection()?;
        let author_id = post
            .author_id
            .filter(|author| !author.trim().is_empty())
            .ok_or(StorageError::MissingAuthor)?;

        let max_inline = self.config.max_inline_content;
        let content = store_content(self, post.content, max_inline)?;
        let cover_image = match post.cover_image {
            Some(image) => Some(self.upload_cover(image, Some(content.as_str()))?),
            None => None,
        };

        let now = Utc::now();
        let record = Post {
            id: PostId::new(self.next_id()),
            title: post.title,
            content,
            cover_image,
            author_id,
            status: post.status,
            created_at: now,
            updated_at: now,
        };
        info!(post = %record.id, status = ?record.status, "created post");
        self.state.posts.push(record.clone());
        self.resolved(&record)
    }

    fn get_post(&self, id: &PostId) -> StorageResult<Post> {
        self.config.require_collection()?;
        let post = self
            .raw_post(id)
            .ok_or_else(|| StorageError::post_not_found(id))?;
        self.resolved(post)
    }

    fn get_posts(&self, filter: &PostFilter) -> StorageResult<Vec<Post>> {
        self.config.require_collection()?;
        self.state
            .posts
            .iter()
            .filter(|post| filter.matches(post))
            .map(|post| self.resolved(post))
            .collect()
    }

    fn update_post(&mut self, id: &PostId, update: PostUpdate) -> StorageResult<Post> {
        self.config.require_collection()?;
        let index = self
            .state
            .posts
            .iter()
            .position(|post| &post.id == id)
            .ok_or_else(|| StorageError::post_not_found(id))?;

        let content = match update.content {
            Some(content) => {
                let max_inline = self.config.max_inline_content;
                Some(store_content(self, content, max_inline)?)
            }
            None => None,
        };
        let cover_image = match update.cover_image {
            Some(image) => Some(self.upload_cover(image, content.as_deref())?),
            None => None,
        };

        let current = &self.state.posts[index];
        let replaced_content = content
            .as_ref()
            .and_then(|_| parse_placeholder(&current.content));
        let replaced_cover = cover_image.as_ref().and(current.cover_image.clone());

        let post = &mut self.state.posts[index];
        if let Some(title) = update.title {
            post.title = title;
        }
        if let Some(content) = content {
            post.content = content;
        }
        if let Some(cover_image) = cover_image {
            post.cover_image = Some(cover_image);
        }
        if let Some(status) = update.status {
            post.status = status;
        }
        post.updated_at = Utc::now();
        let record = post.clone();

        for file in replaced_content.into_iter().chain(replaced_cover) {
            self.remove_file(&file);
        }
        info!(post = %id, "updated post");
        self.resolved(&record)
    }

    fn delete_post(&mut self, id: &PostId) -> StorageResult<()> {
        self.config.require_collection()?;
        let index = self
            .state
            .posts
            .iter()
            .position(|post| &post.id == id)
            .ok_or_else(|| StorageError::post_not_found(id))?;
        let post = self.state.posts.remove(index);
        if let Some(file) = parse_placeholder(&post.content) {
            self.remove_file(&file);
        }
        info!(post = %id, "deleted post");
        Ok(())
    }
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}
