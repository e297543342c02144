//! Storage contracts
//!
//! The editor and renderer only ever see post HTML as a string; these traits
//! are the seam where a hosted backend plugs in.

use crate::error::StorageResult;
use crate::model::{FileId, NewPost, Post, PostFilter, PostId, PostUpdate};

pub trait ImageStorage {
    fn upload(&mut self, bytes: Vec<u8>, mime: &str) -> StorageResult<FileId>;

    fn download(&self, id: &FileId) -> StorageResult<Vec<u8>>;

    /// Public URL of a file, `None` when the backend cannot address it
    fn view_url(&self, id: &FileId) -> Option<String>;
}

pub trait PostStorage {
    fn create_post(&mut self, post: NewPost) -> StorageResult<Post>;

    /// Fetch a post with its full content, expanding oversize placeholders
    fn get_post(&self, id: &PostId) -> StorageResult<Post>;

    fn get_posts(&self, filter: &PostFilter) -> StorageResult<Vec<Post>>;

    fn update_post(&mut self, id: &PostId, update: PostUpdate) -> StorageResult<Post>;

    fn delete_post(&mut self, id: &PostId) -> StorageResult<()>;
}
