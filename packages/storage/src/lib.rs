//! # Blockpost Storage
//!
//! Persistence contracts for posts and their images.
//!
//! ```text
//! editor ──HTML──► PostStorage ──► record { title, content, cover_image, .. }
//!                      │
//!                      └─ content > max_inline_content
//!                            → ImageStorage::upload, record keeps
//!                              "__STORAGE_FILE__{id}"
//! ```
//!
//! Reads expand the placeholder again, so callers never see it.

pub mod backend;
pub mod config;
pub mod error;
pub mod memory;
pub mod model;
pub mod placeholder;

pub use backend::{ImageStorage, PostStorage};
pub use config::{StorageConfig, DEFAULT_MAX_INLINE_CONTENT};
pub use error::{StorageError, StorageResult};
pub use memory::MemoryStorage;
pub use model::{FileId, NewPost, Post, PostFilter, PostId, PostStatus, PostUpdate, Upload};
pub use placeholder::{parse_placeholder, placeholder_for, STORAGE_FILE_PREFIX};
