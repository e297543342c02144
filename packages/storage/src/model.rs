//! Stored post records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(PostId);
string_id!(FileId);

/// Stored as `draft`, `publish` or `archive`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostStatus {
    #[default]
    #[serde(rename = "draft")]
    Draft,
    #[serde(rename = "publish")]
    Published,
    #[serde(rename = "archive")]
    Archived,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub title: String,
    /// Serialized HTML body
    pub content: String,
    pub cover_image: Option<FileId>,
    pub author_id: String,
    pub status: PostStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// File contents handed to a backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl Upload {
    pub fn new(bytes: Vec<u8>, mime: impl Into<String>) -> Self {
        Self {
            bytes,
            mime: mime.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub cover_image: Option<Upload>,
    pub author_id: Option<String>,
    pub status: PostStatus,
}

/// Fields left as `None` are unchanged
#[derive(Debug, Clone, Default)]
pub struct PostUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub cover_image: Option<Upload>,
    pub status: Option<PostStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostFilter {
    #[serde(default)]
    pub status: Option<PostStatus>,
    #[serde(default)]
    pub author_id: Option<String>,
}

impl PostFilter {
    pub fn published() -> Self {
        Self {
            status: Some(PostStatus::Published),
            author_id: None,
        }
    }

    pub fn by_author(author_id: impl Into<String>) -> Self {
        Self {
            status: None,
            author_id: Some(author_id.into()),
        }
    }

    pub fn matches(&self, post: &Post) -> bool {
        self.status.map_or(true, |status| post.status == status)
            && self
                .author_id
                .as_deref()
                .map_or(true, |author| post.author_id == author)
    }
}
