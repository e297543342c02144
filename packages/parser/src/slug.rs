//! Heading anchor generation
//!
//! The serializer and the renderer share this so table-of-contents links
//! written at save time resolve against ids assigned at display time.

use std::collections::HashMap;

/// Fallback slug for headings with no usable characters
pub const EMPTY_SLUG: &str = "section";

/// Lowercase, alphanumerics kept, whitespace/`-`/`_` runs collapsed to one `-`
pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter_map(|c| {
            if c.is_alphanumeric() {
                Some(c)
            } else if c.is_whitespace() || c == '-' || c == '_' {
                Some('-')
            } else {
                None
            }
        })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Tracks claimed anchor ids within one document.
///
/// The first heading with a given slug gets the bare slug, later ones get
/// `-1`, `-2`, ... in document order.
#[derive(Debug, Default, Clone)]
pub struct SlugRegistry {
    counts: HashMap<String, usize>,
}

impl SlugRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an id that already exists so new slugs never collide with it
    pub fn reserve(&mut self, id: &str) {
        self.counts.entry(id.to_string()).or_insert(0);
    }

    pub fn is_taken(&self, id: &str) -> bool {
        self.counts.contains_key(id)
    }

    /// Derive a unique anchor id for heading text
    pub fn claim(&mut self, text: &str) -> String {
        let mut base = slugify(text);
        if base.is_empty() {
            base = EMPTY_SLUG.to_string();
        }

        if !self.is_taken(&base) {
            self.counts.insert(base.clone(), 0);
            return base;
        }

        loop {
            let next = {
                let count = self.counts.entry(base.clone()).or_insert(0);
                *count += 1;
                *count
            };
            let candidate = format!("{base}-{next}");
            if !self.is_taken(&candidate) {
                self.counts.insert(candidate.clone(), 0);
                return candidate;
            }
        }
    }
}
