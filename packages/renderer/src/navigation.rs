//! Table-of-contents navigation.
//!
//! A TOC can appear before the headings it links to, so the target may not
//! be mounted when an entry is clicked. Navigation retries once after a
//! short delay before giving up.

use crate::render::RenderedDocument;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Host surface that can scroll to and focus an element by id
pub trait Viewport {
    /// Scroll `anchor_id` into view and focus it; false if it is not present
    fn focus_anchor(&mut self, anchor_id: &str) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    Focused,
    FocusedAfterRetry,
    Missing,
}

#[derive(Debug, Clone, Copy)]
pub struct TocNavigator {
    retry_delay: Duration,
}

impl Default for TocNavigator {
    fn default() -> Self {
        Self {
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl TocNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retry_delay(retry_delay: Duration) -> Self {
        Self { retry_delay }
    }

    pub async fn navigate<V: Viewport>(&self, viewport: &mut V, anchor_id: &str) -> NavigationOutcome {
        if viewport.focus_anchor(anchor_id) {
            return NavigationOutcome::Focused;
        }

        debug!(anchor = anchor_id, delay_ms = self.retry_delay.as_millis() as u64, "anchor missing, retrying");
        tokio::time::sleep(self.retry_delay).await;

        if viewport.focus_anchor(anchor_id) {
            NavigationOutcome::FocusedAfterRetry
        } else {
            debug!(anchor = anchor_id, "anchor not found");
            NavigationOutcome::Missing
        }
    }
}

/// Viewport over a rendered document, recording the focused anchor
#[derive(Debug)]
pub struct DocumentViewport<'a> {
    document: &'a RenderedDocument,
    focused: Option<String>,
}

impl<'a> DocumentViewport<'a> {
    pub fn new(document: &'a RenderedDocument) -> Self {
        Self {
            document,
            focused: None,
        }
    }

    pub fn focused(&self) -> Option<&str> {
        self.focused.as_deref()
    }
}

impl Viewport for DocumentViewport<'_> {
    fn focus_anchor(&mut self, anchor_id: &str) -> bool {
        if self.document.find_anchor(anchor_id).is_some() {
            self.focused = Some(anchor_id.to_string());
            true
        } else {
            false
        }
    }
}
