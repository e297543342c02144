//! # Async Effects
//!
//! Diagram renders and image file reads finish after the edit that started
//! them. Each one is issued an [`EffectTicket`]; its result is applied only if
//! the ticket is still the newest one for that block and effect kind.

use crate::block::BlockId;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    DiagramRender,
    ImageRead,
}

/// Handle tying an async result back to the block that requested it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EffectTicket {
    pub block: BlockId,
    pub kind: EffectKind,
    pub generation: u64,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EffectError {
    #[error("Failed to read image: {0}")]
    ImageRead(String),

    #[error("Diagram render failed: {0}")]
    Diagram(String),
}

/// Issues tickets and tracks the newest generation per block
#[derive(Debug, Default)]
pub struct EffectTracker {
    next_generation: u64,
    current: HashMap<(BlockId, EffectKind), u64>,
}

impl EffectTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// New ticket; supersedes any earlier ticket for the same block and kind
    pub fn issue(&mut self, block: &BlockId, kind: EffectKind) -> EffectTicket {
        self.next_generation += 1;
        self.current
            .insert((block.clone(), kind), self.next_generation);
        EffectTicket {
            block: block.clone(),
            kind,
            generation: self.next_generation,
        }
    }

    pub fn is_current(&self, ticket: &EffectTicket) -> bool {
        self.current.get(&(ticket.block.clone(), ticket.kind)) == Some(&ticket.generation)
    }

    /// Retire `ticket`; true when it was current
    pub fn settle(&mut self, ticket: &EffectTicket) -> bool {
        let key = (ticket.block.clone(), ticket.kind);
        if self.current.get(&key) == Some(&ticket.generation) {
            self.current.remove(&key);
            true
        } else {
            false
        }
    }

    /// Drop every outstanding ticket for a block
    pub fn forget_block(&mut self, block: &BlockId) {
        self.current.retain(|(id, _), _| id != block);
    }

    pub fn pending(&self) -> usize {
        self.current.len()
    }
}

/// Image file contents as read from disk or a file picker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            bytes,
        }
    }

    pub fn to_data_uri(&self) -> String {
        data_uri(&self.mime, &self.bytes)
    }
}

/// `data:{mime};base64,{payload}`
pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}
