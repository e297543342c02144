//! # Blockpost Editor
//!
//! Block document model and editing engine for Blockpost posts.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ session: keys, slash menu, list exit,       │
//! │          async effect staleness guard       │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ document: ordered blocks + mutations        │
//! │  - (state, mutation) → state                │
//! │  - structural refusals are no-ops           │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ compiler-html: Document → HTML string       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use blockpost_editor::{BlockType, Document, EditSession, Key, KeyEvent};
//!
//! let mut doc = Document::new("drafts/hello");
//! let heading = doc.insert_block(0, BlockType::Heading1, "Intro");
//!
//! let mut session = EditSession::new(doc);
//! session.input(&heading, "Introduction");
//! session.key_down(&heading, KeyEvent::new(Key::Enter));
//!
//! assert_eq!(session.document().len(), 3);
//! ```

mod block;
mod document;
mod effects;
mod errors;
mod mutations;
mod publish;
mod session;
pub mod slash;

pub use block::{
    list_fragment, list_from_lines, Block, BlockId, BlockKind, BlockType, CalloutColor,
    CodeLanguage, HeadingLevel, TableData, DEFAULT_CALLOUT_ICON, DEFAULT_TABLE_SIZE,
};
pub use document::Document;
pub use effects::{data_uri, EffectError, EffectKind, EffectTicket, EffectTracker, ImageFile};
pub use errors::EditorError;
pub use mutations::{Mutation, MutationError, MutationResult, SEPARATOR_TOKEN};
pub use publish::{has_publishable_content, validate_publish, PublishError};
pub use session::{DiagramPreview, EditSession, Key, KeyEvent, KeyOutcome};
pub use slash::{SlashCommand, SlashMenu, SLASH_COMMANDS};
