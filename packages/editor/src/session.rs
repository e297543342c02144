//! # Edit Session
//!
//! One user's editing state for a document: the document itself, the slash
//! menu, the list-exit tracker and outstanding async effects.
//!
//! The host forwards raw input (`input`) and key presses (`key_down`); the
//! session turns them into mutations. A [`KeyOutcome::PassThrough`] tells
//! the host to apply its default behaviour for the key.

use crate::block::{BlockId, BlockKind, BlockType, CodeLanguage};
use crate::effects::{EffectError, EffectKind, EffectTicket, EffectTracker, ImageFile};
use crate::slash::{self, SlashCommand, SlashMenu};
use crate::{Document, Mutation, MutationResult};
use blockpost_parser::{parse, Element, Node};
use std::collections::HashMap;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Backspace,
    ArrowUp,
    ArrowDown,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub shift: bool,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self { key, shift: false }
    }

    pub fn shift(key: Key) -> Self {
        Self { key, shift: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The session handled the key; the host should suppress its default
    Handled,
    /// Leave the key to the host
    PassThrough,
}

/// Latest diagram render for a code block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagramPreview {
    Rendered { svg: String },
    Failed { message: String, source: String },
}

/// Single-user edit session
pub struct EditSession {
    document: Document,
    slash_menu: SlashMenu,

    /// List block whose empty last item already saw one Enter
    last_empty_item: Option<BlockId>,

    effects: EffectTracker,
    previews: HashMap<BlockId, DiagramPreview>,
}

impl EditSession {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            slash_menu: SlashMenu::Closed,
            last_empty_item: None,
            effects: EffectTracker::new(),
            previews: HashMap::new(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn slash_menu(&self) -> &SlashMenu {
        &self.slash_menu
    }

    /// Commands to show while the menu is open
    pub fn menu_commands(&self) -> Vec<&'static SlashCommand> {
        self.slash_menu.query().map(slash::filter).unwrap_or_default()
    }

    pub fn take_focus(&mut self) -> Option<BlockId> {
        self.document.take_focus()
    }

    /// Apply a mutation directly (toolbars, drag and drop)
    pub fn apply(&mut self, mutation: Mutation) -> MutationResult {
        let result = self.document.apply(mutation);
        self.drop_stale_state();
        result
    }

    /// New content typed into a block
    pub fn input(&mut self, id: &BlockId, content: &str) -> MutationResult {
        self.last_empty_item = None;
        let result = self.document.update_block_content(id, content);

        if let Some(block) = self.document.block(id) {
            if block.block_type() == BlockType::Code {
                return result;
            }
            let text = block.plain_text();
            let was_open = self.slash_menu.is_open_for(id);
            self.slash_menu.on_text(id, text.trim_start());
            if was_open != self.slash_menu.is_open_for(id) {
                debug!(block = %id, open = !was_open, "slash menu");
            }
        } else if self.slash_menu.is_open_for(id) {
            self.slash_menu.close();
        }
        result
    }

    /// Key pressed while `id` has focus
    pub fn key_down(&mut self, id: &BlockId, event: KeyEvent) -> KeyOutcome {
        let Some(index) = self.document.index_of(id) else {
            return KeyOutcome::PassThrough;
        };
        let block_type = self.document.blocks()[index].block_type();

        let other_block = self.last_empty_item.as_ref() != Some(id);
        if event.key != Key::Enter || event.shift || other_block {
            self.last_empty_item = None;
        }

        if event.key == Key::Enter && !event.shift && self.slash_menu.is_open_for(id) {
            let query = self.slash_menu.query().unwrap_or_default().to_string();
            self.slash_menu.close();
            match slash::lookup(&query) {
                Some(command) => {
                    self.apply_command(id, command);
                }
                None => {
                    debug!(block = %id, %query, "no slash command matched");
                    self.document.insert_block(index, BlockType::Paragraph, "");
                }
            }
            return KeyOutcome::Handled;
        }

        if block_type.is_list() {
            return self.list_key_down(id, index, event);
        }

        if matches!(block_type, BlockType::Code | BlockType::Table) {
            return KeyOutcome::PassThrough;
        }

        match event.key {
            Key::Enter if event.shift => KeyOutcome::PassThrough,
            Key::Enter => {
                self.document.insert_block(index, BlockType::Paragraph, "");
                KeyOutcome::Handled
            }
            Key::Backspace if self.document.blocks()[index].is_empty() => {
                // Refused on the last block; the key is still consumed
                let result = self.document.remove_block(index);
                if !result.is_refused() {
                    self.drop_stale_state();
                }
                KeyOutcome::Handled
            }
            Key::ArrowUp if index > 0 => {
                let prev = self.document.blocks()[index - 1].id().clone();
                self.document.set_focus(&prev);
                KeyOutcome::Handled
            }
            Key::ArrowDown if index + 1 < self.document.len() => {
                let next = self.document.blocks()[index + 1].id().clone();
                self.document.set_focus(&next);
                KeyOutcome::Handled
            }
            _ => KeyOutcome::PassThrough,
        }
    }

    fn list_key_down(&mut self, id: &BlockId, index: usize, event: KeyEvent) -> KeyOutcome {
        if event.key != Key::Enter || event.shift {
            return KeyOutcome::PassThrough;
        }

        let content = self.document.blocks()[index].content().to_string();
        let Some(last_empty) = last_item_is_empty(&content) else {
            return KeyOutcome::PassThrough;
        };

        if !last_empty {
            self.last_empty_item = None;
            let updated = edit_list(&content, |list| list.children.push(Node::Element(Element::new("li"))));
            self.document.update_block_content(id, &updated);
            return KeyOutcome::Handled;
        }

        if self.last_empty_item.as_ref() == Some(id) {
            let updated = edit_list(&content, |list| {
                if let Some(pos) = list
                    .children
                    .iter()
                    .rposition(|n| n.as_element().is_some_and(|el| el.tag == "li"))
                {
                    list.children.remove(pos);
                }
            });
            self.document.update_block_content(id, &updated);
            self.document.insert_block(index, BlockType::Paragraph, "");
            self.last_empty_item = None;
            debug!(block = %id, "exited list");
        } else {
            self.last_empty_item = Some(id.clone());
        }
        KeyOutcome::Handled
    }

    /// Apply a slash command to the block holding the menu
    pub fn select_command(&mut self, id: &BlockId, command: &SlashCommand) -> MutationResult {
        self.slash_menu.close();
        self.apply_command(id, command)
    }

    fn apply_command(&mut self, id: &BlockId, command: &SlashCommand) -> MutationResult {
        let text = self
            .document
            .block(id)
            .map(|b| b.plain_text())
            .unwrap_or_default();
        let carry_over = slash::strip_command(&text).to_string();
        debug!(block = %id, command = command.name, "slash command");
        self.document
            .change_block_type(id, command.target, &carry_over)
    }

    /// Clipboard text for a block; `None` when there is nothing to copy
    pub fn copy_text(&self, id: &BlockId) -> Option<String> {
        let block = self.document.block(id)?;
        let text = match &block.kind {
            BlockKind::Code { content, .. } => content.clone(),
            BlockKind::Image { src, .. } => src.clone(),
            BlockKind::Table(table) => table.to_tsv(),
            _ => block.plain_text().trim().to_string(),
        };
        (!text.is_empty()).then_some(text)
    }

    /// Start reading an image file into an image block
    pub fn begin_image_read(&mut self, id: &BlockId) -> Option<EffectTicket> {
        let block = self.document.block(id)?;
        if block.block_type() != BlockType::Image {
            return None;
        }
        Some(self.effects.issue(id, EffectKind::ImageRead))
    }

    /// Finish an image read; true when the result was applied
    pub fn complete_image_read(
        &mut self,
        ticket: EffectTicket,
        result: Result<ImageFile, EffectError>,
    ) -> bool {
        if !self.settle(&ticket) {
            return false;
        }
        match result {
            Ok(file) => {
                let applied = self.document.apply(Mutation::SetImage {
                    id: ticket.block,
                    src: file.to_data_uri(),
                });
                !applied.is_refused()
            }
            Err(err) => {
                warn!(block = %ticket.block, error = %err, "image read failed");
                false
            }
        }
    }

    /// Start rendering a mermaid code block; returns the ticket and source
    pub fn begin_diagram(&mut self, id: &BlockId) -> Option<(EffectTicket, String)> {
        let block = self.document.block(id)?;
        let source = match &block.kind {
            BlockKind::Code {
                language: CodeLanguage::Mermaid,
                content,
            } if !content.trim().is_empty() => content.clone(),
            _ => return None,
        };
        Some((self.effects.issue(id, EffectKind::DiagramRender), source))
    }

    /// Finish a diagram render; true when the preview was updated
    pub fn complete_diagram(
        &mut self,
        ticket: EffectTicket,
        result: Result<String, EffectError>,
    ) -> bool {
        if !self.settle(&ticket) {
            return false;
        }
        let preview = match result {
            Ok(svg) => DiagramPreview::Rendered { svg },
            Err(err) => {
                warn!(block = %ticket.block, error = %err, "diagram render failed");
                let source = self
                    .document
                    .block(&ticket.block)
                    .map(|b| b.content().to_string())
                    .unwrap_or_default();
                DiagramPreview::Failed {
                    message: err.to_string(),
                    source,
                }
            }
        };
        self.previews.insert(ticket.block, preview);
        true
    }

    pub fn diagram_preview(&self, id: &BlockId) -> Option<&DiagramPreview> {
        self.previews.get(id)
    }

    pub fn pending_effects(&self) -> usize {
        self.effects.pending()
    }

    fn settle(&mut self, ticket: &EffectTicket) -> bool {
        if self.document.block(&ticket.block).is_none() {
            warn!(block = %ticket.block, "dropping result for removed block");
            self.effects.forget_block(&ticket.block);
            return false;
        }
        if !self.effects.settle(ticket) {
            warn!(block = %ticket.block, generation = ticket.generation, "dropping stale result");
            return false;
        }
        true
    }

    /// Forget menu, tracker and previews of blocks that no longer exist
    fn drop_stale_state(&mut self) {
        let doc = &self.document;
        if let SlashMenu::Open { block, .. } = &self.slash_menu {
            if doc.block(block).is_none() {
                self.slash_menu.close();
            }
        }
        if let Some(block) = &self.last_empty_item {
            if doc.block(block).is_none() {
                self.last_empty_item = None;
            }
        }
        self.previews.retain(|id, _| doc.block(id).is_some());
    }
}

/// Whether the last `<li>` of a list fragment is blank; `None` without items
fn last_item_is_empty(html: &str) -> Option<bool> {
    let fragment = parse(html);
    let list = fragment
        .elements()
        .find(|el| el.tag == "ul" || el.tag == "ol")?;
    let last = list.child_elements().filter(|el| el.tag == "li").last()?;
    Some(last.text_content().trim().is_empty())
}

fn edit_list(html: &str, f: impl FnOnce(&mut Element)) -> String {
    let mut fragment = parse(html);
    if let Some(list) = fragment
        .nodes
        .iter_mut()
        .filter_map(Node::as_element_mut)
        .find(|el| el.tag == "ul" || el.tag == "ol")
    {
        f(list);
    }
    fragment.to_html()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> (EditSession, BlockId) {
        let doc = Document::new("drafts/session");
        let id = doc.blocks()[0].id().clone();
        (EditSession::new(doc), id)
    }

    #[test]
    fn test_slash_code_enter_makes_code_block() {
        let (mut session, id) = session();
        session.input(&id, "/code");
        assert!(session.slash_menu().is_open_for(&id));

        let outcome = session.key_down(&id, KeyEvent::new(Key::Enter));

        assert_eq!(outcome, KeyOutcome::Handled);
        let block = session.document().block(&id).unwrap();
        assert_eq!(
            block.kind,
            BlockKind::Code {
                language: CodeLanguage::Javascript,
                content: String::new(),
            }
        );
        assert_eq!(session.document().len(), 1);
        assert!(!session.slash_menu().is_open());
    }

    #[test]
    fn test_slash_without_match_inserts_paragraph() {
        let (mut session, id) = session();
        session.input(&id, "/nothing");
        session.key_down(&id, KeyEvent::new(Key::Enter));

        assert_eq!(session.document().len(), 2);
        assert_eq!(session.document().blocks()[1].block_type(), BlockType::Paragraph);
        assert_eq!(session.slash_menu(), &SlashMenu::Closed);
    }

    #[test]
    fn test_menu_lists_filtered_commands() {
        let (mut session, id) = session();
        session.input(&id, "/h");
        let names: Vec<_> = session.menu_commands().iter().map(|c| c.name).collect();
        assert!(names.contains(&"h1"));
        assert!(!names.contains(&"code"));
    }

    #[test]
    fn test_shift_enter_passes_through() {
        let (mut session, id) = session();
        assert_eq!(
            session.key_down(&id, KeyEvent::shift(Key::Enter)),
            KeyOutcome::PassThrough
        );
        assert_eq!(session.document().len(), 1);
    }

    #[test]
    fn test_last_item_detection() {
        assert_eq!(last_item_is_empty("<ul><li>a</li><li> </li></ul>"), Some(true));
        assert_eq!(last_item_is_empty("<ol><li>a</li></ol>"), Some(false));
        assert_eq!(last_item_is_empty("<p>x</p>"), None);
    }
}
