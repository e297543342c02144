//! Slash-command table and menu state.

use crate::block::{BlockId, BlockType};

/// One entry of the slash menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlashCommand {
    /// Name typed after `/`
    pub name: &'static str,
    /// Label shown in the menu
    pub label: &'static str,
    pub target: BlockType,
}

pub const SLASH_COMMANDS: [SlashCommand; 12] = [
    SlashCommand { name: "h1", label: "H1", target: BlockType::Heading1 },
    SlashCommand { name: "h2", label: "H2", target: BlockType::Heading2 },
    SlashCommand { name: "h3", label: "H3", target: BlockType::Heading3 },
    SlashCommand { name: "paragraph", label: "Text", target: BlockType::Paragraph },
    SlashCommand { name: "code", label: "Code", target: BlockType::Code },
    SlashCommand { name: "image", label: "Image", target: BlockType::Image },
    SlashCommand { name: "table", label: "Table View", target: BlockType::Table },
    SlashCommand { name: "bulleted", label: "Bulleted List", target: BlockType::BulletedList },
    SlashCommand { name: "numbered", label: "Numbered List", target: BlockType::NumberedList },
    SlashCommand { name: "callout", label: "Callout", target: BlockType::Callout },
    SlashCommand { name: "quote", label: "Quote", target: BlockType::Quote },
    SlashCommand { name: "toc", label: "Table of Contents", target: BlockType::TableOfContents },
];

/// Command whose name equals `query`, ignoring case
pub fn lookup(query: &str) -> Option<&'static SlashCommand> {
    let query = query.trim();
    SLASH_COMMANDS
        .iter()
        .find(|cmd| cmd.name.eq_ignore_ascii_case(query))
}

/// Menu contents for `query`: commands whose name or label contains it
pub fn filter(query: &str) -> Vec<&'static SlashCommand> {
    let query = query.trim().to_lowercase();
    SLASH_COMMANDS
        .iter()
        .filter(|cmd| {
            query.is_empty()
                || cmd.name.contains(&query)
                || cmd.label.to_lowercase().contains(&query)
        })
        .collect()
}

/// Text left in a block once its leading `/command` is removed
pub fn strip_command(text: &str) -> &str {
    let Some(rest) = text.trim_start().strip_prefix('/') else {
        return text.trim();
    };
    let end = rest
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(rest.len());
    rest[end..].trim()
}

/// Slash menu state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SlashMenu {
    #[default]
    Closed,
    Open {
        block: BlockId,
        query: String,
    },
}

impl SlashMenu {
    pub fn is_open(&self) -> bool {
        matches!(self, SlashMenu::Open { .. })
    }

    pub fn is_open_for(&self, id: &BlockId) -> bool {
        matches!(self, SlashMenu::Open { block, .. } if block == id)
    }

    pub fn query(&self) -> Option<&str> {
        match self {
            SlashMenu::Open { query, .. } => Some(query),
            SlashMenu::Closed => None,
        }
    }

    /// Transition on new plain text for `block`
    pub fn on_text(&mut self, block: &BlockId, text: &str) {
        match text.strip_prefix('/') {
            Some(query) => {
                *self = SlashMenu::Open {
                    block: block.clone(),
                    query: query.to_string(),
                };
            }
            None if self.is_open_for(block) => *self = SlashMenu::Closed,
            None => {}
        }
    }

    pub fn close(&mut self) {
        *self = SlashMenu::Closed;
    }
}
