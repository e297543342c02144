//! Tag and attribute conventions of stored post HTML.
//!
//! Both the serializer and the renderer speak this vocabulary; it is the
//! only contract between them.

use serde::{Deserialize, Serialize};

/// Attribute carrying the block discriminant on container elements
pub const BLOCK_TYPE_ATTR: &str = "data-block-type";

pub const CALLOUT_BLOCK: &str = "callout";
pub const TOC_BLOCK: &str = "toc";

/// Background of table-of-contents containers, also used to recognise
/// content saved before `data-block-type` existed
pub const TOC_BACKGROUND: &str = "#f9fafb";

/// Code block language rendered as a diagram
pub const DIAGRAM_LANGUAGE: &str = "mermaid";

/// Callout colours and their `(background, border)` hex pairs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalloutColor {
    #[default]
    Blue,
    Yellow,
    Red,
    Green,
    Gray,
}

impl CalloutColor {
    pub const ALL: [CalloutColor; 5] = [
        CalloutColor::Blue,
        CalloutColor::Yellow,
        CalloutColor::Red,
        CalloutColor::Green,
        CalloutColor::Gray,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CalloutColor::Blue => "blue",
            CalloutColor::Yellow => "yellow",
            CalloutColor::Red => "red",
            CalloutColor::Green => "green",
            CalloutColor::Gray => "gray",
        }
    }

    pub fn background(&self) -> &'static str {
        match self {
            CalloutColor::Blue => "#eff6ff",
            CalloutColor::Yellow => "#fefce8",
            CalloutColor::Red => "#fef2f2",
            CalloutColor::Green => "#f0fdf4",
            CalloutColor::Gray => "#f9fafb",
        }
    }

    pub fn border(&self) -> &'static str {
        match self {
            CalloutColor::Blue => "#3b82f6",
            CalloutColor::Yellow => "#eab308",
            CalloutColor::Red => "#ef4444",
            CalloutColor::Green => "#22c55e",
            CalloutColor::Gray => "#6b7280",
        }
    }

    /// Map a stored background value back to its colour; unknown values are gray
    pub fn from_background(value: &str) -> Self {
        let value = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|color| value.contains(color.background()))
            .unwrap_or(CalloutColor::Gray)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|color| color.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

/// Value of a single property in an inline `style` attribute
pub fn style_property<'a>(style: &'a str, property: &str) -> Option<&'a str> {
    style.split(';').find_map(|decl| {
        let (name, value) = decl.split_once(':')?;
        name.trim()
            .eq_ignore_ascii_case(property)
            .then(|| value.trim())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_round_trip() {
        for color in CalloutColor::ALL {
            assert_eq!(CalloutColor::from_background(color.background()), color);
        }
        assert_eq!(CalloutColor::from_background("#123456"), CalloutColor::Gray);
        assert_eq!(CalloutColor::from_background(" #EFF6FF "), CalloutColor::Blue);
    }

    #[test]
    fn test_style_property() {
        let style = "display: flex; border-left: 4px solid #3b82f6;background-color:#eff6ff";
        assert_eq!(style_property(style, "background-color"), Some("#eff6ff"));
        assert_eq!(style_property(style, "border-left"), Some("4px solid #3b82f6"));
        assert_eq!(style_property(style, "color"), None);
    }
}
