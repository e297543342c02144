use crate::entities::{escape_attr, escape_text};
use serde::{Deserialize, Serialize};

/// Byte range in the source string
pub type Span = std::ops::Range<usize>;

/// Elements that never have children or a closing tag
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Elements whose body is kept as raw text
pub const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

pub fn is_raw_text_element(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&tag)
}

/// HTML attribute; boolean attributes have no value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: Option<String>,
}

/// A parsed HTML node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Node {
    Element(Element),
    /// Text with entities already decoded
    Text { content: String },
    Comment { content: String },
    Doctype { content: String },
}

/// A parsed HTML element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub tag: String,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
    pub span: Span,
}

/// Top-level node list produced by the parser
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Fragment {
    pub nodes: Vec<Node>,
}

impl Node {
    pub fn text(content: impl Into<String>) -> Self {
        Node::Text {
            content: content.into(),
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Whitespace-only text (or empty)
    pub fn is_blank_text(&self) -> bool {
        matches!(self, Node::Text { content } if content.trim().is_empty())
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text { content } => out.push_str(content),
            Node::Element(el) => {
                for child in &el.children {
                    child.collect_text(out);
                }
            }
            Node::Comment { .. } | Node::Doctype { .. } => {}
        }
    }

    pub fn write_html(&self, out: &mut String) {
        match self {
            Node::Element(el) => el.write_html(out),
            Node::Text { content } => out.push_str(&escape_text(content)),
            Node::Comment { content } => {
                out.push_str("<!--");
                out.push_str(content);
                out.push_str("-->");
            }
            Node::Doctype { content } => out.push_str(content),
        }
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            span: 0..0,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value.as_deref().unwrap_or(""))
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a.name.eq_ignore_ascii_case(name))
    }

    /// Set or replace an attribute value
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = Some(value.into());
        match self
            .attributes
            .iter_mut()
            .find(|a| a.name.eq_ignore_ascii_case(name))
        {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute {
                name: name.to_string(),
                value,
            }),
        }
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// Inline `style` attribute, empty when absent
    pub fn style(&self) -> &str {
        self.attr("style").unwrap_or("")
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// First descendant (depth-first, pre-order) with the given tag
    pub fn find(&self, tag: &str) -> Option<&Element> {
        for child in self.child_elements() {
            if child.tag == tag {
                return Some(child);
            }
            if let Some(found) = child.find(tag) {
                return Some(found);
            }
        }
        None
    }

    /// All descendants with the given tag, in document order
    pub fn find_all<'a>(&'a self, tag: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        self.collect_tag(tag, &mut found);
        found
    }

    fn collect_tag<'a>(&'a self, tag: &str, found: &mut Vec<&'a Element>) {
        for child in self.child_elements() {
            if child.tag == tag {
                found.push(child);
            }
            child.collect_tag(tag, found);
        }
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.collect_text(&mut out);
        }
        out
    }

    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        self.write_children(&mut out);
        out
    }

    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    pub fn write_open_tag(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for attr in &self.attributes {
            out.push(' ');
            out.push_str(&attr.name);
            if let Some(value) = &attr.value {
                out.push_str("=\"");
                out.push_str(&escape_attr(value));
                out.push('"');
            }
        }
        if is_void_element(&self.tag) {
            out.push_str(" />");
        } else {
            out.push('>');
        }
    }

    fn write_children(&self, out: &mut String) {
        if is_raw_text_element(&self.tag) {
            for child in &self.children {
                if let Node::Text { content } = child {
                    out.push_str(content);
                }
            }
            return;
        }
        for child in &self.children {
            child.write_html(out);
        }
    }

    pub fn write_html(&self, out: &mut String) {
        self.write_open_tag(out);
        if is_void_element(&self.tag) {
            return;
        }
        self.write_children(out);
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }
}

impl Fragment {
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.nodes.iter().filter_map(Node::as_element)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.iter().all(Node::is_blank_text)
    }

    /// All elements with the given tag anywhere in the fragment, in document order
    pub fn find_all<'a>(&'a self, tag: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        for el in self.elements() {
            if el.tag == tag {
                found.push(el);
            }
            el.collect_tag(tag, &mut found);
        }
        found
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            node.collect_text(&mut out);
        }
        out
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            node.write_html(&mut out);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attr_lookup_is_case_insensitive() {
        let mut el = Element::new("div");
        el.set_attr("Style", "color: red");
        assert_eq!(el.attr("style"), Some("color: red"));
        el.set_attr("style", "color: blue");
        assert_eq!(el.attributes.len(), 1);
        assert_eq!(el.style(), "color: blue");
    }

    #[test]
    fn test_write_html_escapes_text_and_attributes() {
        let mut el = Element::new("p");
        el.set_attr("title", "a \"b\"");
        el.children.push(Node::text("1 < 2 & 3"));
        assert_eq!(
            el.outer_html(),
            "<p title=\"a &quot;b&quot;\">1 &lt; 2 &amp; 3</p>"
        );
    }

    #[test]
    fn test_void_element_has_no_closing_tag() {
        let mut el = Element::new("img");
        el.set_attr("src", "x.png");
        assert_eq!(el.outer_html(), "<img src=\"x.png\" />");
    }

    #[test]
    fn test_classes() {
        let mut el = Element::new("code");
        el.set_attr("class", "language-rust  highlighted");
        assert!(el.has_class("language-rust"));
        assert!(!el.has_class("language"));
        assert_eq!(el.classes().count(), 2);
    }
}
