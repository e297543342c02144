use blockpost_parser::ast::{is_void_element, Element, Node};
use blockpost_parser::{escape_attr, escape_text};
use serde::{Deserialize, Serialize};

/// Virtual DOM node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum VNode {
    /// HTML element; attributes keep source order
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
        children: Vec<VNode>,
    },

    /// Text node
    Text { content: String },

    /// Trusted markup emitted verbatim (rendered diagrams)
    Raw { html: String },

    /// Error node (shows a failed block inline instead of failing the page)
    Error {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        source: Option<String>,
    },
}

impl VNode {
    pub fn element(tag: impl Into<String>) -> Self {
        VNode::Element {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        VNode::Text {
            content: content.into(),
        }
    }

    pub fn raw(html: impl Into<String>) -> Self {
        VNode::Raw { html: html.into() }
    }

    pub fn error(message: impl Into<String>, source: Option<String>) -> Self {
        VNode::Error {
            message: message.into(),
            source,
        }
    }

    /// Convert a parsed node; comments and doctypes are dropped
    pub fn from_node(node: &Node) -> Option<Self> {
        match node {
            Node::Element(el) => Some(Self::from_element(el)),
            Node::Text { content } => Some(VNode::text(content.clone())),
            Node::Comment { .. } | Node::Doctype { .. } => None,
        }
    }

    /// Convert a parsed element with its attributes and subtree unchanged
    pub fn from_element(el: &Element) -> Self {
        Self::shallow(el).with_children(Self::convert_children(el))
    }

    /// Tag and attributes of `el`, without children
    pub fn shallow(el: &Element) -> Self {
        VNode::Element {
            tag: el.tag.clone(),
            attributes: el
                .attributes
                .iter()
                .map(|a| (a.name.clone(), a.value.clone().unwrap_or_default()))
                .collect(),
            children: Vec::new(),
        }
    }

    pub fn convert_children(el: &Element) -> Vec<VNode> {
        el.children.iter().filter_map(Self::from_node).collect()
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            VNode::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        match self {
            VNode::Element { attributes, .. } => attributes
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str()),
            _ => None,
        }
    }

    pub fn children(&self) -> &[VNode] {
        match self {
            VNode::Element { children, .. } => children,
            _ => &[],
        }
    }

    /// Set or replace an attribute
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let VNode::Element {
            ref mut attributes, ..
        } = self
        {
            let key = key.into();
            let value = value.into();
            match attributes.iter_mut().find(|(k, _)| *k == key) {
                Some(existing) => existing.1 = value,
                None => attributes.push((key, value)),
            }
        }
        self
    }

    /// Append to the `class` attribute
    pub fn with_class(self, class: &str) -> Self {
        let classes = match self.attr("class") {
            Some(existing) if !existing.is_empty() => format!("{existing} {class}"),
            _ => class.to_string(),
        };
        self.with_attr("class", classes)
    }

    pub fn with_child(mut self, child: VNode) -> Self {
        if let VNode::Element {
            ref mut children, ..
        } = self
        {
            children.push(child);
        }
        self
    }

    pub fn with_children(mut self, new_children: Vec<VNode>) -> Self {
        if let VNode::Element {
            ref mut children, ..
        } = self
        {
            children.extend(new_children);
        }
        self
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            VNode::Element { children, .. } => {
                for child in children {
                    child.collect_text(out);
                }
            }
            VNode::Text { content } => out.push_str(content),
            VNode::Raw { .. } | VNode::Error { .. } => {}
        }
    }

    /// First element (pre-order) whose `id` attribute equals `id`
    pub fn find_by_id(&self, id: &str) -> Option<&VNode> {
        if self.attr("id") == Some(id) {
            return Some(self);
        }
        self.children().iter().find_map(|c| c.find_by_id(id))
    }

    pub fn write_html(&self, out: &mut String) {
        match self {
            VNode::Element {
                tag,
                attributes,
                children,
            } => {
                out.push('<');
                out.push_str(tag);
                for (key, value) in attributes {
                    out.push(' ');
                    out.push_str(key);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(value));
                    out.push('"');
                }
                if is_void_element(tag) {
                    out.push_str(" />");
                    return;
                }
                out.push('>');
                for child in children {
                    child.write_html(out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
            VNode::Text { content } => out.push_str(&escape_text(content)),
            VNode::Raw { html } => out.push_str(html),
            VNode::Error { message, source } => {
                out.push_str("<div class=\"render-error\" role=\"alert\"><p class=\"render-error-message\">");
                out.push_str(&escape_text(message));
                out.push_str("</p>");
                if let Some(source) = source {
                    out.push_str("<pre class=\"render-error-source\">");
                    out.push_str(&escape_text(source));
                    out.push_str("</pre>");
                }
                out.push_str("</div>");
            }
        }
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }
}
