use crate::ast::*;
use crate::entities::decode_entities;
use crate::error::{ParseError, ParseErrors};
use crate::tokenizer::{tag_name, tokenize, Token};

/// Elements whose end tag may be omitted without it being reported
const OPTIONAL_END_TAGS: &[&str] = &["p", "li", "td", "th", "tr", "option"];

/// Block-level tags that implicitly close an open `<p>`
const CLOSES_PARAGRAPH: &[&str] = &[
    "address", "blockquote", "div", "figure", "h1", "h2", "h3", "h4", "h5", "h6", "hr", "ol",
    "p", "pre", "table", "ul",
];

/// Tolerant tree builder for HTML fragments.
///
/// Never fails: unmatched closers are dropped, unclosed elements are closed at
/// the end of input, and every repair is recorded in `errors`.
pub struct Parser<'src> {
    source: &'src str,
    tokens: Vec<(Token<'src>, Span)>,
    pos: usize,
    stack: Vec<Element>,
    roots: Vec<Node>,
    errors: ParseErrors,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            tokens: tokenize(source),
            pos: 0,
            stack: Vec::new(),
            roots: Vec::new(),
            errors: ParseErrors::new(),
        }
    }

    /// Parse the whole source into a fragment plus repair diagnostics
    pub fn parse_fragment(mut self) -> (Fragment, ParseErrors) {
        while let Some((token, span)) = self.advance() {
            match token {
                Token::OpenTag(raw) => self.open_tag(raw, span),
                Token::CloseTag(raw) => self.close_tag(raw, span),
                Token::Text(text) => {
                    let decoded = decode_entities(text);
                    self.push_text(&decoded);
                }
                Token::Lt => self.push_text("<"),
                Token::Comment(content) => self.attach(Node::Comment {
                    content: content.to_string(),
                }),
                Token::Doctype(content) => self.attach(Node::Doctype {
                    content: content.to_string(),
                }),
            }
        }

        while let Some(mut el) = self.stack.pop() {
            if !OPTIONAL_END_TAGS.contains(&el.tag.as_str()) {
                self.errors
                    .push(ParseError::unclosed_element(&el.tag, el.span.clone()));
            }
            el.span.end = self.source.len();
            self.attach(Node::Element(el));
        }

        if !self.errors.is_empty() {
            tracing::debug!(repairs = self.errors.len(), "repaired malformed html");
        }

        (Fragment { nodes: self.roots }, self.errors)
    }

    fn advance(&mut self) -> Option<(Token<'src>, Span)> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn open_tag(&mut self, raw: &'src str, span: Span) {
        let (tag, attributes, self_closing) = parse_open_tag(raw);
        self.close_implied(&tag);

        let mut element = Element {
            tag,
            attributes,
            children: Vec::new(),
            span,
        };

        if is_void_element(&element.tag) || self_closing {
            self.attach(Node::Element(element));
        } else if is_raw_text_element(&element.tag) {
            self.read_raw_text(&mut element);
            self.attach(Node::Element(element));
        } else {
            self.stack.push(element);
        }
    }

    /// Close elements whose end tag is implied by the opening of `tag`
    fn close_implied(&mut self, tag: &str) {
        match tag {
            "li" => self.close_until(&["li"], &["ul", "ol"]),
            "td" | "th" => self.close_until(&["td", "th"], &["tr", "table"]),
            "tr" => self.close_until(&["tr"], &["table", "thead", "tbody", "tfoot"]),
            _ if CLOSES_PARAGRAPH.contains(&tag) => {
                if self.stack.last().map(|el| el.tag == "p").unwrap_or(false) {
                    self.pop_and_attach();
                }
            }
            _ => {}
        }
    }

    /// Pop down through the nearest open element in `targets`, stopping at `boundaries`
    fn close_until(&mut self, targets: &[&str], boundaries: &[&str]) {
        let found = self
            .stack
            .iter()
            .rposition(|el| targets.contains(&el.tag.as_str()) || boundaries.contains(&el.tag.as_str()))
            .filter(|&i| targets.contains(&self.stack[i].tag.as_str()));

        if let Some(index) = found {
            while self.stack.len() > index {
                self.pop_and_attach();
            }
        }
    }

    fn close_tag(&mut self, raw: &'src str, span: Span) {
        let tag = tag_name(raw);
        if is_void_element(&tag) {
            return;
        }

        match self.stack.iter().rposition(|el| el.tag == tag) {
            Some(index) => {
                while self.stack.len() > index + 1 {
                    if let Some(el) = self.stack.last() {
                        if !OPTIONAL_END_TAGS.contains(&el.tag.as_str()) {
                            self.errors
                                .push(ParseError::unclosed_element(&el.tag, el.span.clone()));
                        }
                    }
                    self.pop_and_attach();
                }
                if let Some(mut el) = self.stack.pop() {
                    el.span.end = span.end;
                    self.attach(Node::Element(el));
                }
            }
            None => {
                self.errors.push(ParseError::unmatched_closing_tag(tag, span));
            }
        }
    }

    /// Consume everything up to the matching close tag as a single text child
    fn read_raw_text(&mut self, element: &mut Element) {
        let body_start = element.span.end;
        let closer = format!("</{}", element.tag);
        let lowered = self.source[body_start..].to_ascii_lowercase();

        let (body_end, resume_at) = match lowered.find(&closer) {
            Some(offset) => {
                let close_start = body_start + offset;
                let close_end = self.source[close_start..]
                    .find('>')
                    .map(|gt| close_start + gt + 1)
                    .unwrap_or(self.source.len());
                (close_start, close_end)
            }
            None => {
                self.errors
                    .push(ParseError::unclosed_element(&element.tag, element.span.clone()));
                (self.source.len(), self.source.len())
            }
        };

        let body = &self.source[body_start..body_end];
        if !body.is_empty() {
            element.children.push(Node::text(body));
        }
        element.span.end = resume_at;

        while self
            .tokens
            .get(self.pos)
            .map(|(_, span)| span.start < resume_at)
            .unwrap_or(false)
        {
            self.pos += 1;
        }
    }

    fn pop_and_attach(&mut self) {
        if let Some(el) = self.stack.pop() {
            self.attach(Node::Element(el));
        }
    }

    fn push_text(&mut self, text: &str) {
        let siblings = match self.stack.last_mut() {
            Some(parent) => &mut parent.children,
            None => &mut self.roots,
        };
        match siblings.last_mut() {
            Some(Node::Text { content }) => content.push_str(text),
            _ => siblings.push(Node::text(text)),
        }
    }

    fn attach(&mut self, node: Node) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.roots.push(node),
        }
    }
}

/// Split an opening tag slice into name, attributes and the self-closing flag
fn parse_open_tag(raw: &str) -> (String, Vec<Attribute>, bool) {
    let tag = tag_name(raw);
    let inner = raw
        .trim_start_matches('<')
        .trim_end_matches('>')
        .trim_end();
    let self_closing = inner.ends_with('/');
    let body = inner[tag.len().min(inner.len())..].trim_end_matches('/');

    let mut attributes = Vec::new();
    let mut chars = body.char_indices().peekable();

    loop {
        while let Some((_, c)) = chars.peek() {
            if c.is_whitespace() || *c == '/' {
                chars.next();
            } else {
                break;
            }
        }
        let Some(&(name_start, _)) = chars.peek() else {
            break;
        };

        let mut name_end = body.len();
        while let Some(&(i, c)) = chars.peek() {
            if c.is_whitespace() || c == '=' || c == '/' {
                name_end = i;
                break;
            }
            chars.next();
        }
        let name = body[name_start..name_end].to_ascii_lowercase();

        while let Some((_, c)) = chars.peek() {
            if c.is_whitespace() {
                chars.next();
            } else {
                break;
            }
        }

        let value = if chars.peek().map(|(_, c)| *c == '=').unwrap_or(false) {
            chars.next();
            while let Some((_, c)) = chars.peek() {
                if c.is_whitespace() {
                    chars.next();
                } else {
                    break;
                }
            }
            Some(read_attribute_value(body, &mut chars))
        } else {
            None
        };

        if !name.is_empty() {
            attributes.push(Attribute { name, value });
        }
    }

    (tag, attributes, self_closing)
}

fn read_attribute_value(
    body: &str,
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
) -> String {
    let Some(&(start, first)) = chars.peek() else {
        return String::new();
    };

    let raw = if first == '"' || first == '\'' {
        chars.next();
        let value_start = start + 1;
        let mut value_end = body.len();
        for (i, c) in chars.by_ref() {
            if c == first {
                value_end = i;
                break;
            }
        }
        &body[value_start..value_end]
    } else {
        let mut value_end = body.len();
        while let Some(&(i, c)) = chars.peek() {
            if c.is_whitespace() {
                value_end = i;
                break;
            }
            chars.next();
        }
        &body[start..value_end]
    };

    decode_entities(raw).into_owned()
}

/// Parse an HTML fragment, discarding repair diagnostics
pub fn parse(source: &str) -> Fragment {
    Parser::new(source).parse_fragment().0
}

/// Parse an HTML fragment and return the repair diagnostics alongside it
pub fn parse_with_diagnostics(source: &str) -> (Fragment, ParseErrors) {
    Parser::new(source).parse_fragment()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_tag_attributes() {
        let (tag, attrs, self_closing) =
            parse_open_tag(r#"<img src="a.png" alt='it&#39;s' data-x=1 hidden />"#);

        assert_eq!(tag, "img");
        assert!(self_closing);
        assert_eq!(attrs.len(), 4);
        assert_eq!(attrs[0].value.as_deref(), Some("a.png"));
        assert_eq!(attrs[1].value.as_deref(), Some("it's"));
        assert_eq!(attrs[2].value.as_deref(), Some("1"));
        assert_eq!(attrs[3].name, "hidden");
        assert_eq!(attrs[3].value, None);
    }

    #[test]
    fn test_attribute_value_with_spaces_around_equals() {
        let (_, attrs, _) = parse_open_tag(r#"<div style = "color: red; margin: 0">"#);
        assert_eq!(attrs[0].name, "style");
        assert_eq!(attrs[0].value.as_deref(), Some("color: red; margin: 0"));
    }

    #[test]
    fn test_raw_text_body_is_not_parsed() {
        let fragment = parse("<style>p > a { color: red }</style><p>x</p>");
        let style = fragment.elements().next().unwrap();
        assert_eq!(style.tag, "style");
        assert_eq!(style.text_content(), "p > a { color: red }");
        assert_eq!(fragment.elements().count(), 2);
    }
}
