//! Lexer for stored post HTML using logos
//!
//! Tags are lexed as whole tokens; attribute scanning happens in the parser.
//! A `<` that does not start a tag is its own token so that text like
//! `a < b` inside code blocks survives.

use logos::{Lexer, Logos};

/// Token types for HTML fragments
#[derive(Logos, Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token<'src> {
    /// `<!-- ... -->`, body without the delimiters
    #[token("<!--", lex_comment)]
    Comment(&'src str),

    /// `<!DOCTYPE html>` and friends
    #[regex(r"<![a-zA-Z][^>]*>", |lex| lex.slice())]
    Doctype(&'src str),

    /// Full opening tag including attributes, e.g. `<a href="#x">`
    #[regex(r#"<[a-zA-Z][a-zA-Z0-9:-]*([^<>"']|"[^"]*"|'[^']*')*>"#, |lex| lex.slice())]
    OpenTag(&'src str),

    /// Closing tag, e.g. `</p>`
    #[regex(r"</[a-zA-Z][a-zA-Z0-9:-]*[ \t\r\n]*>", |lex| lex.slice())]
    CloseTag(&'src str),

    #[regex(r"[^<]+", |lex| lex.slice())]
    Text(&'src str),

    /// A `<` that does not start a tag
    #[token("<")]
    Lt,
}

fn lex_comment<'src>(lex: &mut Lexer<'src, Token<'src>>) -> &'src str {
    let rest = lex.remainder();
    match rest.find("-->") {
        Some(end) => {
            lex.bump(end + 3);
            &rest[..end]
        }
        None => {
            lex.bump(rest.len());
            rest
        }
    }
}

impl<'src> Token<'src> {
    /// Whether this token is real markup (a tag, not text)
    pub fn is_tag(&self) -> bool {
        matches!(self, Token::OpenTag(_) | Token::CloseTag(_))
    }
}

/// Tokenize source into tokens with spans
pub fn tokenize(source: &str) -> Vec<(Token, std::ops::Range<usize>)> {
    let lexer = Token::lexer(source);
    lexer
        .spanned()
        .filter_map(|(result, span)| result.ok().map(|token| (token, span)))
        .collect()
}

/// Extract the lowercase tag name from an open or close tag slice
pub fn tag_name(tag: &str) -> String {
    tag.trim_start_matches('<')
        .trim_start_matches('/')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == ':')
        .collect::<String>()
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_and_text() {
        let tokens = tokenize("<p class=\"x\">Hello</p>");

        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].0, Token::OpenTag("<p class=\"x\">"));
        assert_eq!(tokens[1].0, Token::Text("Hello"));
        assert_eq!(tokens[2].0, Token::CloseTag("</p>"));
    }

    #[test]
    fn test_quoted_gt_in_attribute() {
        let tokens = tokenize(r#"<img alt="a > b" src="x.png" />"#);
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].0.is_tag());
    }

    #[test]
    fn test_stray_less_than_is_not_a_tag() {
        let tokens = tokenize("if a < b then");
        assert!(tokens.iter().all(|(t, _)| !t.is_tag()));
        assert!(tokens.iter().any(|(t, _)| *t == Token::Lt));
    }

    #[test]
    fn test_comment_and_doctype() {
        let tokens = tokenize("<!DOCTYPE html><!-- note --><p>x</p>");
        assert_eq!(tokens[0].0, Token::Doctype("<!DOCTYPE html>"));
        assert_eq!(tokens[1].0, Token::Comment(" note "));
        assert_eq!(tokens[1].1, 15..28);
    }

    #[test]
    fn test_tag_name() {
        assert_eq!(tag_name("<H1 id=\"x\">"), "h1");
        assert_eq!(tag_name("</blockquote >"), "blockquote");
        assert_eq!(tag_name("<br/>"), "br");
    }
}
