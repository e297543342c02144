//! Input normalization for stored post content
//!
//! Stored content is not always clean HTML: older posts were saved
//! entity-escaped as a whole, and some are plain Markdown. Each step here is
//! idempotent and runs at most once per render.

use crate::entities::{decode_entities, escape_text};
use crate::tokenizer::tokenize;
use std::borrow::Cow;

/// Whether the source contains at least one real tag
pub fn contains_tags(source: &str) -> bool {
    tokenize(source).iter().any(|(token, _)| token.is_tag())
}

/// Whether the source contains entity-escaped markup such as `&lt;p&gt;`
pub fn contains_escaped_tags(source: &str) -> bool {
    source.match_indices("&lt;").any(|(i, _)| {
        source[i + 4..]
            .chars()
            .next()
            .map(|c| c.is_ascii_alphabetic() || c == '/' || c == '!')
            .unwrap_or(false)
    })
}

/// Decode a whole-document over-escape. Content that already has real tags is
/// returned unchanged so escaped code samples inside it survive.
pub fn decode_escaped_markup(source: &str) -> Cow<'_, str> {
    if !contains_tags(source) && contains_escaped_tags(source) {
        tracing::debug!("decoding entity-escaped document");
        return Cow::Owned(decode_entities(source).into_owned());
    }
    Cow::Borrowed(source)
}

/// Level of a Markdown ATX heading line (`# ` through `###### `)
fn markdown_heading(line: &str) -> Option<(usize, &str)> {
    let hashes = line.chars().take_while(|c| *c == '#').count();
    if !(1..=6).contains(&hashes) {
        return None;
    }
    let rest = &line[hashes..];
    let text = rest.strip_prefix(|c: char| c.is_whitespace())?;
    Some((hashes, text.trim()))
}

/// Convert Markdown heading lines to heading tags when the source has no tags.
/// All other lines are left untouched.
pub fn markdown_headings(source: &str) -> Cow<'_, str> {
    if contains_tags(source) || !source.lines().any(|l| markdown_heading(l).is_some()) {
        return Cow::Borrowed(source);
    }

    tracing::debug!("converting markdown headings");
    let converted = source
        .lines()
        .map(|line| match markdown_heading(line) {
            Some((level, text)) => {
                format!("<h{level}>{}</h{level}>", escape_text(text))
            }
            None => line.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n");
    Cow::Owned(converted)
}

/// Run every normalization step in order
pub fn normalize(source: &str) -> Cow<'_, str> {
    match decode_escaped_markup(source) {
        Cow::Borrowed(s) => markdown_headings(s),
        Cow::Owned(decoded) => Cow::Owned(markdown_headings(&decoded).into_owned()),
    }
}
