//! Diagnostics for the tolerant HTML parser
//!
//! Parsing never fails outright; malformed markup is repaired and each repair
//! is recorded as a `ParseError` so callers can report it.

use crate::ast::Span;
use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Closing tag </{tag}> at {span:?} has no matching opening tag")]
    UnmatchedClosingTag { tag: String, span: Span },

    #[error("Element <{tag}> opened at {span:?} was never closed")]
    UnclosedElement { tag: String, span: Span },

    #[error("Lexer error at {span:?}")]
    LexError { span: Span },
}

impl ParseError {
    pub fn unmatched_closing_tag(tag: impl Into<String>, span: Span) -> Self {
        Self::UnmatchedClosingTag {
            tag: tag.into(),
            span,
        }
    }

    pub fn unclosed_element(tag: impl Into<String>, span: Span) -> Self {
        Self::UnclosedElement {
            tag: tag.into(),
            span,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            ParseError::UnmatchedClosingTag { span, .. } => span.clone(),
            ParseError::UnclosedElement { span, .. } => span.clone(),
            ParseError::LexError { span } => span.clone(),
        }
    }
}

/// Collection of diagnostics from a parse
#[derive(Debug, Default, Clone)]
pub struct ParseErrors {
    pub errors: Vec<ParseError>,
}

impl ParseErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn push(&mut self, error: ParseError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }
}

/// Pretty-print diagnostics with source context using ariadne
#[cfg(feature = "pretty-errors")]
pub fn format_errors(source: &str, filename: &str, errors: &ParseErrors) -> String {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    let mut output = Vec::new();

    for error in &errors.errors {
        let span = error.span();
        let message = match error {
            ParseError::UnmatchedClosingTag { .. } => "closing tag dropped",
            ParseError::UnclosedElement { .. } => "closed implicitly",
            ParseError::LexError { .. } => "unrecognised input",
        };

        let report = Report::build(ReportKind::Warning, filename, span.start)
            .with_message(error.to_string())
            .with_label(
                Label::new((filename, span.start..span.end))
                    .with_color(Color::Yellow)
                    .with_message(message),
            )
            .finish();

        if report
            .write((filename, Source::from(source)), &mut output)
            .is_err()
        {
            return "Error formatting failed".to_string();
        }
    }

    String::from_utf8(output).unwrap_or_else(|_| "Error formatting failed".to_string())
}
