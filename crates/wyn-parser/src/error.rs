use std::fmt;

use wyn_common::span::Span;

/// A parse error with location information.
///
/// The parser accumulates errors and keeps going (skipping to a likely
/// statement boundary), so one bad construct does not hide the rest of
/// the file.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseError {}
