//! Parser error types.

use thiserror::Error;

use crate::grammar::Feature;
use crate::lexer::{Span, TokenKind};

/// A parse error.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message} at position {}..{}", span.start, span.end)]
pub struct ParseError {
    /// The error message.
    pub message: String,
    /// The location of the error.
    pub span: Span,
    /// Expected tokens (if applicable).
    pub expected: Option<String>,
    /// The actual token found.
    pub found: Option<TokenKind>,
    /// The grammar extension the input needed, when that is why it failed.
    pub feature: Option<Feature>,
}

impl ParseError {
    /// Creates a new parse error.
    #[must_use]
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            expected: None,
            found: None,
            feature: None,
        }
    }

    /// Creates an "unexpected token" error.
    #[must_use]
    pub fn unexpected(expected: impl Into<String>, found: TokenKind, span: Span) -> Self {
        let expected: String = expected.into();
        if matches!(found, TokenKind::Eof) {
            return Self::unexpected_eof(expected, span);
        }
        Self {
            message: format!("Unexpected token: expected {expected}, found {found:?}"),
            span,
            expected: Some(expected),
            found: Some(found),
            feature: None,
        }
    }

    /// Creates an "unexpected end of input" error.
    #[must_use]
    pub fn unexpected_eof(expected: impl Into<String>, span: Span) -> Self {
        let expected: String = expected.into();
        Self {
            message: format!("Unexpected end of input: expected {expected}"),
            span,
            expected: Some(expected),
            found: Some(TokenKind::Eof),
            feature: None,
        }
    }

    /// Creates an error for syntax the active grammar does not enable.
    #[must_use]
    pub fn unsupported(feature: Feature, span: Span) -> Self {
        Self {
            message: format!("{feature} is not supported by the active dialect"),
            span,
            expected: None,
            found: None,
            feature: Some(feature),
        }
    }
}
