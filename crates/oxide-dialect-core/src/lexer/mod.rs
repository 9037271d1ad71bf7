//! Tokens and source spans.
//!
//! Keywords cover statement structure only; type names such as `BIGINT` or
//! `JSONB` stay identifiers so any dialect can give them meaning.

mod span;
mod token;
mod tokenizer;

pub use span::Span;
pub use token::{Keyword, Token, TokenKind};
pub use tokenizer::Lexer;
