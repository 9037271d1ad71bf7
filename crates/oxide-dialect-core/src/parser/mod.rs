//! SQL Parser
//!
//! A hand-written recursive descent parser with Pratt expression parsing,
//! restricted by the [`Grammar`](crate::grammar::Grammar) of the active dialect.

mod ddl;
mod error;
#[allow(clippy::module_inception)]
mod parser;
mod pratt;

pub use error::ParseError;
pub use parser::Parser;
