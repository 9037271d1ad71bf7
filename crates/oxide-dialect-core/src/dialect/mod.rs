//! SQL dialect support.
//!
//! A dialect bundles everything that differs between databases and between
//! versions of one database: the syntax extensions the parser accepts, the
//! resolver chain that types expressions and the squasher chain that folds
//! migrations. Dialect versions are layered: a later version builds its
//! chains on top of the previous version's.

mod ansi;

pub use ansi::AnsiDialect;

use crate::grammar::Grammar;
use crate::resolver::TypeResolver;
use crate::squash::MigrationSquasher;

/// Trait for SQL dialect-specific behavior.
pub trait Dialect: Send + Sync {
    /// Returns the name of the dialect, including its version if any.
    fn name(&self) -> &'static str;

    /// Returns the syntax extensions the dialect installs.
    fn grammar(&self) -> Grammar;

    /// Builds the head of the dialect's resolver chain.
    fn type_resolver(&self) -> Box<dyn TypeResolver>;

    /// Builds the head of the dialect's migration squasher chain.
    fn migration_squasher(&self) -> Box<dyn MigrationSquasher>;

    /// Returns the identifier quote character (e.g., `"` for standard SQL, `` ` `` for MySQL).
    fn identifier_quote(&self) -> char {
        '"'
    }

    /// Quotes an identifier, doubling any embedded quote character.
    fn quote_identifier(&self, name: &str) -> String {
        let quote = self.identifier_quote();
        let escaped = name.replace(quote, &format!("{quote}{quote}"));
        format!("{quote}{escaped}{quote}")
    }
}
