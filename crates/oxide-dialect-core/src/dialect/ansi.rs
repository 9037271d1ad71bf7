//! The dialect every other dialect starts from.

use super::Dialect;
use crate::grammar::Grammar;
use crate::resolver::{AnsiTypeResolver, TypeResolver};
use crate::squash::{AnsiMigrationSquasher, MigrationSquasher};

/// Plain ANSI SQL: the base grammar, the root resolver and the root
/// squasher.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnsiDialect;

impl AnsiDialect {
    /// Creates the ANSI dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for AnsiDialect {
    fn name(&self) -> &'static str {
        "ansi"
    }

    fn grammar(&self) -> Grammar {
        Grammar::base()
    }

    fn type_resolver(&self) -> Box<dyn TypeResolver> {
        Box::new(AnsiTypeResolver::new())
    }

    fn migration_squasher(&self) -> Box<dyn MigrationSquasher> {
        Box::new(AnsiMigrationSquasher::new())
    }
}
