//! PostgreSQL dialect implementation.

use oxide_dialect_core::dialect::Dialect;
use oxide_dialect_core::grammar::{Feature, Grammar};
use oxide_dialect_core::resolver::{AnsiTypeResolver, TypeResolver};
use oxide_dialect_core::squash::{AnsiMigrationSquasher, MigrationSquasher};

use crate::resolver::PostgresTypeResolver;
use crate::squash::PostgresMigrationSquasher;

/// PostgreSQL dialect.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PostgresDialect;

impl PostgresDialect {
    /// Creates the dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn grammar(&self) -> Grammar {
        [
            Feature::Upsert,
            Feature::WindowFunctions,
            Feature::NullsOrdering,
            Feature::UpdateFrom,
            Feature::Returning,
            Feature::JsonOperators,
            Feature::RenameColumn,
            Feature::DropColumn,
            Feature::AlterColumn,
        ]
        .into_iter()
        .fold(Grammar::base(), Grammar::with)
    }

    fn type_resolver(&self) -> Box<dyn TypeResolver> {
        Box::new(PostgresTypeResolver::new(Box::new(AnsiTypeResolver::new())))
    }

    fn migration_squasher(&self) -> Box<dyn MigrationSquasher> {
        Box::new(PostgresMigrationSquasher::new(Box::new(
            AnsiMigrationSquasher::new(),
        )))
    }

    fn identifier_quote(&self) -> char {
        '"'
    }
}
