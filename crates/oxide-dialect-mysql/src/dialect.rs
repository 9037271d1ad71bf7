//! MySQL dialect implementation.

use oxide_dialect_core::dialect::Dialect;
use oxide_dialect_core::grammar::{Feature, Grammar};
use oxide_dialect_core::resolver::{AnsiTypeResolver, TypeResolver};
use oxide_dialect_core::squash::{AnsiMigrationSquasher, MigrationSquasher};

use crate::resolver::MySqlTypeResolver;
use crate::squash::MySqlMigrationSquasher;

/// MySQL dialect.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MySqlDialect;

impl MySqlDialect {
    /// Creates the dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn grammar(&self) -> Grammar {
        [
            Feature::Upsert,
            Feature::WindowFunctions,
            Feature::JsonOperators,
            Feature::RenameColumn,
            Feature::DropColumn,
            Feature::ColumnPositions,
            Feature::ModifyColumn,
        ]
        .into_iter()
        .fold(Grammar::base(), Grammar::with)
    }

    fn type_resolver(&self) -> Box<dyn TypeResolver> {
        Box::new(MySqlTypeResolver::new(Box::new(AnsiTypeResolver::new())))
    }

    fn migration_squasher(&self) -> Box<dyn MigrationSquasher> {
        Box::new(MySqlMigrationSquasher::new(Box::new(AnsiMigrationSquasher::new())))
    }

    fn identifier_quote(&self) -> char {
        '`'
    }
}

#[cfg(test)]
mod tests {
    use oxide_dialect_core::resolver::chain_names;

    use super::*;

    #[test]
    fn test_mysql_dialect() {
        let dialect = MySqlDialect::new();
        assert_eq!(dialect.name(), "mysql");
        assert_eq!(dialect.identifier_quote(), '`');
        assert_eq!(dialect.quote_identifier("user"), "`user`");
        assert_eq!(dialect.quote_identifier("a`b"), "`a``b`");
    }

    #[test]
    fn test_grammar() {
        let grammar = MySqlDialect::new().grammar();
        assert!(grammar.supports(Feature::ColumnPositions));
        assert!(grammar.supports(Feature::ModifyColumn));
        assert!(grammar.supports(Feature::WindowFunctions));
        assert!(!grammar.supports(Feature::Returning));
        assert!(grammar.supports(Feature::Upsert));
        assert!(!grammar.supports(Feature::AlterColumn));
    }

    #[test]
    fn test_chains() {
        let dialect = MySqlDialect::new();
        assert_eq!(chain_names(dialect.type_resolver().as_ref()), ["mysql", "ansi"]);
        let squasher = dialect.migration_squasher();
        assert_eq!(squasher.name(), "mysql");
        assert_eq!(squasher.parent().map(MigrationSquasher::name), Some("ansi"));
    }
}
