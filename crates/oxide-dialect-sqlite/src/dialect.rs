//! SQLite dialect implementation.

use core::fmt;
use core::str::FromStr;

use oxide_dialect_core::dialect::Dialect;
use oxide_dialect_core::grammar::{Feature, Grammar};
use oxide_dialect_core::resolver::{AnsiTypeResolver, TypeResolver};
use oxide_dialect_core::squash::{AnsiMigrationSquasher, MigrationSquasher};
use thiserror::Error;

use crate::resolver::{
    Sqlite318TypeResolver, Sqlite325TypeResolver, Sqlite335TypeResolver, Sqlite338TypeResolver,
};
use crate::squash::{Sqlite325MigrationSquasher, Sqlite335MigrationSquasher};

/// The SQLite releases with distinct grammar or typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SqliteVersion {
    /// 3.18, the oldest supported release.
    V3_18,
    /// 3.24: upsert.
    V3_24,
    /// 3.25: window functions and `RENAME COLUMN`.
    V3_25,
    /// 3.30: `NULLS FIRST/LAST`.
    V3_30,
    /// 3.33: `UPDATE ... FROM`.
    V3_33,
    /// 3.35: `RETURNING`, `DROP COLUMN` and math functions.
    V3_35,
    /// 3.38: JSON operators and functions.
    V3_38,
}

impl SqliteVersion {
    /// Every supported version, oldest first.
    pub const ALL: [Self; 7] = [
        Self::V3_18,
        Self::V3_24,
        Self::V3_25,
        Self::V3_30,
        Self::V3_33,
        Self::V3_35,
        Self::V3_38,
    ];

    /// The newest supported version.
    pub const LATEST: Self = Self::V3_38;

    /// The `major.minor` version number.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::V3_18 => "3.18",
            Self::V3_24 => "3.24",
            Self::V3_25 => "3.25",
            Self::V3_30 => "3.30",
            Self::V3_33 => "3.33",
            Self::V3_35 => "3.35",
            Self::V3_38 => "3.38",
        }
    }

    const fn dialect_name(self) -> &'static str {
        match self {
            Self::V3_18 => "sqlite-3.18",
            Self::V3_24 => "sqlite-3.24",
            Self::V3_25 => "sqlite-3.25",
            Self::V3_30 => "sqlite-3.30",
            Self::V3_33 => "sqlite-3.33",
            Self::V3_35 => "sqlite-3.35",
            Self::V3_38 => "sqlite-3.38",
        }
    }

    /// The syntax features this version adds over the previous one.
    const fn introduces(self) -> &'static [Feature] {
        match self {
            Self::V3_18 => &[],
            Self::V3_24 => &[Feature::Upsert],
            Self::V3_25 => &[Feature::WindowFunctions, Feature::RenameColumn],
            Self::V3_30 => &[Feature::NullsOrdering],
            Self::V3_33 => &[Feature::UpdateFrom],
            Self::V3_35 => &[Feature::Returning, Feature::DropColumn],
            Self::V3_38 => &[Feature::JsonOperators],
        }
    }
}

impl fmt::Display for SqliteVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A version string that names no supported SQLite release.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported SQLite version {0}; expected one of 3.18, 3.24, 3.25, 3.30, 3.33, 3.35, 3.38")]
pub struct UnknownVersion(pub String);

impl FromStr for SqliteVersion {
    type Err = UnknownVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == trimmed)
            .ok_or_else(|| UnknownVersion(trimmed.to_string()))
    }
}

/// SQLite dialect at a given version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SqliteDialect {
    version: SqliteVersion,
}

impl SqliteDialect {
    /// Creates the dialect for one SQLite version.
    #[must_use]
    pub const fn new(version: SqliteVersion) -> Self {
        Self { version }
    }

    /// Returns the dialect version.
    #[must_use]
    pub const fn version(&self) -> SqliteVersion {
        self.version
    }

    fn at_least(&self, version: SqliteVersion) -> bool {
        self.version >= version
    }
}

impl Default for SqliteDialect {
    fn default() -> Self {
        Self::new(SqliteVersion::LATEST)
    }
}

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        self.version.dialect_name()
    }

    fn grammar(&self) -> Grammar {
        SqliteVersion::ALL
            .into_iter()
            .filter(|v| *v <= self.version)
            .flat_map(|v| v.introduces().iter().copied())
            .fold(Grammar::base(), Grammar::with)
    }

    fn type_resolver(&self) -> Box<dyn TypeResolver> {
        let mut resolver: Box<dyn TypeResolver> =
            Box::new(Sqlite318TypeResolver::new(Box::new(AnsiTypeResolver::new())));
        if self.at_least(SqliteVersion::V3_25) {
            resolver = Box::new(Sqlite325TypeResolver::new(resolver));
        }
        if self.at_least(SqliteVersion::V3_35) {
            resolver = Box::new(Sqlite335TypeResolver::new(resolver));
        }
        if self.at_least(SqliteVersion::V3_38) {
            resolver = Box::new(Sqlite338TypeResolver::new(resolver));
        }
        resolver
    }

    fn migration_squasher(&self) -> Box<dyn MigrationSquasher> {
        let mut squasher: Box<dyn MigrationSquasher> = Box::new(AnsiMigrationSquasher::new());
        if self.at_least(SqliteVersion::V3_25) {
            squasher = Box::new(Sqlite325MigrationSquasher::new(squasher));
        }
        if self.at_least(SqliteVersion::V3_35) {
            squasher = Box::new(Sqlite335MigrationSquasher::new(squasher));
        }
        squasher
    }

    fn identifier_quote(&self) -> char {
        '"' // SQLite also accepts backticks, but double quotes are standard
    }
}

#[cfg(test)]
mod tests {
    use oxide_dialect_core::resolver::chain_names;

    use super::*;

    #[test]
    fn test_sqlite_dialect() {
        let dialect = SqliteDialect::default();
        assert_eq!(dialect.name(), "sqlite-3.38");
        assert_eq!(dialect.identifier_quote(), '"');
        let grammar = dialect.grammar();
        for feature in [
            Feature::Upsert,
            Feature::WindowFunctions,
            Feature::RenameColumn,
            Feature::NullsOrdering,
            Feature::UpdateFrom,
            Feature::Returning,
            Feature::DropColumn,
            Feature::JsonOperators,
        ] {
            assert!(grammar.supports(feature), "{feature}");
        }
        assert!(!grammar.supports(Feature::ColumnPositions));
        assert!(!grammar.supports(Feature::AlterColumn));
    }

    #[test]
    fn test_grammar_grows_with_version() {
        let old = SqliteDialect::new(SqliteVersion::V3_18).grammar();
        assert_eq!(old, Grammar::base());

        let upsert = SqliteDialect::new(SqliteVersion::V3_24).grammar();
        assert!(upsert.supports(Feature::Upsert));
        assert!(!upsert.supports(Feature::WindowFunctions));

        let returning = SqliteDialect::new(SqliteVersion::V3_35).grammar();
        assert!(returning.supports(Feature::Upsert));
        assert!(returning.supports(Feature::Returning));
        assert!(!returning.supports(Feature::JsonOperators));
        assert!(!returning.supports(Feature::ModifyColumn));
    }

    #[test]
    fn test_resolver_chain_per_version() {
        let chain = |v| chain_names(SqliteDialect::new(v).type_resolver().as_ref());
        assert_eq!(chain(SqliteVersion::V3_18), ["sqlite-3.18", "ansi"]);
        assert_eq!(chain(SqliteVersion::V3_24), ["sqlite-3.18", "ansi"]);
        assert_eq!(
            chain(SqliteVersion::V3_33),
            ["sqlite-3.25", "sqlite-3.18", "ansi"]
        );
        assert_eq!(
            chain(SqliteVersion::V3_38),
            ["sqlite-3.38", "sqlite-3.35", "sqlite-3.25", "sqlite-3.18", "ansi"]
        );
    }

    #[test]
    fn test_squasher_chain_per_version() {
        assert_eq!(
            SqliteDialect::new(SqliteVersion::V3_24).migration_squasher().name(),
            "ansi"
        );
        assert_eq!(
            SqliteDialect::new(SqliteVersion::V3_30).migration_squasher().name(),
            "sqlite-3.25"
        );
        assert_eq!(
            SqliteDialect::new(SqliteVersion::V3_38).migration_squasher().name(),
            "sqlite-3.35"
        );
    }

    #[test]
    fn test_version_parsing() {
        assert_eq!("3.25".parse::<SqliteVersion>(), Ok(SqliteVersion::V3_25));
        assert_eq!(" 3.38 ".parse::<SqliteVersion>(), Ok(SqliteVersion::V3_38));
        let err = "3.9".parse::<SqliteVersion>().unwrap_err();
        assert!(err.to_string().starts_with("unsupported SQLite version 3.9"));
        assert!(SqliteVersion::V3_18 < SqliteVersion::V3_38);
    }
}
