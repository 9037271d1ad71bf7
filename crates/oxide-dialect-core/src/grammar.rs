//! Dialect-gated syntax features.
//!
//! The parser accepts a base SQL grammar everywhere. Syntax that only some
//! dialects (or dialect versions) understand is gated behind a [`Feature`];
//! a [`Grammar`] is the set of features a dialect installs.

use core::fmt;

/// A syntax extension that only some dialects accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    /// `INSERT ... ON CONFLICT (...) DO NOTHING | DO UPDATE SET ...`
    Upsert,
    /// `f(...) OVER (PARTITION BY ... ORDER BY ...)`
    WindowFunctions,
    /// `ORDER BY x NULLS FIRST | NULLS LAST`
    NullsOrdering,
    /// `UPDATE t SET ... FROM other`
    UpdateFrom,
    /// `INSERT | UPDATE | DELETE ... RETURNING ...`
    Returning,
    /// `doc -> path` and `doc ->> path`
    JsonOperators,
    /// `ALTER TABLE t RENAME [COLUMN] a TO b`
    RenameColumn,
    /// `ALTER TABLE t DROP [COLUMN] c`
    DropColumn,
    /// `ADD ... FIRST | AFTER c`
    ColumnPositions,
    /// `ALTER TABLE t MODIFY ...` and `CHANGE ...`
    ModifyColumn,
    /// `ALTER TABLE t ALTER [COLUMN] c TYPE | SET NOT NULL | DROP NOT NULL`
    AlterColumn,
}

impl Feature {
    /// Every feature, in declaration order.
    pub const ALL: [Self; 11] = [
        Self::Upsert,
        Self::WindowFunctions,
        Self::NullsOrdering,
        Self::UpdateFrom,
        Self::Returning,
        Self::JsonOperators,
        Self::RenameColumn,
        Self::DropColumn,
        Self::ColumnPositions,
        Self::ModifyColumn,
        Self::AlterColumn,
    ];

    const fn bit(self) -> u16 {
        1 << (self as u16)
    }

    /// Returns a human-readable name for error messages.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Upsert => "ON CONFLICT",
            Self::WindowFunctions => "window functions",
            Self::NullsOrdering => "NULLS FIRST/LAST",
            Self::UpdateFrom => "UPDATE ... FROM",
            Self::Returning => "RETURNING",
            Self::JsonOperators => "JSON operators",
            Self::RenameColumn => "RENAME COLUMN",
            Self::DropColumn => "DROP COLUMN",
            Self::ColumnPositions => "FIRST/AFTER column positions",
            Self::ModifyColumn => "MODIFY/CHANGE COLUMN",
            Self::AlterColumn => "ALTER COLUMN",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A set of enabled syntax features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Grammar {
    bits: u16,
}

impl Grammar {
    /// The base grammar with no extensions.
    #[must_use]
    pub const fn base() -> Self {
        Self { bits: 0 }
    }

    /// A grammar with every extension enabled.
    #[must_use]
    pub const fn all() -> Self {
        let mut grammar = Self::base();
        let mut i = 0;
        while i < Feature::ALL.len() {
            grammar = grammar.with(Feature::ALL[i]);
            i += 1;
        }
        grammar
    }

    /// Returns this grammar extended with a feature.
    #[must_use]
    pub const fn with(self, feature: Feature) -> Self {
        Self {
            bits: self.bits | feature.bit(),
        }
    }

    /// Returns true if the feature is enabled.
    #[must_use]
    pub const fn supports(&self, feature: Feature) -> bool {
        self.bits & feature.bit() != 0
    }

    /// Iterates over the enabled features.
    pub fn features(&self) -> impl Iterator<Item = Feature> + '_ {
        Feature::ALL.into_iter().filter(|f| self.supports(*f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_supports_nothing() {
        let grammar = Grammar::base();
        assert!(Feature::ALL.iter().all(|f| !grammar.supports(*f)));
    }

    #[test]
    fn test_extension_is_additive() {
        let parent = Grammar::base().with(Feature::Upsert);
        let child = parent.with(Feature::Returning);
        assert!(child.supports(Feature::Upsert));
        assert!(child.supports(Feature::Returning));
        assert!(!parent.supports(Feature::Returning));
        assert_eq!(
            child.features().collect::<Vec<_>>(),
            vec![Feature::Upsert, Feature::Returning]
        );
    }

    #[test]
    fn test_all() {
        assert_eq!(Grammar::all().features().count(), Feature::ALL.len());
    }
}
