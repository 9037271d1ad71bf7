//! SQLite migration squasher layers.

use oxide_dialect_core::ast::{AlterTableRule, AlterTableRuleKind};
use oxide_dialect_core::squash::{MigrationSquasher, SquishContext};
use tracing::trace;

/// `ALTER TABLE ... RENAME COLUMN`, available from 3.25.
pub struct Sqlite325MigrationSquasher {
    parent: Box<dyn MigrationSquasher>,
}

impl Sqlite325MigrationSquasher {
    /// Wraps `parent`, normally the ANSI root squasher.
    #[must_use]
    pub fn new(parent: Box<dyn MigrationSquasher>) -> Self {
        Self { parent }
    }
}

impl MigrationSquasher for Sqlite325MigrationSquasher {
    fn name(&self) -> &'static str {
        "sqlite-3.25"
    }

    fn parent(&self) -> Option<&dyn MigrationSquasher> {
        Some(self.parent.as_ref())
    }

    fn squish(&self, rule: &AlterTableRule, cx: &SquishContext<'_>) -> String {
        match &rule.kind {
            AlterTableRuleKind::RenameColumn {
                old, new, new_span, ..
            } => {
                trace!(table = cx.table, old = old.as_str(), new = new.as_str(), "Renaming column");
                cx.rename_column(old, new, *new_span)
            }
            _ => self.parent.squish(rule, cx),
        }
    }
}

/// `ALTER TABLE ... DROP COLUMN`, available from 3.35.
pub struct Sqlite335MigrationSquasher {
    parent: Box<dyn MigrationSquasher>,
}

impl Sqlite335MigrationSquasher {
    /// Wraps the 3.25 layer.
    #[must_use]
    pub fn new(parent: Box<dyn MigrationSquasher>) -> Self {
        Self { parent }
    }
}

impl MigrationSquasher for Sqlite335MigrationSquasher {
    fn name(&self) -> &'static str {
        "sqlite-3.35"
    }

    fn parent(&self) -> Option<&dyn MigrationSquasher> {
        Some(self.parent.as_ref())
    }

    fn squish(&self, rule: &AlterTableRule, cx: &SquishContext<'_>) -> String {
        match &rule.kind {
            AlterTableRuleKind::DropColumn { column, .. } => {
                trace!(table = cx.table, column = column.as_str(), "Dropping column");
                cx.drop_column(column)
            }
            _ => self.parent.squish(rule, cx),
        }
    }
}

#[cfg(test)]
mod tests {
    use oxide_dialect_core::Parser;
    use oxide_dialect_core::ast::Statement;
    use oxide_dialect_core::squash::AnsiMigrationSquasher;

    use super::*;

    fn squasher() -> Sqlite335MigrationSquasher {
        Sqlite335MigrationSquasher::new(Box::new(Sqlite325MigrationSquasher::new(Box::new(
            AnsiMigrationSquasher::new(),
        ))))
    }

    fn fold(target: &str, migration: &str) -> String {
        let Ok(Statement::AlterTable(alter)) = Parser::new(migration).parse_statement() else {
            panic!("not an ALTER TABLE: {migration}");
        };
        let cx = SquishContext::new(&alter.table, migration, target).unwrap();
        squasher().squish(&alter.rules[0], &cx)
    }

    #[test]
    fn test_rename_column_keeps_definition() {
        assert_eq!(
            fold(
                "CREATE TABLE t(a INT NOT NULL, b TEXT DEFAULT 'x');",
                "ALTER TABLE t RENAME COLUMN b TO label"
            ),
            "CREATE TABLE t(a INT NOT NULL, label TEXT DEFAULT 'x');"
        );
    }

    #[test]
    fn test_drop_column_rejoins() {
        assert_eq!(
            fold("CREATE TABLE t(a INT, b INT, c INT);", "ALTER TABLE t DROP COLUMN b"),
            "CREATE TABLE t(a INT,\n  c INT);"
        );
    }

    #[test]
    fn test_rename_table_reaches_the_root() {
        assert_eq!(
            fold("CREATE TABLE t(a INT);", "ALTER TABLE t RENAME TO u"),
            "CREATE TABLE u(a INT);"
        );
    }

    #[test]
    fn test_modify_is_not_sqlite() {
        let target = "CREATE TABLE t(a INT);";
        assert_eq!(fold(target, "ALTER TABLE t MODIFY a TEXT"), target);
    }
}
