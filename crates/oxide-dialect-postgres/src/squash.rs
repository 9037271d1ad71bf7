//! The PostgreSQL migration squasher layer.

use oxide_dialect_core::ast::{AlterTableRule, AlterTableRuleKind};
use oxide_dialect_core::squash::{MigrationSquasher, SquishContext};
use tracing::trace;

/// Folds `DROP COLUMN`, `RENAME COLUMN` and the `ALTER COLUMN` forms.
pub struct PostgresMigrationSquasher {
    parent: Box<dyn MigrationSquasher>,
}

impl PostgresMigrationSquasher {
    /// Wraps `parent`, normally the ANSI root squasher.
    #[must_use]
    pub fn new(parent: Box<dyn MigrationSquasher>) -> Self {
        Self { parent }
    }
}

impl MigrationSquasher for PostgresMigrationSquasher {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn parent(&self) -> Option<&dyn MigrationSquasher> {
        Some(self.parent.as_ref())
    }

    fn squish(&self, rule: &AlterTableRule, cx: &SquishContext<'_>) -> String {
        match &rule.kind {
            AlterTableRuleKind::DropColumn { column, .. } => cx.drop_column(column),
            AlterTableRuleKind::RenameColumn {
                old, new, new_span, ..
            } => cx.rename_column(old, new, *new_span),
            AlterTableRuleKind::AlterColumnType { column, data_type } => {
                trace!(
                    table = cx.table,
                    column = column.as_str(),
                    data_type = data_type.name.as_str(),
                    "Altering column type"
                );
                cx.alter_column_type(column, data_type)
            }
            AlterTableRuleKind::SetNotNull { column } => {
                trace!(table = cx.table, column = column.as_str(), "Setting NOT NULL");
                cx.set_not_null(column)
            }
            AlterTableRuleKind::DropNotNull { column } => {
                trace!(table = cx.table, column = column.as_str(), "Dropping NOT NULL");
                cx.drop_not_null(column)
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

    fn fold(target: &str, migration: &str) -> String {
        let Ok(Statement::AlterTable(alter)) = Parser::new(migration).parse_statement() else {
            panic!("not an ALTER TABLE: {migration}");
        };
        let cx = SquishContext::new(&alter.table, migration, target).unwrap();
        PostgresMigrationSquasher::new(Box::new(AnsiMigrationSquasher::new()))
            .squish(&alter.rules[0], &cx)
    }

    #[test]
    fn test_alter_type_keeps_constraints() {
        assert_eq!(
            fold(
                "CREATE TABLE t(\n  id INTEGER PRIMARY KEY,\n  n INTEGER NOT NULL\n)",
                "ALTER TABLE t ALTER COLUMN n TYPE bigint"
            ),
            "CREATE TABLE t(\n  id INTEGER PRIMARY KEY,\n  n bigint NOT NULL\n)"
        );
    }

    #[test]
    fn test_set_and_drop_not_null() {
        let target = "CREATE TABLE t(\n  a TEXT,\n  b TEXT NOT NULL\n)";
        assert_eq!(
            fold(target, "ALTER TABLE t ALTER a SET NOT NULL"),
            "CREATE TABLE t(\n  a TEXT NOT NULL,\n  b TEXT NOT NULL\n)"
        );
        assert_eq!(
            fold(target, "ALTER TABLE t ALTER COLUMN b DROP NOT NULL"),
            "CREATE TABLE t(\n  a TEXT,\n  b TEXT\n)"
        );
    }

    #[test]
    fn test_rename_and_drop() {
        assert_eq!(
            fold("CREATE TABLE t(a INT, b INT)", "ALTER TABLE t RENAME COLUMN a TO c"),
            "CREATE TABLE t(c INT, b INT)"
        );
        assert_eq!(
            fold("CREATE TABLE t(a INT, b INT)", "ALTER TABLE t DROP COLUMN a"),
            "CREATE TABLE t(b INT)"
        );
    }

    #[test]
    fn test_positions_are_not_postgres() {
        let target = "CREATE TABLE t(a INT)";
        assert_eq!(fold(target, "ALTER TABLE t MODIFY a BIGINT"), target);
    }
}
