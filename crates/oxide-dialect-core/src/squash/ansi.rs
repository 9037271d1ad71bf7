use crate::ast::{AlterTableRule, AlterTableRuleKind};

use super::{MigrationSquasher, PassthroughSquasher, SquishContext};

/// The rules every dialect accepts: `RENAME TO` and `ADD COLUMN` without a
/// position.
pub struct AnsiMigrationSquasher {
    parent: Box<dyn MigrationSquasher>,
}

impl AnsiMigrationSquasher {
    /// Creates the root squasher, ending in a passthrough.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Box::new(PassthroughSquasher),
        }
    }
}

impl Default for AnsiMigrationSquasher {
    fn default() -> Self {
        Self::new()
    }
}

impl MigrationSquasher for AnsiMigrationSquasher {
    fn name(&self) -> &'static str {
        "ansi"
    }

    fn parent(&self) -> Option<&dyn MigrationSquasher> {
        Some(self.parent.as_ref())
    }

    fn squish(&self, rule: &AlterTableRule, cx: &SquishContext<'_>) -> String {
        match &rule.kind {
            AlterTableRuleKind::RenameTable { name, name_span } => {
                cx.rename_table(name, *name_span)
            }
            AlterTableRuleKind::AddColumn {
                column,
                position: None,
            } => cx.add_column(column, None),
            _ => self.parent.squish(rule, cx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Statement;
    use crate::parser::Parser;

    fn fold(target: &str, migration: &str) -> String {
        let Ok(Statement::AlterTable(alter)) = Parser::new(migration).parse_statement() else {
            panic!("not an ALTER TABLE: {migration}");
        };
        let mut text = target.to_string();
        for rule in &alter.rules {
            let folded = {
                let cx = SquishContext::new(&alter.table, migration, &text).expect("table exists");
                AnsiMigrationSquasher::new().squish(rule, &cx)
            };
            text = folded;
        }
        text
    }

    #[test]
    fn test_rename_table() {
        assert_eq!(
            fold("CREATE TABLE t(a INT);", "ALTER TABLE t RENAME TO u"),
            "CREATE TABLE u(a INT);"
        );
    }

    #[test]
    fn test_add_column_appends() {
        assert_eq!(
            fold(
                "CREATE TABLE t(a INT);",
                "ALTER TABLE t ADD COLUMN b TEXT NOT NULL DEFAULT ''"
            ),
            "CREATE TABLE t(a INT,\n  b TEXT NOT NULL DEFAULT '');"
        );
    }

    #[test]
    fn test_unknown_rule_passes_through() {
        let target = "CREATE TABLE t(a INT, b INT);";
        assert_eq!(fold(target, "ALTER TABLE t DROP COLUMN b"), target);
    }

    #[test]
    fn test_squish_is_deterministic() {
        let target = "CREATE TABLE t(a INT);";
        let migration = "ALTER TABLE t ADD c BLOB";
        assert_eq!(fold(target, migration), fold(target, migration));
    }
}
