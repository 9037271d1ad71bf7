//! The MySQL migration squasher layer.

use oxide_dialect_core::ast::{AlterTableRule, AlterTableRuleKind};
use oxide_dialect_core::squash::{MigrationSquasher, SquishContext};
use tracing::trace;

/// Folds the MySQL `ALTER TABLE` forms: positional `ADD`, `DROP`,
/// `RENAME COLUMN`, `MODIFY` and `CHANGE`.
pub struct MySqlMigrationSquasher {
    parent: Box<dyn MigrationSquasher>,
}

impl MySqlMigrationSquasher {
    /// Wraps `parent`, normally the ANSI root squasher.
    #[must_use]
    pub fn new(parent: Box<dyn MigrationSquasher>) -> Self {
        Self { parent }
    }
}

impl MigrationSquasher for MySqlMigrationSquasher {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn parent(&self) -> Option<&dyn MigrationSquasher> {
        Some(self.parent.as_ref())
    }

    fn squish(&self, rule: &AlterTableRule, cx: &SquishContext<'_>) -> String {
        match &rule.kind {
            AlterTableRuleKind::AddColumn {
                column,
                position: Some(position),
            } => cx.add_column(column, Some(position)),
            AlterTableRuleKind::DropColumn { column, .. } => cx.drop_column(column),
            AlterTableRuleKind::RenameColumn {
                old, new, new_span, ..
            } => cx.rename_column(old, new, *new_span),
            AlterTableRuleKind::ModifyColumn { column, position } => {
                trace!(table = cx.table, column = column.name.as_str(), "Modifying column");
                cx.replace_column(&column.name, column, position.as_ref())
            }
            AlterTableRuleKind::ChangeColumn {
                old,
                column,
                position,
                ..
            } => {
                trace!(
                    table = cx.table,
                    old = old.as_str(),
                    new = column.name.as_str(),
                    "Changing column"
                );
                cx.replace_column(old, column, position.as_ref())
            }
            _ => self.parent.squish(rule, cx),
        }
    }
}
