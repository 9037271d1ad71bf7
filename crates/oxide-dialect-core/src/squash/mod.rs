//! Folding `ALTER TABLE` rules into `CREATE TABLE` text.
//!
//! A [`MigrationSquasher`] takes one rule and the current schema text and
//! returns the whole rewritten text. Squashers form a chain like type
//! resolvers: each dialect layer handles the rules it introduces and
//! forwards the rest to its parent. [`PassthroughSquasher`] ends every chain
//! and returns the text unchanged.
//!
//! Squashers assume the rule is valid. Preconditions (the column exists, a
//! dropped column is not keyed) are checked by the caller before folding,
//! see [`crate::migrate`].

mod ansi;
mod edit;

pub use ansi::AnsiMigrationSquasher;
pub use edit::{
    COLUMN_SEPARATOR, Edit, apply_edits, column_text, name_text, with_leading_whitespace,
};

use crate::ast::{
    AlterTableRule, ColumnDef, ColumnPosition, CreateTableStatement, Statement, TypeName,
};
use crate::lexer::Span;
use crate::parser::Parser;

use edit::ColumnList;

/// Everything a squasher needs to fold one rule.
#[derive(Debug, Clone)]
pub struct SquishContext<'a> {
    /// The table the rule alters.
    pub table: &'a str,
    /// Source text the rule was parsed from; rule spans point into it.
    pub migration: &'a str,
    /// Schema text being rewritten.
    pub target: &'a str,
    /// The parsed `CREATE TABLE` for `table` inside `target`.
    pub create: CreateTableStatement,
}

impl<'a> SquishContext<'a> {
    /// Locates the `CREATE TABLE` for `table` in `target`.
    ///
    /// Returns `None` when the target holds no such statement.
    #[must_use]
    pub fn new(table: &'a str, migration: &'a str, target: &'a str) -> Option<Self> {
        let create = find_create_table(target, table)?;
        Some(Self {
            table,
            migration,
            target,
            create,
        })
    }

    /// The column definition named `name`.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.create.column(name)
    }

    fn rewrite(&self, edits: Vec<Edit>) -> String {
        apply_edits(self.target, edits)
    }

    fn columns(&self) -> ColumnList {
        ColumnList::new(&self.create, self.target)
    }

    /// Replaces the table name with `name` as spelled at `span` in the
    /// migration.
    #[must_use]
    pub fn rename_table(&self, name: &str, span: Span) -> String {
        let text = name_text(name, span, self.migration);
        self.rewrite(vec![Edit::replace(self.create.name_span, text)])
    }

    /// Inserts a column definition taken from the migration text.
    #[must_use]
    pub fn add_column(&self, column: &ColumnDef, position: Option<&ColumnPosition>) -> String {
        let mut columns = self.columns();
        columns.insert(&column.name, column_text(column, self.migration), position);
        self.rewrite(vec![columns.into_edit()])
    }

    /// Removes a column definition and re-joins the rest.
    #[must_use]
    pub fn drop_column(&self, name: &str) -> String {
        let mut columns = self.columns();
        if columns.remove(name).is_none() {
            return self.target.to_string();
        }
        self.rewrite(vec![columns.into_edit()])
    }

    /// Replaces the name of column `old` in place with `new` as spelled at
    /// `span` in the migration.
    #[must_use]
    pub fn rename_column(&self, old: &str, new: &str, span: Span) -> String {
        match self.column(old) {
            Some(column) => {
                let text = name_text(new, span, self.migration);
                self.rewrite(vec![Edit::replace(column.name_span, text)])
            }
            None => self.target.to_string(),
        }
    }

    /// Replaces the definition of column `old`, moving it when a position
    /// is given.
    #[must_use]
    pub fn replace_column(
        &self,
        old: &str,
        column: &ColumnDef,
        position: Option<&ColumnPosition>,
    ) -> String {
        let mut columns = self.columns();
        columns.replace(
            old,
            &column.name,
            column_text(column, self.migration),
            position,
        );
        self.rewrite(vec![columns.into_edit()])
    }

    /// Replaces the declared type of a column, adding one if it had none.
    #[must_use]
    pub fn alter_column_type(&self, name: &str, data_type: &TypeName) -> String {
        let Some(column) = self.column(name) else {
            return self.target.to_string();
        };
        let text = data_type.span.text(self.migration);
        let text = if text.is_empty() {
            data_type.to_sql()
        } else {
            text.to_string()
        };
        let edit = match &column.data_type {
            Some(existing) => Edit::replace(existing.span, text),
            None => Edit::insert(column.name_span.end, format!(" {text}")),
        };
        self.rewrite(vec![edit])
    }

    /// Appends `NOT NULL` to a column unless it already carries one.
    #[must_use]
    pub fn set_not_null(&self, name: &str) -> String {
        match self.column(name) {
            Some(column) if !column.is_not_null() => {
                self.rewrite(vec![Edit::insert(column.span.end, " NOT NULL")])
            }
            _ => self.target.to_string(),
        }
    }

    /// Removes a column's `NOT NULL` constraint.
    #[must_use]
    pub fn drop_not_null(&self, name: &str) -> String {
        let constraint = self.column(name).and_then(ColumnDef::not_null_constraint);
        match constraint {
            Some(constraint) => self.rewrite(vec![Edit::delete(with_leading_whitespace(
                self.target,
                constraint.span,
            ))]),
            None => self.target.to_string(),
        }
    }
}

/// Finds the `CREATE TABLE` statement for `table` in `source`.
///
/// Statements that fail to parse are skipped.
#[must_use]
pub fn find_create_table(source: &str, table: &str) -> Option<CreateTableStatement> {
    Parser::new(source)
        .parse_script()
        .into_iter()
        .find_map(|statement| match statement {
            Ok(Statement::CreateTable(create)) if create.name.eq_ignore_ascii_case(table) => {
                Some(create)
            }
            _ => None,
        })
}

/// A link in a migration squasher chain.
pub trait MigrationSquasher: Send + Sync {
    /// Name of the layer, for logging.
    fn name(&self) -> &'static str;

    /// The next squasher in the chain.
    fn parent(&self) -> Option<&dyn MigrationSquasher>;

    /// Folds `rule` into the schema text of `cx` and returns the whole
    /// rewritten text.
    ///
    /// The default forwards to the parent, or leaves the text unchanged at
    /// the end of the chain.
    fn squish(&self, rule: &AlterTableRule, cx: &SquishContext<'_>) -> String {
        match self.parent() {
            Some(parent) => parent.squish(rule, cx),
            None => cx.target.to_string(),
        }
    }
}

/// Ends a squasher chain: every rule leaves the text unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughSquasher;

impl MigrationSquasher for PassthroughSquasher {
    fn name(&self) -> &'static str {
        "passthrough"
    }

    fn parent(&self) -> Option<&dyn MigrationSquasher> {
        None
    }

    fn squish(&self, rule: &AlterTableRule, cx: &SquishContext<'_>) -> String {
        tracing::debug!(rule = rule.label(), table = cx.table, "No squasher handles rule");
        cx.target.to_string()
    }
}
