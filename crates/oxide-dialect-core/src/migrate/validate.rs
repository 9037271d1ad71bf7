//! Preconditions checked before a rule is folded.

use thiserror::Error;

use crate::ast::{AlterTableRule, AlterTableRuleKind, ColumnPosition, Statement};
use crate::parser::Parser;
use crate::squash::find_create_table;

/// Why an `ALTER TABLE` rule cannot be folded into the schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidRule {
    /// The altered table is not defined.
    #[error("No table found with name {0}")]
    MissingTable(String),
    /// A rename would collide with an existing table.
    #[error("Table already defined with name {0}")]
    TableExists(String),
    /// The rule names a column the table does not have.
    #[error("No column found with name {column} in table {table}")]
    MissingColumn {
        /// The altered table.
        table: String,
        /// The missing column.
        column: String,
    },
    /// The rule would create a second column with the same name.
    #[error("Column {column} already exists in table {table}")]
    ColumnExists {
        /// The altered table.
        table: String,
        /// The duplicated column.
        column: String,
    },
    /// Dropping the column would leave the table empty.
    #[error("Cannot drop {column}: it is the only column of table {table}")]
    OnlyColumn {
        /// The altered table.
        table: String,
        /// The dropped column.
        column: String,
    },
    /// The column is part of a primary key or unique constraint.
    #[error("Cannot drop {column}: it is part of a PRIMARY KEY or UNIQUE constraint")]
    KeyedColumn {
        /// The dropped column.
        column: String,
    },
    /// An index still covers the column.
    #[error("Cannot drop {column}: it is used by index {index}")]
    IndexedColumn {
        /// The dropped column.
        column: String,
        /// The covering index.
        index: String,
    },
}

/// Checks that `rule` can be folded into the definition of `table` found
/// in `schema`.
///
/// # Errors
///
/// Returns the first precondition the rule violates.
pub fn validate_rule(rule: &AlterTableRule, table: &str, schema: &str) -> Result<(), InvalidRule> {
    let create =
        find_create_table(schema, table).ok_or_else(|| InvalidRule::MissingTable(table.to_string()))?;
    let missing = |column: &str| InvalidRule::MissingColumn {
        table: create.name.clone(),
        column: column.to_string(),
    };
    let exists = |column: &str| InvalidRule::ColumnExists {
        table: create.name.clone(),
        column: column.to_string(),
    };

    if let Some(column) = rule.target_column()
        && create.column(column).is_none()
    {
        return Err(missing(column));
    }
    if let Some(ColumnPosition::After { column, .. }) = rule.position()
        && create.column(column).is_none()
    {
        return Err(missing(column));
    }

    match &rule.kind {
        AlterTableRuleKind::RenameTable { name, .. } => {
            if !name.eq_ignore_ascii_case(table) && find_create_table(schema, name).is_some() {
                return Err(InvalidRule::TableExists(name.clone()));
            }
        }
        AlterTableRuleKind::AddColumn { column, .. } => {
            if create.column(&column.name).is_some() {
                return Err(exists(&column.name));
            }
        }
        AlterTableRuleKind::RenameColumn { old, new, .. } => {
            if !old.eq_ignore_ascii_case(new) && create.column(new).is_some() {
                return Err(exists(new));
            }
        }
        AlterTableRuleKind::ChangeColumn { old, column, .. } => {
            if !old.eq_ignore_ascii_case(&column.name) && create.column(&column.name).is_some() {
                return Err(exists(&column.name));
            }
        }
        AlterTableRuleKind::DropColumn { column, .. } => {
            if create.columns.len() == 1 {
                return Err(InvalidRule::OnlyColumn {
                    table: create.name.clone(),
                    column: column.clone(),
                });
            }
            let keyed = create.column(column).is_some_and(|c| c.is_primary_key() || c.is_unique())
                || create.column_is_keyed(column);
            if keyed {
                return Err(InvalidRule::KeyedColumn {
                    column: column.clone(),
                });
            }
            if let Some(index) = covering_index(schema, &create.name, column) {
                return Err(InvalidRule::IndexedColumn {
                    column: column.clone(),
                    index,
                });
            }
        }
        AlterTableRuleKind::ModifyColumn { .. }
        | AlterTableRuleKind::AlterColumnType { .. }
        | AlterTableRuleKind::SetNotNull { .. }
        | AlterTableRuleKind::DropNotNull { .. } => {}
    }
    Ok(())
}

fn covering_index(schema: &str, table: &str, column: &str) -> Option<String> {
    Parser::new(schema)
        .parse_script()
        .into_iter()
        .find_map(|statement| match statement {
            Ok(Statement::CreateIndex(index))
                if index.table.eq_ignore_ascii_case(table)
                    && index.columns.iter().any(|c| c.eq_ignore_ascii_case(column)) =>
            {
                Some(index.name)
            }
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = "
        CREATE TABLE t(id INTEGER PRIMARY KEY, a INT, b INT UNIQUE, c INT);
        CREATE TABLE single(x INT);
        CREATE INDEX t_c ON t(c);
    ";

    fn check(sql: &str) -> Result<(), InvalidRule> {
        let Ok(Statement::AlterTable(alter)) = Parser::new(sql).parse_statement() else {
            panic!("not an ALTER TABLE: {sql}");
        };
        validate_rule(&alter.rules[0], &alter.table, SCHEMA)
    }

    #[test]
    fn test_valid_rules_pass() {
        assert_eq!(check("ALTER TABLE t DROP COLUMN a"), Ok(()));
        assert_eq!(check("ALTER TABLE t ADD COLUMN d INT AFTER a"), Ok(()));
        assert_eq!(check("ALTER TABLE t RENAME COLUMN a TO aa"), Ok(()));
    }

    #[test]
    fn test_drop_only_column_rejected() {
        assert_eq!(
            check("ALTER TABLE single DROP COLUMN x"),
            Err(InvalidRule::OnlyColumn {
                table: String::from("single"),
                column: String::from("x"),
            })
        );
    }

    #[test]
    fn test_drop_keyed_column_rejected() {
        assert!(matches!(
            check("ALTER TABLE t DROP COLUMN id"),
            Err(InvalidRule::KeyedColumn { .. })
        ));
        assert!(matches!(
            check("ALTER TABLE t DROP COLUMN b"),
            Err(InvalidRule::KeyedColumn { .. })
        ));
    }

    #[test]
    fn test_drop_indexed_column_rejected() {
        let err = check("ALTER TABLE t DROP COLUMN c").unwrap_err();
        assert_eq!(err.to_string(), "Cannot drop c: it is used by index t_c");
    }

    #[test]
    fn test_missing_targets_rejected() {
        assert_eq!(
            check("ALTER TABLE nope ADD COLUMN a INT"),
            Err(InvalidRule::MissingTable(String::from("nope")))
        );
        assert!(matches!(
            check("ALTER TABLE t RENAME COLUMN zz TO y"),
            Err(InvalidRule::MissingColumn { .. })
        ));
        assert!(matches!(
            check("ALTER TABLE t ADD COLUMN d INT AFTER zz"),
            Err(InvalidRule::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_duplicates_rejected() {
        assert!(matches!(
            check("ALTER TABLE t ADD COLUMN a INT"),
            Err(InvalidRule::ColumnExists { .. })
        ));
        assert!(matches!(
            check("ALTER TABLE t RENAME COLUMN a TO c"),
            Err(InvalidRule::ColumnExists { .. })
        ));
        assert_eq!(
            check("ALTER TABLE t RENAME TO single"),
            Err(InvalidRule::TableExists(String::from("single")))
        );
    }
}
