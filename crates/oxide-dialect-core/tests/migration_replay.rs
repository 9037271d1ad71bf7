//! Migration replay through a layered squasher chain.

mod common;
use common::*;

use oxide_dialect_core::ast::{AlterTableRule, AlterTableRuleKind};
use oxide_dialect_core::migrate::{compare_schema, normalize_whitespace};
use oxide_dialect_core::resolver::{AnsiTypeResolver, TypeResolver};
use oxide_dialect_core::squash::{AnsiMigrationSquasher, MigrationSquasher, SquishContext};
use oxide_dialect_core::{Dialect, Grammar};

/// A layer folding positional adds, drops and column renames.
struct PositionalSquasher {
    parent: AnsiMigrationSquasher,
}

impl MigrationSquasher for PositionalSquasher {
    fn name(&self) -> &'static str {
        "positional"
    }

    fn parent(&self) -> Option<&dyn MigrationSquasher> {
        Some(&self.parent)
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
            _ => self.parent.squish(rule, cx),
        }
    }
}

struct PositionalDialect;

impl Dialect for PositionalDialect {
    fn name(&self) -> &'static str {
        "positional"
    }

    fn grammar(&self) -> Grammar {
        Grammar::all()
    }

    fn type_resolver(&self) -> Box<dyn TypeResolver> {
        Box::new(AnsiTypeResolver::new())
    }

    fn migration_squasher(&self) -> Box<dyn MigrationSquasher> {
        Box::new(PositionalSquasher {
            parent: AnsiMigrationSquasher::new(),
        })
    }
}

fn replay(schema: &str, migrations: &[&str]) -> (String, Vec<String>) {
    let (folded, diagnostics) = replay_with(PositionalDialect, schema, migrations);
    (
        folded,
        diagnostics.into_iter().map(|d| d.message).collect(),
    )
}

#[test]
fn add_drop_rename_scenario() {
    let (folded, diagnostics) = replay(
        "CREATE TABLE t(a INT, b INT, c INT)",
        &[
            "ALTER TABLE t ADD COLUMN d INT AFTER b;",
            "ALTER TABLE t DROP COLUMN a;",
            "ALTER TABLE t RENAME COLUMN c TO z;",
        ],
    );
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    assert_eq!(
        normalize_whitespace(&folded),
        "CREATE TABLE t(b INT, d INT, z INT)"
    );
}

#[test]
fn folded_text_keeps_untouched_layout() {
    let schema = "CREATE TABLE t(\n  a INT NOT NULL, -- key\n  b TEXT\n);";
    let (folded, _) = replay(schema, &["ALTER TABLE t RENAME COLUMN b TO label"]);
    assert_eq!(folded, "CREATE TABLE t(\n  a INT NOT NULL, -- key\n  label TEXT\n);");
}

#[test]
fn replay_is_deterministic() {
    let schema = "CREATE TABLE t(a INT, b INT);";
    let migrations = ["ALTER TABLE t ADD COLUMN c TEXT FIRST", "ALTER TABLE t DROP b"];
    assert_eq!(replay(schema, &migrations), replay(schema, &migrations));
}

#[test]
fn one_statement_with_several_rules() {
    let (folded, diagnostics) = replay(
        "CREATE TABLE t(a INT, b INT);",
        &["ALTER TABLE t ADD COLUMN c INT FIRST, DROP COLUMN b, RENAME TO u;"],
    );
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    assert_eq!(normalize_whitespace(&folded), "CREATE TABLE u(c INT, a INT);");
}

#[test]
fn drop_preconditions_are_enforced_before_folding() {
    let schema = "
        CREATE TABLE single(x INT);
        CREATE TABLE t(id INTEGER PRIMARY KEY, a INT, b INT UNIQUE, c INT);
        CREATE INDEX t_c ON t(c);
    ";
    let (folded, diagnostics) = replay(
        schema,
        &[
            "ALTER TABLE single DROP COLUMN x;",
            "ALTER TABLE t DROP COLUMN id;",
            "ALTER TABLE t DROP COLUMN b;",
            "ALTER TABLE t DROP COLUMN c;",
        ],
    );
    assert_eq!(
        diagnostics,
        [
            "Cannot drop x: it is the only column of table single",
            "Cannot drop id: it is part of a PRIMARY KEY or UNIQUE constraint",
            "Cannot drop b: it is part of a PRIMARY KEY or UNIQUE constraint",
            "Cannot drop c: it is used by index t_c",
        ]
    );
    assert!(compare_schema(schema, &folded).is_match());
}

#[test]
fn dropping_the_index_first_allows_the_drop() {
    let (folded, diagnostics) = replay(
        "CREATE TABLE t(a INT, c INT);\nCREATE INDEX t_c ON t(c);",
        &["DROP INDEX t_c;", "ALTER TABLE t DROP COLUMN c;"],
    );
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    assert_eq!(normalize_whitespace(&folded), "CREATE TABLE t(a INT);");
}

#[test]
fn canonical_mismatch_produces_diff() {
    let (folded, _) = replay(
        "CREATE TABLE t(a INT);",
        &["ALTER TABLE t ADD COLUMN b TEXT;", "CREATE TABLE u(x INT);"],
    );
    let diff = compare_schema("CREATE TABLE t(a INT, b INT);\nCREATE TABLE u(x INT);", &folded);
    assert!(!diff.is_match());
    let changes: Vec<String> = diff.changes().map(ToString::to_string).collect();
    assert_eq!(
        changes,
        ["- CREATE TABLE t(a INT, b INT)", "+ CREATE TABLE t(a INT, b TEXT)"]
    );
}

#[test]
fn unknown_rules_fall_through_to_passthrough() {
    let schema = "CREATE TABLE t(a INT);";
    let (folded, diagnostics) = replay(schema, &["ALTER TABLE t ALTER COLUMN a SET NOT NULL"]);
    assert!(diagnostics.is_empty());
    assert_eq!(folded, schema);
}
