//! Migration replay with the SQLite squasher layers.

mod common;
use common::*;

use oxide_dialect_core::migrate::{compare_schema, normalize_whitespace};
use oxide_dialect_sqlite::SqliteVersion;

const SCHEMA: &str = "CREATE TABLE player (
  id INTEGER PRIMARY KEY,
  name TEXT NOT NULL,
  team TEXT,
  score INTEGER NOT NULL DEFAULT 0
);
";

#[test]
fn rename_and_drop_fold_in_order() {
    let (folded, diagnostics) = replay(
        SqliteVersion::V3_35,
        SCHEMA,
        &[
            "ALTER TABLE player ADD COLUMN nickname TEXT;",
            "ALTER TABLE player RENAME COLUMN team TO squad;",
            "ALTER TABLE player DROP COLUMN score;",
        ],
    );
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    let canonical = "CREATE TABLE player (
      id INTEGER PRIMARY KEY,
      name TEXT NOT NULL,
      squad TEXT,
      nickname TEXT
    );";
    let diff = compare_schema(canonical, &folded);
    assert!(diff.is_match(), "{diff}");
}

#[test]
fn drop_column_needs_3_35() {
    let (folded, diagnostics) = replay(
        SqliteVersion::V3_33,
        SCHEMA,
        &["ALTER TABLE player DROP COLUMN team;"],
    );
    assert_eq!(
        diagnostics,
        ["DROP COLUMN is not supported by the active dialect"]
    );
    assert_eq!(folded, SCHEMA);
}

#[test]
fn rename_column_needs_3_25() {
    let (_, diagnostics) = replay(
        SqliteVersion::V3_24,
        SCHEMA,
        &["ALTER TABLE player RENAME COLUMN team TO squad;"],
    );
    assert_eq!(
        diagnostics,
        ["RENAME COLUMN is not supported by the active dialect"]
    );
}

#[test]
fn dropping_a_keyed_column_is_rejected() {
    let (folded, diagnostics) = replay(
        SqliteVersion::V3_38,
        "CREATE TABLE player (id INTEGER PRIMARY KEY, name TEXT);
         CREATE INDEX player_name ON player(name);",
        &[
            "ALTER TABLE player DROP COLUMN id;",
            "ALTER TABLE player DROP COLUMN name;",
        ],
    );
    assert_eq!(
        diagnostics,
        [
            "Cannot drop id: it is part of a PRIMARY KEY or UNIQUE constraint",
            "Cannot drop name: it is used by index player_name",
        ]
    );
    assert_eq!(
        normalize_whitespace(&folded),
        "CREATE TABLE player (id INTEGER PRIMARY KEY, name TEXT); CREATE INDEX player_name ON player(name);"
    );
}

#[test]
fn new_tables_and_renames_across_files() {
    let (folded, diagnostics) = replay(
        SqliteVersion::V3_25,
        SCHEMA,
        &[
            "CREATE TABLE team (id INTEGER PRIMARY KEY, title TEXT NOT NULL);",
            "ALTER TABLE team RENAME TO squad;\nALTER TABLE squad RENAME COLUMN title TO label;",
        ],
    );
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    let canonical = format!("{SCHEMA}\nCREATE TABLE squad (id INTEGER PRIMARY KEY, label TEXT NOT NULL);");
    assert!(compare_schema(&canonical, &folded).is_match());
}

#[test]
fn quoted_rename_targets_stay_quoted() {
    let (folded, diagnostics) = replay(
        SqliteVersion::V3_35,
        SCHEMA,
        &[
            "ALTER TABLE player RENAME COLUMN team TO \"order\";",
            "ALTER TABLE player DROP COLUMN score;",
            "ALTER TABLE player RENAME TO \"my player\";\nALTER TABLE \"my player\" ADD COLUMN rank INTEGER;",
        ],
    );
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    let canonical = "CREATE TABLE \"my player\" (
      id INTEGER PRIMARY KEY,
      name TEXT NOT NULL,
      \"order\" TEXT,
      rank INTEGER
    );";
    let diff = compare_schema(canonical, &folded);
    assert!(diff.is_match(), "{diff}");
}
