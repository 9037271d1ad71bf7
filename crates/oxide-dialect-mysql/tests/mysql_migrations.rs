//! Migration replay with the MySQL squasher.

mod common;
use common::*;

use oxide_dialect_core::migrate::{compare_schema, normalize_whitespace};

#[test]
fn add_after_drop_and_rename() {
    let (folded, diagnostics) = replay(
        "CREATE TABLE t(a INT, b INT, c INT);",
        &[
            "ALTER TABLE t ADD COLUMN d INT AFTER b;",
            "ALTER TABLE t DROP COLUMN a;",
            "ALTER TABLE t RENAME COLUMN c TO z;",
        ],
    );
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    assert_eq!(
        normalize_whitespace(&folded),
        "CREATE TABLE t(b INT, d INT, z INT);"
    );
}

#[test]
fn modify_and_change_fold_into_the_definition() {
    let schema = "CREATE TABLE `user` (
  id INT NOT NULL AUTO_INCREMENT PRIMARY KEY,
  name VARCHAR(50),
  bio TEXT,
  age TINYINT
);
";
    let (folded, diagnostics) = replay(
        schema,
        &[
            "ALTER TABLE `user` MODIFY name VARCHAR(120) NOT NULL;",
            "ALTER TABLE `user` CHANGE COLUMN bio about MEDIUMTEXT AFTER id;",
            "ALTER TABLE `user` MODIFY age SMALLINT UNSIGNED FIRST;",
        ],
    );
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    let canonical = "CREATE TABLE `user` (
      age SMALLINT UNSIGNED,
      id INT NOT NULL AUTO_INCREMENT PRIMARY KEY,
      about MEDIUMTEXT,
      name VARCHAR(120) NOT NULL
    );";
    let diff = compare_schema(canonical, &folded);
    assert!(diff.is_match(), "{diff}");
}

#[test]
fn invalid_rules_are_reported_and_skipped() {
    let schema = "CREATE TABLE t(id INT PRIMARY KEY, a INT, b INT);";
    let (folded, diagnostics) = replay(
        schema,
        &[
            "ALTER TABLE t ADD COLUMN c INT AFTER missing;",
            "ALTER TABLE t CHANGE a b INT;",
            "ALTER TABLE t DROP COLUMN id;",
            "ALTER TABLE t ADD COLUMN c INT FIRST;",
        ],
    );
    assert_eq!(
        diagnostics,
        [
            "No column found with name missing in table t",
            "Column b already exists in table t",
            "Cannot drop id: it is part of a PRIMARY KEY or UNIQUE constraint",
        ]
    );
    assert_eq!(
        normalize_whitespace(&folded),
        "CREATE TABLE t(c INT, id INT PRIMARY KEY, a INT, b INT);"
    );
}

#[test]
fn alter_column_is_not_mysql_syntax() {
    let schema = "CREATE TABLE t(a INT, b INT);";
    let (folded, diagnostics) = replay(schema, &["ALTER TABLE t ALTER COLUMN a TYPE BIGINT;"]);
    assert_eq!(
        diagnostics,
        ["ALTER COLUMN is not supported by the active dialect"]
    );
    assert_eq!(folded, schema);
}

#[test]
fn canonical_mismatch_is_reported_as_a_diff() {
    let (folded, _) = replay(
        "CREATE TABLE t(a INT, b INT);",
        &["ALTER TABLE t MODIFY b BIGINT;"],
    );
    let diff = compare_schema("CREATE TABLE t(a INT, b INT);", &folded);
    assert!(!diff.is_match());
    let rendered = diff.to_string();
    assert!(rendered.contains("BIGINT"), "{rendered}");
}
