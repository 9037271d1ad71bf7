//! Type resolution with the MySQL layer.

mod common;
use common::*;

use oxide_dialect_core::types::NativeType;

const SCHEMA: &str = "
    CREATE TABLE account (
      id BIGINT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY,
      age TINYINT UNSIGNED,
      level TINYINT NOT NULL,
      active TINYINT(1) NOT NULL DEFAULT 1,
      balance DECIMAL(12, 2) NOT NULL,
      rating FLOAT,
      email VARCHAR(255) NOT NULL,
      bio TEXT,
      created_at DATETIME NOT NULL,
      birthday DATE,
      profile JSON
    );
";

#[test]
fn narrow_columns_keep_their_variant() {
    let report = single_report(
        SCHEMA,
        "SELECT id, age, level, active, balance, rating, created_at, birthday FROM account",
    );
    assert_eq!(
        types(&report),
        [
            ("BIGINT", false),
            ("SMALLINT", true),
            ("TINYINT", false),
            ("BOOLEAN", false),
            ("DECIMAL", false),
            ("FLOAT", true),
            ("DATETIME", false),
            ("DATE", true),
        ]
    );
    let natives: Vec<_> = report.columns.iter().map(|c| c.ty.native).collect();
    assert_eq!(
        natives,
        [
            Some(NativeType::I64),
            Some(NativeType::I16),
            Some(NativeType::I8),
            Some(NativeType::Bool),
            Some(NativeType::Decimal),
            Some(NativeType::F32),
            Some(NativeType::Timestamp),
            Some(NativeType::Date),
        ]
    );
    assert!(report.columns.iter().all(|c| c.ty.dialect == "mysql"));
}

#[test]
fn descriptors_serialize_for_emitters() {
    let report = single_report(SCHEMA, "SELECT level FROM account");
    let value = serde_json::to_value(&report.columns[0].ty).unwrap();
    assert_eq!(value["dialect"], "mysql");
    assert_eq!(value["sql_type"], "TINYINT");
    assert_eq!(value["affinity"], "integer");
    assert_eq!(value["native"], "i8");
    assert_eq!(value["nullable"], false);
}

#[test]
fn mysql_functions() {
    let report = single_report(
        SCHEMA,
        "SELECT if(active, email, 'none'), ifnull(rating, 0), concat(email, bio),
                concat_ws(',', email, bio), now(), unix_timestamp(created_at),
                char_length(email), date_format(created_at, '%Y'), last_insert_id(),
                rand(), floor(rating)
         FROM account",
    );
    assert_eq!(
        types(&report),
        [
            ("TEXT", false),
            ("REAL", false),
            ("TEXT", true),
            ("TEXT", false),
            ("DATETIME", false),
            ("BIGINT", false),
            ("BIGINT", false),
            ("VARCHAR", true),
            ("BIGINT", false),
            ("DOUBLE", false),
            ("FLOAT", true),
        ]
    );
}

#[test]
fn greatest_and_least_unify_their_arguments() {
    let report = single_report(
        SCHEMA,
        "SELECT greatest(level, age), least(balance, balance), greatest(rating, 1.5) FROM account",
    );
    assert_eq!(
        types(&report),
        [("SMALLINT", true), ("DECIMAL", false), ("REAL", true)]
    );
}

#[test]
fn integers_and_single_floats_unify_to_double() {
    let report = single_report(
        SCHEMA,
        "SELECT id FROM account UNION SELECT rating FROM account",
    );
    assert_eq!(types(&report), [("REAL", true)]);

    let report = single_report(
        SCHEMA,
        "SELECT CASE WHEN level > 0 THEN id ELSE rating END, id + rating, level * rating,
                greatest(rating, rating)
         FROM account",
    );
    assert_eq!(
        types(&report),
        [("REAL", true), ("REAL", true), ("REAL", true), ("FLOAT", true)]
    );
    let natives: Vec<_> = report.columns.iter().map(|c| c.ty.native).collect();
    assert_eq!(
        natives,
        [
            Some(NativeType::F64),
            Some(NativeType::F64),
            Some(NativeType::F64),
            Some(NativeType::F32),
        ]
    );
}

#[test]
fn aggregates_follow_mysql_rules() {
    let report = single_report(
        SCHEMA,
        "SELECT sum(level), sum(balance), avg(rating), count(*), max(created_at), group_concat(email)
         FROM account",
    );
    assert_eq!(
        types(&report),
        [
            ("DECIMAL", true),
            ("DECIMAL", true),
            ("DOUBLE", true),
            ("INTEGER", false),
            ("DATETIME", true),
            ("TEXT", true),
        ]
    );
}

#[test]
fn window_functions() {
    let report = single_report(
        SCHEMA,
        "SELECT row_number() OVER (ORDER BY id), lag(balance) OVER (ORDER BY id),
                sum(level) OVER (PARTITION BY active)
         FROM account",
    );
    assert_eq!(
        types(&report),
        [("INTEGER", false), ("DECIMAL", true), ("DECIMAL", true)]
    );
}

#[test]
fn json_operators_and_functions() {
    let report = single_report(
        SCHEMA,
        "SELECT profile -> '$.name', profile ->> '$.name', json_extract(profile, '$.a'),
                json_object('id', id)
         FROM account",
    );
    assert_eq!(
        types(&report),
        [("JSON", true), ("TEXT", true), ("JSON", true), ("JSON", false)]
    );
}

#[test]
fn parameters_take_column_variants() {
    let report = single_report(
        SCHEMA,
        "UPDATE account SET level = ?, birthday = ? WHERE email = ? AND age > ?",
    );
    assert_eq!(report.kind, "UPDATE");
    assert!(report.columns.is_empty());
    assert_eq!(
        parameter_types(&report),
        [
            ("TINYINT", false),
            ("DATE", true),
            ("VARCHAR", false),
            ("SMALLINT", true),
        ]
    );
}

#[test]
fn duplicate_key_update() {
    let report = single_report(
        SCHEMA,
        "INSERT INTO account (email, level, balance, created_at) VALUES (?, ?, ?, now())
         ON DUPLICATE KEY UPDATE level = level + 1, balance = ?",
    );
    assert_eq!(report.kind, "INSERT");
    assert_eq!(
        parameter_types(&report),
        [
            ("VARCHAR", false),
            ("TINYINT", false),
            ("DECIMAL", false),
            ("DECIMAL", false),
        ]
    );
}

#[test]
fn casts_to_mysql_types() {
    let report = single_report(
        SCHEMA,
        "SELECT CAST(balance AS SIGNED), CAST(age AS CHAR), CAST(email AS DATE) FROM account",
    );
    assert_eq!(
        types(&report),
        [("BIGINT", false), ("CHAR", true), ("DATE", false)]
    );
}

#[test]
fn modified_columns_change_type() {
    let (reports, diagnostics) = analyze(
        SCHEMA,
        "ALTER TABLE account MODIFY level SMALLINT, CHANGE bio summary VARCHAR(80) NOT NULL;
         SELECT level, summary FROM account;",
    );
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    assert_eq!(types(&reports[0]), [("SMALLINT", true), ("VARCHAR", false)]);
}

#[test]
fn syntax_mysql_lacks_is_rejected() {
    let (reports, diagnostics) = analyze(
        SCHEMA,
        "DELETE FROM account WHERE id = ? RETURNING id;
         UPDATE account SET level = 1 FROM account AS other;
         SELECT id FROM account;",
    );
    assert_eq!(
        messages(&diagnostics),
        [
            "RETURNING is not supported by the active dialect",
            "UPDATE ... FROM is not supported by the active dialect",
        ]
    );
    assert_eq!(reports.len(), 1);
    assert_eq!(types(&reports[0]), [("BIGINT", false)]);
}

#[test]
fn unknown_types_are_reported() {
    let (_, diagnostics) = analyze("CREATE TABLE t (id UUID, tags TEXT);", "SELECT 1");
    assert_eq!(messages(&diagnostics), ["Unknown type UUID"]);
}
