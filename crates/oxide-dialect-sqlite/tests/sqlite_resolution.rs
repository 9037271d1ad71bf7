//! Type resolution across SQLite versions.

mod common;
use common::*;

use oxide_dialect_sqlite::SqliteVersion;

const SCHEMA: &str = "
    CREATE TABLE car (
      id INTEGER PRIMARY KEY,
      owner_id INTEGER NOT NULL,
      model TEXT NOT NULL,
      price NUMERIC,
      spec TEXT
    );
    CREATE TABLE owner (
      id INTEGER PRIMARY KEY,
      name TEXT NOT NULL
    );
";

#[test]
fn left_join_owner_side_is_nullable() {
    let report = single_report(
        SqliteVersion::V3_18,
        SCHEMA,
        "SELECT car.model, owner.name, owner.id FROM car LEFT JOIN owner ON owner.id = car.owner_id",
    );
    assert_eq!(
        types(&report),
        [("TEXT", false), ("TEXT", true), ("INTEGER", true)]
    );
}

#[test]
fn numeric_columns_are_real() {
    let report = single_report(SqliteVersion::V3_18, SCHEMA, "SELECT price FROM car");
    assert_eq!(types(&report), [("REAL", true)]);
}

#[test]
fn core_functions() {
    let report = single_report(
        SqliteVersion::V3_18,
        SCHEMA,
        "SELECT ifnull(price, 0), typeof(price), group_concat(model), total(price),
                datetime('now'), max(id, owner_id), instr(model, 'a'), last_insert_rowid()
         FROM car",
    );
    assert_eq!(
        types(&report),
        [
            ("REAL", false),
            ("TEXT", false),
            ("TEXT", true),
            ("REAL", false),
            ("TEXT", true),
            ("INTEGER", false),
            ("INTEGER", false),
            ("INTEGER", false),
        ]
    );
}

#[test]
fn window_functions_arrive_in_3_25() {
    let sql = "SELECT row_number() OVER (ORDER BY id), lag(price, 1, 0) OVER (PARTITION BY owner_id ORDER BY id) FROM car";

    let (reports, diagnostics) = analyze(SqliteVersion::V3_24, SCHEMA, sql);
    assert!(reports.is_empty());
    assert_eq!(
        messages(&diagnostics),
        ["window functions is not supported by the active dialect"]
    );

    let report = single_report(SqliteVersion::V3_25, SCHEMA, sql);
    assert_eq!(types(&report), [("INTEGER", false), ("REAL", true)]);
}

#[test]
fn aggregate_over_window_resolves_like_plain_aggregate() {
    let report = single_report(
        SqliteVersion::V3_30,
        SCHEMA,
        "SELECT sum(owner_id) OVER (ORDER BY id NULLS LAST), percent_rank() OVER (ORDER BY price) FROM car",
    );
    assert_eq!(types(&report), [("INTEGER", true), ("REAL", false)]);
}

#[test]
fn returning_arrives_in_3_35() {
    let sql = "UPDATE car SET price = ? WHERE id = ? RETURNING id, model";

    let (_, diagnostics) = analyze(SqliteVersion::V3_33, SCHEMA, sql);
    assert_eq!(
        messages(&diagnostics),
        ["RETURNING is not supported by the active dialect"]
    );

    let report = single_report(SqliteVersion::V3_35, SCHEMA, sql);
    assert_eq!(report.kind, "UPDATE");
    assert_eq!(
        columns(&report),
        [
            ("id".to_string(), "INTEGER", false),
            ("model".to_string(), "TEXT", false),
        ]
    );
    let parameters: Vec<_> = report
        .parameters
        .iter()
        .map(|p| (p.ty.sql_type, p.ty.nullable))
        .collect();
    assert_eq!(parameters, [("REAL", true), ("INTEGER", false)]);
}

#[test]
fn insert_returning_through_upsert() {
    let report = single_report(
        SqliteVersion::V3_35,
        SCHEMA,
        "INSERT INTO owner (id, name) VALUES (?, ?)
         ON CONFLICT (id) DO UPDATE SET name = excluded.name
         RETURNING id",
    );
    assert_eq!(types(&report), [("INTEGER", false)]);
}

#[test]
fn math_functions_arrive_in_3_35() {
    let sql = "SELECT sqrt(price), floor(owner_id), pi() FROM car";

    let (_, diagnostics) = analyze(SqliteVersion::V3_33, SCHEMA, sql);
    assert_eq!(
        messages(&diagnostics),
        [
            "Unknown function sqrt",
            "Unknown function floor",
            "Unknown function pi"
        ]
    );

    let report = single_report(SqliteVersion::V3_35, SCHEMA, sql);
    assert_eq!(
        types(&report),
        [("REAL", true), ("INTEGER", false), ("REAL", false)]
    );
}

#[test]
fn json_arrives_in_3_38() {
    let sql = "SELECT spec -> '$.wheels', spec ->> '$.color', json_array(id, model), json_extract(spec, '$.a') FROM car";

    let (_, diagnostics) = analyze(SqliteVersion::V3_35, SCHEMA, sql);
    assert_eq!(
        messages(&diagnostics),
        ["JSON operators is not supported by the active dialect"]
    );

    let report = single_report(SqliteVersion::V3_38, SCHEMA, sql);
    assert_eq!(
        types(&report),
        [("TEXT", true), ("TEXT", true), ("TEXT", false), ("TEXT", true)]
    );
}

#[test]
fn earlier_features_stay_visible_later() {
    // a 3.18 function and a 3.25 window in a 3.38 chain
    let report = single_report(
        SqliteVersion::V3_38,
        SCHEMA,
        "SELECT hex(model), rank() OVER (ORDER BY id) FROM car",
    );
    assert_eq!(types(&report), [("TEXT", false), ("INTEGER", false)]);
}

#[test]
fn unknown_column_type_is_reported() {
    let (_, diagnostics) = analyze(
        SqliteVersion::V3_38,
        "CREATE TABLE t (a VARCHAR(10), b BOOLEAN);",
        "SELECT a, b FROM t",
    );
    assert_eq!(
        messages(&diagnostics),
        ["Unknown type VARCHAR", "Unknown type BOOLEAN"]
    );
}
