//! Tests for parser error cases.

mod common;
use common::*;

use oxide_dialect_core::{Feature, Grammar, Parser};

#[test]
fn error_empty_input() {
    let _ = parse_err("");
}

#[test]
fn error_incomplete_select() {
    let _ = parse_err("SELECT");
}

#[test]
fn error_missing_from_table() {
    let _ = parse_err("SELECT * FROM");
}

#[test]
fn error_unexpected_keyword() {
    let _ = parse_err("TRUNCATE users");
}

#[test]
fn error_unclosed_paren() {
    let _ = parse_err("SELECT (1 + 2");
}

#[test]
fn error_alter_without_rule() {
    let _ = parse_err("ALTER TABLE t");
}

#[test]
fn gated_syntax_names_its_feature() {
    let cases = [
        ("SELECT row_number() OVER () FROM t", Feature::WindowFunctions),
        ("DELETE FROM t RETURNING id", Feature::Returning),
        ("SELECT doc -> 'a' FROM t", Feature::JsonOperators),
        ("ALTER TABLE t DROP COLUMN a", Feature::DropColumn),
        ("ALTER TABLE t ADD COLUMN a INT FIRST", Feature::ColumnPositions),
        ("ALTER TABLE t MODIFY a TEXT", Feature::ModifyColumn),
        ("ALTER TABLE t ALTER COLUMN a SET NOT NULL", Feature::AlterColumn),
    ];
    for (sql, feature) in cases {
        let err = Parser::with_grammar(sql, Grammar::base())
            .parse_statement()
            .expect_err(sql);
        assert_eq!(err.feature, Some(feature), "{sql}");
        assert!(err.to_string().contains(feature.as_str()), "{sql}");
    }
}

#[test]
fn enabled_feature_parses() {
    let grammar = Grammar::base().with(Feature::Returning);
    assert!(
        Parser::with_grammar("DELETE FROM t RETURNING id", grammar)
            .parse_statement()
            .is_ok()
    );
}

#[test]
fn script_reports_each_bad_statement() {
    let results = Parser::new("SELECT 1; SELEC 2; SELECT 3; DROP;").parse_script();
    let ok: Vec<bool> = results.iter().map(Result::is_ok).collect();
    assert_eq!(ok, [true, false, true, false]);
}
