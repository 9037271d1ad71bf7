#![allow(dead_code)]

use std::sync::Arc;

use oxide_dialect_core::ast::{AlterTableStatement, CreateTableStatement, Query, Statement};
use oxide_dialect_core::migrate::{Migration, MigrationReplayer};
use oxide_dialect_core::{
    AnsiDialect, Analyzer, Diagnostic, Diagnostics, Dialect, DialectRegistry, ParseError, Parser,
    QueryReport,
};

pub fn parse(sql: &str) -> Statement {
    Parser::new(sql)
        .parse_statement()
        .unwrap_or_else(|e| panic!("Failed to parse: {sql}\nError: {e:?}"))
}

pub fn parse_err(sql: &str) -> ParseError {
    Parser::new(sql)
        .parse_statement()
        .expect_err(&format!("Expected parse error for: {sql}"))
}

pub fn parse_select(sql: &str) -> Query {
    match parse(sql) {
        Statement::Select(s) => s,
        other => panic!("Expected SELECT, got {other:?}"),
    }
}

pub fn parse_create_table(sql: &str) -> CreateTableStatement {
    match parse(sql) {
        Statement::CreateTable(c) => c,
        other => panic!("Expected CREATE TABLE, got {other:?}"),
    }
}

pub fn parse_alter(sql: &str) -> AlterTableStatement {
    match parse(sql) {
        Statement::AlterTable(a) => a,
        other => panic!("Expected ALTER TABLE, got {other:?}"),
    }
}

pub fn registry(dialect: impl Dialect + 'static) -> DialectRegistry {
    DialectRegistry::with_dialect(Arc::new(dialect))
}

/// Analyzes `schema` then `sql` with `dialect`, returning the reports for
/// `sql` and every diagnostic of both passes.
pub fn analyze_with(
    dialect: impl Dialect + 'static,
    schema: &str,
    sql: &str,
) -> (Vec<QueryReport>, Vec<Diagnostic>) {
    let registry = registry(dialect);
    let mut analyzer = Analyzer::new(&registry);
    let diagnostics = Diagnostics::new();
    analyzer
        .analyze(schema, &diagnostics)
        .unwrap_or_else(|e| panic!("Failed to analyze schema: {e}"));
    let reports = analyzer
        .analyze(sql, &diagnostics)
        .unwrap_or_else(|e| panic!("Failed to analyze: {e}"));
    (reports, diagnostics.into_vec())
}

pub fn analyze(schema: &str, sql: &str) -> (Vec<QueryReport>, Vec<Diagnostic>) {
    analyze_with(AnsiDialect, schema, sql)
}

/// Analyzes `sql` and expects exactly one clean report.
pub fn single_report(schema: &str, sql: &str) -> QueryReport {
    let (mut reports, diagnostics) = analyze(schema, sql);
    assert!(diagnostics.is_empty(), "Unexpected diagnostics: {diagnostics:?}");
    assert_eq!(reports.len(), 1, "Expected one report for: {sql}");
    reports.remove(0)
}

/// `(name, sql_type, nullable)` for each result column.
pub fn columns(report: &QueryReport) -> Vec<(String, &'static str, bool)> {
    report
        .columns
        .iter()
        .map(|c| (c.name.clone(), c.ty.sql_type, c.ty.nullable))
        .collect()
}

/// `(sql_type, nullable)` for each bind parameter.
pub fn parameters(report: &QueryReport) -> Vec<(&'static str, bool)> {
    report
        .parameters
        .iter()
        .map(|p| (p.ty.sql_type, p.ty.nullable))
        .collect()
}

pub fn messages(diagnostics: &[Diagnostic]) -> Vec<&str> {
    diagnostics.iter().map(|d| d.message.as_str()).collect()
}

/// Replays migrations numbered from 1 with `dialect`.
pub fn replay_with(
    dialect: impl Dialect + 'static,
    schema: &str,
    migrations: &[&str],
) -> (String, Vec<Diagnostic>) {
    let registry = registry(dialect);
    let migrations: Vec<Migration> = migrations
        .iter()
        .enumerate()
        .map(|(i, source)| Migration::new(format!("{}.sqm", i + 1), *source))
        .collect();
    let diagnostics = Diagnostics::new();
    let folded = MigrationReplayer::new(&registry)
        .replay(schema, &migrations, &diagnostics)
        .unwrap_or_else(|e| panic!("Failed to replay: {e}"));
    (folded, diagnostics.into_vec())
}
