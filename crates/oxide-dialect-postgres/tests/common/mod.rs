#![allow(dead_code)]

use std::sync::Arc;

use oxide_dialect_core::migrate::{Migration, MigrationReplayer};
use oxide_dialect_core::{Analyzer, Diagnostic, Diagnostics, DialectRegistry, QueryReport};
use oxide_dialect_postgres::PostgresDialect;

pub fn registry() -> DialectRegistry {
    DialectRegistry::with_dialect(Arc::new(PostgresDialect::new()))
}

/// Analyzes `schema` then `sql`, returning the reports for `sql` and every
/// diagnostic of both passes.
pub fn analyze(schema: &str, sql: &str) -> (Vec<QueryReport>, Vec<Diagnostic>) {
    let registry = registry();
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

/// Analyzes `sql` and expects exactly one clean report.
pub fn single_report(schema: &str, sql: &str) -> QueryReport {
    let (mut reports, diagnostics) = analyze(schema, sql);
    assert!(diagnostics.is_empty(), "Unexpected diagnostics: {diagnostics:?}");
    assert_eq!(reports.len(), 1, "Expected one report for: {sql}");
    reports.remove(0)
}

/// `(sql_type, nullable)` for each result column.
pub fn types(report: &QueryReport) -> Vec<(&'static str, bool)> {
    report
        .columns
        .iter()
        .map(|c| (c.ty.sql_type, c.ty.nullable))
        .collect()
}

/// `(sql_type, nullable)` for each bind parameter.
pub fn parameter_types(report: &QueryReport) -> Vec<(&'static str, bool)> {
    report
        .parameters
        .iter()
        .map(|p| (p.ty.sql_type, p.ty.nullable))
        .collect()
}

pub fn messages(diagnostics: &[Diagnostic]) -> Vec<&str> {
    diagnostics.iter().map(|d| d.message.as_str()).collect()
}

/// Replays migrations numbered from 1.
pub fn replay(schema: &str, migrations: &[&str]) -> (String, Vec<String>) {
    let registry = registry();
    let migrations: Vec<Migration> = migrations
        .iter()
        .enumerate()
        .map(|(i, source)| Migration::new(format!("{:04}_step.sql", i + 1), *source))
        .collect();
    let diagnostics = Diagnostics::new();
    let folded = MigrationReplayer::new(&registry)
        .replay(schema, &migrations, &diagnostics)
        .unwrap_or_else(|e| panic!("Failed to replay: {e}"));
    let messages = diagnostics.into_vec().into_iter().map(|d| d.message).collect();
    (folded, messages)
}
