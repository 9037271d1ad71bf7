//! Rendering outcomes as text or JSON.

use std::fmt::Write as _;

use oxide_dialect_core::{Diagnostic, QueryReport, TypeDescriptor};
use serde::Serialize;

use crate::config::OutputFormat;
use crate::error::Result;
use crate::verify::{ReplayOutcome, TypesOutcome};

/// Renders a replay outcome.
///
/// # Errors
///
/// Returns [`crate::VerifyError::Serialization`] if JSON rendering fails.
pub fn render_replay(outcome: &ReplayOutcome, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => json(outcome),
        OutputFormat::Text => Ok(replay_text(outcome)),
    }
}

/// Renders the resolved query types.
///
/// # Errors
///
/// Returns [`crate::VerifyError::Serialization`] if JSON rendering fails.
pub fn render_types(outcome: &TypesOutcome, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => json(outcome),
        OutputFormat::Text => Ok(types_text(outcome)),
    }
}

fn json(value: &impl Serialize) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn replay_text(outcome: &ReplayOutcome) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Replayed {} migration(s) with {}",
        outcome.migrations.len(),
        outcome.dialect
    );
    write_diagnostics(&mut out, &outcome.diagnostics);
    match &outcome.diff {
        Some(diff) if diff.is_match() => {
            let _ = writeln!(out, "Folded schema matches the canonical schema");
        }
        Some(diff) => {
            let _ = writeln!(out, "Folded schema differs from the canonical schema:");
            for line in diff.changes() {
                let _ = writeln!(out, "{line}");
            }
        }
        None => {
            let _ = writeln!(out, "{}", outcome.schema.trim_end());
        }
    }
    out
}

fn types_text(outcome: &TypesOutcome) -> String {
    let mut out = String::new();
    write_diagnostics(&mut out, &outcome.diagnostics);
    for file in &outcome.files {
        for report in &file.reports {
            write_report(&mut out, &file.file, report);
        }
    }
    out
}

fn write_diagnostics(out: &mut String, diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        let _ = writeln!(out, "{diagnostic}");
    }
}

fn write_report(out: &mut String, file: &str, report: &QueryReport) {
    let _ = writeln!(out, "{file} #{} {}", report.statement + 1, report.kind);
    for column in &report.columns {
        let _ = writeln!(out, "  {}: {}", column.name, describe(&column.ty));
    }
    for parameter in &report.parameters {
        let label = parameter
            .name
            .as_ref()
            .map_or_else(|| format!("?{}", parameter.position), |name| format!(":{name}"));
        let _ = writeln!(out, "  {label}: {}", describe(&parameter.ty));
    }
}

/// `VARCHAR? (string)`: the SQL type, `?` when nullable, and the host type.
fn describe(ty: &TypeDescriptor) -> String {
    let nullable = if ty.nullable { "?" } else { "" };
    match ty.native {
        Some(native) => format!("{}{nullable} ({})", ty.sql_type, native.as_str()),
        None => format!("{}{nullable}", ty.sql_type),
    }
}
