//! Comparing folded schema text with the canonical schema.
//!
//! Both texts are split into statements and each statement is collapsed to
//! a single normalized line, so layout differences never count. What
//! remains is diffed statement by statement.

use core::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::parser::Parser;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| compile(r"\s+"));
static AFTER_OPEN: LazyLock<Regex> = LazyLock::new(|| compile(r"\(\s+"));
static BEFORE_CLOSE: LazyLock<Regex> = LazyLock::new(|| compile(r"\s+\)"));
static BEFORE_COMMA: LazyLock<Regex> = LazyLock::new(|| compile(r"\s+,"));

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("whitespace pattern {pattern}: {e}"))
}

// ================================================================
// Normalization
// ================================================================

/// Collapses runs of whitespace to one space and drops the spaces just
/// inside parentheses and before commas.
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    let text = WHITESPACE.replace_all(text.trim(), " ");
    let text = AFTER_OPEN.replace_all(&text, "(");
    let text = BEFORE_CLOSE.replace_all(&text, ")");
    BEFORE_COMMA.replace_all(&text, ",").into_owned()
}

/// Splits `text` into normalized statements.
///
/// Uses statement spans when the whole text parses, and plain `;`
/// boundaries otherwise.
fn statements(text: &str) -> Vec<String> {
    let parsed: Result<Vec<_>, _> = Parser::new(text).parse_script().into_iter().collect();
    match parsed {
        Ok(statements) => statements
            .iter()
            .map(|s| normalize_whitespace(s.span().text(text)))
            .collect(),
        Err(_) => text
            .split(';')
            .map(normalize_whitespace)
            .filter(|s| !s.is_empty())
            .collect(),
    }
}

// ================================================================
// Public types
// ================================================================

/// One line of a schema diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "statement", rename_all = "snake_case")]
pub enum DiffLine {
    /// Present in both.
    Same(String),
    /// Only in the canonical schema.
    Expected(String),
    /// Only in the folded schema.
    Actual(String),
}

impl fmt::Display for DiffLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Same(s) => write!(f, "  {s}"),
            Self::Expected(s) => write!(f, "- {s}"),
            Self::Actual(s) => write!(f, "+ {s}"),
        }
    }
}

/// Statement-level differences between two schema texts.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SchemaDiff {
    /// Every statement of both texts, in order.
    pub lines: Vec<DiffLine>,
}

impl SchemaDiff {
    /// Returns true if the texts hold the same statements.
    #[must_use]
    pub fn is_match(&self) -> bool {
        self.lines.iter().all(|l| matches!(l, DiffLine::Same(_)))
    }

    /// Lines that differ.
    pub fn changes(&self) -> impl Iterator<Item = &DiffLine> {
        self.lines
            .iter()
            .filter(|l| !matches!(l, DiffLine::Same(_)))
    }
}

impl fmt::Display for SchemaDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

// ================================================================
// Diff
// ================================================================

/// Compares the canonical schema with a folded one, modulo whitespace.
#[must_use]
pub fn compare_schema(expected: &str, actual: &str) -> SchemaDiff {
    let expected = statements(expected);
    let actual = statements(actual);
    SchemaDiff {
        lines: diff_lines(&expected, &actual),
    }
}

/// Longest-common-subsequence diff.
fn diff_lines(a: &[String], b: &[String]) -> Vec<DiffLine> {
    let (m, n) = (a.len(), b.len());
    // lcs[i][j] = length of the LCS of a[i..] and b[j..]
    let mut lcs = vec![vec![0usize; n + 1]; m + 1];
    for i in (0..m).rev() {
        for j in (0..n).rev() {
            lcs[i][j] = if a[i] == b[j] {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let mut lines = Vec::with_capacity(m.max(n));
    let (mut i, mut j) = (0, 0);
    while i < m && j < n {
        if a[i] == b[j] {
            lines.push(DiffLine::Same(a[i].clone()));
            i += 1;
            j += 1;
        } else if lcs[i + 1][j] >= lcs[i][j + 1] {
            lines.push(DiffLine::Expected(a[i].clone()));
            i += 1;
        } else {
            lines.push(DiffLine::Actual(b[j].clone()));
            j += 1;
        }
    }
    lines.extend(a[i..].iter().cloned().map(DiffLine::Expected));
    lines.extend(b[j..].iter().cloned().map(DiffLine::Actual));
    lines
}
