//! User-facing semantic errors collected while analyzing SQL.

use core::cell::RefCell;
use core::fmt;

use serde::Serialize;

use crate::lexer::Span;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The statement cannot be resolved.
    Error,
    /// Suspicious but resolvable.
    Warning,
}

/// One problem found in user SQL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Diagnostic {
    /// Severity.
    pub severity: Severity,
    /// Offending source range.
    pub span: Span,
    /// Human-readable message.
    pub message: String,
    /// The file the span points into, when several are involved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Diagnostic {
    /// Creates an error diagnostic.
    #[must_use]
    pub fn error(span: Span, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            span,
            message: message.into(),
            file: None,
        }
    }

    /// Creates a warning diagnostic.
    #[must_use]
    pub fn warning(span: Span, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(span, message)
        }
    }

    /// Attaches the file name the span points into.
    #[must_use]
    pub fn in_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Returns the 1-based line and column of the span start in `source`.
    #[must_use]
    pub fn line_col(&self, source: &str) -> (usize, usize) {
        let before = source.get(..self.span.start).unwrap_or(source);
        let line = before.matches('\n').count() + 1;
        let col = before.rfind('\n').map_or(before.len(), |nl| before.len() - nl - 1) + 1;
        (line, col)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        if let Some(file) = &self.file {
            write!(f, "{file}: ")?;
        }
        write!(
            f,
            "{level}: {} ({}..{})",
            self.message, self.span.start, self.span.end
        )
    }
}

/// Receives diagnostics as they are found.
///
/// Reporting never interrupts analysis; the caller decides what to do with
/// the collected problems afterwards.
pub trait DiagnosticSink {
    /// Records one diagnostic.
    fn report(&self, diagnostic: Diagnostic);
}

/// A sink that keeps every diagnostic in order.
#[derive(Debug, Default)]
pub struct Diagnostics {
    items: RefCell<Vec<Diagnostic>>,
}

impl Diagnostics {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of diagnostics collected.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    /// Whether nothing was reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// Whether any error-severity diagnostic was reported.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.items
            .borrow()
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Returns a copy of the collected diagnostics.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Diagnostic> {
        self.items.borrow().clone()
    }

    /// Consumes the collection.
    #[must_use]
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items.into_inner()
    }
}

impl DiagnosticSink for Diagnostics {
    fn report(&self, diagnostic: Diagnostic) {
        self.items.borrow_mut().push(diagnostic);
    }
}

/// Forwards to another sink, dropping exact duplicates and counting what
/// passed through.
///
/// Resolution may visit an expression more than once (a sibling resolved to
/// type a parameter, a `CASE` arm unified twice); each problem is still
/// reported once.
pub(crate) struct Deduplicating<'a> {
    inner: &'a dyn DiagnosticSink,
    seen: RefCell<Vec<Diagnostic>>,
    file: Option<&'a str>,
}

impl<'a> Deduplicating<'a> {
    pub(crate) fn new(inner: &'a dyn DiagnosticSink, file: Option<&'a str>) -> Self {
        Self {
            inner,
            seen: RefCell::new(Vec::new()),
            file,
        }
    }

    /// Number of distinct diagnostics forwarded so far.
    pub(crate) fn count(&self) -> usize {
        self.seen.borrow().len()
    }
}

impl DiagnosticSink for Deduplicating<'_> {
    fn report(&self, diagnostic: Diagnostic) {
        let diagnostic = match self.file {
            Some(file) if diagnostic.file.is_none() => diagnostic.in_file(file),
            _ => diagnostic,
        };
        if self.seen.borrow().contains(&diagnostic) {
            return;
        }
        tracing::warn!(
            start = diagnostic.span.start,
            end = diagnostic.span.end,
            file = diagnostic.file.as_deref(),
            "{}",
            diagnostic.message
        );
        self.seen.borrow_mut().push(diagnostic.clone());
        self.inner.report(diagnostic);
    }
}
