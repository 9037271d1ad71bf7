//! Span-based text surgery.
//!
//! Rewrites never re-print a parsed statement: they splice replacement text
//! into the original source at recorded byte offsets, so formatting and
//! comments outside the touched ranges survive unchanged.

use crate::ast::{ColumnDef, ColumnPosition, CreateTableStatement};
use crate::lexer::{Keyword, Span};

/// Separator placed between column definitions when a column list is rebuilt.
pub const COLUMN_SEPARATOR: &str = ",\n  ";

/// Replace the text covered by `span` with `replacement`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// Range of the original text to replace.
    pub span: Span,
    /// Text to put in its place.
    pub replacement: String,
}

impl Edit {
    /// Replaces a range.
    #[must_use]
    pub fn replace(span: Span, replacement: impl Into<String>) -> Self {
        Self {
            span,
            replacement: replacement.into(),
        }
    }

    /// Inserts text at an offset.
    #[must_use]
    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self::replace(Span::new(at, at), text)
    }

    /// Deletes a range.
    #[must_use]
    pub fn delete(span: Span) -> Self {
        Self::replace(span, String::new())
    }
}

/// Applies `edits` to `source` from left to right.
///
/// Edits overlapping an earlier one are dropped.
#[must_use]
pub fn apply_edits(source: &str, mut edits: Vec<Edit>) -> String {
    edits.sort_by_key(|e| (e.span.start, e.span.end));
    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;
    for edit in edits {
        if edit.span.start < cursor {
            tracing::debug!(
                start = edit.span.start,
                end = edit.span.end,
                "Dropping overlapping edit"
            );
            continue;
        }
        out.push_str(source.get(cursor..edit.span.start).unwrap_or_default());
        out.push_str(&edit.replacement);
        cursor = edit.span.end;
    }
    out.push_str(source.get(cursor..).unwrap_or_default());
    out
}

/// Widens `span` leftwards over the whitespace preceding it.
#[must_use]
pub fn with_leading_whitespace(source: &str, span: Span) -> Span {
    let before = source.get(..span.start).unwrap_or_default();
    let trimmed = before.trim_end();
    Span::new(trimmed.len(), span.end)
}

/// The text of a column definition as written, or a minimal rendering
/// when it carries no source location.
#[must_use]
pub fn column_text(column: &ColumnDef, source: &str) -> String {
    let text = column.span.text(source);
    if !text.is_empty() {
        return text.to_string();
    }
    match &column.data_type {
        Some(data_type) => format!("{} {}", column.name, data_type.to_sql()),
        None => column.name.clone(),
    }
}

/// A name as the migration spelled it, quotes included. Names without a
/// source location are double-quoted unless they lex as a bare identifier.
#[must_use]
pub fn name_text(name: &str, span: Span, source: &str) -> String {
    let text = span.text(source);
    if !text.is_empty() {
        return text.to_string();
    }
    let bare = name.chars().next().is_some_and(|c| c.is_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_alphanumeric() || c == '_')
        && Keyword::from_str(name).is_none();
    if bare {
        name.to_string()
    } else {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}

/// The column definitions of one `CREATE TABLE`, as editable text.
#[derive(Debug, Clone)]
pub(crate) struct ColumnList {
    span: Span,
    entries: Vec<(String, String)>,
}

impl ColumnList {
    pub(crate) fn new(create: &CreateTableStatement, source: &str) -> Self {
        Self {
            span: create.columns_span,
            entries: create
                .columns
                .iter()
                .map(|c| (c.name.clone(), c.span.text(source).to_string()))
                .collect(),
        }
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(n, _)| n.eq_ignore_ascii_case(name))
    }

    /// Inserts a definition at `position`, appending when absent or when
    /// the anchor column is missing.
    pub(crate) fn insert(&mut self, name: &str, text: String, position: Option<&ColumnPosition>) {
        let at = match position {
            Some(ColumnPosition::First) => 0,
            Some(ColumnPosition::After { column, .. }) => {
                self.index_of(column).map_or(self.entries.len(), |i| i + 1)
            }
            None => self.entries.len(),
        };
        self.entries.insert(at, (name.to_string(), text));
    }

    pub(crate) fn remove(&mut self, name: &str) -> Option<(String, String)> {
        let index = self.index_of(name)?;
        Some(self.entries.remove(index))
    }

    /// Replaces a definition in place, or moves it when `position` is set.
    pub(crate) fn replace(
        &mut self,
        old: &str,
        name: &str,
        text: String,
        position: Option<&ColumnPosition>,
    ) {
        let Some(index) = self.index_of(old) else {
            return;
        };
        if position.is_some() {
            self.entries.remove(index);
            self.insert(name, text, position);
        } else {
            self.entries[index] = (name.to_string(), text);
        }
    }

    pub(crate) fn into_edit(self) -> Edit {
        let rendered = self
            .entries
            .into_iter()
            .map(|(_, text)| text)
            .collect::<Vec<_>>()
            .join(COLUMN_SEPARATOR);
        Edit::replace(self.span, rendered)
    }
}
