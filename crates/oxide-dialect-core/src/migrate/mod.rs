//! Migration replay.
//!
//! Starting from the schema of the first version, every migration is
//! replayed in order: `CREATE` statements are appended to the schema text,
//! `DROP` statements remove their target, and each `ALTER TABLE` rule is
//! validated and then folded into the matching `CREATE TABLE` by the active
//! squasher chain. The folded text is compared with the maintained
//! canonical schema by [`compare_schema`].

mod compare;
mod validate;

pub use compare::{DiffLine, SchemaDiff, compare_schema, normalize_whitespace};
pub use validate::{InvalidRule, validate_rule};

use tracing::debug;

use crate::ast::{AlterTableRuleKind, AlterTableStatement, Statement};
use crate::diagnostics::{Deduplicating, Diagnostic, DiagnosticSink};
use crate::lexer::Span;
use crate::parser::Parser;
use crate::registry::{DialectRegistry, Result};
use crate::squash::{Edit, MigrationSquasher, SquishContext, apply_edits, find_create_table};

/// One migration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    /// File name, used for ordering and in diagnostics.
    pub name: String,
    /// Statements of the migration.
    pub source: String,
}

impl Migration {
    /// Creates a migration.
    #[must_use]
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }

    /// The version number a file name starts with (`3.sqm`, `0003_add.sql`).
    #[must_use]
    pub fn version(&self) -> Option<u64> {
        let digits: String = self
            .name
            .chars()
            .take_while(char::is_ascii_digit)
            .collect();
        digits.parse().ok()
    }
}

/// Sorts migrations by version, then by name. Unversioned files go last.
pub fn order_migrations(migrations: &mut [Migration]) {
    migrations.sort_by(|a, b| {
        let key = |m: &Migration| m.version().unwrap_or(u64::MAX);
        key(a).cmp(&key(b)).then_with(|| a.name.cmp(&b.name))
    });
}

/// Replays migrations with the active dialect of a registry.
#[derive(Debug, Clone, Copy)]
pub struct MigrationReplayer<'r> {
    registry: &'r DialectRegistry,
}

impl<'r> MigrationReplayer<'r> {
    /// Creates a replayer.
    #[must_use]
    pub const fn new(registry: &'r DialectRegistry) -> Self {
        Self { registry }
    }

    /// Replays `migrations` over `schema` and returns the folded text.
    ///
    /// Invalid rules and unparsable statements are reported to `sink` and
    /// skipped; replay continues with the next statement.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotInstalled`](crate::registry::RegistryError)
    /// if the registry has no dialect.
    pub fn replay(
        &self,
        schema: &str,
        migrations: &[Migration],
        sink: &dyn DiagnosticSink,
    ) -> Result<String> {
        let squasher = self.registry.migration_squasher()?;
        let mut text = schema.to_string();
        for migration in migrations {
            let sink = Deduplicating::new(sink, Some(&migration.name));
            let statements = self.registry.parser(&migration.source)?.parse_script();
            for statement in statements {
                match statement {
                    Ok(statement) => {
                        text = apply_statement(&statement, migration, &text, squasher.as_ref(), &sink);
                    }
                    Err(err) => sink.report(Diagnostic::error(err.span, err.message)),
                }
            }
            debug!(
                migration = migration.name.as_str(),
                diagnostics = sink.count(),
                "Replayed migration"
            );
        }
        Ok(text)
    }
}

fn apply_statement(
    statement: &Statement,
    migration: &Migration,
    text: &str,
    squasher: &dyn MigrationSquasher,
    sink: &dyn DiagnosticSink,
) -> String {
    match statement {
        Statement::CreateTable(create) => {
            if find_create_table(text, &create.name).is_some() {
                if !create.if_not_exists {
                    sink.report(Diagnostic::error(
                        create.span,
                        format!("Table already defined with name {}", create.name),
                    ));
                }
                return text.to_string();
            }
            append(text, statement.span().text(&migration.source))
        }
        Statement::CreateIndex(_) | Statement::CreateView(_) => {
            append(text, statement.span().text(&migration.source))
        }
        Statement::DropTable(drop) => {
            let (folded, removed) = remove_statements(text, |s| match s {
                Statement::CreateTable(c) => c.name.eq_ignore_ascii_case(&drop.name),
                Statement::CreateIndex(i) => i.table.eq_ignore_ascii_case(&drop.name),
                _ => false,
            });
            if removed == 0 && !drop.if_exists {
                sink.report(Diagnostic::error(
                    drop.span,
                    format!("No table found with name {}", drop.name),
                ));
            }
            folded
        }
        Statement::DropIndex(drop) => {
            let (folded, removed) = remove_statements(text, |s| {
                matches!(s, Statement::CreateIndex(i) if i.name.eq_ignore_ascii_case(&drop.name))
            });
            if removed == 0 && !drop.if_exists {
                sink.report(Diagnostic::error(
                    drop.span,
                    format!("No index found with name {}", drop.name),
                ));
            }
            folded
        }
        Statement::AlterTable(alter) => fold_alter(alter, migration, text, squasher, sink),
        Statement::Select(_) | Statement::Insert(_) | Statement::Update(_) | Statement::Delete(_) => {
            debug!(kind = statement.kind_name(), "Ignoring data statement");
            text.to_string()
        }
    }
}

fn fold_alter(
    alter: &AlterTableStatement,
    migration: &Migration,
    text: &str,
    squasher: &dyn MigrationSquasher,
    sink: &dyn DiagnosticSink,
) -> String {
    let mut text = text.to_string();
    let mut table = alter.table.clone();
    for rule in &alter.rules {
        if let Err(invalid) = validate_rule(rule, &table, &text) {
            sink.report(Diagnostic::error(rule.span, invalid.to_string()));
            continue;
        }
        let Some(folded) = SquishContext::new(&table, &migration.source, &text)
            .map(|cx| squasher.squish(rule, &cx))
        else {
            continue;
        };
        debug!(
            rule = rule.label(),
            table = table.as_str(),
            squasher = squasher.name(),
            "Squashed rule"
        );
        text = folded;
        if let AlterTableRuleKind::RenameTable { name, .. } = &rule.kind {
            table.clone_from(name);
        }
    }
    text
}

/// Appends a statement to the schema text, one blank line after the last.
fn append(text: &str, statement: &str) -> String {
    let mut folded = text.trim_end().to_string();
    if !folded.is_empty() {
        if !folded.ends_with(';') {
            folded.push(';');
        }
        folded.push_str("\n\n");
    }
    folded.push_str(statement);
    folded.push_str(";\n");
    folded
}

/// Removes the statements matching `remove`, with their `;` and trailing
/// whitespace. Returns the new text and how many statements went.
fn remove_statements(text: &str, remove: impl Fn(&Statement) -> bool) -> (String, usize) {
    let edits: Vec<Edit> = Parser::new(text)
        .parse_script()
        .into_iter()
        .flatten()
        .filter(|s| remove(s))
        .map(|s| Edit::delete(statement_extent(text, s.span())))
        .collect();
    let removed = edits.len();
    (apply_edits(text, edits), removed)
}

fn statement_extent(text: &str, span: Span) -> Span {
    let mut end = span.end;
    let rest = text.get(end..).unwrap_or_default();
    let trimmed = rest.trim_start();
    if trimmed.starts_with(';') {
        end += rest.len() - trimmed.len() + 1;
    }
    let rest = text.get(end..).unwrap_or_default();
    end += rest.len() - rest.trim_start().len();
    Span::new(span.start, end)
}
