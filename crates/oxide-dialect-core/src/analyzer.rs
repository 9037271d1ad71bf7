//! One pass over a file of statements.
//!
//! The analyzer parses a `;`-separated file with the active grammar, keeps
//! a [`Catalog`] of the tables and views declared so far, and resolves every
//! query against it through the active resolver chain. Problems are
//! reported to a [`DiagnosticSink`] and analysis continues with the next
//! statement; a statement that produced any diagnostic gets no report.

use core::cell::RefCell;

use serde::Serialize;
use tracing::debug;

use crate::ast::{
    AlterTableRuleKind, AlterTableStatement, ColumnDef, ColumnPosition, ConflictAction,
    CreateIndexStatement, CreateTableStatement, InsertSource, InsertStatement, Statement,
    TableConstraintKind, TypeName, UpdateAssignment,
};
use crate::catalog::{Catalog, ColumnAnchor, ColumnSchema, IndexSchema, TableSchema};
use crate::diagnostics::{Deduplicating, Diagnostic, DiagnosticSink};
use crate::lexer::Span;
use crate::registry::{DialectRegistry, Result};
use crate::resolver::{
    BindParameter, ParameterReport, ResolveContext, ResultColumn, Scope, ScopeTable, TypeResolver,
    record_as, resolve_query, resolve_returning, with_mutation_scope,
};
use crate::types::{AnsiType, IntermediateType, TypeDescriptor};

/// A result column as reported to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnReport {
    /// Column label.
    pub name: String,
    /// Resolved type.
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
}

impl From<&ResultColumn> for ColumnReport {
    fn from(column: &ResultColumn) -> Self {
        Self {
            name: column.name.clone(),
            ty: column.ty.descriptor(),
        }
    }
}

/// The resolved shape of one query or mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryReport {
    /// 0-based index of the statement in the file.
    pub statement: usize,
    /// Statement kind, e.g. `SELECT`.
    pub kind: &'static str,
    /// Source span of the statement.
    pub span: Span,
    /// Result columns; empty for mutations without `RETURNING`.
    pub columns: Vec<ColumnReport>,
    /// Bind parameters ordered by position.
    pub parameters: Vec<ParameterReport>,
}

/// Analyzes files against an installed dialect.
#[derive(Debug)]
pub struct Analyzer<'r> {
    registry: &'r DialectRegistry,
    catalog: Catalog,
    file: Option<String>,
}

impl<'r> Analyzer<'r> {
    /// Creates an analyzer with an empty catalog.
    #[must_use]
    pub fn new(registry: &'r DialectRegistry) -> Self {
        Self::with_catalog(registry, Catalog::new())
    }

    /// Creates an analyzer that starts from an existing catalog.
    #[must_use]
    pub const fn with_catalog(registry: &'r DialectRegistry, catalog: Catalog) -> Self {
        Self {
            registry,
            catalog,
            file: None,
        }
    }

    /// Names the file diagnostics are attributed to.
    #[must_use]
    pub fn in_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Tables, views and indexes declared so far.
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Consumes the analyzer, returning its catalog.
    #[must_use]
    pub fn into_catalog(self) -> Catalog {
        self.catalog
    }

    /// Analyzes every statement in `source`.
    ///
    /// Declarations update the catalog for later statements and later
    /// calls. Returns a report for each query and mutation that resolved
    /// without diagnostics.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotInstalled`](crate::registry::RegistryError)
    /// if the registry has no dialect.
    pub fn analyze(&mut self, source: &str, sink: &dyn DiagnosticSink) -> Result<Vec<QueryReport>> {
        let resolver = self.registry.type_resolver()?;
        let statements = self.registry.parser(source)?.parse_script();
        let file = self.file.clone();
        let mut reports = Vec::new();

        for (index, statement) in statements.into_iter().enumerate() {
            let dedup = Deduplicating::new(sink, file.as_deref());
            let statement = match statement {
                Ok(statement) => statement,
                Err(err) => {
                    dedup.report(Diagnostic::error(err.span, err.message));
                    continue;
                }
            };
            let report = self.statement(index, &statement, source, resolver.as_ref(), &dedup);
            debug!(
                statement = index,
                kind = statement.kind_name(),
                diagnostics = dedup.count(),
                "Analyzed statement"
            );
            if dedup.count() == 0 {
                reports.extend(report);
            }
        }
        Ok(reports)
    }

    fn statement(
        &mut self,
        index: usize,
        statement: &Statement,
        source: &str,
        resolver: &dyn TypeResolver,
        sink: &dyn DiagnosticSink,
    ) -> Option<QueryReport> {
        let parameters = RefCell::new(Vec::new());
        let cx = ResolveContext::new(resolver, &self.catalog, source, sink, &parameters)
            .at(statement.span());

        let columns = match statement {
            Statement::CreateTable(create) => {
                let table = table_schema(create, resolver, sink);
                self.declare(table, create.if_not_exists, create.span, sink);
                return None;
            }
            Statement::CreateView(view) => {
                let columns = resolve_query(&view.query, &cx);
                let table = TableSchema {
                    name: view.name.clone(),
                    columns: columns
                        .into_iter()
                        .map(|c| ColumnSchema::new(c.name, c.ty))
                        .collect(),
                    view: true,
                };
                self.declare(table, view.if_not_exists, view.span, sink);
                return None;
            }
            Statement::CreateIndex(create) => {
                self.create_index(create, sink);
                return None;
            }
            Statement::DropTable(drop) => {
                if self.catalog.remove(&drop.name).is_none() && !drop.if_exists {
                    sink.report(Diagnostic::error(
                        drop.span,
                        format!("No table found with name {}", drop.name),
                    ));
                }
                return None;
            }
            Statement::DropIndex(drop) => {
                if self.catalog.remove_index(&drop.name).is_none() && !drop.if_exists {
                    sink.report(Diagnostic::error(
                        drop.span,
                        format!("No index found with name {}", drop.name),
                    ));
                }
                return None;
            }
            Statement::AlterTable(alter) => {
                self.alter_table(alter, resolver, sink);
                return None;
            }
            Statement::Select(query) => resolve_query(query, &cx),
            Statement::Insert(insert) => {
                insert_parameters(insert, &cx);
                returning(statement, &cx)
            }
            Statement::Update(update) => {
                with_mutation_scope(
                    &update.table,
                    update.alias.as_deref(),
                    update.from.as_ref(),
                    update.where_clause.as_ref(),
                    &cx,
                    |inner| assign(&update.table, &update.assignments, inner),
                );
                returning(statement, &cx)
            }
            Statement::Delete(delete) => {
                with_mutation_scope(
                    &delete.table,
                    delete.alias.as_deref(),
                    None,
                    delete.where_clause.as_ref(),
                    &cx,
                    |_| (),
                );
                returning(statement, &cx)
            }
        };

        let mut parameters = parameters.into_inner();
        parameters.sort_by_key(|p| p.position);
        Some(QueryReport {
            statement: index,
            kind: statement.kind_name(),
            span: statement.span(),
            columns: columns.iter().map(ColumnReport::from).collect(),
            parameters: parameters.iter().map(BindParameter::report).collect(),
        })
    }

    fn declare(&mut self, table: TableSchema, if_not_exists: bool, span: Span, sink: &dyn DiagnosticSink) {
        if self.catalog.table(&table.name).is_some() {
            if !if_not_exists {
                sink.report(Diagnostic::error(
                    span,
                    format!("Table already defined with name {}", table.name),
                ));
            }
            return;
        }
        self.catalog.insert(table);
    }

    fn create_index(&mut self, create: &CreateIndexStatement, sink: &dyn DiagnosticSink) {
        let Some(table) = self.catalog.table(&create.table) else {
            sink.report(Diagnostic::error(
                create.span,
                format!("No table found with name {}", create.table),
            ));
            return;
        };
        for column in &create.columns {
            if table.column(column).is_none() {
                sink.report(Diagnostic::error(
                    create.span,
                    format!("No column found with name {column}"),
                ));
            }
        }
        if self.catalog.index(&create.name).is_some() {
            if !create.if_not_exists {
                sink.report(Diagnostic::error(
                    create.span,
                    format!("Index already defined with name {}", create.name),
                ));
            }
            return;
        }
        self.catalog.add_index(IndexSchema {
            name: create.name.clone(),
            table: create.table.clone(),
            columns: create.columns.clone(),
        });
    }

    fn alter_table(
        &mut self,
        alter: &AlterTableStatement,
        resolver: &dyn TypeResolver,
        sink: &dyn DiagnosticSink,
    ) {
        if self.catalog.table(&alter.table).is_none() {
            sink.report(Diagnostic::error(
                alter.table_span,
                format!("No table found with name {}", alter.table),
            ));
            return;
        }
        let mut table = alter.table.clone();
        for rule in &alter.rules {
            if let Some(column) = rule.target_column() {
                let exists = self
                    .catalog
                    .table(&table)
                    .is_some_and(|t| t.column(column).is_some());
                if !exists {
                    sink.report(Diagnostic::error(
                        rule.span,
                        format!("No column found with name {column}"),
                    ));
                    continue;
                }
            }
            match &rule.kind {
                AlterTableRuleKind::RenameTable { name, .. } => {
                    self.catalog.rename_table(&table, name);
                    table.clone_from(name);
                }
                AlterTableRuleKind::AddColumn { column, position } => {
                    let schema = column_schema(column, false, resolver, sink);
                    self.catalog.add_column(&table, schema, anchor(position.as_ref()));
                }
                AlterTableRuleKind::DropColumn { column, .. } => {
                    self.catalog.drop_column(&table, column);
                }
                AlterTableRuleKind::RenameColumn { old, new, .. } => {
                    self.catalog.update_column(&table, old, |c| {
                        c.name.clone_from(new);
                        c.ty.set_name(new.clone());
                    });
                }
                AlterTableRuleKind::ModifyColumn { column, position } => {
                    let schema = column_schema(column, false, resolver, sink);
                    let old = column.name.clone();
                    self.catalog
                        .replace_column(&table, &old, schema, anchor(position.as_ref()));
                }
                AlterTableRuleKind::ChangeColumn {
                    old,
                    column,
                    position,
                    ..
                } => {
                    let schema = column_schema(column, false, resolver, sink);
                    self.catalog
                        .replace_column(&table, old, schema, anchor(position.as_ref()));
                }
                AlterTableRuleKind::AlterColumnType { column, data_type } => {
                    let ty = declared_type(data_type, resolver, sink);
                    self.catalog.update_column(&table, column, |c| {
                        c.ty = ty.with_nullable(c.ty.is_nullable()).with_name(c.name.clone());
                    });
                }
                AlterTableRuleKind::SetNotNull { column } => {
                    self.catalog
                        .update_column(&table, column, |c| c.ty.set_nullable(false));
                }
                AlterTableRuleKind::DropNotNull { column } => {
                    self.catalog
                        .update_column(&table, column, |c| c.ty.set_nullable(true));
                }
            }
        }
    }
}

fn anchor(position: Option<&ColumnPosition>) -> Option<ColumnAnchor<'_>> {
    position.map(|p| match p {
        ColumnPosition::First => ColumnAnchor::First,
        ColumnPosition::After { column, .. } => ColumnAnchor::After(column),
    })
}

/// Resolves a declared type name, reporting names no layer declares.
fn declared_type(
    data_type: &TypeName,
    resolver: &dyn TypeResolver,
    sink: &dyn DiagnosticSink,
) -> IntermediateType {
    if resolver.declares_type(data_type) {
        resolver.definition_type(data_type)
    } else {
        sink.report(Diagnostic::error(
            data_type.span,
            format!("Unknown type {}", data_type.name),
        ));
        IntermediateType::argument()
    }
}

fn column_schema(
    column: &ColumnDef,
    table_key: bool,
    resolver: &dyn TypeResolver,
    sink: &dyn DiagnosticSink,
) -> ColumnSchema {
    // A column declared without a type stores anything.
    let ty = column.data_type.as_ref().map_or_else(
        || IntermediateType::ansi(AnsiType::Blob),
        |t| declared_type(t, resolver, sink),
    );
    let primary_key = table_key || column.is_primary_key();
    let non_null = column.is_not_null() || primary_key;
    ColumnSchema {
        name: column.name.clone(),
        ty: ty.with_nullable(!non_null).with_name(column.name.clone()),
        primary_key,
        unique: column.is_unique(),
    }
}

fn table_schema(
    create: &CreateTableStatement,
    resolver: &dyn TypeResolver,
    sink: &dyn DiagnosticSink,
) -> TableSchema {
    let mut table = TableSchema::new(create.name.clone());
    for column in &create.columns {
        let table_key = create.constraints.iter().any(|c| {
            matches!(&c.kind, TableConstraintKind::PrimaryKey(cols)
                if cols.iter().any(|col| col.eq_ignore_ascii_case(&column.name)))
        });
        let mut schema = column_schema(column, table_key, resolver, sink);
        schema.unique |= create.constraints.iter().any(|c| {
            matches!(&c.kind, TableConstraintKind::Unique(cols)
                if cols.iter().any(|col| col.eq_ignore_ascii_case(&column.name)))
        });
        table.columns.push(schema);
    }
    table
}

fn returning(statement: &Statement, cx: &ResolveContext<'_>) -> Vec<ResultColumn> {
    cx.resolver
        .query_with_results(statement)
        .map(|query| resolve_returning(&query, cx))
        .unwrap_or_default()
}

/// The declared type of `column` in `table`, reporting unknown columns.
fn target_column(table: &str, column: &str, cx: &ResolveContext<'_>) -> Option<IntermediateType> {
    let schema = cx.catalog.table(table)?;
    let found = schema.column(column).map(|c| c.ty.clone());
    if found.is_none() {
        cx.report(cx.span, format!("No column found with name {column}"));
    }
    found
}

fn assign(table: &str, assignments: &[UpdateAssignment], cx: &ResolveContext<'_>) {
    for assignment in assignments {
        let _ = cx.type_of(&assignment.value);
        let ty = target_column(table, &assignment.column, cx)
            .unwrap_or_else(|| IntermediateType::argument().as_nullable());
        record_as(&assignment.value, ty, cx);
    }
}

fn insert_parameters(insert: &InsertStatement, cx: &ResolveContext<'_>) {
    let Some(schema) = cx.catalog.table(&insert.table) else {
        cx.report(cx.span, format!("No table found with name {}", insert.table));
        return;
    };
    let targets: Vec<Option<IntermediateType>> = if insert.columns.is_empty() {
        schema.columns.iter().map(|c| Some(c.ty.clone())).collect()
    } else {
        insert
            .columns
            .iter()
            .map(|c| target_column(&insert.table, c, cx))
            .collect()
    };

    match &insert.values {
        InsertSource::Values(rows) => {
            for row in rows {
                if row.len() != targets.len() {
                    cx.report(
                        cx.span,
                        format!("{} values for {} columns", row.len(), targets.len()),
                    );
                }
                for (value, target) in row.iter().zip(&targets) {
                    let _ = cx.type_of(value);
                    let ty = target
                        .clone()
                        .unwrap_or_else(|| IntermediateType::argument().as_nullable());
                    record_as(value, ty, cx);
                }
            }
        }
        InsertSource::Query(query) => {
            let columns = resolve_query(query, cx);
            if columns.len() != targets.len() {
                cx.report(
                    cx.span,
                    format!("{} values for {} columns", columns.len(), targets.len()),
                );
            }
        }
        InsertSource::DefaultValues => {}
    }

    if let Some(ConflictAction::DoUpdate(assignments)) =
        insert.on_conflict.as_ref().map(|c| &c.action)
    {
        // the proposed row, visible as `excluded` behind the target table
        let mut proposed = Scope::child(cx.scope);
        proposed.push(ScopeTable::from_schema(schema, Some("excluded")));
        let outer = cx.with_scope(&proposed);
        with_mutation_scope(&insert.table, None, None, None, &outer, |inner| {
            assign(&insert.table, assignments, inner);
        });
    }
}
