//! Result shapes of queries.

use crate::ast::{BinaryOp, Expr, JoinType, Query, SelectColumn, SelectCore, TableRef};
use crate::types::{AnsiType, IntermediateType, PREFERENCE_ORDER, encapsulate};

use super::parameters::{record_as, record_parameters};
use super::scope::{Scope, ScopeTable};
use super::{QueryWithResults, ResolveContext};

/// One column of a query's result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultColumn {
    /// Column label.
    pub name: String,
    /// Resolved type.
    pub ty: IntermediateType,
}

/// Resolves the result columns of a query.
///
/// Compound branches are unified position by position; a branch with a
/// different column count is reported and the first branch's shape is kept.
#[must_use]
pub fn resolve_query(query: &Query, cx: &ResolveContext<'_>) -> Vec<ResultColumn> {
    let cx = cx.at(query.span);
    let first = resolve_core(&query.body, &cx);
    let mut branches = Vec::with_capacity(query.compounds.len());
    for (operator, core) in &query.compounds {
        let branch = resolve_core(core, &cx);
        if branch.len() == first.len() {
            branches.push(branch);
        } else {
            cx.report(
                query.span,
                format!(
                    "{} branches return {} and {} columns",
                    operator.as_str(),
                    first.len(),
                    branch.len()
                ),
            );
        }
    }

    for bound in [&query.limit, &query.offset].into_iter().flatten() {
        let _ = cx.type_of(bound);
        record_as(bound, IntermediateType::ansi(AnsiType::Integer), &cx);
    }

    if branches.is_empty() {
        return first;
    }
    first
        .into_iter()
        .enumerate()
        .map(|(i, column)| {
            let mut candidates = vec![column.ty];
            candidates.extend(branches.iter().map(|b| b[i].ty.clone()));
            ResultColumn {
                name: column.name,
                ty: encapsulate(&candidates, PREFERENCE_ORDER, false),
            }
        })
        .collect()
}

/// Resolves the `RETURNING` projection of a mutation.
#[must_use]
pub fn resolve_returning(query: &QueryWithResults<'_>, cx: &ResolveContext<'_>) -> Vec<ResultColumn> {
    let mut scope = Scope::child(cx.scope);
    match cx.catalog.table(query.source_table) {
        Some(schema) => scope.push(ScopeTable::from_schema(schema, query.alias)),
        None => cx.report(
            query.statement.span(),
            format!("No table found with name {}", query.source_table),
        ),
    }
    let cx = cx.with_scope(&scope);
    project(query.result_columns, &cx)
}

/// Runs `f` with `table` (and any `FROM` sources) in scope, after typing
/// the `WHERE` predicate of an `UPDATE` or `DELETE`.
pub(crate) fn with_mutation_scope<T>(
    table: &str,
    alias: Option<&str>,
    from: Option<&TableRef>,
    where_clause: Option<&Expr>,
    cx: &ResolveContext<'_>,
    f: impl FnOnce(&ResolveContext<'_>) -> T,
) -> T {
    let mut scope = Scope::child(cx.scope);
    let mut conditions = Vec::new();
    match cx.catalog.table(table) {
        Some(schema) => scope.push(ScopeTable::from_schema(schema, alias)),
        None => cx.report(cx.span, format!("No table found with name {table}")),
    }
    if let Some(from) = from {
        add_table_ref(from, cx, &mut scope, &mut conditions);
    }
    if let Some(where_clause) = where_clause {
        collect_guards(where_clause, &mut scope);
    }
    let inner = cx.with_scope(&scope);
    for predicate in conditions.into_iter().chain(where_clause) {
        let _ = inner.type_of(predicate);
        record_as(predicate, IntermediateType::ansi(AnsiType::Boolean), &inner);
    }
    f(&inner)
}

fn resolve_core(core: &SelectCore, cx: &ResolveContext<'_>) -> Vec<ResultColumn> {
    let mut scope = Scope::child(cx.scope);
    let mut conditions = Vec::new();
    if let Some(from) = &core.from {
        add_table_ref(from, cx, &mut scope, &mut conditions);
    }
    if let Some(where_clause) = &core.where_clause {
        collect_guards(where_clause, &mut scope);
    }
    let inner = cx.with_scope(&scope);

    let predicates = conditions
        .into_iter()
        .chain(core.where_clause.as_ref())
        .chain(core.having.as_ref());
    for predicate in predicates {
        let _ = inner.type_of(predicate);
        record_as(predicate, IntermediateType::ansi(AnsiType::Boolean), &inner);
    }
    for expr in &core.group_by {
        let _ = inner.type_of(expr);
        record_parameters(expr, &inner);
    }

    project(&core.columns, &inner)
}

fn project(columns: &[SelectColumn], cx: &ResolveContext<'_>) -> Vec<ResultColumn> {
    let mut result = Vec::new();
    for column in columns {
        if let Expr::Wildcard { table } = &column.expr {
            match cx.scope.expand(table.as_deref()) {
                Some(expanded) if table.is_some() || !cx.scope.is_empty() => {
                    result.extend(expanded.into_iter().map(|(name, ty)| ResultColumn { name, ty }));
                }
                _ => cx.report(
                    column.span,
                    table.as_ref().map_or_else(
                        || String::from("* used without a FROM clause"),
                        |t| format!("No table found with name {t}"),
                    ),
                ),
            }
            continue;
        }

        let ty = cx.at(column.span).type_of(&column.expr);
        record_as(&column.expr, IntermediateType::argument(), &cx.at(column.span));
        result.push(ResultColumn {
            name: column_label(column, cx.source),
            ty,
        });
    }
    result
}

fn column_label(column: &SelectColumn, source: &str) -> String {
    if let Some(alias) = &column.alias {
        return alias.clone();
    }
    if let Expr::Column { name, .. } = column.expr.unparenthesized() {
        return name.clone();
    }
    column.span.text(source).trim().to_string()
}

fn add_table_ref<'q>(
    table_ref: &'q TableRef,
    cx: &ResolveContext<'_>,
    scope: &mut Scope<'_>,
    conditions: &mut Vec<&'q Expr>,
) {
    match table_ref {
        TableRef::Table { name, alias, span } => match cx.catalog.table(name) {
            Some(schema) => scope.push(ScopeTable::from_schema(schema, alias.as_deref())),
            None => cx.report(*span, format!("No table found with name {name}")),
        },
        TableRef::Subquery { query, alias } => {
            let columns = resolve_query(query, cx);
            scope.push(ScopeTable::derived(alias, columns));
        }
        TableRef::Join { left, join } => {
            add_table_ref(left, cx, scope, conditions);
            let split = scope.len();
            add_table_ref(&join.table, cx, scope, conditions);
            let end = scope.len();
            if join.join_type.nulls_right() {
                scope.widen(split..end);
            }
            if join.join_type.nulls_left() {
                scope.widen(0..split);
            }
            for column in &join.using {
                scope.add_using(column);
            }
            if let Some(on) = &join.on {
                conditions.push(on);
            } else if join.join_type != JoinType::Cross
                && join.join_type != JoinType::Inner
                && join.using.is_empty()
            {
                cx.report(
                    cx.span,
                    format!("{} JOIN requires an ON or USING clause", join.join_type.as_str()),
                );
            }
        }
    }
}

/// Collects `col IS NOT NULL` guards from the top-level `AND` chain.
fn collect_guards(expr: &Expr, scope: &mut Scope<'_>) {
    match expr.unparenthesized() {
        Expr::Binary {
            left,
            op: BinaryOp::And,
            right,
        } => {
            collect_guards(left, scope);
            collect_guards(right, scope);
        }
        Expr::IsNull {
            expr,
            negated: true,
        } => {
            if let Expr::Column { table, name, .. } = expr.unparenthesized() {
                scope.add_guard(table.as_deref(), name);
            }
        }
        _ => {}
    }
}
