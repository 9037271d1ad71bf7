//! The root of every resolver chain.

use core::ptr;

use crate::ast::{
    BinaryOp, Expr, FunctionCall, InList, Literal, Query, Statement, TypeName, UnaryOp,
};
use crate::types::{AnsiType, IntermediateType, NUMERIC_ORDER, PREFERENCE_ORDER, encapsulate};

use super::functions::ansi_function_type;
use super::query::resolve_query;
use super::{QueryWithResults, ResolveContext, TypeResolver};

/// Resolves everything no dialect layer claims.
///
/// Declares the baseline column types `INTEGER`, `INT`, `REAL`, `TEXT` and
/// `BLOB`, and the common function table.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnsiTypeResolver;

impl AnsiTypeResolver {
    /// Creates the root resolver.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

fn ansi_kind(type_name: &TypeName) -> Option<AnsiType> {
    match type_name.name.as_str() {
        "INTEGER" | "INT" => Some(AnsiType::Integer),
        "REAL" => Some(AnsiType::Real),
        "TEXT" => Some(AnsiType::Text),
        "BLOB" => Some(AnsiType::Blob),
        _ => None,
    }
}

fn literal_type(literal: &Literal) -> IntermediateType {
    match literal {
        Literal::Integer(_) => IntermediateType::ansi(AnsiType::Integer),
        Literal::Float(_) => IntermediateType::ansi(AnsiType::Real),
        Literal::String(_) => IntermediateType::ansi(AnsiType::Text),
        Literal::Blob(_) => IntermediateType::ansi(AnsiType::Blob),
        Literal::Boolean(_) => IntermediateType::ansi(AnsiType::Boolean),
        Literal::Null => IntermediateType::null(),
    }
}

fn any_nullable(types: &[&IntermediateType]) -> bool {
    types.iter().any(|t| t.is_nullable())
}

fn binary_type(op: BinaryOp, left: &IntermediateType, right: &IntermediateType) -> IntermediateType {
    let nullable = any_nullable(&[left, right]);
    match op {
        BinaryOp::Mod => IntermediateType::ansi(AnsiType::Integer).with_nullable(nullable),
        op if op.is_arithmetic() => encapsulate(&[left.clone(), right.clone()], NUMERIC_ORDER, false),
        op if op.is_predicate() => IntermediateType::ansi(AnsiType::Boolean).with_nullable(nullable),
        BinaryOp::Concat => IntermediateType::ansi(AnsiType::Text).with_nullable(nullable),
        _ => IntermediateType::ansi(AnsiType::Integer).with_nullable(nullable),
    }
}

fn single_column(query: &Query, cx: &ResolveContext<'_>) -> IntermediateType {
    let mut columns = resolve_query(query, cx);
    if columns.len() == 1 {
        columns.swap_remove(0).ty.without_name()
    } else {
        cx.report(
            query.span,
            format!("Subquery must return one column, found {}", columns.len()),
        );
        IntermediateType::argument().as_nullable()
    }
}

/// The first of `candidates` that is not a placeholder, typed in `cx`.
fn sibling_type<'e>(
    candidates: impl IntoIterator<Item = &'e Expr>,
    cx: &ResolveContext<'_>,
) -> IntermediateType {
    candidates
        .into_iter()
        .find(|e| !matches!(e.unparenthesized(), Expr::Parameter { .. }))
        .map_or_else(IntermediateType::argument, |e| cx.type_of(e).without_name())
}

impl TypeResolver for AnsiTypeResolver {
    fn name(&self) -> &'static str {
        "ansi"
    }

    fn parent(&self) -> Option<&dyn TypeResolver> {
        None
    }

    fn declares_type(&self, type_name: &TypeName) -> bool {
        ansi_kind(type_name).is_some()
    }

    fn definition_type(&self, type_name: &TypeName) -> IntermediateType {
        match ansi_kind(type_name) {
            Some(kind) => IntermediateType::ansi(kind),
            None => panic!(
                "column type {} is declared by the active dialect but no resolver maps it",
                type_name.name
            ),
        }
    }

    fn resolved_type(&self, expr: &Expr, cx: &ResolveContext<'_>) -> IntermediateType {
        match expr {
            Expr::Literal(literal) => literal_type(literal),
            Expr::Column { table, name, span } => cx.column_type(table.as_deref(), name, *span),
            Expr::Binary { left, op, right } => {
                binary_type(*op, &cx.type_of(left), &cx.type_of(right))
            }
            Expr::Unary { op, operand } => {
                let operand = cx.type_of(operand);
                match op {
                    UnaryOp::Neg | UnaryOp::Plus => operand.without_name(),
                    UnaryOp::Not => IntermediateType::ansi(AnsiType::Boolean)
                        .with_nullable(operand.is_nullable()),
                    UnaryOp::BitNot => IntermediateType::ansi(AnsiType::Integer)
                        .with_nullable(operand.is_nullable()),
                }
            }
            Expr::Json { .. } => panic!(
                "JSON operator reached the {} resolver; the dialect enabling it has no resolver layer for it",
                self.name()
            ),
            Expr::Function(call) => cx.function_type(call).unwrap_or_else(|| {
                cx.report(call.span, format!("Unknown function {}", call.name));
                IntermediateType::argument().as_nullable()
            }),
            Expr::Subquery(query) => single_column(query, cx).as_nullable(),
            Expr::Exists { query, .. } => {
                let _ = resolve_query(query, cx);
                IntermediateType::ansi(AnsiType::Boolean)
            }
            Expr::IsNull { expr, .. } => {
                let _ = cx.type_of(expr);
                IntermediateType::ansi(AnsiType::Boolean)
            }
            Expr::In { expr, list, .. } => {
                let tested = cx.type_of(expr);
                let nullable = match list {
                    InList::Values(values) => values
                        .iter()
                        .fold(tested.is_nullable(), |acc, v| cx.type_of(v).is_nullable() || acc),
                    InList::Query(query) => {
                        let _ = single_column(query, cx);
                        tested.is_nullable()
                    }
                };
                IntermediateType::ansi(AnsiType::Boolean).with_nullable(nullable)
            }
            Expr::Between {
                expr, low, high, ..
            } => {
                let types = [cx.type_of(expr), cx.type_of(low), cx.type_of(high)];
                IntermediateType::ansi(AnsiType::Boolean)
                    .with_nullable(types.iter().any(IntermediateType::is_nullable))
            }
            Expr::Case {
                operand,
                when_clauses,
                else_clause,
            } => {
                if let Some(operand) = operand {
                    let _ = cx.type_of(operand);
                }
                let mut arms = Vec::with_capacity(when_clauses.len() + 1);
                for (when, then) in when_clauses {
                    let _ = cx.type_of(when);
                    arms.push(cx.type_of(then));
                }
                if let Some(otherwise) = else_clause {
                    arms.push(cx.type_of(otherwise));
                }
                encapsulate(&arms, PREFERENCE_ORDER, else_clause.is_none())
            }
            Expr::Cast { expr, data_type } => {
                let source = cx.type_of(expr);
                if cx.resolver.declares_type(data_type) {
                    cx.resolver
                        .definition_type(data_type)
                        .with_nullable(source.is_nullable())
                } else {
                    cx.report(data_type.span, format!("Unknown type {}", data_type.name));
                    IntermediateType::argument().with_nullable(source.is_nullable())
                }
            }
            Expr::Collate { expr, .. } | Expr::Paren(expr) => cx.type_of(expr),
            Expr::Parameter { .. } | Expr::Wildcard { .. } => IntermediateType::argument(),
        }
    }

    fn function_type(&self, call: &FunctionCall, cx: &ResolveContext<'_>) -> Option<IntermediateType> {
        ansi_function_type(call, cx)
    }

    fn argument_type(&self, parent: &Expr, argument: &Expr, cx: &ResolveContext<'_>) -> IntermediateType {
        let is_argument = |e: &Expr| ptr::eq(e, argument);
        match parent {
            Expr::Binary { left, op, right } => {
                let other = if is_argument(&**left) { right } else { left };
                match op {
                    BinaryOp::And | BinaryOp::Or => IntermediateType::ansi(AnsiType::Boolean),
                    BinaryOp::Concat | BinaryOp::Like | BinaryOp::Glob => {
                        IntermediateType::ansi(AnsiType::Text)
                    }
                    op if op.is_bitwise() || *op == BinaryOp::Mod => {
                        IntermediateType::ansi(AnsiType::Integer)
                    }
                    _ => sibling_type([other.as_ref()], cx),
                }
            }
            Expr::In { expr, list, .. } => match list {
                InList::Values(values) if is_argument(&**expr) => sibling_type(values, cx),
                InList::Query(query) if is_argument(&**expr) => single_column(query, cx),
                _ => sibling_type([expr.as_ref()], cx),
            },
            Expr::Between {
                expr, low, high, ..
            } => {
                if is_argument(&**expr) {
                    sibling_type([low.as_ref(), high.as_ref()], cx)
                } else {
                    sibling_type([expr.as_ref(), low.as_ref(), high.as_ref()], cx)
                }
            }
            Expr::Case {
                operand,
                when_clauses,
                else_clause,
            } => {
                let in_condition = when_clauses.iter().any(|(when, _)| is_argument(when));
                let is_operand = operand.as_deref().is_some_and(is_argument);
                if is_operand || in_condition {
                    match operand {
                        Some(operand) => sibling_type(
                            core::iter::once(operand.as_ref())
                                .chain(when_clauses.iter().map(|(when, _)| when)),
                            cx,
                        ),
                        None => IntermediateType::ansi(AnsiType::Boolean),
                    }
                } else {
                    sibling_type(
                        when_clauses
                            .iter()
                            .map(|(_, then)| then)
                            .chain(else_clause.as_deref()),
                        cx,
                    )
                }
            }
            Expr::Function(call) => {
                let siblings: Vec<IntermediateType> = call
                    .args
                    .iter()
                    .filter(|a| !matches!(a.unparenthesized(), Expr::Parameter { .. }))
                    .map(|a| cx.type_of(a))
                    .collect();
                if siblings.is_empty() {
                    IntermediateType::argument()
                } else {
                    encapsulate(&siblings, PREFERENCE_ORDER, false)
                }
            }
            Expr::Unary { op: UnaryOp::Not, .. } => IntermediateType::ansi(AnsiType::Boolean),
            Expr::Unary { .. } => IntermediateType::ansi(AnsiType::Integer),
            Expr::Cast { data_type, .. } if cx.resolver.declares_type(data_type) => {
                cx.resolver.definition_type(data_type)
            }
            Expr::Collate { .. } | Expr::Json { .. } => IntermediateType::ansi(AnsiType::Text),
            Expr::IsNull { .. } => IntermediateType::argument().as_nullable(),
            _ => IntermediateType::argument(),
        }
    }

    fn query_with_results<'s>(&self, _statement: &'s Statement) -> Option<QueryWithResults<'s>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declares_baseline_types() {
        let resolver = AnsiTypeResolver::new();
        assert!(resolver.declares_type(&TypeName::new("integer")));
        assert!(resolver.declares_type(&TypeName::new("BLOB")));
        assert!(!resolver.declares_type(&TypeName::new("VARCHAR")));
        assert!(
            resolver
                .definition_type(&TypeName::new("INT"))
                .is(AnsiType::Integer)
        );
    }

    #[test]
    #[should_panic(expected = "no resolver maps it")]
    fn test_unmapped_declared_type_panics() {
        let _ = AnsiTypeResolver::new().definition_type(&TypeName::new("VARCHAR"));
    }

    #[test]
    fn test_binary_types() {
        let int = IntermediateType::ansi(AnsiType::Integer);
        let real = IntermediateType::ansi(AnsiType::Real).as_nullable();
        let sum = binary_type(BinaryOp::Add, &int, &real);
        assert!(sum.is(AnsiType::Real));
        assert!(sum.is_nullable());
        assert!(binary_type(BinaryOp::Eq, &int, &int).is(AnsiType::Boolean));
        assert!(binary_type(BinaryOp::Concat, &int, &int).is(AnsiType::Text));
        assert!(binary_type(BinaryOp::BitAnd, &int, &real).is_nullable());
    }

    #[test]
    fn test_literal_types() {
        assert!(literal_type(&Literal::Null).is_nullable());
        assert!(literal_type(&Literal::Float(1.5)).is(AnsiType::Real));
        assert!(!literal_type(&Literal::String("a".into())).is_nullable());
    }
}
