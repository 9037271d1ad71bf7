//! Bind parameter type inference.

use serde::Serialize;

use crate::ast::{Expr, InList};
use crate::lexer::Span;
use crate::types::{IntermediateType, TypeDescriptor};

use super::ResolveContext;

/// A bind parameter with its inferred type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindParameter {
    /// 1-based position in the statement.
    pub position: usize,
    /// Name of a `:name` placeholder.
    pub name: Option<String>,
    /// Inferred type.
    pub ty: IntermediateType,
    /// Placeholder location.
    pub span: Span,
}

impl BindParameter {
    /// Builds a parameter entry when `expr` is a placeholder.
    #[must_use]
    pub fn from_expr(expr: &Expr, ty: IntermediateType) -> Option<Self> {
        match expr.unparenthesized() {
            Expr::Parameter {
                name,
                position,
                span,
            } => Some(Self {
                position: *position,
                name: name.clone(),
                ty,
                span: *span,
            }),
            _ => None,
        }
    }

    /// The serializable form used in reports.
    #[must_use]
    pub fn report(&self) -> ParameterReport {
        ParameterReport {
            position: self.position,
            name: self.name.clone(),
            ty: self.ty.descriptor(),
        }
    }
}

/// A bind parameter as reported to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterReport {
    /// 1-based position.
    pub position: usize,
    /// Placeholder name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Inferred type.
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
}

/// Records every placeholder nested in `expr`, typed from its immediate
/// parent expression. Subqueries are left to their own resolution.
pub fn record_parameters(expr: &Expr, cx: &ResolveContext<'_>) {
    for child in children(expr) {
        if let Expr::Parameter { .. } = child.unparenthesized() {
            let ty = cx.resolver.argument_type(expr, child, cx);
            if let Some(parameter) = BindParameter::from_expr(child, ty) {
                cx.record_parameter(parameter);
            }
        } else {
            record_parameters(child, cx);
        }
    }
}

/// Records `expr` itself as a parameter of type `ty` when it is one, and
/// its nested placeholders otherwise.
pub(crate) fn record_as(expr: &Expr, ty: IntermediateType, cx: &ResolveContext<'_>) {
    match BindParameter::from_expr(expr, ty) {
        Some(parameter) => cx.record_parameter(parameter),
        None => record_parameters(expr, cx),
    }
}

fn children(expr: &Expr) -> Vec<&Expr> {
    match expr {
        Expr::Binary { left, right, .. } | Expr::Json { left, right, .. } => {
            vec![left.as_ref(), right.as_ref()]
        }
        Expr::Unary { operand: inner, .. }
        | Expr::IsNull { expr: inner, .. }
        | Expr::Cast { expr: inner, .. }
        | Expr::Collate { expr: inner, .. }
        | Expr::Paren(inner) => vec![inner.as_ref()],
        Expr::Function(call) => call.args.iter().collect(),
        Expr::In { expr, list, .. } => {
            let mut items = vec![expr.as_ref()];
            if let InList::Values(values) = list {
                items.extend(values);
            }
            items
        }
        Expr::Between {
            expr, low, high, ..
        } => vec![expr.as_ref(), low.as_ref(), high.as_ref()],
        Expr::Case {
            operand,
            when_clauses,
            else_clause,
        } => {
            let mut items: Vec<&Expr> = operand.iter().map(|e| &**e).collect();
            for (when, then) in when_clauses {
                items.push(when);
                items.push(then);
            }
            items.extend(else_clause.iter().map(|e| &**e));
            items
        }
        Expr::Literal(_)
        | Expr::Column { .. }
        | Expr::Subquery(_)
        | Expr::Exists { .. }
        | Expr::Parameter { .. }
        | Expr::Wildcard { .. } => Vec::new(),
    }
}
