//! Type resolution.
//!
//! Dialects form a chain of [`TypeResolver`]s. Each layer answers the cases
//! it introduces and forwards everything else to its parent; the
//! [`AnsiTypeResolver`] at the root answers whatever remains. Callers always
//! talk to the head of the chain, and the root resolves nested expressions
//! through the head again, so a layer's override applies at any depth.

mod ansi;
mod functions;
mod parameters;
mod query;
mod scope;
mod window;

use core::cell::RefCell;

use crate::ast::{Expr, FunctionCall, SelectColumn, Statement, TypeName};
use crate::catalog::Catalog;
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::lexer::Span;
use crate::types::IntermediateType;

pub use ansi::AnsiTypeResolver;
pub use functions::{argument_types, returns, returns_kind, unify_arguments};
pub use parameters::{BindParameter, ParameterReport, record_parameters};
pub(crate) use parameters::record_as;
pub(crate) use query::with_mutation_scope;
pub use query::{ResultColumn, resolve_query, resolve_returning};
pub use scope::{Lookup, Scope, ScopeTable};
pub use window::window_function_type;

static EMPTY_SCOPE: Scope<'static> = Scope::new();

/// A statement that mutates rows and also returns them.
#[derive(Debug, Clone, Copy)]
pub struct QueryWithResults<'a> {
    /// The mutating statement.
    pub statement: &'a Statement,
    /// Its `RETURNING` projection.
    pub result_columns: &'a [SelectColumn],
    /// The table the returned rows come from.
    pub source_table: &'a str,
    /// The alias the statement gives that table.
    pub alias: Option<&'a str>,
}

impl<'a> QueryWithResults<'a> {
    /// Extracts the `RETURNING` shape of an `INSERT`, `UPDATE` or `DELETE`.
    ///
    /// Returns `None` for other statements and for mutations without a
    /// `RETURNING` clause.
    #[must_use]
    pub fn from_returning(statement: &'a Statement) -> Option<Self> {
        let (returning, table, alias) = match statement {
            Statement::Insert(insert) => (&insert.returning, &insert.table, None),
            Statement::Update(update) => (&update.returning, &update.table, update.alias.as_deref()),
            Statement::Delete(delete) => (&delete.returning, &delete.table, delete.alias.as_deref()),
            _ => return None,
        };
        if returning.is_empty() {
            return None;
        }
        Some(Self {
            statement,
            result_columns: returning,
            source_table: table,
            alias,
        })
    }
}

/// Everything a resolver needs besides the node itself.
#[derive(Clone, Copy)]
pub struct ResolveContext<'a> {
    /// Head of the resolver chain.
    pub resolver: &'a dyn TypeResolver,
    /// Tables and views declared so far.
    pub catalog: &'a Catalog,
    /// Columns in view.
    pub scope: &'a Scope<'a>,
    /// Source text the spans point into.
    pub source: &'a str,
    /// Span reported for nodes that carry none.
    pub span: Span,
    sink: &'a dyn DiagnosticSink,
    parameters: &'a RefCell<Vec<BindParameter>>,
}

impl<'a> ResolveContext<'a> {
    /// Creates a context with an empty scope.
    #[must_use]
    pub fn new(
        resolver: &'a dyn TypeResolver,
        catalog: &'a Catalog,
        source: &'a str,
        sink: &'a dyn DiagnosticSink,
        parameters: &'a RefCell<Vec<BindParameter>>,
    ) -> Self {
        Self {
            resolver,
            catalog,
            scope: &EMPTY_SCOPE,
            source,
            span: Span::new(0, source.len()),
            sink,
            parameters,
        }
    }

    /// Returns a copy resolving names in `scope`.
    #[must_use]
    pub fn with_scope<'b>(&'b self, scope: &'b Scope<'b>) -> ResolveContext<'b> {
        ResolveContext { scope, ..*self }
    }

    /// Returns a copy reporting `span` for nodes that carry none.
    #[must_use]
    pub fn at(self, span: Span) -> Self {
        Self { span, ..self }
    }

    /// Resolves an expression through the head of the chain.
    #[must_use]
    pub fn type_of(&self, expr: &Expr) -> IntermediateType {
        self.resolver.resolved_type(expr, self)
    }

    /// Resolves a function call through the head of the chain.
    #[must_use]
    pub fn function_type(&self, call: &FunctionCall) -> Option<IntermediateType> {
        self.resolver.function_type(call, self)
    }

    /// Reports an error at `span`.
    pub fn report(&self, span: Span, message: impl Into<String>) {
        self.sink.report(Diagnostic::error(span, message));
    }

    /// The span of `expr`, or the context span when it has none.
    #[must_use]
    pub fn span_of(&self, expr: &Expr) -> Span {
        expr.span().unwrap_or(self.span)
    }

    /// Looks up a column, reporting unknown and ambiguous references.
    #[must_use]
    pub fn column_type(&self, table: Option<&str>, name: &str, span: Span) -> IntermediateType {
        match self.scope.lookup(table, name) {
            Lookup::Found(ty) => ty,
            Lookup::Ambiguous => {
                self.report(span, format!("Ambiguous column name {name}"));
                IntermediateType::argument().as_nullable()
            }
            Lookup::Missing => {
                let shown = table.map_or_else(|| name.to_string(), |t| format!("{t}.{name}"));
                self.report(span, format!("No column found with name {shown}"));
                IntermediateType::argument().as_nullable()
            }
        }
    }

    /// Records the inferred type of a bind parameter.
    pub fn record_parameter(&self, parameter: BindParameter) {
        let mut parameters = self.parameters.borrow_mut();
        match parameters
            .iter_mut()
            .find(|p| p.position == parameter.position)
        {
            Some(existing) if existing.ty.affinity().is_none() => *existing = parameter,
            Some(_) => {}
            None => parameters.push(parameter),
        }
    }
}

impl core::fmt::Debug for ResolveContext<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ResolveContext")
            .field("resolver", &self.resolver.name())
            .field("scope", &self.scope)
            .field("span", &self.span)
            .finish_non_exhaustive()
    }
}

/// One layer of a dialect's type resolution.
///
/// Every operation has a default that forwards to [`parent`](Self::parent).
/// A layer overrides only what its dialect introduces or changes; the root
/// overrides everything and has no parent.
pub trait TypeResolver: Send + Sync {
    /// A short label for logs (`sqlite-3.25`, `ansi`, ...).
    fn name(&self) -> &'static str;

    /// The next resolver in the chain.
    fn parent(&self) -> Option<&dyn TypeResolver>;

    /// Whether `type_name` is a column type some layer of the chain owns.
    ///
    /// Names no layer declares are user errors; the caller reports them
    /// and never asks for their [`definition_type`](Self::definition_type).
    fn declares_type(&self, type_name: &TypeName) -> bool {
        self.parent().is_some_and(|p| p.declares_type(type_name))
    }

    /// Maps a declared column type to its resolved type.
    ///
    /// # Panics
    ///
    /// Panics when the chain declares `type_name` but no layer maps it.
    fn definition_type(&self, type_name: &TypeName) -> IntermediateType {
        delegate(self).definition_type(type_name)
    }

    /// Resolves the type of an expression.
    fn resolved_type(&self, expr: &Expr, cx: &ResolveContext<'_>) -> IntermediateType {
        delegate(self).resolved_type(expr, cx)
    }

    /// Resolves the return type of a built-in function, `None` when no
    /// layer knows it.
    fn function_type(&self, call: &FunctionCall, cx: &ResolveContext<'_>) -> Option<IntermediateType> {
        self.parent().and_then(|p| p.function_type(call, cx))
    }

    /// Infers the type of `argument`, a bind parameter directly inside
    /// `parent`, from the expressions around it.
    fn argument_type(&self, parent: &Expr, argument: &Expr, cx: &ResolveContext<'_>) -> IntermediateType {
        delegate(self).argument_type(parent, argument, cx)
    }

    /// Exposes the result shape of a mutation that also returns rows.
    fn query_with_results<'s>(&self, statement: &'s Statement) -> Option<QueryWithResults<'s>> {
        self.parent().and_then(|p| p.query_with_results(statement))
    }
}

fn delegate<R: TypeResolver + ?Sized>(resolver: &R) -> &dyn TypeResolver {
    resolver
        .parent()
        .unwrap_or_else(|| panic!("resolver {} has no parent to delegate to", resolver.name()))
}

/// Walks the chain from `head` to the root, yielding each layer's name.
#[must_use]
pub fn chain_names(head: &dyn TypeResolver) -> Vec<&'static str> {
    let mut names = vec![head.name()];
    let mut current = head.parent();
    while let Some(layer) = current {
        names.push(layer.name());
        current = layer.parent();
    }
    names
}
