//! Expression AST types.

use super::statement::{OrderBy, Query};
use super::types::TypeName;
use crate::lexer::Span;

/// A literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Integer literal.
    Integer(i64),
    /// Float literal.
    Float(f64),
    /// String literal.
    String(String),
    /// Blob literal.
    Blob(Vec<u8>),
    /// Boolean literal.
    Boolean(bool),
    /// NULL literal.
    Null,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Comparison
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Logical
    And,
    Or,

    // String
    Concat,
    Like,
    Glob,

    // Bitwise
    BitAnd,
    BitOr,
    LeftShift,
    RightShift,
}

impl BinaryOp {
    /// Returns the SQL representation of the operator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Concat => "||",
            Self::Like => "LIKE",
            Self::Glob => "GLOB",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::LeftShift => "<<",
            Self::RightShift => ">>",
        }
    }

    /// Returns true for `+ - * / %`.
    #[must_use]
    pub const fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            Self::Add | Self::Sub | Self::Mul | Self::Div | Self::Mod
        )
    }

    /// Returns true for operators whose result is a truth value.
    #[must_use]
    pub const fn is_predicate(&self) -> bool {
        matches!(
            self,
            Self::Eq
                | Self::NotEq
                | Self::Lt
                | Self::LtEq
                | Self::Gt
                | Self::GtEq
                | Self::And
                | Self::Or
                | Self::Like
                | Self::Glob
        )
    }

    /// Returns true for `& | << >>`.
    #[must_use]
    pub const fn is_bitwise(&self) -> bool {
        matches!(
            self,
            Self::BitAnd | Self::BitOr | Self::LeftShift | Self::RightShift
        )
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Negation (-)
    Neg,
    /// Unary plus (+)
    Plus,
    /// Logical NOT
    Not,
    /// Bitwise NOT (~)
    BitNot,
}

impl UnaryOp {
    /// Returns the SQL representation of the operator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::Plus => "+",
            Self::Not => "NOT",
            Self::BitNot => "~",
        }
    }
}

/// JSON extraction operators (`->` and `->>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonOperator {
    /// `->` extracts a JSON sub-document.
    Extract,
    /// `->>` extracts an SQL value.
    ExtractText,
}

impl JsonOperator {
    /// Returns the SQL representation of the operator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Extract => "->",
            Self::ExtractText => "->>",
        }
    }
}

/// The `OVER (...)` clause of a window function call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WindowSpec {
    /// PARTITION BY expressions.
    pub partition_by: Vec<Expr>,
    /// ORDER BY clauses inside the window.
    pub order_by: Vec<OrderBy>,
}

/// A function call expression.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    /// The function name as written.
    pub name: String,
    /// The arguments. `count(*)` has no arguments and `star` set.
    pub args: Vec<Expr>,
    /// Whether DISTINCT was specified.
    pub distinct: bool,
    /// Whether the single argument was `*`.
    pub star: bool,
    /// Window clause, present for `f(...) OVER (...)`.
    pub over: Option<WindowSpec>,
    /// Source span of the whole call.
    pub span: Span,
}

impl FunctionCall {
    /// Returns true if the function name matches, ignoring case.
    #[must_use]
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Returns the lowercase function name used for table lookups.
    #[must_use]
    pub fn lookup_name(&self) -> String {
        self.name.to_ascii_lowercase()
    }
}

/// Right-hand side of an IN expression.
#[derive(Debug, Clone, PartialEq)]
pub enum InList {
    /// `IN (a, b, c)`
    Values(Vec<Expr>),
    /// `IN (SELECT ...)`
    Query(Box<Query>),
}

/// An SQL expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal value.
    Literal(Literal),

    /// A column reference (optionally qualified with table name).
    Column {
        /// Table name or alias (optional).
        table: Option<String>,
        /// Column name.
        name: String,
        /// Source span.
        span: Span,
    },

    /// A binary expression.
    Binary {
        /// Left operand.
        left: Box<Expr>,
        /// Operator.
        op: BinaryOp,
        /// Right operand.
        right: Box<Expr>,
    },

    /// A unary expression.
    Unary {
        /// Operator.
        op: UnaryOp,
        /// Operand.
        operand: Box<Expr>,
    },

    /// A JSON extraction (`doc -> path`, `doc ->> path`).
    Json {
        /// The JSON document.
        left: Box<Expr>,
        /// Operator.
        op: JsonOperator,
        /// The path or key.
        right: Box<Expr>,
    },

    /// A function call.
    Function(FunctionCall),

    /// A scalar subquery.
    Subquery(Box<Query>),

    /// EXISTS (subquery).
    Exists {
        /// The subquery.
        query: Box<Query>,
        /// Whether this is NOT EXISTS.
        negated: bool,
    },

    /// IS NULL expression.
    IsNull {
        /// The expression to check.
        expr: Box<Expr>,
        /// Whether this is IS NOT NULL.
        negated: bool,
    },

    /// IN expression.
    In {
        /// The expression to check.
        expr: Box<Expr>,
        /// The list of values or subquery.
        list: InList,
        /// Whether this is NOT IN.
        negated: bool,
    },

    /// BETWEEN expression.
    Between {
        /// The expression to check.
        expr: Box<Expr>,
        /// Lower bound.
        low: Box<Expr>,
        /// Upper bound.
        high: Box<Expr>,
        /// Whether this is NOT BETWEEN.
        negated: bool,
    },

    /// CASE expression.
    Case {
        /// The operand (if any).
        operand: Option<Box<Expr>>,
        /// WHEN/THEN clauses.
        when_clauses: Vec<(Expr, Expr)>,
        /// ELSE clause.
        else_clause: Option<Box<Expr>>,
    },

    /// CAST expression.
    Cast {
        /// Expression to cast.
        expr: Box<Expr>,
        /// Target type.
        data_type: TypeName,
    },

    /// `expr COLLATE name`.
    Collate {
        /// The collated expression.
        expr: Box<Expr>,
        /// Collation name.
        collation: String,
    },

    /// Parenthesized expression.
    Paren(Box<Expr>),

    /// A parameter placeholder (`?`, `?N` or `:name`).
    Parameter {
        /// The parameter name, for `:name` placeholders.
        name: Option<String>,
        /// Position in the statement (1-based).
        position: usize,
        /// Source span.
        span: Span,
    },

    /// Wildcard (*) in SELECT.
    Wildcard {
        /// Table qualifier (optional).
        table: Option<String>,
    },
}

impl Expr {
    /// Creates a new column reference.
    #[must_use]
    pub fn column(name: impl Into<String>) -> Self {
        Self::Column {
            table: None,
            name: name.into(),
            span: Span::default(),
        }
    }

    /// Creates a new qualified column reference.
    #[must_use]
    pub fn qualified_column(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Column {
            table: Some(table.into()),
            name: name.into(),
            span: Span::default(),
        }
    }

    /// Creates a new integer literal.
    #[must_use]
    pub const fn integer(value: i64) -> Self {
        Self::Literal(Literal::Integer(value))
    }

    /// Creates a new string literal.
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::Literal(Literal::String(value.into()))
    }

    /// Creates a NULL literal.
    #[must_use]
    pub const fn null() -> Self {
        Self::Literal(Literal::Null)
    }

    /// Creates a binary expression.
    #[must_use]
    pub fn binary(self, op: BinaryOp, right: Self) -> Self {
        Self::Binary {
            left: Box::new(self),
            op,
            right: Box::new(right),
        }
    }

    /// Creates an AND expression.
    #[must_use]
    pub fn and(self, right: Self) -> Self {
        self.binary(BinaryOp::And, right)
    }

    /// Creates an IS NOT NULL expression.
    #[must_use]
    pub fn is_not_null(self) -> Self {
        Self::IsNull {
            expr: Box::new(self),
            negated: true,
        }
    }

    /// Strips any number of enclosing parentheses.
    #[must_use]
    pub fn unparenthesized(&self) -> &Self {
        let mut expr = self;
        while let Self::Paren(inner) = expr {
            expr = inner;
        }
        expr
    }

    /// Returns the source span when the node records one.
    #[must_use]
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Column { span, .. } | Self::Parameter { span, .. } => Some(*span),
            Self::Function(call) => Some(call.span),
            Self::Paren(inner) | Self::Collate { expr: inner, .. } => inner.span(),
            Self::Binary { left, right, .. } | Self::Json { left, right, .. } => {
                match (left.span(), right.span()) {
                    (Some(l), Some(r)) => Some(l.merge(r)),
                    (l, r) => l.or(r),
                }
            }
            Self::Unary { operand, .. } => operand.span(),
            Self::IsNull { expr, .. }
            | Self::In { expr, .. }
            | Self::Between { expr, .. }
            | Self::Cast { expr, .. } => expr.span(),
            Self::Subquery(query) | Self::Exists { query, .. } => Some(query.span),
            Self::Literal(_) | Self::Case { .. } | Self::Wildcard { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_classes() {
        assert!(BinaryOp::Add.is_arithmetic());
        assert!(!BinaryOp::Concat.is_arithmetic());
        assert!(BinaryOp::Like.is_predicate());
        assert!(BinaryOp::LeftShift.is_bitwise());
        assert_eq!(JsonOperator::ExtractText.as_str(), "->>");
    }

    #[test]
    fn test_unparenthesized() {
        let expr = Expr::Paren(Box::new(Expr::Paren(Box::new(Expr::column("a")))));
        assert!(matches!(expr.unparenthesized(), Expr::Column { name, .. } if name == "a"));
    }

    #[test]
    fn test_expr_chaining() {
        let expr = Expr::column("age")
            .binary(BinaryOp::Gt, Expr::integer(18))
            .and(Expr::column("status").is_not_null());

        assert!(matches!(
            expr,
            Expr::Binary {
                op: BinaryOp::And,
                ..
            }
        ));
    }

    #[test]
    fn test_span_merges_operands() {
        let expr = Expr::Column {
            table: None,
            name: String::from("a"),
            span: Span::new(7, 8),
        }
        .binary(
            BinaryOp::Add,
            Expr::Column {
                table: None,
                name: String::from("b"),
                span: Span::new(11, 12),
            },
        );
        assert_eq!(expr.span(), Some(Span::new(7, 12)));
    }
}
