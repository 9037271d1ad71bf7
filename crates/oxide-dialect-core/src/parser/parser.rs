//! SQL Parser implementation.

use super::error::ParseError;
use super::pratt::{infix_binding_power, token_to_binary_op, token_to_json_op, token_to_unary_op};
use crate::ast::{
    BinaryOp, CompoundOperator, ConflictAction, DeleteStatement, Expr, FunctionCall, InList,
    InsertSource, InsertStatement, JoinClause, JoinType, Literal, NullOrdering, OnConflict,
    OrderBy, OrderDirection, Query, SelectColumn, SelectCore, Statement, TableRef, UnaryOp,
    UpdateAssignment, UpdateStatement, WindowSpec,
};
use crate::grammar::{Feature, Grammar};
use crate::lexer::{Keyword, Lexer, Span, Token, TokenKind};

/// Niladic functions written without parentheses.
const NILADIC_FUNCTIONS: &[&str] = &[
    "CURRENT_DATE",
    "CURRENT_TIME",
    "CURRENT_TIMESTAMP",
    "LOCALTIME",
    "LOCALTIMESTAMP",
];

/// SQL Parser.
///
/// The parser accepts the syntax enabled by its [`Grammar`]; anything gated
/// behind a disabled [`Feature`] is rejected with a `ParseError` naming the
/// feature.
pub struct Parser<'a> {
    pub(super) source: &'a str,
    lexer: Lexer<'a>,
    pub(super) current: Token,
    pub(super) previous: Token,
    grammar: Grammar,
    /// Highest positional index handed out so far in this statement.
    param_counter: usize,
    /// Named parameters seen so far in this statement, with their index.
    named_params: Vec<(String, usize)>,
}

impl<'a> Parser<'a> {
    /// Creates a parser accepting every grammar extension.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self::with_grammar(input, Grammar::all())
    }

    /// Creates a parser restricted to the given grammar.
    #[must_use]
    pub fn with_grammar(input: &'a str, grammar: Grammar) -> Self {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token();
        Self {
            source: input,
            lexer,
            current,
            previous: Token::new(TokenKind::Eof, Span::new(0, 0)),
            grammar,
            param_counter: 0,
            named_params: Vec::new(),
        }
    }

    /// Returns the grammar this parser was built with.
    #[must_use]
    pub const fn grammar(&self) -> Grammar {
        self.grammar
    }

    /// Parses a single SQL statement.
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` if the input is not a valid SQL statement.
    pub fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        self.param_counter = 0;
        self.named_params.clear();

        match &self.current.kind {
            TokenKind::Keyword(Keyword::Select) => Ok(Statement::Select(self.parse_query()?)),
            TokenKind::Keyword(Keyword::Insert | Keyword::Replace) => {
                Ok(Statement::Insert(self.parse_insert_statement()?))
            }
            TokenKind::Keyword(Keyword::Update) => {
                Ok(Statement::Update(self.parse_update_statement()?))
            }
            TokenKind::Keyword(Keyword::Delete) => {
                Ok(Statement::Delete(self.parse_delete_statement()?))
            }
            TokenKind::Keyword(Keyword::Create) => self.parse_create_statement(),
            TokenKind::Keyword(Keyword::Drop) => self.parse_drop_statement(),
            TokenKind::Keyword(Keyword::Alter) => {
                Ok(Statement::AlterTable(self.parse_alter_table_statement()?))
            }
            _ => Err(ParseError::unexpected(
                "SELECT, INSERT, UPDATE, DELETE, CREATE, DROP, or ALTER",
                self.current.kind.clone(),
                self.current.span,
            )),
        }
    }

    /// Parses every `;`-separated statement in the input.
    ///
    /// A statement that fails to parse yields an error and parsing resumes
    /// after the next `;`, so one bad statement does not hide the others.
    pub fn parse_script(&mut self) -> Vec<Result<Statement, ParseError>> {
        let mut results = vec![];
        loop {
            while self.check(&TokenKind::Semicolon) {
                self.advance();
            }
            if self.current.is_eof() {
                break;
            }
            let result = self.parse_statement().and_then(|stmt| {
                if self.check(&TokenKind::Semicolon) || self.current.is_eof() {
                    Ok(stmt)
                } else {
                    Err(ParseError::unexpected(
                        "';'",
                        self.current.kind.clone(),
                        self.current.span,
                    ))
                }
            });
            if result.is_err() {
                self.recover();
            }
            results.push(result);
        }
        results
    }

    /// Parses every statement, failing on the first error.
    ///
    /// # Errors
    ///
    /// Returns the first `ParseError` encountered.
    pub fn parse_all(&mut self) -> Result<Vec<Statement>, ParseError> {
        self.parse_script().into_iter().collect()
    }

    /// Skips to just past the next `;`.
    fn recover(&mut self) {
        while !self.current.is_eof() && !self.check(&TokenKind::Semicolon) {
            self.advance();
        }
    }

    /// Parses a query: select blocks joined by set operators, then ORDER BY / LIMIT.
    pub(super) fn parse_query(&mut self) -> Result<Query, ParseError> {
        let start = self.current.span.start;
        let body = self.parse_select_core()?;

        let mut compounds = vec![];
        loop {
            let op = match &self.current.kind {
                TokenKind::Keyword(Keyword::Union) => {
                    self.advance();
                    if self.check_keyword(Keyword::All) {
                        self.advance();
                        CompoundOperator::UnionAll
                    } else {
                        CompoundOperator::Union
                    }
                }
                TokenKind::Keyword(Keyword::Intersect) => {
                    self.advance();
                    CompoundOperator::Intersect
                }
                TokenKind::Keyword(Keyword::Except) => {
                    self.advance();
                    CompoundOperator::Except
                }
                _ => break,
            };
            compounds.push((op, self.parse_select_core()?));
        }

        // ORDER BY clause
        let order_by = if self.check_keyword(Keyword::Order) {
            self.advance();
            self.expect_keyword(Keyword::By)?;
            self.parse_order_by_list()?
        } else {
            vec![]
        };

        // LIMIT clause, including the `LIMIT offset, count` form
        let mut offset = None;
        let limit = if self.check_keyword(Keyword::Limit) {
            self.advance();
            let first = self.parse_expression(0)?;
            if self.check(&TokenKind::Comma) {
                self.advance();
                offset = Some(first);
                Some(self.parse_expression(0)?)
            } else {
                Some(first)
            }
        } else {
            None
        };

        // OFFSET clause
        if self.check_keyword(Keyword::Offset) {
            self.advance();
            offset = Some(self.parse_expression(0)?);
        }

        Ok(Query {
            body,
            compounds,
            order_by,
            limit,
            offset,
            span: self.span_from(start),
        })
    }

    /// Parses one SELECT block.
    fn parse_select_core(&mut self) -> Result<SelectCore, ParseError> {
        self.expect_keyword(Keyword::Select)?;

        // DISTINCT or ALL
        let distinct = if self.check_keyword(Keyword::Distinct) {
            self.advance();
            true
        } else {
            if self.check_keyword(Keyword::All) {
                self.advance();
            }
            false
        };

        let columns = self.parse_select_columns()?;

        // FROM clause (optional for expressions like SELECT 1+1)
        let from = if self.check_keyword(Keyword::From) {
            self.advance();
            Some(self.parse_table_ref()?)
        } else {
            None
        };

        let where_clause = self.parse_optional_where()?;

        let group_by = if self.check_keyword(Keyword::Group) {
            self.advance();
            self.expect_keyword(Keyword::By)?;
            self.parse_expression_list()?
        } else {
            vec![]
        };

        let having = if self.check_keyword(Keyword::Having) {
            self.advance();
            Some(self.parse_expression(0)?)
        } else {
            None
        };

        Ok(SelectCore {
            distinct,
            columns,
            from,
            where_clause,
            group_by,
            having,
        })
    }

    /// Parses SELECT (or RETURNING) columns.
    pub(super) fn parse_select_columns(&mut self) -> Result<Vec<SelectColumn>, ParseError> {
        let mut columns = vec![];

        loop {
            let start = self.current.span.start;
            let expr = self.parse_expression(0)?;
            let span = self.span_from(start);

            // Check for alias (AS name or just name)
            let alias = if self.check_keyword(Keyword::As) {
                self.advance();
                Some(self.expect_identifier()?)
            } else if matches!(&self.current.kind, TokenKind::Identifier(_) | TokenKind::String(_))
            {
                Some(self.expect_alias()?)
            } else {
                None
            };

            columns.push(SelectColumn { expr, alias, span });

            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }

        Ok(columns)
    }

    /// Parses a table reference with any trailing joins.
    pub(super) fn parse_table_ref(&mut self) -> Result<TableRef, ParseError> {
        let mut table_ref = self.parse_simple_table_ref()?;

        loop {
            let join_type = if self.check(&TokenKind::Comma) {
                self.advance();
                JoinType::Cross
            } else if self.is_join_keyword() {
                self.parse_join_type()?
            } else {
                break;
            };
            let right = self.parse_simple_table_ref()?;

            let (on, using) = if self.check_keyword(Keyword::On) {
                self.advance();
                (Some(self.parse_expression(0)?), vec![])
            } else if self.check_keyword(Keyword::Using) {
                self.advance();
                self.expect(&TokenKind::LeftParen)?;
                let cols = self.parse_identifier_list()?;
                self.expect(&TokenKind::RightParen)?;
                (None, cols)
            } else if join_type == JoinType::Cross || join_type == JoinType::Inner {
                (None, vec![])
            } else {
                return Err(ParseError::new(
                    "Expected ON or USING clause",
                    self.current.span,
                ));
            };

            table_ref = TableRef::Join {
                left: Box::new(table_ref),
                join: Box::new(JoinClause {
                    join_type,
                    table: right,
                    on,
                    using,
                }),
            };
        }

        Ok(table_ref)
    }

    /// Parses a table name, subquery, or parenthesized join (no trailing joins).
    fn parse_simple_table_ref(&mut self) -> Result<TableRef, ParseError> {
        if self.check(&TokenKind::LeftParen) {
            self.advance();
            if self.check_keyword(Keyword::Select) {
                let query = self.parse_query()?;
                self.expect(&TokenKind::RightParen)?;
                let alias = self.parse_optional_alias()?;
                return Ok(TableRef::Subquery {
                    query: Box::new(query),
                    alias: alias.unwrap_or_else(|| String::from("subquery")),
                });
            }
            let inner = self.parse_table_ref()?;
            self.expect(&TokenKind::RightParen)?;
            return Ok(inner);
        }

        let (name, span) = self.parse_qualified_name()?;
        let alias = self.parse_optional_alias()?;
        Ok(TableRef::Table { name, alias, span })
    }

    /// Parses `[schema.]name`, keeping only the object name.
    pub(super) fn parse_qualified_name(&mut self) -> Result<(String, Span), ParseError> {
        let (mut name, mut span) = self.expect_identifier_spanned()?;
        if self.check(&TokenKind::Dot) {
            self.advance();
            (name, span) = self.expect_identifier_spanned()?;
        }
        Ok((name, span))
    }

    /// Checks if current token is a join keyword.
    fn is_join_keyword(&self) -> bool {
        matches!(
            &self.current.kind,
            TokenKind::Keyword(
                Keyword::Join
                    | Keyword::Inner
                    | Keyword::Left
                    | Keyword::Right
                    | Keyword::Full
                    | Keyword::Cross
            )
        )
    }

    /// Parses a join type.
    fn parse_join_type(&mut self) -> Result<JoinType, ParseError> {
        let join_type = match &self.current.kind {
            TokenKind::Keyword(Keyword::Join) => JoinType::Inner,
            TokenKind::Keyword(Keyword::Inner) => {
                self.advance();
                JoinType::Inner
            }
            TokenKind::Keyword(kw @ (Keyword::Left | Keyword::Right | Keyword::Full)) => {
                let join_type = match kw {
                    Keyword::Left => JoinType::Left,
                    Keyword::Right => JoinType::Right,
                    _ => JoinType::Full,
                };
                self.advance();
                if self.check_keyword(Keyword::Outer) {
                    self.advance();
                }
                join_type
            }
            TokenKind::Keyword(Keyword::Cross) => {
                self.advance();
                JoinType::Cross
            }
            _ => {
                return Err(ParseError::unexpected(
                    "JOIN keyword",
                    self.current.kind.clone(),
                    self.current.span,
                ));
            }
        };
        self.expect_keyword(Keyword::Join)?;
        Ok(join_type)
    }

    /// Parses an optional table alias.
    fn parse_optional_alias(&mut self) -> Result<Option<String>, ParseError> {
        if self.check_keyword(Keyword::As) {
            self.advance();
            Ok(Some(self.expect_identifier()?))
        } else if matches!(&self.current.kind, TokenKind::Identifier(_)) {
            Ok(Some(self.expect_identifier()?))
        } else {
            Ok(None)
        }
    }

    /// Parses an optional WHERE clause.
    pub(super) fn parse_optional_where(&mut self) -> Result<Option<Expr>, ParseError> {
        if self.check_keyword(Keyword::Where) {
            self.advance();
            Ok(Some(self.parse_expression(0)?))
        } else {
            Ok(None)
        }
    }

    /// Parses an optional RETURNING clause.
    fn parse_optional_returning(&mut self) -> Result<Vec<SelectColumn>, ParseError> {
        if !self.check_keyword(Keyword::Returning) {
            return Ok(vec![]);
        }
        self.require(Feature::Returning)?;
        self.advance();
        self.parse_select_columns()
    }

    /// Parses an INSERT statement.
    fn parse_insert_statement(&mut self) -> Result<InsertStatement, ParseError> {
        let start = self.current.span.start;
        let mut replace = false;
        if self.check_keyword(Keyword::Replace) {
            self.advance();
            replace = true;
        } else {
            self.expect_keyword(Keyword::Insert)?;
            // INSERT OR REPLACE / OR IGNORE / OR ABORT ...
            if self.check_keyword(Keyword::Or) {
                self.advance();
                replace = self.check_keyword(Keyword::Replace);
                self.advance();
            }
        }
        self.expect_keyword(Keyword::Into)?;

        let (table, _) = self.parse_qualified_name()?;
        if self.check_keyword(Keyword::As) {
            self.advance();
            self.expect_identifier()?;
        }

        // Column list (optional)
        let columns = if self.check(&TokenKind::LeftParen) {
            self.advance();
            let cols = self.parse_identifier_list()?;
            self.expect(&TokenKind::RightParen)?;
            cols
        } else {
            vec![]
        };

        // VALUES, SELECT, or DEFAULT VALUES
        let values = if self.check_keyword(Keyword::Values) {
            self.advance();
            let mut rows = vec![];
            loop {
                self.expect(&TokenKind::LeftParen)?;
                let row = self.parse_expression_list()?;
                self.expect(&TokenKind::RightParen)?;
                rows.push(row);
                if !self.check(&TokenKind::Comma) {
                    break;
                }
                self.advance();
            }
            InsertSource::Values(rows)
        } else if self.check_keyword(Keyword::Select) {
            InsertSource::Query(Box::new(self.parse_query()?))
        } else if self.check_keyword(Keyword::Default) {
            self.advance();
            self.expect_keyword(Keyword::Values)?;
            InsertSource::DefaultValues
        } else {
            return Err(ParseError::unexpected(
                "VALUES, SELECT, or DEFAULT VALUES",
                self.current.kind.clone(),
                self.current.span,
            ));
        };

        let on_conflict = if self.check_keyword(Keyword::On) {
            Some(self.parse_on_conflict()?)
        } else {
            None
        };

        let returning = self.parse_optional_returning()?;

        Ok(InsertStatement {
            replace,
            table,
            columns,
            values,
            on_conflict,
            returning,
            span: self.span_from(start),
        })
    }

    /// Parses `ON CONFLICT ...` or MySQL's `ON DUPLICATE KEY UPDATE ...`.
    fn parse_on_conflict(&mut self) -> Result<OnConflict, ParseError> {
        self.require(Feature::Upsert)?;
        self.expect_keyword(Keyword::On)?;

        if self.check_word("DUPLICATE") {
            self.advance();
            self.expect_keyword(Keyword::Key)?;
            self.expect_keyword(Keyword::Update)?;
            let assignments = self.parse_assignments()?;
            return Ok(OnConflict {
                columns: vec![],
                action: ConflictAction::DoUpdate(assignments),
            });
        }

        self.expect_keyword(Keyword::Conflict)?;
        let columns = if self.check(&TokenKind::LeftParen) {
            self.advance();
            let cols = self.parse_identifier_list()?;
            self.expect(&TokenKind::RightParen)?;
            // Partial-index target
            self.parse_optional_where()?;
            cols
        } else {
            vec![]
        };

        self.expect_keyword(Keyword::Do)?;
        let action = if self.check_keyword(Keyword::Nothing) {
            self.advance();
            ConflictAction::DoNothing
        } else {
            self.expect_keyword(Keyword::Update)?;
            self.expect_keyword(Keyword::Set)?;
            let assignments = self.parse_assignments()?;
            self.parse_optional_where()?;
            ConflictAction::DoUpdate(assignments)
        };

        Ok(OnConflict { columns, action })
    }

    /// Parses `col = expr, ...`.
    fn parse_assignments(&mut self) -> Result<Vec<UpdateAssignment>, ParseError> {
        let mut assignments = vec![];
        loop {
            let (mut column, _) = self.expect_identifier_spanned()?;
            if self.check(&TokenKind::Dot) {
                self.advance();
                column = self.expect_identifier()?;
            }
            self.expect(&TokenKind::Eq)?;
            let value = self.parse_expression(0)?;
            assignments.push(UpdateAssignment { column, value });

            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }
        Ok(assignments)
    }

    /// Parses an UPDATE statement.
    fn parse_update_statement(&mut self) -> Result<UpdateStatement, ParseError> {
        let start = self.current.span.start;
        self.expect_keyword(Keyword::Update)?;
        if self.check_keyword(Keyword::Or) {
            self.advance();
            self.advance();
        }

        let (table, _) = self.parse_qualified_name()?;
        let alias = self.parse_optional_alias()?;

        self.expect_keyword(Keyword::Set)?;
        let assignments = self.parse_assignments()?;

        // FROM clause (optional, for joins)
        let from = if self.check_keyword(Keyword::From) {
            self.require(Feature::UpdateFrom)?;
            self.advance();
            Some(self.parse_table_ref()?)
        } else {
            None
        };

        let where_clause = self.parse_optional_where()?;
        let returning = self.parse_optional_returning()?;

        Ok(UpdateStatement {
            table,
            alias,
            assignments,
            from,
            where_clause,
            returning,
            span: self.span_from(start),
        })
    }

    /// Parses a DELETE statement.
    fn parse_delete_statement(&mut self) -> Result<DeleteStatement, ParseError> {
        let start = self.current.span.start;
        self.expect_keyword(Keyword::Delete)?;
        self.expect_keyword(Keyword::From)?;

        let (table, _) = self.parse_qualified_name()?;
        let alias = self.parse_optional_alias()?;

        let where_clause = self.parse_optional_where()?;
        let returning = self.parse_optional_returning()?;

        Ok(DeleteStatement {
            table,
            alias,
            where_clause,
            returning,
            span: self.span_from(start),
        })
    }

    /// Parses an ORDER BY list.
    fn parse_order_by_list(&mut self) -> Result<Vec<OrderBy>, ParseError> {
        let mut items = vec![];
        loop {
            let expr = self.parse_expression(0)?;
            let direction = if self.check_keyword(Keyword::Desc) {
                self.advance();
                OrderDirection::Desc
            } else {
                if self.check_keyword(Keyword::Asc) {
                    self.advance();
                }
                OrderDirection::Asc
            };

            let nulls = if self.check_keyword(Keyword::Nulls) {
                self.require(Feature::NullsOrdering)?;
                self.advance();
                if self.check_keyword(Keyword::First) {
                    self.advance();
                    Some(NullOrdering::First)
                } else {
                    self.expect_keyword(Keyword::Last)?;
                    Some(NullOrdering::Last)
                }
            } else {
                None
            };

            items.push(OrderBy {
                expr,
                direction,
                nulls,
            });

            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }
        Ok(items)
    }

    /// Parses an expression using Pratt parsing.
    pub(super) fn parse_expression(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_prefix()?;

        loop {
            let Some((l_bp, r_bp)) = infix_binding_power(&self.current.kind) else {
                break;
            };
            if l_bp < min_bp {
                break;
            }

            match &self.current.kind {
                TokenKind::Keyword(Keyword::Is) => {
                    self.advance();
                    let negated = if self.check_keyword(Keyword::Not) {
                        self.advance();
                        true
                    } else {
                        false
                    };
                    if self.check_keyword(Keyword::Null) {
                        self.advance();
                        lhs = Expr::IsNull {
                            expr: Box::new(lhs),
                            negated,
                        };
                    } else {
                        // `a IS b` compares like `=`, treating NULLs as equal
                        let rhs = self.parse_expression(r_bp)?;
                        let op = if negated { BinaryOp::NotEq } else { BinaryOp::Eq };
                        lhs = lhs.binary(op, rhs);
                    }
                }
                TokenKind::Keyword(Keyword::Not) => {
                    if !matches!(
                        self.peek().kind,
                        TokenKind::Keyword(
                            Keyword::In | Keyword::Between | Keyword::Like | Keyword::Glob
                        )
                    ) {
                        break;
                    }
                    self.advance();
                    lhs = self.parse_negatable(lhs, r_bp, true)?;
                }
                TokenKind::Keyword(Keyword::In | Keyword::Between | Keyword::Like | Keyword::Glob) => {
                    lhs = self.parse_negatable(lhs, r_bp, false)?;
                }
                TokenKind::Keyword(Keyword::Collate) => {
                    self.advance();
                    let collation = self.expect_identifier()?;
                    lhs = Expr::Collate {
                        expr: Box::new(lhs),
                        collation,
                    };
                }
                TokenKind::DoubleColon => {
                    self.advance();
                    let data_type = self.expect_type_name()?;
                    lhs = Expr::Cast {
                        expr: Box::new(lhs),
                        data_type,
                    };
                }
                kind => {
                    if let Some(op) = token_to_json_op(kind) {
                        self.require(Feature::JsonOperators)?;
                        self.advance();
                        let rhs = self.parse_expression(r_bp)?;
                        lhs = Expr::Json {
                            left: Box::new(lhs),
                            op,
                            right: Box::new(rhs),
                        };
                    } else if let Some(op) = token_to_binary_op(kind) {
                        self.advance();
                        let rhs = self.parse_expression(r_bp)?;
                        lhs = lhs.binary(op, rhs);
                    } else {
                        break;
                    }
                }
            }
        }

        Ok(lhs)
    }

    /// Parses the operators that accept a `NOT` prefix: IN, BETWEEN, LIKE, GLOB.
    fn parse_negatable(&mut self, lhs: Expr, r_bp: u8, negated: bool) -> Result<Expr, ParseError> {
        let token = self.current.clone();
        self.advance();
        match token.kind {
            TokenKind::Keyword(Keyword::In) => {
                self.expect(&TokenKind::LeftParen)?;
                let list = if self.check_keyword(Keyword::Select) {
                    InList::Query(Box::new(self.parse_query()?))
                } else if self.check(&TokenKind::RightParen) {
                    InList::Values(vec![])
                } else {
                    InList::Values(self.parse_expression_list()?)
                };
                self.expect(&TokenKind::RightParen)?;
                Ok(Expr::In {
                    expr: Box::new(lhs),
                    list,
                    negated,
                })
            }
            TokenKind::Keyword(Keyword::Between) => {
                let low = self.parse_expression(r_bp)?;
                self.expect_keyword(Keyword::And)?;
                let high = self.parse_expression(r_bp)?;
                Ok(Expr::Between {
                    expr: Box::new(lhs),
                    low: Box::new(low),
                    high: Box::new(high),
                    negated,
                })
            }
            kind => {
                let op = token_to_binary_op(&kind).ok_or_else(|| {
                    ParseError::unexpected("IN, BETWEEN, LIKE, or GLOB", kind.clone(), token.span)
                })?;
                let rhs = self.parse_expression(r_bp)?;
                if self.check_keyword(Keyword::Escape) {
                    self.advance();
                    self.parse_expression(r_bp)?;
                }
                let expr = lhs.binary(op, rhs);
                Ok(if negated {
                    Expr::Unary {
                        op: UnaryOp::Not,
                        operand: Box::new(expr),
                    }
                } else {
                    expr
                })
            }
        }
    }

    /// Parses a prefix expression.
    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        if self.check_keyword(Keyword::Not)
            && matches!(self.peek().kind, TokenKind::Keyword(Keyword::Exists))
        {
            self.advance();
            return self.parse_exists(true);
        }

        if let Some((op, bp)) = token_to_unary_op(&self.current.kind) {
            self.advance();
            let operand = self.parse_expression(bp)?;
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
            });
        }

        self.parse_primary()
    }

    /// Parses a primary expression.
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.current.clone();

        match &token.kind {
            // Literals
            TokenKind::Integer(n) => {
                self.advance();
                Ok(Expr::Literal(Literal::Integer(*n)))
            }
            TokenKind::Float(f) => {
                self.advance();
                Ok(Expr::Literal(Literal::Float(*f)))
            }
            TokenKind::String(s) => {
                let value = s.clone();
                self.advance();
                Ok(Expr::Literal(Literal::String(value)))
            }
            TokenKind::Blob(b) => {
                let value = b.clone();
                self.advance();
                Ok(Expr::Literal(Literal::Blob(value)))
            }
            TokenKind::Keyword(Keyword::True) => {
                self.advance();
                Ok(Expr::Literal(Literal::Boolean(true)))
            }
            TokenKind::Keyword(Keyword::False) => {
                self.advance();
                Ok(Expr::Literal(Literal::Boolean(false)))
            }
            TokenKind::Keyword(Keyword::Null) => {
                self.advance();
                Ok(Expr::Literal(Literal::Null))
            }

            // Parameter placeholders
            TokenKind::Question => self.parse_positional_parameter(),
            TokenKind::Colon | TokenKind::At => {
                self.advance();
                let name = self.expect_identifier()?;
                let position = self.named_position(&name);
                Ok(Expr::Parameter {
                    name: Some(name),
                    position,
                    span: self.span_from(token.span.start),
                })
            }

            // Wildcard
            TokenKind::Star => {
                self.advance();
                Ok(Expr::Wildcard { table: None })
            }

            // Parenthesized expression or subquery
            TokenKind::LeftParen => {
                self.advance();
                if self.check_keyword(Keyword::Select) {
                    let subquery = self.parse_query()?;
                    self.expect(&TokenKind::RightParen)?;
                    Ok(Expr::Subquery(Box::new(subquery)))
                } else {
                    let expr = self.parse_expression(0)?;
                    self.expect(&TokenKind::RightParen)?;
                    Ok(Expr::Paren(Box::new(expr)))
                }
            }

            TokenKind::Keyword(Keyword::Case) => self.parse_case_expression(),
            TokenKind::Keyword(Keyword::Cast) => self.parse_cast_expression(),
            TokenKind::Keyword(Keyword::Exists) => self.parse_exists(false),

            // Function names that collide with keywords: left(), right(), replace(), if()
            TokenKind::Keyword(kw)
                if (!kw.is_reserved()
                    || matches!(kw, Keyword::Left | Keyword::Right | Keyword::Glob | Keyword::Like))
                    && matches!(self.peek().kind, TokenKind::LeftParen) =>
            {
                let name = String::from(token.span.text(self.source));
                self.advance();
                self.parse_function_call(name, token.span.start)
            }

            TokenKind::Identifier(_) | TokenKind::Keyword(_) => self.parse_identifier_expression(),

            _ => Err(ParseError::unexpected(
                "expression",
                self.current.kind.clone(),
                self.current.span,
            )),
        }
    }

    /// Parses a column reference, qualified wildcard, or function call.
    fn parse_identifier_expression(&mut self) -> Result<Expr, ParseError> {
        let (name, span) = self.expect_identifier_spanned()?;

        // Check for function call
        if self.check(&TokenKind::LeftParen) {
            return self.parse_function_call(name, span.start);
        }

        // Check for qualified name (table.column or table.*)
        if self.check(&TokenKind::Dot) {
            self.advance();
            if self.check(&TokenKind::Star) {
                self.advance();
                return Ok(Expr::Wildcard { table: Some(name) });
            }
            let (column, column_span) = self.expect_identifier_spanned()?;
            return Ok(Expr::Column {
                table: Some(name),
                name: column,
                span: span.merge(column_span),
            });
        }

        if NILADIC_FUNCTIONS
            .iter()
            .any(|f| f.eq_ignore_ascii_case(&name))
        {
            return Ok(Expr::Function(FunctionCall {
                name,
                args: vec![],
                distinct: false,
                star: false,
                over: None,
                span,
            }));
        }

        Ok(Expr::Column {
            table: None,
            name,
            span,
        })
    }

    /// Parses `?` or `?N`.
    fn parse_positional_parameter(&mut self) -> Result<Expr, ParseError> {
        let question = self.current.span;
        self.advance();

        // `?N` lexes as two adjacent tokens
        if let TokenKind::Integer(n) = self.current.kind {
            if self.current.span.start == question.end {
                let position = usize::try_from(n)
                    .ok()
                    .filter(|p| *p > 0)
                    .ok_or_else(|| ParseError::new("Invalid parameter index", self.current.span))?;
                self.advance();
                self.param_counter = self.param_counter.max(position);
                return Ok(Expr::Parameter {
                    name: None,
                    position,
                    span: self.span_from(question.start),
                });
            }
        }

        self.param_counter += 1;
        Ok(Expr::Parameter {
            name: None,
            position: self.param_counter,
            span: question,
        })
    }

    /// Returns the index of a named parameter, allocating one on first use.
    fn named_position(&mut self, name: &str) -> usize {
        if let Some((_, position)) = self.named_params.iter().find(|(n, _)| n == name) {
            return *position;
        }
        self.param_counter += 1;
        self.named_params
            .push((String::from(name), self.param_counter));
        self.param_counter
    }

    /// Parses `[NOT] EXISTS (subquery)`; the NOT has already been consumed.
    fn parse_exists(&mut self, negated: bool) -> Result<Expr, ParseError> {
        self.expect_keyword(Keyword::Exists)?;
        self.expect(&TokenKind::LeftParen)?;
        let query = self.parse_query()?;
        self.expect(&TokenKind::RightParen)?;
        Ok(Expr::Exists {
            query: Box::new(query),
            negated,
        })
    }

    /// Parses a function call; the name has already been consumed.
    fn parse_function_call(&mut self, name: String, start: usize) -> Result<Expr, ParseError> {
        self.expect(&TokenKind::LeftParen)?;

        let distinct = if self.check_keyword(Keyword::Distinct) {
            self.advance();
            true
        } else {
            false
        };

        let mut star = false;
        let args = if self.check(&TokenKind::RightParen) {
            vec![]
        } else if self.check(&TokenKind::Star) {
            self.advance();
            star = true;
            vec![]
        } else {
            self.parse_expression_list()?
        };

        // group_concat(x ORDER BY y) / string_agg(x, ',' ORDER BY y)
        if self.check_keyword(Keyword::Order) {
            self.advance();
            self.expect_keyword(Keyword::By)?;
            self.parse_order_by_list()?;
        }

        self.expect(&TokenKind::RightParen)?;

        // FILTER (WHERE ...)
        if self.check_word("FILTER") && matches!(self.peek().kind, TokenKind::LeftParen) {
            self.advance();
            self.expect(&TokenKind::LeftParen)?;
            self.expect_keyword(Keyword::Where)?;
            self.parse_expression(0)?;
            self.expect(&TokenKind::RightParen)?;
        }

        let over = if self.check_keyword(Keyword::Over) {
            self.require(Feature::WindowFunctions)?;
            self.advance();
            Some(self.parse_window_spec()?)
        } else {
            None
        };

        Ok(Expr::Function(FunctionCall {
            name,
            args,
            distinct,
            star,
            over,
            span: self.span_from(start),
        }))
    }

    /// Parses the window after OVER: a name or `(PARTITION BY ... ORDER BY ... frame)`.
    fn parse_window_spec(&mut self) -> Result<WindowSpec, ParseError> {
        if !self.check(&TokenKind::LeftParen) {
            self.expect_identifier()?;
            return Ok(WindowSpec::default());
        }
        self.advance();

        let partition_by = if self.check_keyword(Keyword::Partition) {
            self.advance();
            self.expect_keyword(Keyword::By)?;
            self.parse_expression_list()?
        } else {
            vec![]
        };

        let order_by = if self.check_keyword(Keyword::Order) {
            self.advance();
            self.expect_keyword(Keyword::By)?;
            self.parse_order_by_list()?
        } else {
            vec![]
        };

        // Frame clauses do not affect result types.
        self.skip_to_closing_paren()?;

        Ok(WindowSpec {
            partition_by,
            order_by,
        })
    }

    /// Parses a CAST expression.
    fn parse_cast_expression(&mut self) -> Result<Expr, ParseError> {
        self.expect_keyword(Keyword::Cast)?;
        self.expect(&TokenKind::LeftParen)?;
        let expr = self.parse_expression(0)?;
        self.expect_keyword(Keyword::As)?;
        let data_type = self.expect_type_name()?;
        self.expect(&TokenKind::RightParen)?;

        Ok(Expr::Cast {
            expr: Box::new(expr),
            data_type,
        })
    }

    /// Parses a CASE expression.
    fn parse_case_expression(&mut self) -> Result<Expr, ParseError> {
        self.expect_keyword(Keyword::Case)?;

        // Check for simple CASE (CASE expr WHEN ...)
        let operand = if self.check_keyword(Keyword::When) {
            None
        } else {
            Some(Box::new(self.parse_expression(0)?))
        };

        let mut when_clauses = vec![];
        while self.check_keyword(Keyword::When) {
            self.advance();
            let when_expr = self.parse_expression(0)?;
            self.expect_keyword(Keyword::Then)?;
            let then_expr = self.parse_expression(0)?;
            when_clauses.push((when_expr, then_expr));
        }
        if when_clauses.is_empty() {
            return Err(ParseError::unexpected(
                "WHEN",
                self.current.kind.clone(),
                self.current.span,
            ));
        }

        let else_clause = if self.check_keyword(Keyword::Else) {
            self.advance();
            Some(Box::new(self.parse_expression(0)?))
        } else {
            None
        };

        self.expect_keyword(Keyword::End)?;

        Ok(Expr::Case {
            operand,
            when_clauses,
            else_clause,
        })
    }

    /// Parses a comma-separated list of expressions.
    pub(super) fn parse_expression_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut exprs = vec![];
        loop {
            exprs.push(self.parse_expression(0)?);
            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }
        Ok(exprs)
    }

    /// Parses a comma-separated list of identifiers.
    pub(super) fn parse_identifier_list(&mut self) -> Result<Vec<String>, ParseError> {
        let mut idents = vec![];
        loop {
            idents.push(self.expect_identifier()?);
            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }
        Ok(idents)
    }

    /// Skips balanced tokens up to and including the closing `)` of the current group.
    pub(super) fn skip_to_closing_paren(&mut self) -> Result<(), ParseError> {
        let mut depth = 0_usize;
        loop {
            match self.current.kind {
                TokenKind::Eof => return Err(ParseError::unexpected_eof("')'", self.current.span)),
                TokenKind::LeftParen => depth += 1,
                TokenKind::RightParen if depth == 0 => {
                    self.advance();
                    return Ok(());
                }
                TokenKind::RightParen => depth -= 1,
                _ => {}
            }
            self.advance();
        }
    }

    // --- Helper methods ---

    /// Advances to the next token.
    pub(super) fn advance(&mut self) {
        self.previous = core::mem::replace(&mut self.current, self.lexer.next_token());
    }

    /// Returns the token after the current one without consuming anything.
    pub(super) fn peek(&self) -> Token {
        self.lexer.clone().next_token()
    }

    /// Returns the span from `start` to the end of the last consumed token.
    pub(super) const fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.previous.span.end)
    }

    /// Fails unless the active grammar enables the feature.
    pub(super) fn require(&self, feature: Feature) -> Result<(), ParseError> {
        if self.grammar.supports(feature) {
            Ok(())
        } else {
            Err(ParseError::unsupported(feature, self.current.span))
        }
    }

    /// Checks if the current token matches the given kind.
    pub(super) fn check(&self, kind: &TokenKind) -> bool {
        core::mem::discriminant(&self.current.kind) == core::mem::discriminant(kind)
    }

    /// Checks if the current token is the given keyword.
    pub(super) fn check_keyword(&self, keyword: Keyword) -> bool {
        matches!(&self.current.kind, TokenKind::Keyword(kw) if *kw == keyword)
    }

    /// Checks if the current token is an unquoted word that is not a keyword.
    pub(super) fn check_word(&self, word: &str) -> bool {
        matches!(&self.current.kind, TokenKind::Identifier(name) if name.eq_ignore_ascii_case(word))
    }

    /// Expects the current token to be the given kind.
    pub(super) fn expect(&mut self, kind: &TokenKind) -> Result<(), ParseError> {
        if self.check(kind) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::unexpected(
                format!("{kind:?}"),
                self.current.kind.clone(),
                self.current.span,
            ))
        }
    }

    /// Expects the current token to be the given keyword.
    pub(super) fn expect_keyword(&mut self, keyword: Keyword) -> Result<(), ParseError> {
        if self.check_keyword(keyword) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::unexpected(
                keyword.as_str(),
                self.current.kind.clone(),
                self.current.span,
            ))
        }
    }

    /// Expects and returns an identifier.
    pub(super) fn expect_identifier(&mut self) -> Result<String, ParseError> {
        self.expect_identifier_spanned().map(|(name, _)| name)
    }

    /// Expects an identifier and returns it with its span.
    ///
    /// Non-reserved keywords are accepted as written in the source.
    pub(super) fn expect_identifier_spanned(&mut self) -> Result<(String, Span), ParseError> {
        let span = self.current.span;
        match &self.current.kind {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Ok((name, span))
            }
            TokenKind::Keyword(kw) if !kw.is_reserved() => {
                self.advance();
                Ok((String::from(span.text(self.source)), span))
            }
            _ => Err(ParseError::unexpected(
                "identifier",
                self.current.kind.clone(),
                self.current.span,
            )),
        }
    }

    /// Expects a column alias: an identifier or a string literal.
    fn expect_alias(&mut self) -> Result<String, ParseError> {
        if let TokenKind::String(alias) = &self.current.kind {
            let alias = alias.clone();
            self.advance();
            return Ok(alias);
        }
        self.expect_identifier()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BinaryOp;

    fn parse(sql: &str) -> Result<Statement, ParseError> {
        Parser::new(sql).parse_statement()
    }

    fn parse_query(sql: &str) -> Query {
        match parse(sql).unwrap() {
            Statement::Select(query) => query,
            other => panic!("Expected SELECT statement, got {other:?}"),
        }
    }

    #[test]
    fn test_simple_select() {
        let query = parse_query("SELECT id, name FROM users");
        assert_eq!(query.body.columns.len(), 2);
        assert_eq!(query.span, Span::new(0, 26));
    }

    #[test]
    fn test_select_with_join() {
        let query = parse_query("SELECT u.id, o.amount FROM users u LEFT JOIN orders o ON u.id = o.user_id");
        let Some(TableRef::Join { join, .. }) = &query.body.from else {
            panic!("Expected join");
        };
        assert_eq!(join.join_type, JoinType::Left);
        assert!(join.on.is_some());
    }

    #[test]
    fn test_comma_join_is_cross() {
        let query = parse_query("SELECT * FROM a, b");
        let Some(TableRef::Join { join, .. }) = &query.body.from else {
            panic!("Expected join");
        };
        assert_eq!(join.join_type, JoinType::Cross);
    }

    #[test]
    fn test_expression_precedence() {
        // 1 + 2 * 3 should be parsed as 1 + (2 * 3)
        let query = parse_query("SELECT 1 + 2 * 3");
        let Expr::Binary { op, right, .. } = &query.body.columns[0].expr else {
            panic!("Expected binary expression");
        };
        assert_eq!(*op, BinaryOp::Add);
        assert!(matches!(
            right.as_ref(),
            Expr::Binary {
                op: BinaryOp::Mul,
                ..
            }
        ));
    }

    #[test]
    fn test_not_binds_looser_than_comparison() {
        let query = parse_query("SELECT NOT a = 1 AND b");
        let Expr::Binary { op, left, .. } = &query.body.columns[0].expr else {
            panic!("Expected binary expression");
        };
        assert_eq!(*op, BinaryOp::And);
        assert!(matches!(left.as_ref(), Expr::Unary { op: UnaryOp::Not, .. }));
    }

    #[test]
    fn test_compound_select() {
        let query = parse_query("SELECT a FROM t UNION ALL SELECT b FROM u ORDER BY 1 LIMIT 3");
        assert_eq!(query.compounds.len(), 1);
        assert_eq!(query.compounds[0].0, CompoundOperator::UnionAll);
        assert_eq!(query.order_by.len(), 1);
        assert!(query.limit.is_some());
    }

    #[test]
    fn test_select_column_spans_and_aliases() {
        let sql = "SELECT a + b AS total, count(*) n FROM t";
        let query = parse_query(sql);
        assert_eq!(query.body.columns[0].span.text(sql), "a + b");
        assert_eq!(query.body.columns[0].alias.as_deref(), Some("total"));
        assert_eq!(query.body.columns[1].span.text(sql), "count(*)");
        assert_eq!(query.body.columns[1].alias.as_deref(), Some("n"));
    }

    #[test]
    fn test_parameter_placeholders() {
        let query = parse_query("SELECT * FROM users WHERE id = ? AND name = :name AND x = ?5 AND y = :name");
        let mut positions = vec![];
        collect_params(query.body.where_clause.as_ref().unwrap(), &mut positions);
        assert_eq!(positions, vec![1, 2, 5, 2]);
    }

    fn collect_params(expr: &Expr, out: &mut Vec<usize>) {
        match expr {
            Expr::Parameter { position, .. } => out.push(*position),
            Expr::Binary { left, right, .. } => {
                collect_params(left, out);
                collect_params(right, out);
            }
            _ => {}
        }
    }

    #[test]
    fn test_not_in_and_not_between() {
        let query = parse_query("SELECT * FROM t WHERE a NOT IN (1, 2) AND b NOT BETWEEN 1 AND 5");
        let Some(Expr::Binary { left, right, .. }) = &query.body.where_clause else {
            panic!("Expected AND");
        };
        assert!(matches!(left.as_ref(), Expr::In { negated: true, .. }));
        assert!(matches!(right.as_ref(), Expr::Between { negated: true, .. }));
    }

    #[test]
    fn test_in_subquery() {
        let query = parse_query("SELECT * FROM t WHERE a IN (SELECT id FROM u)");
        assert!(matches!(
            &query.body.where_clause,
            Some(Expr::In { list: InList::Query(_), .. })
        ));
    }

    #[test]
    fn test_keyword_named_functions() {
        let query = parse_query("SELECT replace(a, 'x', 'y'), left(b, 2), if(c, 1, 2) FROM t");
        for column in &query.body.columns {
            assert!(matches!(column.expr, Expr::Function(_)));
        }
    }

    #[test]
    fn test_non_reserved_keyword_as_column() {
        let query = parse_query("SELECT key, type FROM t");
        assert!(matches!(&query.body.columns[0].expr, Expr::Column { name, .. } if name == "key"));
    }

    #[test]
    fn test_window_function() {
        let query = parse_query("SELECT row_number() OVER (PARTITION BY a ORDER BY b DESC) FROM t");
        let Expr::Function(call) = &query.body.columns[0].expr else {
            panic!("Expected function");
        };
        let over = call.over.as_ref().unwrap();
        assert_eq!(over.partition_by.len(), 1);
        assert_eq!(over.order_by[0].direction, OrderDirection::Desc);
    }

    #[test]
    fn test_window_function_requires_feature() {
        let err = Parser::with_grammar("SELECT rank() OVER () FROM t", Grammar::base())
            .parse_statement()
            .unwrap_err();
        assert_eq!(err.feature, Some(Feature::WindowFunctions));
    }

    #[test]
    fn test_json_operators() {
        let query = parse_query("SELECT doc ->> '$.a' FROM t");
        assert!(matches!(&query.body.columns[0].expr, Expr::Json { .. }));

        let err = Parser::with_grammar("SELECT doc -> 'a' FROM t", Grammar::base())
            .parse_statement()
            .unwrap_err();
        assert_eq!(err.feature, Some(Feature::JsonOperators));
    }

    #[test]
    fn test_insert_values_returning() {
        let stmt = parse("INSERT INTO users (name, email) VALUES ('Alice', 'a@b.c') RETURNING id").unwrap();
        let Statement::Insert(insert) = stmt else {
            panic!("Expected INSERT statement");
        };
        assert_eq!(insert.table, "users");
        assert_eq!(insert.columns.len(), 2);
        assert!(matches!(insert.values, InsertSource::Values(_)));
        assert_eq!(insert.returning.len(), 1);
    }

    #[test]
    fn test_returning_requires_feature() {
        let err = Parser::with_grammar("DELETE FROM t RETURNING *", Grammar::base())
            .parse_statement()
            .unwrap_err();
        assert_eq!(err.feature, Some(Feature::Returning));
    }

    #[test]
    fn test_upsert() {
        let stmt = parse("INSERT INTO t (id, n) VALUES (1, 2) ON CONFLICT (id) DO UPDATE SET n = excluded.n").unwrap();
        let Statement::Insert(insert) = stmt else {
            panic!("Expected INSERT statement");
        };
        let conflict = insert.on_conflict.unwrap();
        assert_eq!(conflict.columns, vec![String::from("id")]);
        assert!(matches!(conflict.action, ConflictAction::DoUpdate(_)));
    }

    #[test]
    fn test_update_from() {
        let stmt = parse("UPDATE t SET a = u.a FROM u WHERE t.id = u.id").unwrap();
        let Statement::Update(update) = stmt else {
            panic!("Expected UPDATE statement");
        };
        assert!(update.from.is_some());
        assert!(update.where_clause.is_some());
    }

    #[test]
    fn test_delete() {
        let stmt = parse("DELETE FROM users WHERE id = 1").unwrap();
        let Statement::Delete(delete) = stmt else {
            panic!("Expected DELETE statement");
        };
        assert_eq!(delete.table, "users");
        assert!(delete.where_clause.is_some());
    }

    #[test]
    fn test_case_expression() {
        let query = parse_query("SELECT CASE WHEN status = 1 THEN 'active' END FROM users");
        assert!(matches!(
            query.body.columns[0].expr,
            Expr::Case {
                else_clause: None,
                ..
            }
        ));
    }

    #[test]
    fn test_cast_type_name_is_free_form() {
        let query = parse_query("SELECT CAST(a AS DOUBLE PRECISION), b::int FROM t");
        let Expr::Cast { data_type, .. } = &query.body.columns[0].expr else {
            panic!("Expected cast");
        };
        assert_eq!(data_type.name, "DOUBLE PRECISION");
        assert!(matches!(&query.body.columns[1].expr, Expr::Cast { data_type, .. } if data_type.name == "INT"));
    }

    #[test]
    fn test_script_recovers_after_error() {
        let results = Parser::new("SELECT 1; SELECT FROM; SELECT 2;").parse_script();
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
    }

    #[test]
    fn test_trailing_garbage_is_an_error() {
        let results = Parser::new("SELECT 1 2").parse_script();
        assert_eq!(results.len(), 1);
        assert!(results[0].is_err());
    }
}
