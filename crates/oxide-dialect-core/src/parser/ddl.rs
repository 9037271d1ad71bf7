//! Parsing of CREATE, DROP and ALTER TABLE statements.

use super::error::ParseError;
use super::parser::Parser;
use crate::ast::{
    AlterTableRule, AlterTableRuleKind, AlterTableStatement, ColumnConstraint,
    ColumnConstraintKind, ColumnDef, ColumnPosition, CreateIndexStatement, CreateTableStatement,
    CreateViewStatement, DropIndexStatement, DropTableStatement, Expr, ForeignKeyRef,
    ReferentialAction, Statement, TableConstraint, TableConstraintKind, TypeName,
};
use crate::grammar::Feature;
use crate::lexer::{Keyword, Span, TokenKind};

/// Words that end a type name even though they lex as identifiers.
const TYPE_NAME_TERMINATORS: &[&str] = &["AUTO_INCREMENT", "COMMENT", "GENERATED"];

impl Parser<'_> {
    /// Parses `CREATE TABLE | INDEX | VIEW`.
    pub(super) fn parse_create_statement(&mut self) -> Result<Statement, ParseError> {
        let start = self.current.span.start;
        self.expect_keyword(Keyword::Create)?;

        let temporary = if self.check_keyword(Keyword::Temp) || self.check_keyword(Keyword::Temporary)
        {
            self.advance();
            true
        } else {
            false
        };

        match &self.current.kind {
            TokenKind::Keyword(Keyword::Table) => Ok(Statement::CreateTable(
                self.parse_create_table(start, temporary)?,
            )),
            TokenKind::Keyword(Keyword::View) => Ok(Statement::CreateView(
                self.parse_create_view(start, temporary)?,
            )),
            TokenKind::Keyword(Keyword::Unique | Keyword::Index) if !temporary => {
                Ok(Statement::CreateIndex(self.parse_create_index(start)?))
            }
            _ => Err(ParseError::unexpected(
                "TABLE, INDEX, or VIEW",
                self.current.kind.clone(),
                self.current.span,
            )),
        }
    }

    fn parse_if_not_exists(&mut self) -> Result<bool, ParseError> {
        if self.check_keyword(Keyword::If) {
            self.advance();
            self.expect_keyword(Keyword::Not)?;
            self.expect_keyword(Keyword::Exists)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn parse_if_exists(&mut self) -> Result<bool, ParseError> {
        if self.check_keyword(Keyword::If) {
            self.advance();
            self.expect_keyword(Keyword::Exists)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn parse_create_table(
        &mut self,
        start: usize,
        temporary: bool,
    ) -> Result<CreateTableStatement, ParseError> {
        self.expect_keyword(Keyword::Table)?;
        let if_not_exists = self.parse_if_not_exists()?;
        let (name, name_span) = self.parse_qualified_name()?;

        self.expect(&TokenKind::LeftParen)?;
        let body_start = self.current.span.start;

        let mut columns = vec![];
        let mut constraints = vec![];
        loop {
            if self.is_table_constraint_start() {
                constraints.push(self.parse_table_constraint()?);
            } else if constraints.is_empty() {
                columns.push(self.parse_column_def()?);
            } else {
                return Err(ParseError::new(
                    "Column definitions must precede table constraints",
                    self.current.span,
                ));
            }
            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }

        let body_span = Span::new(body_start, self.previous.span.end);
        self.expect(&TokenKind::RightParen)?;

        // Table options (WITHOUT ROWID, STRICT, ENGINE=...) do not affect the schema model.
        while !self.current.is_eof() && !self.check(&TokenKind::Semicolon) {
            self.advance();
        }

        let columns_span = match (columns.first(), columns.last()) {
            (Some(first), Some(last)) => first.span.merge(last.span),
            _ => Span::new(body_start, body_start),
        };

        Ok(CreateTableStatement {
            temporary,
            if_not_exists,
            name,
            name_span,
            columns,
            constraints,
            columns_span,
            body_span,
            span: self.span_from(start),
        })
    }

    fn is_table_constraint_start(&self) -> bool {
        matches!(
            &self.current.kind,
            TokenKind::Keyword(
                Keyword::Constraint
                    | Keyword::Primary
                    | Keyword::Unique
                    | Keyword::Check
                    | Keyword::Foreign
            )
        )
    }

    fn parse_table_constraint(&mut self) -> Result<TableConstraint, ParseError> {
        let start = self.current.span.start;
        let name = if self.check_keyword(Keyword::Constraint) {
            self.advance();
            Some(self.expect_identifier()?)
        } else {
            None
        };

        let kind = match &self.current.kind {
            TokenKind::Keyword(Keyword::Primary) => {
                self.advance();
                self.expect_keyword(Keyword::Key)?;
                TableConstraintKind::PrimaryKey(self.parse_indexed_columns()?)
            }
            TokenKind::Keyword(Keyword::Unique) => {
                self.advance();
                // MySQL: UNIQUE [KEY | INDEX] [name] (cols)
                if self.check_keyword(Keyword::Key) || self.check_keyword(Keyword::Index) {
                    self.advance();
                }
                if !self.check(&TokenKind::LeftParen) {
                    self.expect_identifier()?;
                }
                TableConstraintKind::Unique(self.parse_indexed_columns()?)
            }
            TokenKind::Keyword(Keyword::Check) => {
                self.advance();
                TableConstraintKind::Check(self.parse_parenthesized_expression()?)
            }
            TokenKind::Keyword(Keyword::Foreign) => {
                self.advance();
                self.expect_keyword(Keyword::Key)?;
                self.expect(&TokenKind::LeftParen)?;
                let columns = self.parse_identifier_list()?;
                self.expect(&TokenKind::RightParen)?;
                let references = self.parse_references()?;
                TableConstraintKind::ForeignKey {
                    columns,
                    references,
                }
            }
            _ => {
                return Err(ParseError::unexpected(
                    "PRIMARY KEY, UNIQUE, CHECK, or FOREIGN KEY",
                    self.current.kind.clone(),
                    self.current.span,
                ));
            }
        };

        self.skip_conflict_clause()?;

        Ok(TableConstraint {
            name,
            kind,
            span: self.span_from(start),
        })
    }

    /// Parses `(col [COLLATE x] [ASC | DESC], ...)`, returning the plain column names.
    ///
    /// Expression entries are accepted but contribute no column name.
    fn parse_indexed_columns(&mut self) -> Result<Vec<String>, ParseError> {
        self.expect(&TokenKind::LeftParen)?;
        let mut columns = vec![];
        for expr in self.parse_order_terms()? {
            if let Expr::Column { name, .. } = expr.unparenthesized() {
                columns.push(name.clone());
            } else if let Expr::Collate { expr, .. } = expr.unparenthesized() {
                if let Expr::Column { name, .. } = expr.as_ref() {
                    columns.push(name.clone());
                }
            }
        }
        self.expect(&TokenKind::RightParen)?;
        Ok(columns)
    }

    fn parse_order_terms(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut terms = vec![];
        loop {
            terms.push(self.parse_expression(0)?);
            if self.check_keyword(Keyword::Asc) || self.check_keyword(Keyword::Desc) {
                self.advance();
            }
            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }
        Ok(terms)
    }

    fn parse_parenthesized_expression(&mut self) -> Result<Expr, ParseError> {
        self.expect(&TokenKind::LeftParen)?;
        let expr = self.parse_expression(0)?;
        self.expect(&TokenKind::RightParen)?;
        Ok(expr)
    }

    /// Skips SQLite's `ON CONFLICT <resolution>` after a constraint.
    fn skip_conflict_clause(&mut self) -> Result<(), ParseError> {
        if self.check_keyword(Keyword::On) && matches!(self.peek().kind, TokenKind::Keyword(Keyword::Conflict))
        {
            self.advance();
            self.advance();
            self.expect_identifier_or_keyword()?;
        }
        Ok(())
    }

    fn expect_identifier_or_keyword(&mut self) -> Result<(), ParseError> {
        if matches!(
            self.current.kind,
            TokenKind::Identifier(_) | TokenKind::Keyword(_)
        ) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::unexpected(
                "identifier",
                self.current.kind.clone(),
                self.current.span,
            ))
        }
    }

    fn parse_references(&mut self) -> Result<ForeignKeyRef, ParseError> {
        self.expect_keyword(Keyword::References)?;
        let (table, _) = self.parse_qualified_name()?;
        let columns = if self.check(&TokenKind::LeftParen) {
            self.advance();
            let cols = self.parse_identifier_list()?;
            self.expect(&TokenKind::RightParen)?;
            cols
        } else {
            vec![]
        };

        let mut on_delete = None;
        let mut on_update = None;
        while self.check_keyword(Keyword::On) {
            self.advance();
            let is_delete = self.check_keyword(Keyword::Delete);
            if !is_delete {
                self.expect_keyword(Keyword::Update)?;
            } else {
                self.advance();
            }
            let action = self.parse_referential_action()?;
            if is_delete {
                on_delete = Some(action);
            } else {
                on_update = Some(action);
            }
        }

        Ok(ForeignKeyRef {
            table,
            columns,
            on_delete,
            on_update,
        })
    }

    fn parse_referential_action(&mut self) -> Result<ReferentialAction, ParseError> {
        let action = match &self.current.kind {
            TokenKind::Keyword(Keyword::Cascade) => ReferentialAction::Cascade,
            TokenKind::Keyword(Keyword::Restrict) => ReferentialAction::Restrict,
            TokenKind::Keyword(Keyword::Set) => {
                self.advance();
                if self.check_keyword(Keyword::Null) {
                    ReferentialAction::SetNull
                } else {
                    self.expect_keyword(Keyword::Default)?;
                    return Ok(ReferentialAction::SetDefault);
                }
            }
            TokenKind::Identifier(word) if word.eq_ignore_ascii_case("NO") => {
                self.advance();
                if !self.check_word("ACTION") {
                    return Err(ParseError::unexpected(
                        "ACTION",
                        self.current.kind.clone(),
                        self.current.span,
                    ));
                }
                ReferentialAction::NoAction
            }
            _ => {
                return Err(ParseError::unexpected(
                    "referential action",
                    self.current.kind.clone(),
                    self.current.span,
                ));
            }
        };
        self.advance();
        Ok(action)
    }

    /// Parses a column definition: name, optional type, constraints.
    pub(super) fn parse_column_def(&mut self) -> Result<ColumnDef, ParseError> {
        let start = self.current.span.start;
        let (name, name_span) = self.expect_identifier_spanned()?;
        let data_type = self.parse_type_name()?;

        let mut constraints: Vec<ColumnConstraint> = vec![];
        loop {
            let constraint_start = self.current.span.start;
            if self.check_keyword(Keyword::Constraint) {
                self.advance();
                self.expect_identifier()?;
            }

            let kind = match &self.current.kind {
                TokenKind::Keyword(Keyword::Not) => {
                    self.advance();
                    self.expect_keyword(Keyword::Null)?;
                    ColumnConstraintKind::NotNull
                }
                TokenKind::Keyword(Keyword::Null) => {
                    self.advance();
                    ColumnConstraintKind::Null
                }
                TokenKind::Keyword(Keyword::Primary) => {
                    self.advance();
                    self.expect_keyword(Keyword::Key)?;
                    if self.check_keyword(Keyword::Asc) || self.check_keyword(Keyword::Desc) {
                        self.advance();
                    }
                    self.skip_conflict_clause()?;
                    let autoincrement = self.check_keyword(Keyword::Autoincrement)
                        || self.check_word("AUTO_INCREMENT");
                    if autoincrement {
                        self.advance();
                    }
                    ColumnConstraintKind::PrimaryKey { autoincrement }
                }
                TokenKind::Keyword(Keyword::Unique) => {
                    self.advance();
                    if self.check_keyword(Keyword::Key) {
                        self.advance();
                    }
                    ColumnConstraintKind::Unique
                }
                TokenKind::Keyword(Keyword::Default) => {
                    self.advance();
                    ColumnConstraintKind::Default(self.parse_expression(6)?)
                }
                TokenKind::Keyword(Keyword::Check) => {
                    self.advance();
                    ColumnConstraintKind::Check(self.parse_parenthesized_expression()?)
                }
                TokenKind::Keyword(Keyword::References) => {
                    ColumnConstraintKind::References(self.parse_references()?)
                }
                TokenKind::Keyword(Keyword::Collate) => {
                    self.advance();
                    ColumnConstraintKind::Collate(self.expect_identifier()?)
                }
                TokenKind::Identifier(word) if word.eq_ignore_ascii_case("AUTO_INCREMENT") => {
                    // MySQL spells it as a standalone attribute.
                    self.advance();
                    if let Some(ColumnConstraint {
                        kind: ColumnConstraintKind::PrimaryKey { autoincrement },
                        ..
                    }) = constraints.last_mut()
                    {
                        *autoincrement = true;
                    }
                    continue;
                }
                TokenKind::Identifier(word) if word.eq_ignore_ascii_case("COMMENT") => {
                    self.advance();
                    if !matches!(self.current.kind, TokenKind::String(_)) {
                        return Err(ParseError::unexpected(
                            "string",
                            self.current.kind.clone(),
                            self.current.span,
                        ));
                    }
                    self.advance();
                    continue;
                }
                TokenKind::Keyword(Keyword::On)
                    if matches!(self.peek().kind, TokenKind::Keyword(Keyword::Update)) =>
                {
                    // MySQL: ON UPDATE CURRENT_TIMESTAMP
                    self.advance();
                    self.advance();
                    self.parse_expression(6)?;
                    continue;
                }
                _ => break,
            };

            constraints.push(ColumnConstraint {
                kind,
                span: self.span_from(constraint_start),
            });
        }

        Ok(ColumnDef {
            name,
            name_span,
            data_type,
            constraints,
            span: self.span_from(start),
        })
    }

    /// Parses a free-form type name if one starts here.
    ///
    /// A type name is one or more words with at most one parenthesized
    /// argument list (`VARCHAR(255)`, `DOUBLE PRECISION`, `INT(11) UNSIGNED`).
    pub(super) fn parse_type_name(&mut self) -> Result<Option<TypeName>, ParseError> {
        let start = self.current.span.start;
        let mut words: Vec<String> = vec![];
        let mut args = vec![];

        loop {
            match &self.current.kind {
                TokenKind::Identifier(word)
                    if !TYPE_NAME_TERMINATORS
                        .iter()
                        .any(|t| t.eq_ignore_ascii_case(word)) =>
                {
                    words.push(word.to_ascii_uppercase());
                    self.advance();
                }
                TokenKind::LeftParen if !words.is_empty() && args.is_empty() => {
                    self.advance();
                    args = self.parse_type_arguments()?;
                }
                _ => break,
            }
        }

        if words.is_empty() {
            return Ok(None);
        }
        Ok(Some(TypeName {
            name: words.join(" "),
            args,
            span: self.span_from(start),
        }))
    }

    /// Parses a type name, failing if none is present.
    pub(super) fn expect_type_name(&mut self) -> Result<TypeName, ParseError> {
        match self.parse_type_name()? {
            Some(type_name) => Ok(type_name),
            None => Err(ParseError::unexpected(
                "type name",
                self.current.kind.clone(),
                self.current.span,
            )),
        }
    }

    /// Collects the raw text of each argument up to the closing `)`.
    fn parse_type_arguments(&mut self) -> Result<Vec<String>, ParseError> {
        let mut args = vec![];
        let mut arg_start = self.current.span.start;
        let mut depth = 0_usize;
        loop {
            match self.current.kind {
                TokenKind::Eof => return Err(ParseError::unexpected_eof("')'", self.current.span)),
                TokenKind::LeftParen => depth += 1,
                TokenKind::RightParen if depth > 0 => depth -= 1,
                TokenKind::RightParen | TokenKind::Comma if depth == 0 => {
                    let text = Span::new(arg_start, self.previous.span.end.max(arg_start))
                        .text(self.source)
                        .trim();
                    if !text.is_empty() {
                        args.push(String::from(text));
                    }
                    let done = self.check(&TokenKind::RightParen);
                    self.advance();
                    if done {
                        return Ok(args);
                    }
                    arg_start = self.current.span.start;
                    continue;
                }
                _ => {}
            }
            self.advance();
        }
    }

    fn parse_create_index(&mut self, start: usize) -> Result<CreateIndexStatement, ParseError> {
        let unique = if self.check_keyword(Keyword::Unique) {
            self.advance();
            true
        } else {
            false
        };
        self.expect_keyword(Keyword::Index)?;
        let if_not_exists = self.parse_if_not_exists()?;
        let (name, _) = self.parse_qualified_name()?;
        self.expect_keyword(Keyword::On)?;
        let (table, _) = self.parse_qualified_name()?;
        let columns = self.parse_indexed_columns()?;
        let where_clause = self.parse_optional_where()?;

        Ok(CreateIndexStatement {
            unique,
            if_not_exists,
            name,
            table,
            columns,
            where_clause,
            span: self.span_from(start),
        })
    }

    fn parse_create_view(
        &mut self,
        start: usize,
        temporary: bool,
    ) -> Result<CreateViewStatement, ParseError> {
        self.expect_keyword(Keyword::View)?;
        let if_not_exists = self.parse_if_not_exists()?;
        let (name, _) = self.parse_qualified_name()?;
        self.expect_keyword(Keyword::As)?;
        let query = self.parse_query()?;

        Ok(CreateViewStatement {
            temporary,
            if_not_exists,
            name,
            query,
            span: self.span_from(start),
        })
    }

    /// Parses `DROP TABLE | INDEX`.
    pub(super) fn parse_drop_statement(&mut self) -> Result<Statement, ParseError> {
        let start = self.current.span.start;
        self.expect_keyword(Keyword::Drop)?;

        let is_table = self.check_keyword(Keyword::Table);
        if !is_table && !self.check_keyword(Keyword::Index) {
            return Err(ParseError::unexpected(
                "TABLE or INDEX",
                self.current.kind.clone(),
                self.current.span,
            ));
        }
        self.advance();

        let if_exists = self.parse_if_exists()?;
        let (name, _) = self.parse_qualified_name()?;
        // MySQL: DROP INDEX name ON table
        if !is_table && self.check_keyword(Keyword::On) {
            self.advance();
            self.parse_qualified_name()?;
        }
        let span = self.span_from(start);

        Ok(if is_table {
            Statement::DropTable(DropTableStatement {
                if_exists,
                name,
                span,
            })
        } else {
            Statement::DropIndex(DropIndexStatement {
                if_exists,
                name,
                span,
            })
        })
    }

    /// Parses `ALTER TABLE name rule [, rule ...]`.
    pub(super) fn parse_alter_table_statement(
        &mut self,
    ) -> Result<AlterTableStatement, ParseError> {
        let start = self.current.span.start;
        self.expect_keyword(Keyword::Alter)?;
        self.expect_keyword(Keyword::Table)?;
        self.parse_if_exists()?;
        let (table, table_span) = self.parse_qualified_name()?;

        let mut rules = vec![];
        loop {
            rules.push(self.parse_alter_table_rule()?);
            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }

        Ok(AlterTableStatement {
            table,
            table_span,
            rules,
            span: self.span_from(start),
        })
    }

    fn parse_alter_table_rule(&mut self) -> Result<AlterTableRule, ParseError> {
        let start = self.current.span.start;
        let token = self.current.clone();

        let kind = match &token.kind {
            TokenKind::Keyword(Keyword::Rename) => {
                self.advance();
                if self.check_keyword(Keyword::To) {
                    self.advance();
                    let (name, name_span) = self.parse_qualified_name()?;
                    AlterTableRuleKind::RenameTable { name, name_span }
                } else {
                    self.require(Feature::RenameColumn)?;
                    self.skip_column_keyword();
                    let (old, old_span) = self.expect_identifier_spanned()?;
                    self.expect_keyword(Keyword::To)?;
                    let (new, new_span) = self.expect_identifier_spanned()?;
                    AlterTableRuleKind::RenameColumn {
                        old,
                        old_span,
                        new,
                        new_span,
                    }
                }
            }
            TokenKind::Keyword(Keyword::Add) => {
                self.advance();
                if self.is_table_constraint_start() {
                    return Err(ParseError::new(
                        "ADD CONSTRAINT is not supported",
                        self.current.span,
                    ));
                }
                self.skip_column_keyword();
                let column = self.parse_column_def()?;
                let position = self.parse_column_position()?;
                AlterTableRuleKind::AddColumn { column, position }
            }
            TokenKind::Keyword(Keyword::Drop) => {
                self.require(Feature::DropColumn)?;
                self.advance();
                self.skip_column_keyword();
                self.parse_if_exists()?;
                let (column, column_span) = self.expect_identifier_spanned()?;
                AlterTableRuleKind::DropColumn {
                    column,
                    column_span,
                }
            }
            TokenKind::Keyword(Keyword::Modify) => {
                self.require(Feature::ModifyColumn)?;
                self.advance();
                self.skip_column_keyword();
                let column = self.parse_column_def()?;
                let position = self.parse_column_position()?;
                AlterTableRuleKind::ModifyColumn { column, position }
            }
            TokenKind::Keyword(Keyword::Change) => {
                self.require(Feature::ModifyColumn)?;
                self.advance();
                self.skip_column_keyword();
                let (old, old_span) = self.expect_identifier_spanned()?;
                let column = self.parse_column_def()?;
                let position = self.parse_column_position()?;
                AlterTableRuleKind::ChangeColumn {
                    old,
                    old_span,
                    column,
                    position,
                }
            }
            TokenKind::Keyword(Keyword::Alter) => {
                self.require(Feature::AlterColumn)?;
                self.advance();
                self.skip_column_keyword();
                let column = self.expect_identifier()?;
                self.parse_alter_column_action(column)?
            }
            _ => {
                return Err(ParseError::unexpected(
                    "RENAME, ADD, DROP, MODIFY, CHANGE, or ALTER",
                    self.current.kind.clone(),
                    self.current.span,
                ));
            }
        };

        Ok(AlterTableRule {
            kind,
            span: self.span_from(start),
        })
    }

    fn parse_alter_column_action(&mut self, column: String) -> Result<AlterTableRuleKind, ParseError> {
        if self.check_keyword(Keyword::Type) {
            self.advance();
            let data_type = self.expect_type_name()?;
            self.skip_using_clause()?;
            return Ok(AlterTableRuleKind::AlterColumnType { column, data_type });
        }

        let set = self.check_keyword(Keyword::Set);
        if !set && !self.check_keyword(Keyword::Drop) {
            return Err(ParseError::unexpected(
                "TYPE, SET, or DROP",
                self.current.kind.clone(),
                self.current.span,
            ));
        }
        self.advance();

        // SET DATA TYPE t
        if set && self.check_word("DATA") {
            self.advance();
            self.expect_keyword(Keyword::Type)?;
            let data_type = self.expect_type_name()?;
            self.skip_using_clause()?;
            return Ok(AlterTableRuleKind::AlterColumnType { column, data_type });
        }

        self.expect_keyword(Keyword::Not)?;
        self.expect_keyword(Keyword::Null)?;
        Ok(if set {
            AlterTableRuleKind::SetNotNull { column }
        } else {
            AlterTableRuleKind::DropNotNull { column }
        })
    }

    /// Skips PostgreSQL's `USING expr` conversion after a type change.
    fn skip_using_clause(&mut self) -> Result<(), ParseError> {
        if self.check_keyword(Keyword::Using) {
            self.advance();
            self.parse_expression(0)?;
        }
        Ok(())
    }

    fn skip_column_keyword(&mut self) {
        if self.check_keyword(Keyword::Column) {
            self.advance();
        }
    }

    fn parse_column_position(&mut self) -> Result<Option<ColumnPosition>, ParseError> {
        if self.check_keyword(Keyword::First) {
            self.require(Feature::ColumnPositions)?;
            self.advance();
            return Ok(Some(ColumnPosition::First));
        }
        if self.check_keyword(Keyword::After) {
            self.require(Feature::ColumnPositions)?;
            self.advance();
            let (column, span) = self.expect_identifier_spanned()?;
            return Ok(Some(ColumnPosition::After { column, span }));
        }
        Ok(None)
    }
}
