//! Schema definition statements: CREATE, DROP and ALTER TABLE.

use super::expression::Expr;
use super::statement::Query;
use super::types::TypeName;
use crate::lexer::Span;

/// Referential action for ON DELETE / ON UPDATE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferentialAction {
    /// CASCADE
    Cascade,
    /// RESTRICT
    Restrict,
    /// SET NULL
    SetNull,
    /// SET DEFAULT
    SetDefault,
    /// NO ACTION
    NoAction,
}

/// A `REFERENCES table(columns)` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKeyRef {
    /// Referenced table.
    pub table: String,
    /// Referenced columns.
    pub columns: Vec<String>,
    /// ON DELETE action.
    pub on_delete: Option<ReferentialAction>,
    /// ON UPDATE action.
    pub on_update: Option<ReferentialAction>,
}

/// The kind of a column constraint.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnConstraintKind {
    /// NOT NULL
    NotNull,
    /// NULL
    Null,
    /// PRIMARY KEY [AUTOINCREMENT]
    PrimaryKey {
        /// Whether AUTOINCREMENT (or AUTO_INCREMENT) follows.
        autoincrement: bool,
    },
    /// UNIQUE
    Unique,
    /// DEFAULT expr
    Default(Expr),
    /// CHECK (expr)
    Check(Expr),
    /// REFERENCES table(cols)
    References(ForeignKeyRef),
    /// COLLATE name
    Collate(String),
}

/// One constraint attached to a column definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnConstraint {
    /// What the constraint is.
    pub kind: ColumnConstraintKind,
    /// Source span, including any `CONSTRAINT name` prefix.
    pub span: Span,
}

/// A column definition in CREATE TABLE or ALTER TABLE.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    /// Column name.
    pub name: String,
    /// Source span of the column name.
    pub name_span: Span,
    /// Declared type; SQLite allows it to be omitted.
    pub data_type: Option<TypeName>,
    /// Constraints in source order.
    pub constraints: Vec<ColumnConstraint>,
    /// Source span of the whole definition.
    pub span: Span,
}

impl ColumnDef {
    /// Creates a column definition without constraints.
    #[must_use]
    pub fn new(name: impl Into<String>, data_type: TypeName) -> Self {
        Self {
            name: name.into(),
            name_span: Span::default(),
            data_type: Some(data_type),
            constraints: Vec::new(),
            span: Span::default(),
        }
    }

    /// Appends a constraint.
    #[must_use]
    pub fn with_constraint(mut self, kind: ColumnConstraintKind) -> Self {
        self.constraints.push(ColumnConstraint {
            kind,
            span: Span::default(),
        });
        self
    }

    /// Returns true if the column is declared NOT NULL.
    ///
    /// A `PRIMARY KEY` alone does not count: SQLite allows NULL in
    /// non-integer primary keys.
    #[must_use]
    pub fn is_not_null(&self) -> bool {
        self.constraints
            .iter()
            .any(|c| matches!(c.kind, ColumnConstraintKind::NotNull))
    }

    /// Returns true if the column carries a PRIMARY KEY constraint.
    #[must_use]
    pub fn is_primary_key(&self) -> bool {
        self.constraints
            .iter()
            .any(|c| matches!(c.kind, ColumnConstraintKind::PrimaryKey { .. }))
    }

    /// Returns true if the column carries a UNIQUE constraint.
    #[must_use]
    pub fn is_unique(&self) -> bool {
        self.constraints
            .iter()
            .any(|c| matches!(c.kind, ColumnConstraintKind::Unique))
    }

    /// Returns the NOT NULL constraint, if any.
    #[must_use]
    pub fn not_null_constraint(&self) -> Option<&ColumnConstraint> {
        self.constraints
            .iter()
            .find(|c| matches!(c.kind, ColumnConstraintKind::NotNull))
    }
}

/// The kind of a table-level constraint.
#[derive(Debug, Clone, PartialEq)]
pub enum TableConstraintKind {
    /// PRIMARY KEY (cols)
    PrimaryKey(Vec<String>),
    /// UNIQUE (cols)
    Unique(Vec<String>),
    /// FOREIGN KEY (cols) REFERENCES ...
    ForeignKey {
        /// Local columns.
        columns: Vec<String>,
        /// Referenced table and columns.
        references: ForeignKeyRef,
    },
    /// CHECK (expr)
    Check(Expr),
}

/// A table-level constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct TableConstraint {
    /// Optional constraint name.
    pub name: Option<String>,
    /// What the constraint is.
    pub kind: TableConstraintKind,
    /// Source span.
    pub span: Span,
}

impl TableConstraint {
    /// Returns the columns the constraint keys on, for PRIMARY KEY and UNIQUE.
    #[must_use]
    pub fn key_columns(&self) -> &[String] {
        match &self.kind {
            TableConstraintKind::PrimaryKey(cols) | TableConstraintKind::Unique(cols) => cols,
            TableConstraintKind::ForeignKey { .. } | TableConstraintKind::Check(_) => &[],
        }
    }
}

/// A CREATE TABLE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStatement {
    /// TEMP / TEMPORARY.
    pub temporary: bool,
    /// IF NOT EXISTS.
    pub if_not_exists: bool,
    /// Table name.
    pub name: String,
    /// Source span of the table name.
    pub name_span: Span,
    /// Column definitions.
    pub columns: Vec<ColumnDef>,
    /// Table constraints.
    pub constraints: Vec<TableConstraint>,
    /// Span from the start of the first column to the end of the last one.
    pub columns_span: Span,
    /// Span of the text between the parentheses.
    pub body_span: Span,
    /// Source span.
    pub span: Span,
}

impl CreateTableStatement {
    /// Finds a column definition by name, ignoring case.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Returns true if a table-level PRIMARY KEY or UNIQUE lists the column.
    #[must_use]
    pub fn column_is_keyed(&self, name: &str) -> bool {
        self.constraints.iter().any(|c| {
            c.key_columns()
                .iter()
                .any(|col| col.eq_ignore_ascii_case(name))
        })
    }
}

/// A CREATE INDEX statement.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndexStatement {
    /// UNIQUE index.
    pub unique: bool,
    /// IF NOT EXISTS.
    pub if_not_exists: bool,
    /// Index name.
    pub name: String,
    /// Indexed table.
    pub table: String,
    /// Indexed columns.
    pub columns: Vec<String>,
    /// Partial index predicate.
    pub where_clause: Option<Expr>,
    /// Source span.
    pub span: Span,
}

/// A CREATE VIEW statement.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateViewStatement {
    /// TEMP / TEMPORARY.
    pub temporary: bool,
    /// IF NOT EXISTS.
    pub if_not_exists: bool,
    /// View name.
    pub name: String,
    /// The defining query.
    pub query: Query,
    /// Source span.
    pub span: Span,
}

/// A DROP TABLE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct DropTableStatement {
    /// IF EXISTS.
    pub if_exists: bool,
    /// Table name.
    pub name: String,
    /// Source span.
    pub span: Span,
}

/// A DROP INDEX statement.
#[derive(Debug, Clone, PartialEq)]
pub struct DropIndexStatement {
    /// IF EXISTS.
    pub if_exists: bool,
    /// Index name.
    pub name: String,
    /// Source span.
    pub span: Span,
}

/// Where an added or repositioned column goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnPosition {
    /// FIRST
    First,
    /// AFTER column
    After {
        /// The column to follow.
        column: String,
        /// Source span of the column name.
        span: Span,
    },
}

/// The kind of one ALTER TABLE rule.
#[derive(Debug, Clone, PartialEq)]
pub enum AlterTableRuleKind {
    /// RENAME TO name
    RenameTable {
        /// The new table name.
        name: String,
        /// Source span of the new name.
        name_span: Span,
    },
    /// ADD [COLUMN] def [FIRST | AFTER col]
    AddColumn {
        /// The new column.
        column: ColumnDef,
        /// Requested position; appended when absent.
        position: Option<ColumnPosition>,
    },
    /// DROP [COLUMN] col
    DropColumn {
        /// The dropped column.
        column: String,
        /// Source span of the column name.
        column_span: Span,
    },
    /// RENAME [COLUMN] old TO new
    RenameColumn {
        /// Current name.
        old: String,
        /// Source span of the current name.
        old_span: Span,
        /// New name.
        new: String,
        /// Source span of the new name.
        new_span: Span,
    },
    /// MODIFY [COLUMN] def [FIRST | AFTER col]
    ModifyColumn {
        /// The replacement definition; its name selects the column.
        column: ColumnDef,
        /// Requested position; kept in place when absent.
        position: Option<ColumnPosition>,
    },
    /// CHANGE [COLUMN] old def [FIRST | AFTER col]
    ChangeColumn {
        /// Current name.
        old: String,
        /// Source span of the current name.
        old_span: Span,
        /// The replacement definition, possibly under a new name.
        column: ColumnDef,
        /// Requested position; kept in place when absent.
        position: Option<ColumnPosition>,
    },
    /// ALTER [COLUMN] col [SET DATA] TYPE t
    AlterColumnType {
        /// The altered column.
        column: String,
        /// The new type.
        data_type: TypeName,
    },
    /// ALTER [COLUMN] col SET NOT NULL
    SetNotNull {
        /// The altered column.
        column: String,
    },
    /// ALTER [COLUMN] col DROP NOT NULL
    DropNotNull {
        /// The altered column.
        column: String,
    },
}

/// One rule of an ALTER TABLE statement, with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct AlterTableRule {
    /// What the rule does.
    pub kind: AlterTableRuleKind,
    /// Source span of the rule.
    pub span: Span,
}

impl AlterTableRule {
    /// Creates a rule without source location.
    #[must_use]
    pub fn new(kind: AlterTableRuleKind) -> Self {
        Self {
            kind,
            span: Span::default(),
        }
    }

    /// Returns the column an existing-column rule refers to.
    #[must_use]
    pub fn target_column(&self) -> Option<&str> {
        match &self.kind {
            AlterTableRuleKind::RenameTable { .. } | AlterTableRuleKind::AddColumn { .. } => None,
            AlterTableRuleKind::DropColumn { column, .. }
            | AlterTableRuleKind::AlterColumnType { column, .. }
            | AlterTableRuleKind::SetNotNull { column }
            | AlterTableRuleKind::DropNotNull { column } => Some(column),
            AlterTableRuleKind::RenameColumn { old, .. }
            | AlterTableRuleKind::ChangeColumn { old, .. } => Some(old),
            AlterTableRuleKind::ModifyColumn { column, .. } => Some(&column.name),
        }
    }

    /// Returns the requested column position, if any.
    #[must_use]
    pub const fn position(&self) -> Option<&ColumnPosition> {
        match &self.kind {
            AlterTableRuleKind::AddColumn { position, .. }
            | AlterTableRuleKind::ModifyColumn { position, .. }
            | AlterTableRuleKind::ChangeColumn { position, .. } => position.as_ref(),
            _ => None,
        }
    }

    /// Returns a short label for logging.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match &self.kind {
            AlterTableRuleKind::RenameTable { .. } => "rename table",
            AlterTableRuleKind::AddColumn { .. } => "add column",
            AlterTableRuleKind::DropColumn { .. } => "drop column",
            AlterTableRuleKind::RenameColumn { .. } => "rename column",
            AlterTableRuleKind::ModifyColumn { .. } => "modify column",
            AlterTableRuleKind::ChangeColumn { .. } => "change column",
            AlterTableRuleKind::AlterColumnType { .. } => "alter column type",
            AlterTableRuleKind::SetNotNull { .. } => "set not null",
            AlterTableRuleKind::DropNotNull { .. } => "drop not null",
        }
    }
}

/// An ALTER TABLE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct AlterTableStatement {
    /// The altered table.
    pub table: String,
    /// Source span of the table name.
    pub table_span: Span,
    /// Rules in source order.
    pub rules: Vec<AlterTableRule>,
    /// Source span.
    pub span: Span,
}
