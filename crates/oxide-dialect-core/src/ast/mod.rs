//! Abstract Syntax Tree (AST) types for SQL statements.

mod ddl;
mod expression;
mod statement;
mod types;

pub use ddl::{
    AlterTableRule, AlterTableRuleKind, AlterTableStatement, ColumnConstraint,
    ColumnConstraintKind, ColumnDef, ColumnPosition, CreateIndexStatement, CreateTableStatement,
    CreateViewStatement, DropIndexStatement, DropTableStatement, ForeignKeyRef,
    ReferentialAction, TableConstraint, TableConstraintKind,
};
pub use expression::{
    BinaryOp, Expr, FunctionCall, InList, JsonOperator, Literal, UnaryOp, WindowSpec,
};
pub use statement::{
    CompoundOperator, ConflictAction, DeleteStatement, InsertSource, InsertStatement, JoinClause,
    JoinType, NullOrdering, OnConflict, OrderBy, OrderDirection, Query, SelectColumn, SelectCore,
    Statement, TableRef, UpdateAssignment, UpdateStatement,
};
pub use types::TypeName;
