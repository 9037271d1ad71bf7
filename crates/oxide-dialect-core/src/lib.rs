//! # oxide-dialect-core
//!
//! Type resolution and migration replay for a family of SQL dialects.
//!
//! This crate provides:
//! - A hand-written recursive descent parser with Pratt expression parsing,
//!   restricted to the syntax a dialect's [`Grammar`] enables
//! - Dialect types and the encapsulation algorithm that unifies them
//! - Layered [`TypeResolver`] and [`MigrationSquasher`] chains, with the
//!   ANSI root every dialect builds on
//! - An [`Analyzer`] that types every query and bind parameter in a file
//! - A [`MigrationReplayer`] that folds `ALTER TABLE` migrations into the
//!   schema text and compares the result with the canonical schema
//!
//! ## Resolving a query
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use oxide_dialect_core::{AnsiDialect, Analyzer, DialectRegistry, Diagnostics};
//!
//! let registry = DialectRegistry::with_dialect(Arc::new(AnsiDialect));
//! let mut analyzer = Analyzer::new(&registry);
//! let diagnostics = Diagnostics::new();
//! let reports = analyzer
//!     .analyze(
//!         "CREATE TABLE car (id INTEGER PRIMARY KEY, model TEXT);
//!          SELECT id, model FROM car WHERE id = ?;",
//!         &diagnostics,
//!     )
//!     .unwrap();
//!
//! assert!(diagnostics.is_empty());
//! assert_eq!(reports[0].columns[1].ty.sql_type, "TEXT");
//! assert!(reports[0].columns[1].ty.nullable);
//! assert_eq!(reports[0].parameters[0].ty.sql_type, "INTEGER");
//! ```
//!
//! ## Replaying migrations
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use oxide_dialect_core::migrate::{Migration, MigrationReplayer, compare_schema};
//! use oxide_dialect_core::{AnsiDialect, DialectRegistry, Diagnostics};
//!
//! let registry = DialectRegistry::with_dialect(Arc::new(AnsiDialect));
//! let diagnostics = Diagnostics::new();
//! let folded = MigrationReplayer::new(&registry)
//!     .replay(
//!         "CREATE TABLE t(a INT);",
//!         &[Migration::new("1.sqm", "ALTER TABLE t ADD COLUMN b TEXT;")],
//!         &diagnostics,
//!     )
//!     .unwrap();
//!
//! assert!(compare_schema("CREATE TABLE t(a INT, b TEXT);", &folded).is_match());
//! ```

pub mod analyzer;
pub mod ast;
pub mod catalog;
pub mod diagnostics;
pub mod dialect;
pub mod grammar;
pub mod lexer;
pub mod migrate;
pub mod parser;
pub mod registry;
pub mod resolver;
pub mod squash;
pub mod types;

pub use analyzer::{Analyzer, ColumnReport, QueryReport};
pub use ast::{AlterTableRule, Expr, Statement};
pub use catalog::Catalog;
pub use diagnostics::{Diagnostic, DiagnosticSink, Diagnostics, Severity};
pub use dialect::{AnsiDialect, Dialect};
pub use grammar::{Feature, Grammar};
pub use lexer::{Lexer, Span, Token, TokenKind};
pub use migrate::MigrationReplayer;
pub use parser::{ParseError, Parser};
pub use registry::{DialectRegistry, RegistryError};
pub use resolver::{ResolveContext, TypeResolver};
pub use squash::{MigrationSquasher, SquishContext};
pub use types::{DialectType, IntermediateType, TypeDescriptor, TypeRef};
