//! # oxide-dialect-mysql
//!
//! MySQL dialect layer for `oxide-dialect-core`.
//!
//! # MySQL specifics
//!
//! - **Narrow integers**: `TINYINT`, `SMALLINT` and `MEDIUMINT` resolve to
//!   their own variants and decode into `i8`, `i16` and `i32`. They still
//!   bind and read through the integer primitive. `UNSIGNED` moves a column
//!   to the next wider variant.
//! - **Booleans**: `TINYINT(1)`, `BOOL` and `BOOLEAN` are integer columns
//!   decoding into `bool`.
//! - **Temporal types**: `DATE`, `TIME`, `DATETIME` and `TIMESTAMP` travel
//!   as text and decode into `chrono` values.
//! - **[ALTER TABLE]**: `ADD ... FIRST | AFTER`, `MODIFY` and `CHANGE`.
//! - **Backtick quoting**: identifiers are quoted with `` ` ``.
//! - **Upsert** through `ON DUPLICATE KEY UPDATE`; no `RETURNING`.
//!
//! [ALTER TABLE]: https://dev.mysql.com/doc/refman/8.0/en/alter-table.html
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use oxide_dialect_core::{Analyzer, DialectRegistry, Diagnostics};
//! use oxide_dialect_mysql::MySqlDialect;
//!
//! let registry = DialectRegistry::with_dialect(Arc::new(MySqlDialect::new()));
//! let mut analyzer = Analyzer::new(&registry);
//! let diagnostics = Diagnostics::new();
//! let reports = analyzer
//!     .analyze(
//!         "CREATE TABLE flag (id INT NOT NULL PRIMARY KEY, active TINYINT(1) NOT NULL);
//!          SELECT active FROM flag WHERE id = ?;",
//!         &diagnostics,
//!     )
//!     .unwrap();
//!
//! assert!(diagnostics.is_empty());
//! let active = &reports[0].columns[0].ty;
//! assert_eq!(active.sql_type, "BOOLEAN");
//! assert_eq!(active.dialect, "mysql");
//! assert_eq!(reports[0].parameters[0].ty.sql_type, "INT");
//! ```

mod dialect;
mod resolver;
mod squash;
mod types;

pub use dialect::MySqlDialect;
pub use resolver::MySqlTypeResolver;
pub use squash::MySqlMigrationSquasher;
pub use types::{MYSQL, MySqlType};
