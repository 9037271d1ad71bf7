//! # oxide-dialect-postgres
//!
//! PostgreSQL dialect layer for `oxide-dialect-core`.
//!
//! Column types resolve to [`PostgresType`] variants, so `SMALLINT` decodes
//! into `i16`, `INTEGER` into `i32` and `TIMESTAMPTZ` into a UTC timestamp.
//! Serial types are integer aliases; nullability still comes from the column
//! constraints.
//!
//! The grammar adds `RETURNING`, `ON CONFLICT`, `UPDATE ... FROM`,
//! `NULLS FIRST | LAST`, window functions, the `->` and `->>` operators, and
//! `ALTER COLUMN ... TYPE | SET NOT NULL | DROP NOT NULL`.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use oxide_dialect_core::{Analyzer, DialectRegistry, Diagnostics};
//! use oxide_dialect_postgres::PostgresDialect;
//!
//! let registry = DialectRegistry::with_dialect(Arc::new(PostgresDialect::new()));
//! let mut analyzer = Analyzer::new(&registry);
//! let diagnostics = Diagnostics::new();
//! let reports = analyzer
//!     .analyze(
//!         "CREATE TABLE item (id BIGSERIAL PRIMARY KEY, qty SMALLINT NOT NULL);
//!          INSERT INTO item (qty) VALUES (?) RETURNING id, qty;",
//!         &diagnostics,
//!     )
//!     .unwrap();
//!
//! assert!(diagnostics.is_empty());
//! let columns: Vec<_> = reports[0]
//!     .columns
//!     .iter()
//!     .map(|c| c.ty.sql_type)
//!     .collect();
//! assert_eq!(columns, ["BIGINT", "SMALLINT"]);
//! assert_eq!(reports[0].parameters[0].ty.sql_type, "SMALLINT");
//! ```

mod dialect;
mod resolver;
mod squash;
mod types;

pub use dialect::PostgresDialect;
pub use resolver::PostgresTypeResolver;
pub use squash::PostgresMigrationSquasher;
pub use types::{POSTGRES, PostgresType};
