//! # oxide-dialect-sqlite
//!
//! SQLite dialect layers for `oxide-dialect-core`.
//!
//! # How SQLite versions differ
//!
//! Each supported release adds syntax or typing on top of the previous one.
//! A feature introduced in one version stays visible in every later one.
//!
//! | version | adds |
//! |---|---|
//! | 3.18 | the baseline function set, `NUMERIC` columns |
//! | 3.24 | [UPSERT] (`ON CONFLICT ... DO`) |
//! | 3.25 | [window functions], `ALTER TABLE ... RENAME COLUMN` |
//! | 3.30 | `NULLS FIRST` / `NULLS LAST` |
//! | 3.33 | `UPDATE ... FROM` |
//! | 3.35 | [RETURNING], `ALTER TABLE ... DROP COLUMN`, math functions |
//! | 3.38 | `->` / `->>` [JSON operators], the `json_*` functions |
//!
//! - **[Type affinity]**: SQLite stores every value in one of four storage
//!   classes. Declared column types map onto the shared baseline variants;
//!   there are no narrower integer types.
//! - **Limited [ALTER TABLE]**: no `MODIFY`, `CHANGE` or `ALTER COLUMN`, and
//!   no column positions. Added columns always go last.
//!
//! [UPSERT]: https://www.sqlite.org/lang_upsert.html
//! [window functions]: https://www.sqlite.org/windowfunctions.html
//! [RETURNING]: https://www.sqlite.org/lang_returning.html
//! [JSON operators]: https://www.sqlite.org/json1.html#jptr
//! [Type affinity]: https://www.sqlite.org/datatype3.html
//! [ALTER TABLE]: https://www.sqlite.org/lang_altertable.html
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use oxide_dialect_core::{Analyzer, DialectRegistry, Diagnostics};
//! use oxide_dialect_sqlite::{SqliteDialect, SqliteVersion};
//!
//! let registry = DialectRegistry::with_dialect(Arc::new(SqliteDialect::new(SqliteVersion::V3_35)));
//! let mut analyzer = Analyzer::new(&registry);
//! let diagnostics = Diagnostics::new();
//! let reports = analyzer
//!     .analyze(
//!         "CREATE TABLE note (id INTEGER PRIMARY KEY, body TEXT NOT NULL);
//!          DELETE FROM note WHERE id = ? RETURNING body;",
//!         &diagnostics,
//!     )
//!     .unwrap();
//!
//! assert!(diagnostics.is_empty());
//! assert_eq!(reports[0].columns[0].ty.sql_type, "TEXT");
//! ```

mod dialect;
mod resolver;
mod squash;

pub use dialect::{SqliteDialect, SqliteVersion, UnknownVersion};
pub use resolver::{
    Sqlite318TypeResolver, Sqlite325TypeResolver, Sqlite335TypeResolver, Sqlite338TypeResolver,
};
pub use squash::{Sqlite325MigrationSquasher, Sqlite335MigrationSquasher};
