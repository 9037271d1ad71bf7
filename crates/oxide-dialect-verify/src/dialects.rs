//! Dialect lookup by name.

use std::sync::Arc;

use oxide_dialect_core::Dialect;
use oxide_dialect_mysql::MySqlDialect;
use oxide_dialect_postgres::PostgresDialect;
use oxide_dialect_sqlite::{SqliteDialect, SqliteVersion};

use crate::error::{Result, VerifyError};

/// Builds the dialect named `name`.
///
/// Accepts `sqlite` (the newest supported release), `sqlite-<version>`,
/// `mysql`, and `postgres` or `postgresql`. Names are case-insensitive.
///
/// # Errors
///
/// Returns [`VerifyError::UnknownDialect`] for any other name and
/// [`VerifyError::SqliteVersion`] for an unsupported SQLite release.
pub fn dialect_by_name(name: &str) -> Result<Arc<dyn Dialect>> {
    let lowered = name.trim().to_ascii_lowercase();
    let dialect: Arc<dyn Dialect> = match lowered.as_str() {
        "sqlite" => Arc::new(SqliteDialect::default()),
        "mysql" => Arc::new(MySqlDialect::new()),
        "postgres" | "postgresql" => Arc::new(PostgresDialect::new()),
        other => match other.strip_prefix("sqlite-") {
            Some(version) => Arc::new(SqliteDialect::new(version.parse()?)),
            None => return Err(VerifyError::UnknownDialect(name.to_string())),
        },
    };
    Ok(dialect)
}

/// Every name [`dialect_by_name`] resolves to a distinct dialect.
#[must_use]
pub fn dialect_names() -> Vec<String> {
    SqliteVersion::ALL
        .iter()
        .map(|version| format!("sqlite-{version}"))
        .chain(["mysql".to_string(), "postgres".to_string()])
        .collect()
}
