//! Error types for the verifier.

use std::path::PathBuf;

use oxide_dialect_core::RegistryError;
use oxide_dialect_sqlite::UnknownVersion;

/// Errors that stop a verification run before any SQL is checked.
///
/// Problems inside the SQL itself are diagnostics, not errors.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    /// A file or directory could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        /// The path that failed.
        path: PathBuf,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for [`crate::Config`].
    #[error("Invalid configuration file {path}: {source}")]
    Config {
        /// Path to the configuration file.
        path: PathBuf,
        /// The parse error.
        source: serde_json::Error,
    },

    /// Neither the command line nor the configuration names a setting.
    #[error("No {0} given; pass it on the command line or in the configuration file")]
    MissingSetting(&'static str),

    /// The dialect name matches no supported dialect.
    #[error("Unknown dialect {0}; expected sqlite, sqlite-<version>, mysql or postgres")]
    UnknownDialect(String),

    /// A `sqlite-<version>` name with an unsupported version.
    #[error(transparent)]
    SqliteVersion(#[from] UnknownVersion),

    /// The registry refused the dialect or had none installed.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// JSON output could not be rendered.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for verifier operations.
pub type Result<T> = std::result::Result<T, VerifyError>;
