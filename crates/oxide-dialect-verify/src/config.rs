//! Configuration file and settings layering.
//!
//! Settings come from three places, highest priority first: command-line
//! flags (and their environment variables), the JSON configuration file,
//! and built-in defaults. Relative paths in the configuration file are
//! taken relative to the directory holding it.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, VerifyError};

/// Dialect used when none is configured.
pub const DEFAULT_DIALECT: &str = "sqlite";

/// How results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// One pretty-printed JSON document.
    Json,
}

/// The optional JSON configuration file.
///
/// ```json
/// {
///   "dialect": "postgres",
///   "schema": "schema.sql",
///   "migrations": "migrations",
///   "canonical": "schema.sql",
///   "format": "json"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Dialect name, see [`crate::dialect_by_name`].
    pub dialect: Option<String>,
    /// Schema of the first version.
    pub schema: Option<PathBuf>,
    /// Directory of migration files.
    pub migrations: Option<PathBuf>,
    /// Maintained schema the replay result is compared with.
    pub canonical: Option<PathBuf>,
    /// Output format.
    pub format: Option<OutputFormat>,
}

impl Config {
    /// Reads a configuration file, resolving its paths against the file's
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::Read`] if the file cannot be read and
    /// [`VerifyError::Config`] if it is not a valid configuration.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| VerifyError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| VerifyError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(config.relative_to(base))
    }

    /// Joins every relative path onto `base`.
    #[must_use]
    pub fn relative_to(self, base: &Path) -> Self {
        let join = |p: Option<PathBuf>| p.map(|p| if p.is_relative() { base.join(p) } else { p });
        Self {
            schema: join(self.schema),
            migrations: join(self.migrations),
            canonical: join(self.canonical),
            ..self
        }
    }

    /// Keeps every field set here and takes the rest from `fallback`.
    #[must_use]
    pub fn or(self, fallback: Self) -> Self {
        Self {
            dialect: self.dialect.or(fallback.dialect),
            schema: self.schema.or(fallback.schema),
            migrations: self.migrations.or(fallback.migrations),
            canonical: self.canonical.or(fallback.canonical),
            format: self.format.or(fallback.format),
        }
    }
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Dialect name.
    pub dialect: String,
    /// Schema of the first version.
    pub schema: PathBuf,
    /// Directory of migration files; nothing is replayed without one.
    pub migrations: Option<PathBuf>,
    /// Maintained schema to compare with.
    pub canonical: Option<PathBuf>,
    /// Output format.
    pub format: OutputFormat,
}

impl TryFrom<Config> for Settings {
    type Error = VerifyError;

    fn try_from(config: Config) -> Result<Self> {
        Ok(Self {
            dialect: config
                .dialect
                .unwrap_or_else(|| DEFAULT_DIALECT.to_string()),
            schema: config.schema.ok_or(VerifyError::MissingSetting("schema"))?,
            migrations: config.migrations,
            canonical: config.canonical,
            format: config.format.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let config: Config =
            serde_json::from_str(r#"{"dialect": "mysql", "schema": "a.sql", "format": "json"}"#)
                .unwrap();
        assert_eq!(config.dialect.as_deref(), Some("mysql"));
        assert_eq!(config.format, Some(OutputFormat::Json));
        assert!(config.migrations.is_none());
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        assert!(serde_json::from_str::<Config>(r#"{"dialekt": "mysql"}"#).is_err());
    }

    #[test]
    fn test_flags_win_over_file() {
        let flags = Config {
            dialect: Some("postgres".into()),
            ..Config::default()
        };
        let file = Config {
            dialect: Some("mysql".into()),
            schema: Some("schema.sql".into()),
            ..Config::default()
        };
        let settings = Settings::try_from(flags.or(file)).unwrap();
        assert_eq!(settings.dialect, "postgres");
        assert_eq!(settings.schema, PathBuf::from("schema.sql"));
        assert_eq!(settings.format, OutputFormat::Text);
    }

    #[test]
    fn test_relative_paths() {
        let config = Config {
            schema: Some("schema.sql".into()),
            migrations: Some("/abs/migrations".into()),
            ..Config::default()
        }
        .relative_to(Path::new("project"));
        assert_eq!(config.schema, Some(PathBuf::from("project/schema.sql")));
        assert_eq!(config.migrations, Some(PathBuf::from("/abs/migrations")));
    }

    #[test]
    fn test_schema_is_required() {
        assert!(matches!(
            Settings::try_from(Config::default()),
            Err(VerifyError::MissingSetting("schema"))
        ));
    }
}
