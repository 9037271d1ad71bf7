//! Replaying migrations and describing queries for one configured run.

use std::path::{Path, PathBuf};

use oxide_dialect_core::migrate::{
    Migration, MigrationReplayer, SchemaDiff, compare_schema, order_migrations,
};
use oxide_dialect_core::{
    Analyzer, Catalog, Diagnostic, Diagnostics, DialectRegistry, QueryReport, Severity,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::Settings;
use crate::dialects::dialect_by_name;
use crate::error::{Result, VerifyError};

/// File extensions recognized as migrations.
pub const MIGRATION_EXTENSIONS: [&str; 2] = ["sql", "sqm"];

/// The result of replaying every migration over the first schema.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayOutcome {
    /// Name of the active dialect.
    pub dialect: &'static str,
    /// Migration file names in replay order.
    pub migrations: Vec<String>,
    /// The folded schema text.
    pub schema: String,
    /// Comparison with the canonical schema, when one is configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<SchemaDiff>,
    /// Problems found while replaying.
    pub diagnostics: Vec<Diagnostic>,
}

impl ReplayOutcome {
    /// No error was reported and the folded schema matches the canonical one.
    #[must_use]
    pub fn passed(&self) -> bool {
        !has_errors(&self.diagnostics) && self.diff.as_ref().is_none_or(SchemaDiff::is_match)
    }
}

/// Reports for one query file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    /// The file name as given.
    pub file: String,
    /// One report per resolved query or mutation.
    pub reports: Vec<QueryReport>,
}

/// Resolved types of every query file, against the replayed schema.
#[derive(Debug, Clone, Serialize)]
pub struct TypesOutcome {
    /// Name of the active dialect.
    pub dialect: &'static str,
    /// Per-file reports, in the order the files were given.
    pub files: Vec<FileReport>,
    /// Problems found in the schema, the migrations and the queries.
    pub diagnostics: Vec<Diagnostic>,
}

impl TypesOutcome {
    /// No error was reported.
    #[must_use]
    pub fn passed(&self) -> bool {
        !has_errors(&self.diagnostics)
    }
}

fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(|d| d.severity == Severity::Error)
}

/// One configured verification run.
#[derive(Debug)]
pub struct Verifier {
    registry: DialectRegistry,
    settings: Settings,
}

impl Verifier {
    /// Installs the configured dialect.
    ///
    /// # Errors
    ///
    /// Returns an error if the dialect name is unknown.
    pub fn new(settings: Settings) -> Result<Self> {
        let dialect = dialect_by_name(&settings.dialect)?;
        Ok(Self {
            registry: DialectRegistry::with_dialect(dialect),
            settings,
        })
    }

    /// The resolved settings.
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    fn dialect_name(&self) -> Result<&'static str> {
        Ok(self.registry.active()?.name())
    }

    /// Replays the migrations directory over the schema and compares the
    /// result with the canonical schema, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured file or directory cannot be read.
    pub fn replay(&self) -> Result<ReplayOutcome> {
        let diagnostics = Diagnostics::new();
        let (schema, migrations) = self.fold(&diagnostics)?;
        let diff = self
            .settings
            .canonical
            .as_deref()
            .map(read)
            .transpose()?
            .map(|canonical| compare_schema(&canonical, &schema));
        info!(
            migrations = migrations.len(),
            diagnostics = diagnostics.len(),
            "Replayed migrations"
        );
        Ok(ReplayOutcome {
            dialect: self.dialect_name()?,
            migrations,
            schema,
            diff,
            diagnostics: diagnostics.into_vec(),
        })
    }

    /// Resolves every statement of `queries` against the replayed schema.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured file or a query file cannot be read.
    pub fn describe(&self, queries: &[PathBuf]) -> Result<TypesOutcome> {
        let diagnostics = Diagnostics::new();
        let (schema, _) = self.fold(&diagnostics)?;

        let mut analyzer =
            Analyzer::new(&self.registry).in_file(self.settings.schema.display().to_string());
        analyzer.analyze(&schema, &diagnostics)?;
        let mut catalog = analyzer.into_catalog();

        let mut files = Vec::with_capacity(queries.len());
        for path in queries {
            let (report, next) = self.describe_file(path, catalog, &diagnostics)?;
            files.push(report);
            catalog = next;
        }
        Ok(TypesOutcome {
            dialect: self.dialect_name()?,
            files,
            diagnostics: diagnostics.into_vec(),
        })
    }

    fn describe_file(
        &self,
        path: &Path,
        catalog: Catalog,
        diagnostics: &Diagnostics,
    ) -> Result<(FileReport, Catalog)> {
        let file = path.display().to_string();
        let source = read(path)?;
        let mut analyzer = Analyzer::with_catalog(&self.registry, catalog).in_file(file.clone());
        let reports = analyzer.analyze(&source, diagnostics)?;
        debug!(file = file.as_str(), reports = reports.len(), "Described queries");
        Ok((FileReport { file, reports }, analyzer.into_catalog()))
    }

    /// Reads the schema and replays the migrations, if configured.
    fn fold(&self, diagnostics: &Diagnostics) -> Result<(String, Vec<String>)> {
        let schema = read(&self.settings.schema)?;
        let Some(dir) = &self.settings.migrations else {
            return Ok((schema, Vec::new()));
        };
        let migrations = load_migrations(dir)?;
        let folded =
            MigrationReplayer::new(&self.registry).replay(&schema, &migrations, diagnostics)?;
        let names = migrations.into_iter().map(|m| m.name).collect();
        Ok((folded, names))
    }
}

/// Reads every migration file in `dir`, ordered by version.
///
/// # Errors
///
/// Returns [`VerifyError::Read`] if the directory or a file cannot be read.
pub fn load_migrations(dir: &Path) -> Result<Vec<Migration>> {
    let read_error = |source: std::io::Error| VerifyError::Read {
        path: dir.to_path_buf(),
        source,
    };
    let mut migrations = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_error)? {
        let path = entry.map_err(read_error)?.path();
        let is_migration = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| MIGRATION_EXTENSIONS.contains(&ext));
        if !path.is_file() || !is_migration {
            continue;
        }
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        migrations.push(Migration::new(name, read(&path)?));
    }
    order_migrations(&mut migrations);
    debug!(dir = %dir.display(), count = migrations.len(), "Loaded migrations");
    Ok(migrations)
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| VerifyError::Read {
        path: path.to_path_buf(),
        source,
    })
}
