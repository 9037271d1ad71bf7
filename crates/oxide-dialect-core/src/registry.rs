//! Dialect registration.
//!
//! At most one dialect is installed in a registry at a time. Installing a
//! second one without [`DialectRegistry::reset`] first fails, so stale
//! grammar or resolver state can never leak from one dialect into the next.
//!
//! Most callers own a [`DialectRegistry`] value and hand it to whatever
//! parses or resolves. Build and IDE integrations that need process-wide
//! state use the free functions [`setup`], [`reset`] and [`with_active`],
//! which guard one shared registry with the same invariant.

use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;
use tracing::info;

use crate::dialect::Dialect;
use crate::grammar::Grammar;
use crate::parser::Parser;
use crate::resolver::{TypeResolver, chain_names};
use crate::squash::MigrationSquasher;

/// Errors from installing or using a dialect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A dialect is already installed.
    #[error("dialect {active} is already installed; reset before installing {requested}")]
    AlreadyInstalled {
        /// The installed dialect.
        active: &'static str,
        /// The dialect that was refused.
        requested: &'static str,
    },
    /// No dialect is installed.
    #[error("no dialect is installed")]
    NotInstalled,
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

#[derive(Clone)]
struct Installed {
    dialect: Arc<dyn Dialect>,
    grammar: Grammar,
    resolver: Arc<dyn TypeResolver>,
    squasher: Arc<dyn MigrationSquasher>,
}

/// Holds the active dialect and the chains built from it.
#[derive(Clone, Default)]
pub struct DialectRegistry {
    installed: Option<Installed>,
}

impl DialectRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self { installed: None }
    }

    /// Creates a registry with `dialect` installed.
    #[must_use]
    pub fn with_dialect(dialect: Arc<dyn Dialect>) -> Self {
        let mut registry = Self::new();
        registry.install(dialect);
        registry
    }

    /// Installs a dialect, building its resolver and squasher chains.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::AlreadyInstalled`] if a dialect is active.
    pub fn setup(&mut self, dialect: Arc<dyn Dialect>) -> Result<()> {
        if let Some(installed) = &self.installed {
            return Err(RegistryError::AlreadyInstalled {
                active: installed.dialect.name(),
                requested: dialect.name(),
            });
        }
        self.install(dialect);
        Ok(())
    }

    fn install(&mut self, dialect: Arc<dyn Dialect>) {
        let resolver: Arc<dyn TypeResolver> = Arc::from(dialect.type_resolver());
        let squasher: Arc<dyn MigrationSquasher> = Arc::from(dialect.migration_squasher());
        info!(
            dialect = dialect.name(),
            resolvers = ?chain_names(resolver.as_ref()),
            "Installed dialect"
        );
        self.installed = Some(Installed {
            grammar: dialect.grammar(),
            dialect,
            resolver,
            squasher,
        });
    }

    /// Uninstalls the active dialect, if any.
    pub fn reset(&mut self) {
        if let Some(installed) = self.installed.take() {
            info!(dialect = installed.dialect.name(), "Reset dialect");
        }
    }

    fn installed(&self) -> Result<&Installed> {
        self.installed.as_ref().ok_or(RegistryError::NotInstalled)
    }

    /// Returns true if a dialect is installed.
    #[must_use]
    pub const fn is_installed(&self) -> bool {
        self.installed.is_some()
    }

    /// Returns the active dialect.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotInstalled`] if the registry is empty.
    pub fn active(&self) -> Result<&dyn Dialect> {
        Ok(self.installed()?.dialect.as_ref())
    }

    /// Returns the active grammar.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotInstalled`] if the registry is empty.
    pub fn grammar(&self) -> Result<Grammar> {
        Ok(self.installed()?.grammar)
    }

    /// Returns the head of the active resolver chain.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotInstalled`] if the registry is empty.
    pub fn type_resolver(&self) -> Result<Arc<dyn TypeResolver>> {
        Ok(Arc::clone(&self.installed()?.resolver))
    }

    /// Returns the head of the active squasher chain.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotInstalled`] if the registry is empty.
    pub fn migration_squasher(&self) -> Result<Arc<dyn MigrationSquasher>> {
        Ok(Arc::clone(&self.installed()?.squasher))
    }

    /// Creates a parser for `sql` restricted to the active grammar.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotInstalled`] if the registry is empty.
    pub fn parser<'a>(&self, sql: &'a str) -> Result<Parser<'a>> {
        Ok(Parser::with_grammar(sql, self.grammar()?))
    }
}

impl core::fmt::Debug for DialectRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DialectRegistry")
            .field(
                "active",
                &self.installed.as_ref().map(|i| i.dialect.name()),
            )
            .finish()
    }
}

// ============================================================================
// Process-wide registry
// ============================================================================

static GLOBAL: Mutex<DialectRegistry> = Mutex::new(DialectRegistry::new());

fn global() -> std::sync::MutexGuard<'static, DialectRegistry> {
    GLOBAL.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Installs a dialect in the process-wide registry.
///
/// # Errors
///
/// Returns [`RegistryError::AlreadyInstalled`] unless [`reset`] was called
/// since the last successful `setup`.
pub fn setup(dialect: Arc<dyn Dialect>) -> Result<()> {
    global().setup(dialect)
}

/// Uninstalls the process-wide dialect.
pub fn reset() {
    global().reset();
}

/// Runs `f` with a snapshot of the process-wide registry.
///
/// The lock is released before `f` runs, so `f` may itself call [`reset`].
///
/// # Errors
///
/// Returns [`RegistryError::NotInstalled`] if no dialect is installed.
pub fn with_active<T>(f: impl FnOnce(&DialectRegistry) -> T) -> Result<T> {
    let snapshot = global().clone();
    if !snapshot.is_installed() {
        return Err(RegistryError::NotInstalled);
    }
    Ok(f(&snapshot))
}
