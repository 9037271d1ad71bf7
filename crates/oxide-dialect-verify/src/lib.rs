//! # oxide-dialect-verify
//!
//! Checks a project's SQL against one dialect without a database:
//!
//! - **replay**: folds every migration file into the first schema and
//!   compares the result with the maintained canonical schema.
//! - **types**: resolves the result columns and bind parameters of query
//!   files against the replayed schema.
//!
//! The `oxide-verify` binary wraps [`Verifier`]; settings come from flags,
//! environment variables and an optional JSON [`Config`] file.
//!
//! ## Example
//!
//! ```rust,no_run
//! use oxide_dialect_verify::{Config, OutputFormat, Settings, Verifier, render_replay};
//!
//! let config = Config {
//!     dialect: Some("postgres".into()),
//!     schema: Some("schema.sql".into()),
//!     migrations: Some("migrations".into()),
//!     canonical: Some("schema.sql".into()),
//!     format: None,
//! };
//! let verifier = Verifier::new(Settings::try_from(config)?)?;
//! let outcome = verifier.replay()?;
//! print!("{}", render_replay(&outcome, OutputFormat::Text)?);
//! # Ok::<(), oxide_dialect_verify::VerifyError>(())
//! ```

pub mod config;
pub mod dialects;
pub mod error;
pub mod output;
pub mod verify;

pub use config::{Config, OutputFormat, Settings};
pub use dialects::{dialect_by_name, dialect_names};
pub use error::{Result, VerifyError};
pub use output::{render_replay, render_types};
pub use verify::{FileReport, ReplayOutcome, TypesOutcome, Verifier, load_migrations};
