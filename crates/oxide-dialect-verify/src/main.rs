//! oxide-verify CLI
//!
//! Replays migrations and dumps resolved query types.

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use oxide_dialect_verify::{
    Config, OutputFormat, Settings, Verifier, dialect_names, render_replay, render_types,
};

/// Checks SQL schemas, migrations and queries against one dialect.
#[derive(Parser)]
#[command(name = "oxide-verify")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON configuration file; flags override its values.
    #[arg(short, long, env = "OXIDE_VERIFY_CONFIG")]
    config: Option<PathBuf>,

    /// Dialect: sqlite, sqlite-<version>, mysql or postgres.
    #[arg(short, long, env = "OXIDE_DIALECT")]
    dialect: Option<String>,

    /// Schema of the first version.
    #[arg(short, long)]
    schema: Option<PathBuf>,

    /// Migrations directory.
    #[arg(short, long)]
    migrations_dir: Option<PathBuf>,

    /// Output format.
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay migrations and compare with the canonical schema.
    Replay {
        /// Maintained schema the folded result must match.
        #[arg(long)]
        canonical: Option<PathBuf>,
    },

    /// Resolve result and parameter types of query files.
    Types {
        /// Files of `;`-separated statements.
        #[arg(required = true)]
        queries: Vec<PathBuf>,
    },

    /// List the supported dialects.
    Dialects,
}

impl Cli {
    /// Flags layered over the configuration file.
    fn settings(&self, canonical: Option<PathBuf>) -> anyhow::Result<Settings> {
        let file = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        let flags = Config {
            dialect: self.dialect.clone(),
            schema: self.schema.clone(),
            migrations: self.migrations_dir.clone(),
            canonical,
            format: self.format,
        };
        Ok(Settings::try_from(flags.or(file))?)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match &cli.command {
        Commands::Dialects => {
            for name in dialect_names() {
                println!("{name}");
            }
        }

        Commands::Replay { canonical } => {
            let settings = cli.settings(canonical.clone())?;
            let format = settings.format;
            let verifier = Verifier::new(settings)?;
            let outcome = verifier.replay().context("Failed to replay migrations")?;
            print!("{}", render_replay(&outcome, format)?);
            if !outcome.passed() {
                bail!("Migrations do not fold into the canonical schema");
            }
        }

        Commands::Types { queries } => {
            let settings = cli.settings(None)?;
            let format = settings.format;
            let verifier = Verifier::new(settings)?;
            let outcome = verifier
                .describe(queries)
                .context("Failed to resolve queries")?;
            print!("{}", render_types(&outcome, format)?);
            if !outcome.passed() {
                bail!("Queries did not resolve cleanly");
            }
        }
    }

    Ok(())
}
