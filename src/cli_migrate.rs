use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use who_stats_server::migration::migrate_database;

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

/// Copies the WHO statistics tables from one SQLite database into another.
#[derive(Parser, Debug)]
struct CliArgs {
    /// Database to read from.
    #[clap(value_parser = parse_path)]
    pub source: PathBuf,

    /// Database to write into. Created, with its schema, if it does not exist.
    #[clap(value_parser = parse_path)]
    pub target: PathBuf,

    /// Do not draw a progress bar.
    #[clap(long)]
    pub no_progress: bool,
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    if cli_args.source == cli_args.target {
        bail!("Source and target must be different databases");
    }

    let summary = migrate_database(&cli_args.source, &cli_args.target, !cli_args.no_progress)?;

    for table in &summary.tables {
        match &table.error {
            None => info!(
                "{:<18} found {:>8}  migrated {:>8}",
                table.table, table.found, table.migrated
            ),
            Some(err) => info!("{:<18} FAILED: {}", table.table, err),
        }
    }

    let failed = summary.failed_tables();
    if !failed.is_empty() {
        bail!("Migration failed for: {}", failed.join(", "));
    }
    Ok(())
}
