//! One-off copy of the statistics tables from one SQLite file into another.
//!
//! Rows already present in the target are skipped, so a migration can be
//! re-run after a partial failure. Each table is copied in its own
//! transaction and a failing table does not stop the following ones.

use crate::health_store::{create_health_schema, HEALTH_TABLES};
use crate::sqlite_persistence::Table;
use anyhow::{anyhow, Context};
use indicatif::{ProgressBar, ProgressStyle};
use rusqlite::{params_from_iter, types::Value, Connection, OpenFlags};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info};

/// Tables in the order they are copied.
pub const MIGRATION_ORDER: &[&str] = &[
    "Antigen",
    "Country",
    "CountryPopulation",
    "Economy",
    "Infection_Type",
    "InfectionData",
    "Vaccination",
];

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("source database not found: {0:?}")]
    SourceNotFound(PathBuf),

    #[error("failed to open database: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to prepare target schema: {0:#}")]
    Schema(anyhow::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableMigration {
    pub table: &'static str,
    pub found: usize,
    pub migrated: usize,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MigrationSummary {
    pub tables: Vec<TableMigration>,
}

impl MigrationSummary {
    pub fn total_migrated(&self) -> usize {
        self.tables.iter().map(|t| t.migrated).sum()
    }

    pub fn failed_tables(&self) -> Vec<&'static str> {
        self.tables
            .iter()
            .filter(|t| t.error.is_some())
            .map(|t| t.table)
            .collect()
    }

    pub fn table(&self, name: &str) -> Option<&TableMigration> {
        self.tables.iter().find(|t| t.table == name)
    }
}

fn make_progress_bar(len: usize, show_progress: bool) -> ProgressBar {
    if !show_progress {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len as u64);
    match ProgressStyle::default_bar()
        .template("{spinner:.green} {msg:<18} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
    {
        Ok(style) => pb.set_style(style.progress_chars("#>-")),
        Err(err) => debug!("Invalid progress bar template: {}", err),
    }
    pb
}

fn target_has_tables(conn: &Connection) -> rusqlite::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'",
        [],
        |r| r.get(0),
    )?;
    Ok(count > 0)
}

/// Columns copied for `table`, ROWID first when other tables reference it.
fn copied_columns(table: &Table) -> Vec<&'static str> {
    let mut columns = Vec::with_capacity(table.columns.len() + 1);
    if table.rowid_is_key {
        columns.push("ROWID");
    }
    columns.extend(table.column_names());
    columns
}

fn copy_table(
    source: &Connection,
    target: &mut Connection,
    table: &Table,
    progress: &ProgressBar,
) -> anyhow::Result<(usize, usize)> {
    let columns = copied_columns(table);
    let column_list = columns.join(", ");

    let found: i64 = source
        .query_row(&format!("SELECT COUNT(*) FROM {}", table.name), [], |r| {
            r.get(0)
        })
        .with_context(|| format!("Failed to count source rows of {}", table.name))?;
    info!("Found {} rows in source table \"{}\".", found, table.name);
    progress.set_length(found as u64);
    progress.set_position(0);
    progress.set_message(table.name);

    if found == 0 {
        return Ok((0, 0));
    }

    let placeholders = (1..=columns.len())
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ");
    let insert_sql = format!(
        "INSERT OR IGNORE INTO {} ({}) VALUES ({})",
        table.name, column_list, placeholders
    );

    let mut select = source.prepare(&format!("SELECT {} FROM {}", column_list, table.name))?;
    let mut rows = select.query([])?;

    let tx = target.transaction()?;
    let mut migrated = 0;
    {
        let mut insert = tx
            .prepare(&insert_sql)
            .with_context(|| format!("Target table {} is not compatible", table.name))?;
        while let Some(row) = rows.next()? {
            let values = (0..columns.len())
                .map(|i| row.get::<_, Value>(i))
                .collect::<Result<Vec<_>, _>>()?;
            migrated += insert.execute(params_from_iter(values))?;
            progress.inc(1);
        }
    }
    tx.commit()?;

    Ok((found as usize, migrated))
}

/// Copies every statistics table from `source_path` into `target_path`.
///
/// The target file is created if needed, and its schema is created when it
/// has no tables at all.
pub fn migrate_database(
    source_path: &Path,
    target_path: &Path,
    show_progress: bool,
) -> Result<MigrationSummary, MigrationError> {
    if !source_path.exists() {
        return Err(MigrationError::SourceNotFound(source_path.to_path_buf()));
    }
    let source = Connection::open_with_flags(
        source_path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_URI,
    )?;
    let mut target = Connection::open(target_path)?;

    if !target_has_tables(&target)? {
        info!("Target database {:?} is empty, creating schema", target_path);
        create_health_schema(&target).map_err(MigrationError::Schema)?;
    }

    info!(
        "Starting migration from {:?} to {:?}...",
        source_path, target_path
    );
    let progress = make_progress_bar(0, show_progress);
    let mut summary = MigrationSummary::default();

    for &table_name in MIGRATION_ORDER {
        let result = HEALTH_TABLES
            .iter()
            .find(|t| t.name == table_name)
            .ok_or_else(|| anyhow!("Unknown table {}", table_name))
            .and_then(|table| copy_table(&source, &mut target, table, &progress));

        let entry = match result {
            Ok((found, migrated)) => {
                info!(
                    "Successfully migrated {} of {} rows to \"{}\".",
                    migrated, found, table_name
                );
                TableMigration {
                    table: table_name,
                    found,
                    migrated,
                    error: None,
                }
            }
            Err(err) => {
                error!("Error migrating table {}: {:#}", table_name, err);
                TableMigration {
                    table: table_name,
                    found: 0,
                    migrated: 0,
                    error: Some(format!("{:#}", err)),
                }
            }
        };
        summary.tables.push(entry);
    }
    progress.finish_and_clear();

    info!(
        "Migration complete! {} rows migrated, {} tables failed.",
        summary.total_migrated(),
        summary.failed_tables().len()
    );
    Ok(summary)
}
