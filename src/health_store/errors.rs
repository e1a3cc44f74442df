use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while opening the statistics database.
#[derive(Debug, Error)]
pub enum StoreOpenError {
    #[error("statistics database not found: {0:?}")]
    NotFound(PathBuf),

    #[error("read pool size must be at least 1")]
    EmptyReadPool,

    #[error("failed to open statistics database: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("statistics database schema mismatch: {0:#}")]
    Schema(anyhow::Error),
}
