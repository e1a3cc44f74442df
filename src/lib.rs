//! WHO Health Statistics Server Library
//!
//! Exposes the query service, configuration and HTTP layer so the binaries
//! and the end-to-end tests share one implementation.

pub mod config;
pub mod health_store;
pub mod migration;
pub mod overview;
pub mod server;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use health_store::{HealthStatsStore, SqliteHealthStore};
pub use server::{run_server, RequestsLoggingLevel};
