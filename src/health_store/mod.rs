mod errors;
mod models;
mod predicates;
mod schema;
mod store;
mod trait_def;

#[cfg(test)]
pub(crate) mod fixtures;

pub use errors::StoreOpenError;
pub use models::*;
pub use predicates::Predicates;
pub use schema::{create_health_schema, validate_health_schema, HEALTH_TABLES};
pub use store::SqliteHealthStore;
pub use trait_def::HealthStatsStore;
