use axum::extract::FromRef;

use crate::health_store::HealthStatsStore;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedHealthStore = Arc<dyn HealthStatsStore>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub health_store: GuardedHealthStore,
    pub version: String,
}

impl ServerState {
    pub fn new(config: ServerConfig, health_store: GuardedHealthStore) -> ServerState {
        ServerState {
            config,
            start_time: Instant::now(),
            health_store,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl FromRef<ServerState> for GuardedHealthStore {
    fn from_ref(input: &ServerState) -> Self {
        input.health_store.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
