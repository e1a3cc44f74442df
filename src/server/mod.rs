pub mod config;
mod http_layers;
pub mod metrics;
#[allow(clippy::module_inception)]
pub mod server;
pub mod state;
mod stats_routes;

pub use config::ServerConfig;
pub use http_layers::*;
pub use server::run_server;
