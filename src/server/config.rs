use super::RequestsLoggingLevel;
use crate::overview::DEFAULT_SAMPLE_ROWS;

#[derive(Clone)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    pub metrics_port: u16,
    pub content_cache_age_sec: usize,
    pub frontend_dir_path: Option<String>,
    /// Rows summed per fact table by the approximate overview.
    pub overview_sample_rows: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: 3001,
            metrics_port: 9091,
            content_cache_age_sec: 3600,
            frontend_dir_path: None,
            overview_sample_rows: DEFAULT_SAMPLE_ROWS,
        }
    }
}
