use crate::health_store::DatasetCounts;
use axum::{http::StatusCode, response::IntoResponse};
use lazy_static::lazy_static;
use prometheus::{
    CounterVec, Encoder, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::time::Duration;

/// Metric name prefix for all statistics server metrics
const PREFIX: &str = "who_stats";

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Request Metrics
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_http_requests_total"), "Total number of HTTP requests"),
        &["method", "path", "status"]
    ).expect("Failed to create http_requests_total metric");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_http_request_duration_seconds"),
            "HTTP request duration in seconds"
        )
        .buckets(vec![0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0]),
        &["method", "path"]
    ).expect("Failed to create http_request_duration_seconds metric");

    // Query Metrics
    pub static ref QUERY_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_query_duration_seconds"),
            "Analytical query duration in seconds"
        )
        .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
        &["operation"]
    ).expect("Failed to create query_duration_seconds metric");

    pub static ref QUERY_ERRORS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_query_errors_total"), "Total failed analytical queries"),
        &["operation"]
    ).expect("Failed to create query_errors_total metric");

    // Dataset Metrics
    pub static ref DATASET_ROWS: GaugeVec = GaugeVec::new(
        Opts::new(format!("{PREFIX}_dataset_rows"), "Rows per table of the statistics database"),
        &["table"]
    ).expect("Failed to create dataset_rows metric");
}

/// Initialize all metrics and register them with the Prometheus registry
pub fn init_metrics() {
    // Ignore errors if already registered (for tests)
    let _ = REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(QUERY_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(QUERY_ERRORS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(DATASET_ROWS.clone()));

    tracing::info!("Metrics system initialized successfully");
}

pub fn init_dataset_metrics(counts: &DatasetCounts) {
    for (table, rows) in [
        ("Country", counts.countries),
        ("Antigen", counts.antigens),
        ("Infection_Type", counts.infection_types),
        ("Vaccination", counts.vaccination_rows),
        ("InfectionData", counts.infection_rows),
        ("CountryPopulation", counts.population_rows),
    ] {
        DATASET_ROWS.with_label_values(&[table]).set(rows as f64);
    }

    tracing::info!(
        "Dataset metrics initialized: {} vaccination rows, {} infection rows, {} population rows",
        counts.vaccination_rows,
        counts.infection_rows,
        counts.population_rows
    );
}

/// Record an HTTP request
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration.as_secs_f64());
}

/// Record one analytical query, failed or not
pub fn record_query(operation: &str, duration: Duration, succeeded: bool) {
    QUERY_DURATION_SECONDS
        .with_label_values(&[operation])
        .observe(duration.as_secs_f64());

    if !succeeded {
        QUERY_ERRORS_TOTAL.with_label_values(&[operation]).inc();
    }
}

pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = vec![];
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => {
            let response = String::from_utf8(buffer).unwrap_or_else(|_| String::from(""));
            (StatusCode::OK, response)
        }
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {}", e),
            )
        }
    }
}
