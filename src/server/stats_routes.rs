//! Routes of the analytical queries, mounted under `/v1`.
//!
//! Handlers call the store directly; each query is a short read against a
//! local SQLite file.

use super::metrics::record_query;
use super::state::{GuardedHealthStore, ServerState};
use crate::health_store::{
    AboveAverageFilter, HighCoverageFilter, ImprovementFilter, InfectionByPhaseFilter,
    DEFAULT_IMPROVEMENT_LIMIT,
};
use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::{fmt, str::FromStr, time::Instant};
use tracing::error;

/// The dashboard sends `param=` to mean "all", so an empty value counts as
/// absent.
fn empty_string_as_none<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let opt = Option::<String>::deserialize(de)?;
    match opt.as_deref() {
        None | Some("") => Ok(None),
        Some(s) => FromStr::from_str(s).map_err(de::Error::custom).map(Some),
    }
}

#[derive(Deserialize, Debug)]
struct HighCoverageQuery {
    year: i64,
    antigen: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    country: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    region: Option<String>,
}

#[derive(Deserialize, Debug)]
struct InfectionByPhaseQuery {
    economic_phase: i64,
    infection_type: String,
    year: i64,
}

#[derive(Deserialize, Debug)]
struct ImprovementQuery {
    start_year: i64,
    end_year: i64,
    antigen: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    limit: Option<u32>,
}

#[derive(Deserialize, Debug)]
struct AboveAverageQuery {
    year: i64,
    infection_type: String,
}

/// Turns a store result into a JSON response, recording the query metrics.
fn respond<T: Serialize>(operation: &str, start: Instant, result: Result<T>) -> Response {
    let duration = start.elapsed();
    match result {
        Ok(value) => {
            record_query(operation, duration, true);
            Json(value).into_response()
        }
        Err(err) => {
            record_query(operation, duration, false);
            error!("Query {} failed: {:#}", operation, err);
            (StatusCode::INTERNAL_SERVER_ERROR, format!("{:#}", err)).into_response()
        }
    }
}

async fn get_filters(State(store): State<GuardedHealthStore>) -> Response {
    let start = Instant::now();
    respond("filter_options", start, store.list_filter_options())
}

async fn get_high_coverage(
    State(store): State<GuardedHealthStore>,
    Query(params): Query<HighCoverageQuery>,
) -> Response {
    let filter = HighCoverageFilter {
        year: params.year,
        antigen_id: params.antigen,
        country_id: params.country,
        region: params.region,
    };
    let start = Instant::now();
    respond("high_coverage", start, store.high_coverage(&filter))
}

async fn get_infection_by_phase(
    State(store): State<GuardedHealthStore>,
    Query(params): Query<InfectionByPhaseQuery>,
) -> Response {
    let filter = InfectionByPhaseFilter {
        economic_phase_id: params.economic_phase,
        infection_type_id: params.infection_type,
        year: params.year,
    };
    let start = Instant::now();
    respond("infection_by_phase", start, store.infection_by_phase(&filter))
}

async fn get_improvement(
    State(store): State<GuardedHealthStore>,
    Query(params): Query<ImprovementQuery>,
) -> Response {
    let filter = ImprovementFilter {
        start_year: params.start_year,
        end_year: params.end_year,
        antigen_id: params.antigen,
        limit: params.limit.unwrap_or(DEFAULT_IMPROVEMENT_LIMIT),
    };
    let start = Instant::now();
    // Failures are already logged and flattened to an empty list by the store.
    let rows = store.top_improvement(&filter);
    record_query("improvement", start.elapsed(), true);
    Json(rows).into_response()
}

async fn get_above_average(
    State(store): State<GuardedHealthStore>,
    Query(params): Query<AboveAverageQuery>,
) -> Response {
    let filter = AboveAverageFilter {
        year: params.year,
        infection_type_id: params.infection_type,
    };
    let start = Instant::now();
    respond("above_average", start, store.above_global_average(&filter))
}

async fn get_overview(State(state): State<ServerState>) -> Response {
    let start = Instant::now();
    let result = state
        .health_store
        .approximate_overview(state.config.overview_sample_rows);
    respond("overview", start, result)
}

pub fn make_stats_routes(state: ServerState) -> Router {
    Router::new()
        .route("/filters", get(get_filters))
        .route("/vaccination/high-coverage", get(get_high_coverage))
        .route("/vaccination/improvement", get(get_improvement))
        .route("/infection/by-phase", get(get_infection_by_phase))
        .route("/infection/above-average", get(get_above_average))
        .route("/stats/overview", get(get_overview))
        .with_state(state)
}
