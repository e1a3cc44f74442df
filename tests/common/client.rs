//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with one method per statistics endpoint. When API routes
//! or parameter names change, update only this file.

use super::constants::*;
use reqwest::Response;
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

#[allow(dead_code)]
impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    async fn get_with_query(&self, path: &str, query: &[(&str, String)]) -> Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .query(query)
            .send()
            .await
            .expect("Request failed")
    }

    pub async fn get_raw(&self, path_and_query: &str) -> Response {
        self.client
            .get(format!("{}{}", self.base_url, path_and_query))
            .send()
            .await
            .expect("Request failed")
    }

    // ========================================================================
    // Statistics Endpoints
    // ========================================================================

    pub async fn get_home(&self) -> Response {
        self.get_raw("/").await
    }

    pub async fn get_filters(&self) -> Response {
        self.get_raw("/v1/filters").await
    }

    /// Empty `country` or `region` means "all", as the dashboard sends it.
    pub async fn get_high_coverage(
        &self,
        year: i64,
        antigen: &str,
        country: &str,
        region: &str,
    ) -> Response {
        self.get_with_query(
            "/v1/vaccination/high-coverage",
            &[
                ("year", year.to_string()),
                ("antigen", antigen.to_string()),
                ("country", country.to_string()),
                ("region", region.to_string()),
            ],
        )
        .await
    }

    pub async fn get_infection_by_phase(
        &self,
        economic_phase: i64,
        infection_type: &str,
        year: i64,
    ) -> Response {
        self.get_with_query(
            "/v1/infection/by-phase",
            &[
                ("economic_phase", economic_phase.to_string()),
                ("infection_type", infection_type.to_string()),
                ("year", year.to_string()),
            ],
        )
        .await
    }

    pub async fn get_improvement(
        &self,
        start_year: i64,
        end_year: i64,
        antigen: &str,
        limit: Option<u32>,
    ) -> Response {
        let mut query = vec![
            ("start_year", start_year.to_string()),
            ("end_year", end_year.to_string()),
            ("antigen", antigen.to_string()),
        ];
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }
        self.get_with_query("/v1/vaccination/improvement", &query)
            .await
    }

    pub async fn get_above_average(&self, year: i64, infection_type: &str) -> Response {
        self.get_with_query(
            "/v1/infection/above-average",
            &[
                ("year", year.to_string()),
                ("infection_type", infection_type.to_string()),
            ],
        )
        .await
    }

    pub async fn get_overview(&self) -> Response {
        self.get_raw("/v1/stats/overview").await
    }
}
