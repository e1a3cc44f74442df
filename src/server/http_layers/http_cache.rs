//! HTTP caching middleware

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request},
    middleware::Next,
    response::IntoResponse,
};

/// Marks successful responses as cacheable for `max_age_sec` seconds.
///
/// Query results only change when the database file is replaced, so clients
/// may reuse them freely within the window. Error responses are left
/// uncached.
pub async fn http_cache(
    State(max_age_sec): State<usize>,
    request: Request<Body>,
    next: Next,
) -> impl IntoResponse {
    let response = next.run(request).await.into_response();

    let (mut parts, body) = response.into_parts();
    if !parts.status.is_success() {
        return axum::http::Response::from_parts(parts, body);
    }
    if let Ok(value) = HeaderValue::from_str(&format!("max-age={}", max_age_sec)) {
        parts.headers.insert(header::CACHE_CONTROL, value);
    }

    axum::http::Response::from_parts(parts, body)
}
