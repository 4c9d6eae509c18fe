//! HTTP request handlers for the snowfall service.
//!
//! Every data endpoint sits behind the shared [`snowgrid::ResultCache`] and
//! reports whether it was served from cache in the `X-Cache-Hit` header.

use axum::{
    extract::{Path, Query, State},
    http::{header::CONTENT_TYPE, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use snowgrid::geojson::measurements_to_feature_collection;
use snowgrid::{SnowError, SnowfallEvent, StormMetadata};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::AppState;

/// Response header telling whether the body came from the cache.
pub const CACHE_HIT_HEADER: &str = "x-cache-hit";

const LATEST_KEY: &str = "snowfall:latest";
const STORMS_KEY: &str = "storms:list";

/// Output format for measurement endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// `SnowfallEvent` as JSON.
    #[default]
    Json,
    /// Measurements as a GeoJSON `FeatureCollection` of points.
    Geojson,
}

/// Query parameters for measurement endpoints.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FormatQuery {
    /// `json` (default) or `geojson`.
    #[serde(default)]
    pub format: ResponseFormat,
}

/// Error body shared by all endpoints.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    /// Short error class, e.g. "Not Found".
    pub error: String,
    /// Human-readable description.
    pub message: String,
    /// HTTP status code, repeated in the body.
    pub status_code: u16,
    /// When the error was produced.
    pub timestamp: DateTime<Utc>,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

/// Cache and pipeline statistics.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatsResponse {
    /// Entries currently in the result cache.
    pub cached_entries: u64,
    /// Cache hit count.
    pub cache_hits: u64,
    /// Cache miss count.
    pub cache_misses: u64,
    /// Cache hit rate (0.0 to 1.0).
    pub hit_rate: f64,
    /// Cache TTL in seconds.
    pub cache_ttl_secs: u64,
    /// Whether the real provider is queried.
    pub real_provider: bool,
    /// Whether the strategic sampling plan is in use.
    pub strategic_sampling: bool,
}

/// Get the measurements for the current storm.
///
/// Served from cache for up to the configured TTL (two hours by default).
#[utoipa::path(
    get,
    path = "/api/snowfall/latest",
    tag = "snowfall",
    params(FormatQuery),
    responses(
        (status = 200, description = "Current snowfall event", body = SnowfallEvent,
            headers(("x-cache-hit" = String, description = "\"true\" when served from cache")))
    )
)]
pub async fn get_latest_snowfall(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FormatQuery>,
) -> Response {
    if let Some(event) = state.cache.get::<SnowfallEvent>(LATEST_KEY) {
        tracing::debug!(key = LATEST_KEY, "Cache hit");
        return event_response(&event, query.format, true);
    }

    let event = state.snowfall.current_event().await;
    tracing::info!(
        storm_id = %event.storm_id,
        measurements = event.measurements.len(),
        "Computed latest snowfall"
    );
    let event = state.cache.set(LATEST_KEY, event);

    event_response(&event, query.format, false)
}

/// Get the measurements for a storm by identifier.
///
/// # Returns
///
/// - `200 OK` with the snowfall event
/// - `404 Not Found` if the identifier is malformed or dated in the future
#[utoipa::path(
    get,
    path = "/api/snowfall/{storm_id}",
    tag = "snowfall",
    params(
        ("storm_id" = String, Path, description = "Storm identifier, storm-YYYY-MM-DD"),
        FormatQuery
    ),
    responses(
        (status = 200, description = "Snowfall event for the storm", body = SnowfallEvent,
            headers(("x-cache-hit" = String, description = "\"true\" when served from cache"))),
        (status = 404, description = "Unknown storm", body = ApiErrorResponse)
    )
)]
pub async fn get_storm_snowfall(
    State(state): State<Arc<AppState>>,
    Path(storm_id): Path<String>,
    Query(query): Query<FormatQuery>,
) -> Response {
    let key = format!("snowfall:{}", storm_id);

    if let Some(event) = state.cache.get::<SnowfallEvent>(&key) {
        tracing::debug!(key = %key, "Cache hit");
        return event_response(&event, query.format, true);
    }

    match state.snowfall.storm_event(&storm_id).await {
        Ok(event) => {
            let event = state.cache.set(key, event);
            event_response(&event, query.format, false)
        }
        Err(e) => error_response(e),
    }
}

/// List available storms.
///
/// Only the current storm is tracked; the list has a single entry.
#[utoipa::path(
    get,
    path = "/api/storms",
    tag = "snowfall",
    responses(
        (status = 200, description = "Storm summaries", body = Vec<StormMetadata>,
            headers(("x-cache-hit" = String, description = "\"true\" when served from cache")))
    )
)]
pub async fn list_storms(State(state): State<Arc<AppState>>) -> Response {
    if let Some(storms) = state.cache.get::<Vec<StormMetadata>>(STORMS_KEY) {
        return with_cache_header(Json(storms.as_ref()), true);
    }

    let storms = state.cache.set(STORMS_KEY, state.snowfall.storms().await);
    with_cache_header(Json(storms.as_ref()), false)
}

/// Health check endpoint.
///
/// Returns service status and version.
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses((status = 200, description = "Service is healthy", body = HealthResponse))
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Get cache statistics.
#[utoipa::path(
    get,
    path = "/stats",
    tag = "system",
    responses((status = 200, description = "Cache statistics", body = StatsResponse))
)]
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    let stats = state.cache.stats();
    let config = state.snowfall.config();

    Json(StatsResponse {
        cached_entries: stats.entry_count,
        cache_hits: stats.hit_count,
        cache_misses: stats.miss_count,
        hit_rate: stats.hit_rate(),
        cache_ttl_secs: state.cache.default_ttl().as_secs(),
        real_provider: config.use_real_provider,
        strategic_sampling: config.use_strategic_sampling,
    })
}

fn event_response(event: &SnowfallEvent, format: ResponseFormat, cache_hit: bool) -> Response {
    match format {
        ResponseFormat::Json => with_cache_header(Json(event), cache_hit),
        ResponseFormat::Geojson => {
            let collection = measurements_to_feature_collection(&event.measurements);
            (
                StatusCode::OK,
                [
                    (CONTENT_TYPE, "application/geo+json"),
                    (HeaderName::from_static(CACHE_HIT_HEADER), cache_flag(cache_hit)),
                ],
                Json(collection),
            )
                .into_response()
        }
    }
}

fn with_cache_header(body: impl IntoResponse, cache_hit: bool) -> Response {
    (
        StatusCode::OK,
        [(CACHE_HIT_HEADER, cache_flag(cache_hit))],
        body,
    )
        .into_response()
}

fn cache_flag(cache_hit: bool) -> &'static str {
    if cache_hit {
        "true"
    } else {
        "false"
    }
}

/// Map a library error onto an HTTP error response.
fn error_response(e: SnowError) -> Response {
    let status = match &e {
        SnowError::InvalidStormId { .. } | SnowError::FutureStorm { .. } => StatusCode::NOT_FOUND,
        SnowError::InvalidBounds { .. }
        | SnowError::InvalidResolution { .. }
        | SnowError::InvalidFeature { .. } => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    tracing::warn!(status = status.as_u16(), error = %e, "Request failed");

    let body = ApiErrorResponse {
        error: status
            .canonical_reason()
            .unwrap_or("Error")
            .to_string(),
        message: e.to_string(),
        status_code: status.as_u16(),
        timestamp: Utc::now(),
    };

    (status, Json(body)).into_response()
}
