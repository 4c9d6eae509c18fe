//! snowgrid Service Library
//!
//! HTTP handlers, shared state and router for the snowfall service.
//! This library is used by both the snowgrid-service binary and integration tests.

pub mod handlers;

use std::sync::Arc;

use axum::{routing::get, Router};
use snowgrid::{ResultCache, SnowfallService};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Application state shared across handlers.
pub struct AppState {
    /// Sampling and interpolation pipeline.
    pub snowfall: SnowfallService,
    /// Result cache in front of the pipeline, owned for the process lifetime.
    pub cache: ResultCache,
}

impl AppState {
    /// Create state whose cache TTL follows the service configuration.
    pub fn new(snowfall: SnowfallService) -> Self {
        let cache = ResultCache::with_default_ttl(snowfall.config().cache_ttl);
        Self { snowfall, cache }
    }
}

/// OpenAPI documentation for the snowfall service.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "snowgrid Snowfall Service",
        version = "0.1.0",
        description = "REST API serving sampled and interpolated snow depth measurements.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    paths(
        handlers::get_latest_snowfall,
        handlers::get_storm_snowfall,
        handlers::list_storms,
        handlers::health_check,
        handlers::get_stats,
    ),
    components(
        schemas(
            handlers::ResponseFormat,
            handlers::ApiErrorResponse,
            handlers::HealthResponse,
            handlers::StatsResponse,
            snowgrid::SnowfallEvent,
            snowgrid::Measurement,
            snowgrid::DataSource,
            snowgrid::StormMetadata,
        )
    ),
    tags(
        (name = "snowfall", description = "Snowfall measurement endpoints"),
        (name = "system", description = "System and health endpoints")
    )
)]
pub struct ApiDoc;

/// Build the application router with docs, tracing and CORS layers.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/snowfall/latest", get(handlers::get_latest_snowfall))
        .route("/api/snowfall/:storm_id", get(handlers::get_storm_snowfall))
        .route("/api/storms", get(handlers::list_storms))
        .route("/health", get(handlers::health_check))
        .route("/stats", get(handlers::get_stats))
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
        .with_state(state)
}

// Re-export commonly used types for convenience
pub use handlers::{
    ApiErrorResponse, FormatQuery, HealthResponse, ResponseFormat, StatsResponse,
    CACHE_HIT_HEADER,
};
