//! snowgrid Service - HTTP microservice for regional snowfall maps.
//!
//! Samples snow depth at strategic points, expands the samples into a grid
//! with IDW interpolation and serves the result from a two-hour cache.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `SNOWGRID_PORT` | HTTP server port | 8080 |
//! | `SNOWGRID_USE_REAL_PROVIDER` | Query NOHRSC instead of fixture data | false |
//! | `SNOWGRID_USE_STRATEGIC_SAMPLING` | Strategic plan vs uniform grid | true |
//! | `SNOWGRID_POINT_TIMEOUT_SECS` | Per-point query timeout | 10 |
//! | `SNOWGRID_GRID_RESOLUTION` | Expansion lattice spacing (degrees) | 0.5 |
//! | `SNOWGRID_CACHE_TTL_SECS` | Result cache TTL | 7200 |
//! | `SNOWGRID_NOHRSC_URL` | NOHRSC MapServer base URL | NOAA public server |
//! | `SNOWGRID_NWS_STATIONS` | Stations merged in (empty disables) | KORD,KMDW,KPWK |
//! | `SNOWGRID_NWS_URL` | NWS API base URL | api.weather.gov |
//! | `RUST_LOG` | Log level (e.g., "info", "debug") | "info" |
//!
//! ## Endpoints
//!
//! - `GET /api/snowfall/latest` - Current storm measurements
//! - `GET /api/snowfall/{storm_id}` - Measurements for `storm-YYYY-MM-DD`
//! - `GET /api/storms` - Storm list
//! - `GET /health` - Health check
//! - `GET /stats` - Cache statistics
//! - `GET /docs` - OpenAPI documentation (Swagger UI)
//!
//! Measurement endpoints accept `?format=geojson`.

use std::net::SocketAddr;
use std::sync::Arc;

use snowgrid::SnowfallServiceBuilder;
use snowgrid_service::{router, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "snowgrid_service=info,snowgrid=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load port from environment (service-specific config)
    let port: u16 = std::env::var("SNOWGRID_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);

    // The library reads the SNOWGRID_* pipeline variables and wires up the
    // NOHRSC provider and NWS station client when the real provider is enabled
    let snowfall = SnowfallServiceBuilder::from_env()?.build()?;
    let config = snowfall.config();

    if config.use_real_provider && !snowfall.has_provider() {
        tracing::warn!("Real provider enabled but none available; responses will be empty");
    }

    tracing::info!(
        real_provider = config.use_real_provider,
        strategic_sampling = config.use_strategic_sampling,
        grid_resolution = config.grid_resolution,
        point_timeout_secs = config.point_timeout.as_secs(),
        cache_ttl_secs = config.cache_ttl.as_secs(),
        stations = snowfall.has_station_source(),
        port = port,
        "Starting snowgrid service"
    );

    let state = Arc::new(AppState::new(snowfall));
    let app = router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
