//! Snowfall aggregation service.
//!
//! [`SnowfallService`] ties the pipeline together: pick a sampling plan,
//! query the provider at every point in parallel, and expand whatever came
//! back into a regular grid of IDW estimates. Weather-station readings, when
//! a station source is configured, are fetched alongside and prepended to
//! the result.
//!
//! ```ignore
//! use snowgrid::SnowfallServiceBuilder;
//!
//! let service = SnowfallServiceBuilder::from_env()?.build()?;
//! let measurements = service.current_measurements().await;
//! ```
//!
//! The service never fails for "no snow": an empty acquisition, a missing
//! provider or a misconfigured plan all yield an empty list and a log line.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveTime, Utc};

use crate::acquisition::{acquire, AcquisitionReport};
use crate::error::{Result, SnowError};
use crate::interpolation::{expand_grid, DEFAULT_GRID_RESOLUTION};
use crate::measurement::{Measurement, SnowfallEvent};
use crate::provider::{mock_measurements, SnowDepthProvider};
use crate::region::{BoundingBox, ILLINOIS_BOUNDS};
use crate::sampling::SamplingPlan;
use crate::stations::{fetch_station_readings, parse_station_list, StationSource, DEFAULT_STATIONS};
use crate::storm::{resolve_storm_date, storm_id_for, StormMetadata};

#[cfg(feature = "nohrsc")]
use crate::nohrsc::{NohrscConfig, NohrscProvider};

#[cfg(feature = "nws")]
use crate::nws::{NwsClient, NwsConfig};

/// Default per-point query timeout in seconds.
pub const DEFAULT_POINT_TIMEOUT_SECS: u64 = 10;

/// Default serving-layer cache TTL in seconds (two hours).
pub const DEFAULT_CACHE_TTL_SECS: u64 = 2 * 60 * 60;

/// Pipeline configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SnowfallConfig {
    /// Strategic plan (true) or uniform-grid fallback (false).
    pub use_strategic_sampling: bool,
    /// Query the provider (true) or serve the fixed fixture set (false).
    pub use_real_provider: bool,
    /// Upper bound on a single point query.
    pub point_timeout: Duration,
    /// Spacing of the expansion lattice in degrees.
    pub grid_resolution: f64,
    /// Region covered by the plan and the expansion lattice.
    pub bounds: BoundingBox,
    /// TTL the serving layer applies to cached results.
    pub cache_ttl: Duration,
    /// Weather stations whose latest readings are merged in; empty disables.
    pub stations: Vec<String>,
}

impl Default for SnowfallConfig {
    fn default() -> Self {
        Self {
            use_strategic_sampling: true,
            use_real_provider: false,
            point_timeout: Duration::from_secs(DEFAULT_POINT_TIMEOUT_SECS),
            grid_resolution: DEFAULT_GRID_RESOLUTION,
            bounds: ILLINOIS_BOUNDS,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            stations: DEFAULT_STATIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl SnowfallConfig {
    /// Read configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `SNOWGRID_USE_STRATEGIC_SAMPLING` | Strategic plan vs uniform grid | true |
    /// | `SNOWGRID_USE_REAL_PROVIDER` | Query the provider vs fixture data | false |
    /// | `SNOWGRID_POINT_TIMEOUT_SECS` | Per-point query timeout | 10 |
    /// | `SNOWGRID_GRID_RESOLUTION` | Expansion lattice spacing (degrees) | 0.5 |
    /// | `SNOWGRID_CACHE_TTL_SECS` | Serving-layer cache TTL | 7200 |
    /// | `SNOWGRID_NWS_STATIONS` | Comma-separated station ids, empty disables | KORD,KMDW,KPWK |
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`Self::from_env`] with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let use_strategic_sampling = match lookup("SNOWGRID_USE_STRATEGIC_SAMPLING") {
            Some(v) => parse_bool("SNOWGRID_USE_STRATEGIC_SAMPLING", &v)?,
            None => defaults.use_strategic_sampling,
        };
        let use_real_provider = match lookup("SNOWGRID_USE_REAL_PROVIDER") {
            Some(v) => parse_bool("SNOWGRID_USE_REAL_PROVIDER", &v)?,
            None => defaults.use_real_provider,
        };
        let point_timeout = match lookup("SNOWGRID_POINT_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(parse_number("SNOWGRID_POINT_TIMEOUT_SECS", &v)?),
            None => defaults.point_timeout,
        };
        let grid_resolution = match lookup("SNOWGRID_GRID_RESOLUTION") {
            Some(v) => parse_number("SNOWGRID_GRID_RESOLUTION", &v)?,
            None => defaults.grid_resolution,
        };
        let cache_ttl = match lookup("SNOWGRID_CACHE_TTL_SECS") {
            Some(v) => Duration::from_secs(parse_number("SNOWGRID_CACHE_TTL_SECS", &v)?),
            None => defaults.cache_ttl,
        };
        let stations = match lookup("SNOWGRID_NWS_STATIONS") {
            Some(v) => parse_station_list(&v),
            None => defaults.stations.clone(),
        };

        Ok(Self {
            use_strategic_sampling,
            use_real_provider,
            point_timeout,
            grid_resolution,
            cache_ttl,
            stations,
            ..defaults
        })
    }

    /// Check bounds and resolution before any query is issued.
    pub fn validate(&self) -> Result<()> {
        self.bounds.lattice_dims(self.grid_resolution)?;
        if self.point_timeout.is_zero() {
            return Err(SnowError::Config(
                "point timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(SnowError::Config(format!(
            "{} must be true or false, got '{}'",
            name, other
        ))),
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| SnowError::Config(format!("{} is not a valid number: '{}'", name, value)))
}

/// High-level snowfall pipeline.
///
/// Cheap to share behind an [`Arc`]; all methods take `&self`.
pub struct SnowfallService {
    config: SnowfallConfig,
    provider: Option<Arc<dyn SnowDepthProvider>>,
    stations: Option<Arc<dyn StationSource>>,
}

impl SnowfallService {
    /// Create a builder for configuration options.
    pub fn builder() -> SnowfallServiceBuilder {
        SnowfallServiceBuilder::new()
    }

    /// The active configuration.
    pub fn config(&self) -> &SnowfallConfig {
        &self.config
    }

    /// Whether a point provider is configured.
    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Whether station readings will be merged in.
    pub fn has_station_source(&self) -> bool {
        self.stations.is_some() && !self.config.stations.is_empty()
    }

    /// Current measurements: station readings, then raw samples, then
    /// interpolated grid points.
    ///
    /// Returns the fixture set when the real provider is disabled, and an
    /// empty list when neither stations nor sample points report snow.
    pub async fn current_measurements(&self) -> Vec<Measurement> {
        if !self.config.use_real_provider {
            tracing::info!("Using fixture measurements (real provider disabled)");
            return mock_measurements(Utc::now());
        }

        let (mut merged, gridded) =
            futures::join!(self.station_measurements(), self.gridded_measurements());
        merged.extend(gridded);
        merged
    }

    async fn station_measurements(&self) -> Vec<Measurement> {
        match &self.stations {
            Some(source) if !self.config.stations.is_empty() => {
                fetch_station_readings(
                    source.as_ref(),
                    &self.config.stations,
                    self.config.point_timeout,
                )
                .await
            }
            _ => Vec::new(),
        }
    }

    /// Raw samples followed by the interpolated lattice.
    async fn gridded_measurements(&self) -> Vec<Measurement> {
        let provider = match &self.provider {
            Some(p) => p,
            None => {
                tracing::error!("Real provider enabled but no provider is configured");
                return Vec::new();
            }
        };

        let plan = SamplingPlan::from_toggle(self.config.use_strategic_sampling);
        let points = match plan.points(&self.config.bounds) {
            Ok(points) => points,
            Err(e) => {
                tracing::error!(error = %e, "Could not build sampling plan");
                return Vec::new();
            }
        };

        let AcquisitionReport { measurements, .. } =
            acquire(&points, provider.as_ref(), self.config.point_timeout).await;

        if measurements.is_empty() {
            tracing::info!("No snow detected at any sample point");
            return Vec::new();
        }

        self.with_grid(measurements)
    }

    /// Append interpolated grid points to the raw samples.
    fn with_grid(&self, mut raw: Vec<Measurement>) -> Vec<Measurement> {
        match expand_grid(&raw, self.config.grid_resolution, &self.config.bounds) {
            Ok(grid) => {
                tracing::info!(
                    samples = raw.len(),
                    grid_points = grid.len(),
                    resolution = self.config.grid_resolution,
                    "Expanded samples into grid"
                );
                raw.extend(grid);
                raw
            }
            Err(e) => {
                tracing::error!(error = %e, "Grid expansion failed, returning raw samples");
                raw
            }
        }
    }

    /// Event for the current storm, dated now and named after today.
    pub async fn current_event(&self) -> SnowfallEvent {
        let now = Utc::now();
        let measurements = self.current_measurements().await;
        SnowfallEvent::new(storm_id_for(now.date_naive()), now, measurements)
    }

    /// Event for a named storm.
    ///
    /// Historical data is not stored, so the measurements are the current
    /// ones; the event carries the storm's own id and date.
    ///
    /// # Errors
    ///
    /// Malformed identifiers and dates after today.
    pub async fn storm_event(&self, storm_id: &str) -> Result<SnowfallEvent> {
        let date = resolve_storm_date(storm_id, Utc::now().date_naive())?;
        let measurements = self.current_measurements().await;
        Ok(SnowfallEvent::new(
            storm_id,
            date.and_time(NaiveTime::MIN).and_utc(),
            measurements,
        ))
    }

    /// Storm list for the selector: only the current storm.
    pub async fn storms(&self) -> Vec<StormMetadata> {
        let event = self.current_event().await;
        vec![StormMetadata::summarize(
            event.storm_id,
            event.date,
            &event.measurements,
        )]
    }
}

/// Builder for creating [`SnowfallService`] with custom configuration.
///
/// # Example
///
/// ```ignore
/// use snowgrid::SnowfallServiceBuilder;
///
/// let service = SnowfallServiceBuilder::new()
///     .use_real_provider(true)
///     .provider(Arc::new(my_provider))
///     .point_timeout(Duration::from_secs(5))
///     .build()?;
/// ```
pub struct SnowfallServiceBuilder {
    config: SnowfallConfig,
    provider: Option<Arc<dyn SnowDepthProvider>>,
    stations: Option<Arc<dyn StationSource>>,
    #[cfg(feature = "nohrsc")]
    nohrsc_config: Option<NohrscConfig>,
    #[cfg(feature = "nws")]
    nws_config: Option<NwsConfig>,
}

impl Default for SnowfallServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SnowfallServiceBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: SnowfallConfig::default(),
            provider: None,
            stations: None,
            #[cfg(feature = "nohrsc")]
            nohrsc_config: None,
            #[cfg(feature = "nws")]
            nws_config: None,
        }
    }

    /// Create a builder configured from environment variables.
    ///
    /// See [`SnowfallConfig::from_env`]. With the `nohrsc` feature and
    /// `SNOWGRID_USE_REAL_PROVIDER=true`, the NOHRSC provider is configured as
    /// well, honoring `SNOWGRID_NOHRSC_URL` when set. Likewise the `nws`
    /// feature configures the station client (`SNOWGRID_NWS_URL`) unless the
    /// station list is empty.
    pub fn from_env() -> Result<Self> {
        let config = SnowfallConfig::from_env()?;

        #[cfg(feature = "nohrsc")]
        let nohrsc_config = if config.use_real_provider {
            let base = match std::env::var("SNOWGRID_NOHRSC_URL") {
                Ok(url) => NohrscConfig::with_base_url(url),
                Err(_) => NohrscConfig::default(),
            };
            Some(
                base.with_timeout(config.point_timeout.as_secs().max(1))
                    .with_map_extent(config.bounds),
            )
        } else {
            None
        };

        #[cfg(feature = "nws")]
        let nws_config = if config.use_real_provider && !config.stations.is_empty() {
            let base = match std::env::var("SNOWGRID_NWS_URL") {
                Ok(url) => NwsConfig::with_base_url(url),
                Err(_) => NwsConfig::default(),
            };
            Some(base.with_timeout(config.point_timeout.as_secs().max(1)))
        } else {
            None
        };

        Ok(Self {
            config,
            provider: None,
            stations: None,
            #[cfg(feature = "nohrsc")]
            nohrsc_config,
            #[cfg(feature = "nws")]
            nws_config,
        })
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: SnowfallConfig) -> Self {
        self.config = config;
        self
    }

    /// Choose the strategic plan (true) or the uniform grid (false).
    pub fn use_strategic_sampling(mut self, enabled: bool) -> Self {
        self.config.use_strategic_sampling = enabled;
        self
    }

    /// Query the provider (true) or serve fixture data (false).
    pub fn use_real_provider(mut self, enabled: bool) -> Self {
        self.config.use_real_provider = enabled;
        self
    }

    /// Set the per-point query timeout.
    pub fn point_timeout(mut self, timeout: Duration) -> Self {
        self.config.point_timeout = timeout;
        self
    }

    /// Set the expansion lattice spacing in degrees.
    pub fn grid_resolution(mut self, resolution: f64) -> Self {
        self.config.grid_resolution = resolution;
        self
    }

    /// Set the region bounds.
    pub fn bounds(mut self, bounds: BoundingBox) -> Self {
        self.config.bounds = bounds;
        self
    }

    /// Inject a point provider.
    pub fn provider(mut self, provider: Arc<dyn SnowDepthProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the weather stations to merge in; an empty list disables them.
    pub fn stations(mut self, stations: Vec<String>) -> Self {
        self.config.stations = stations;
        self
    }

    /// Inject a weather-station source.
    pub fn station_source(mut self, source: Arc<dyn StationSource>) -> Self {
        self.stations = Some(source);
        self
    }

    /// Use api.weather.gov as the station source.
    #[cfg(feature = "nws")]
    pub fn nws(mut self, config: NwsConfig) -> Self {
        self.nws_config = Some(config);
        self
    }

    /// Use the NOHRSC MapServer as provider.
    #[cfg(feature = "nohrsc")]
    pub fn nohrsc(mut self, config: NohrscConfig) -> Self {
        self.nohrsc_config = Some(config);
        self
    }

    /// Build the [`SnowfallService`].
    ///
    /// # Errors
    ///
    /// Returns an error if the bounds, resolution or timeout are invalid, or
    /// an HTTP client cannot be created.
    pub fn build(self) -> Result<SnowfallService> {
        self.config.validate()?;

        #[cfg(feature = "nohrsc")]
        let provider = match (self.provider, self.nohrsc_config) {
            (Some(p), _) => Some(p),
            (None, Some(config)) => {
                Some(Arc::new(NohrscProvider::new(config)?) as Arc<dyn SnowDepthProvider>)
            }
            (None, None) => None,
        };

        #[cfg(not(feature = "nohrsc"))]
        let provider = self.provider;

        #[cfg(feature = "nws")]
        let stations = match (self.stations, self.nws_config) {
            (Some(s), _) => Some(s),
            (None, Some(config)) => {
                Some(Arc::new(NwsClient::new(config)?) as Arc<dyn StationSource>)
            }
            (None, None) => None,
        };

        #[cfg(not(feature = "nws"))]
        let stations = self.stations;

        Ok(SnowfallService {
            config: self.config,
            provider,
            stations,
        })
    }
}
