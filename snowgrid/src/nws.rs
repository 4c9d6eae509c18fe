//! National Weather Service station observations.
//!
//! Reads `GET /stations/{id}/observations/latest` from api.weather.gov and
//! turns the reported snow depth into a station reading. Only available with
//! the `nws` feature.
//!
//! # Response format
//!
//! ```text
//! {
//!   "geometry": { "coordinates": [-87.93, 41.98] },
//!   "properties": {
//!     "timestamp": "2024-01-12T15:51:00+00:00",
//!     "snowDepth": { "unitCode": "wmoUnit:m", "value": 0.1 }
//!   }
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::error::{Result, SnowError};
use crate::measurement::{meters_to_inches, Measurement};
use crate::stations::StationSource;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.weather.gov";

/// api.weather.gov rejects requests without a User-Agent.
pub const DEFAULT_USER_AGENT: &str = concat!("snowgrid/", env!("CARGO_PKG_VERSION"));

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for the NWS client.
#[derive(Debug, Clone)]
pub struct NwsConfig {
    /// API base URL.
    pub base_url: String,
    /// User-Agent header sent with every request.
    pub user_agent: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for NwsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl NwsConfig {
    /// Use a different API host, e.g. a local mock.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Set the User-Agent header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// A latest-observation document.
#[derive(Debug, Deserialize)]
pub struct Observation {
    #[serde(default)]
    geometry: Option<PointGeometry>,
    #[serde(default)]
    properties: ObservationProperties,
}

#[derive(Debug, Deserialize)]
struct PointGeometry {
    #[serde(default)]
    coordinates: Vec<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObservationProperties {
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    snow_depth: Option<QuantitativeValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuantitativeValue {
    #[serde(default)]
    value: Option<f64>,
    #[serde(default)]
    unit_code: Option<String>,
}

impl QuantitativeValue {
    fn meters(&self) -> Option<f64> {
        let value = self.value?;
        match self.unit_code.as_deref() {
            None | Some("wmoUnit:m") => Some(value),
            Some("wmoUnit:cm") => Some(value / 100.0),
            Some("wmoUnit:mm") => Some(value / 1000.0),
            Some(other) => {
                tracing::debug!(unit = other, "Unsupported snow depth unit");
                None
            }
        }
    }
}

/// Convert an observation into a reading for `station_id`.
///
/// Returns `None` when the observation has no snow depth or no usable
/// coordinates. The timestamp falls back to `now` when absent.
pub fn observation_to_measurement(
    station_id: &str,
    observation: &Observation,
    now: DateTime<Utc>,
) -> Option<Measurement> {
    let meters = observation.properties.snow_depth.as_ref()?.meters()?;

    let (lon, lat) = match observation.geometry.as_ref()?.coordinates.as_slice() {
        [lon, lat, ..] => (*lon, *lat),
        _ => return None,
    };

    Some(Measurement::station_reading(
        lat,
        lon,
        meters_to_inches(meters),
        station_id,
        observation.properties.timestamp.unwrap_or(now),
    ))
}

/// Station source backed by api.weather.gov.
pub struct NwsClient {
    client: Client,
    config: NwsConfig,
}

impl NwsClient {
    /// Create a new client with the given configuration.
    pub fn new(config: NwsConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// The configuration in use.
    pub fn config(&self) -> &NwsConfig {
        &self.config
    }

    fn latest_url(&self, station_id: &str) -> String {
        format!(
            "{}/stations/{}/observations/latest",
            self.config.base_url.trim_end_matches('/'),
            station_id
        )
    }
}

#[async_trait]
impl StationSource for NwsClient {
    async fn latest_reading(&self, station_id: &str) -> Result<Option<Measurement>> {
        let response = self
            .client
            .get(self.latest_url(station_id))
            .header("Accept", "application/geo+json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SnowError::Provider(format!(
                "NWS returned {} for station {}",
                status, station_id
            )));
        }

        let observation: Observation = response.json().await?;
        Ok(observation_to_measurement(station_id, &observation, Utc::now()))
    }

    fn name(&self) -> &str {
        "nws"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::DataSource;

    fn parse(body: &str) -> Observation {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_snow_depth_in_meters() {
        let obs = parse(
            r#"{
                "geometry": {"type": "Point", "coordinates": [-87.93, 41.98]},
                "properties": {
                    "station": "https://api.weather.gov/stations/KORD",
                    "timestamp": "2024-01-12T15:51:00+00:00",
                    "snowDepth": {"unitCode": "wmoUnit:m", "value": 0.254}
                }
            }"#,
        );

        let m = observation_to_measurement("KORD", &obs, Utc::now()).unwrap();
        assert_eq!(m.station, "KORD");
        assert_eq!(m.source, DataSource::NoaaNws);
        assert_eq!((m.lat, m.lon), (41.98, -87.93));
        assert!((m.amount - 10.0).abs() < 0.001);
        assert_eq!(m.timestamp.to_rfc3339(), "2024-01-12T15:51:00+00:00");
    }

    #[test]
    fn test_centimeter_unit() {
        let obs = parse(
            r#"{"geometry": {"coordinates": [-87.75, 41.78]},
                "properties": {"snowDepth": {"unitCode": "wmoUnit:cm", "value": 25.4}}}"#,
        );
        let now = Utc::now();
        let m = observation_to_measurement("KMDW", &obs, now).unwrap();
        assert!((m.amount - 10.0).abs() < 0.001);
        assert_eq!(m.timestamp, now);
    }

    #[test]
    fn test_missing_snow_depth() {
        let null_value = parse(
            r#"{"geometry": {"coordinates": [-87.93, 41.98]},
                "properties": {"snowDepth": {"unitCode": "wmoUnit:m", "value": null}}}"#,
        );
        assert!(observation_to_measurement("KORD", &null_value, Utc::now()).is_none());

        let absent = parse(r#"{"geometry": {"coordinates": [-87.93, 41.98]}, "properties": {}}"#);
        assert!(observation_to_measurement("KORD", &absent, Utc::now()).is_none());

        let no_geometry = parse(r#"{"properties": {"snowDepth": {"value": 0.1}}}"#);
        assert!(observation_to_measurement("KORD", &no_geometry, Utc::now()).is_none());

        let odd_unit = parse(
            r#"{"geometry": {"coordinates": [-87.93, 41.98]},
                "properties": {"snowDepth": {"unitCode": "wmoUnit:ft", "value": 1.0}}}"#,
        );
        assert!(observation_to_measurement("KORD", &odd_unit, Utc::now()).is_none());
    }

    #[test]
    fn test_latest_url() {
        let client = NwsClient::new(NwsConfig::with_base_url("http://localhost:9001/")).unwrap();
        assert_eq!(
            client.latest_url("KPWK"),
            "http://localhost:9001/stations/KPWK/observations/latest"
        );
        assert_eq!(client.name(), "nws");
    }

    #[test]
    fn test_config_builder() {
        let config = NwsConfig::default()
            .with_timeout(4)
            .with_user_agent("snowgrid-test");
        assert_eq!(config.timeout_secs, 4);
        assert_eq!(config.user_agent, "snowgrid-test");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }
}
