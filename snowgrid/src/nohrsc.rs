//! NOAA NOHRSC Snow Analysis provider.
//!
//! Queries the raster `identify` endpoint of the National Snow Analysis
//! MapServer for a single pixel. Only available with the `nohrsc` feature.
//!
//! # Response format
//!
//! ```text
//! { "results": [ { "attributes": { "Service Pixel Value": "0.254" } } ] }
//! ```
//!
//! The pixel value is snow depth in meters, or the string `NoData`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Result, SnowError};
use crate::provider::SnowDepthProvider;
use crate::region::{BoundingBox, ILLINOIS_BOUNDS};

/// Default MapServer base URL.
pub const DEFAULT_BASE_URL: &str =
    "https://mapservices.weather.noaa.gov/raster/rest/services/snow/NOHRSC_Snow_Analysis/MapServer";

/// Default timeout for a single identify request in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Raster layer holding the snow depth image.
const SNOW_DEPTH_LAYER: &str = "all:3";

/// Attribute carrying the raster value.
const PIXEL_VALUE_ATTRIBUTE: &str = "Service Pixel Value";

/// Configuration for the NOHRSC provider.
#[derive(Debug, Clone)]
pub struct NohrscConfig {
    /// MapServer base URL (without the trailing `/identify`).
    pub base_url: String,
    /// Map extent sent with every request.
    pub map_extent: BoundingBox,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for NohrscConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            map_extent: ILLINOIS_BOUNDS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl NohrscConfig {
    /// Use a different MapServer, e.g. a local mirror.
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

    /// Set the map extent.
    pub fn with_map_extent(mut self, extent: BoundingBox) -> Self {
        self.map_extent = extent;
        self
    }
}

#[derive(Debug, Deserialize)]
struct IdentifyResponse {
    #[serde(default)]
    results: Vec<IdentifyResult>,
}

#[derive(Debug, Deserialize)]
struct IdentifyResult {
    #[serde(default)]
    attributes: serde_json::Map<String, Value>,
}

/// Snow depth provider backed by the NOHRSC MapServer.
pub struct NohrscProvider {
    client: Client,
    config: NohrscConfig,
}

impl NohrscProvider {
    /// Create a new provider with the given configuration.
    pub fn new(config: NohrscConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// The configuration in use.
    pub fn config(&self) -> &NohrscConfig {
        &self.config
    }

    fn identify_url(&self) -> String {
        format!("{}/identify", self.config.base_url.trim_end_matches('/'))
    }

    fn query_params(&self, lon: f64, lat: f64) -> Vec<(&'static str, String)> {
        let extent = &self.config.map_extent;
        vec![
            ("geometry", format!("{},{}", lon, lat)),
            ("geometryType", "esriGeometryPoint".to_string()),
            ("tolerance", "1".to_string()),
            ("layers", SNOW_DEPTH_LAYER.to_string()),
            (
                "mapExtent",
                format!(
                    "{},{},{},{}",
                    extent.min_lon, extent.min_lat, extent.max_lon, extent.max_lat
                ),
            ),
            ("imageDisplay", "400,400,96".to_string()),
            ("returnGeometry", "false".to_string()),
            ("f", "json".to_string()),
        ]
    }
}

#[async_trait]
impl SnowDepthProvider for NohrscProvider {
    async fn snow_depth_meters(&self, lon: f64, lat: f64) -> Result<Option<f64>> {
        let response = self
            .client
            .get(self.identify_url())
            .query(&self.query_params(lon, lat))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SnowError::Provider(format!(
                "NOHRSC MapServer returned {} for ({}, {})",
                status, lon, lat
            )));
        }

        let body = response.text().await?;
        parse_identify_response(&body)
    }

    fn name(&self) -> &str {
        "nohrsc"
    }
}

/// Extract the snow depth in meters from an identify response body.
///
/// Missing results, `NoData`, unparseable and negative pixel values all mean
/// "no data". Only a body that is not JSON at all is an error.
pub fn parse_identify_response(body: &str) -> Result<Option<f64>> {
    let response: IdentifyResponse = serde_json::from_str(body)
        .map_err(|e| SnowError::Provider(format!("Invalid identify response: {}", e)))?;

    let value = response
        .results
        .first()
        .and_then(|r| r.attributes.get(PIXEL_VALUE_ATTRIBUTE));

    let meters = match value {
        Some(Value::String(s)) if s != "NoData" => s.trim().parse::<f64>().ok(),
        Some(Value::Number(n)) => n.as_f64(),
        _ => None,
    };

    Ok(meters.filter(|m| m.is_finite() && *m >= 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pixel_value() {
        let body = r#"{"results":[{"attributes":{"Service Pixel Value":"0.254"}}]}"#;
        assert_eq!(parse_identify_response(body).unwrap(), Some(0.254));
    }

    #[test]
    fn test_parse_numeric_pixel_value() {
        let body = r#"{"results":[{"attributes":{"Service Pixel Value":0.5}}]}"#;
        assert_eq!(parse_identify_response(body).unwrap(), Some(0.5));
    }

    #[test]
    fn test_parse_no_data() {
        let body = r#"{"results":[{"attributes":{"Service Pixel Value":"NoData"}}]}"#;
        assert_eq!(parse_identify_response(body).unwrap(), None);

        let body = r#"{"results":[]}"#;
        assert_eq!(parse_identify_response(body).unwrap(), None);

        let body = r#"{}"#;
        assert_eq!(parse_identify_response(body).unwrap(), None);

        let body = r#"{"results":[{"attributes":{"Service Pixel Value":"abc"}}]}"#;
        assert_eq!(parse_identify_response(body).unwrap(), None);

        let body = r#"{"results":[{"attributes":{"Service Pixel Value":"-1.0"}}]}"#;
        assert_eq!(parse_identify_response(body).unwrap(), None);
    }

    #[test]
    fn test_parse_invalid_body() {
        assert!(matches!(
            parse_identify_response("<html>502</html>"),
            Err(SnowError::Provider(_))
        ));
    }

    #[test]
    fn test_identify_url_and_params() {
        let provider =
            NohrscProvider::new(NohrscConfig::with_base_url("http://localhost:9000/MapServer/"))
                .unwrap();
        assert_eq!(
            provider.identify_url(),
            "http://localhost:9000/MapServer/identify"
        );

        let params = provider.query_params(-87.63, 41.88);
        assert!(params.contains(&("geometry", "-87.63,41.88".to_string())));
        assert!(params.contains(&("layers", "all:3".to_string())));
        assert!(params.contains(&("mapExtent", "-91.5,37,-87.5,42.5".to_string())));
    }

    #[test]
    fn test_config_builder() {
        let config = NohrscConfig::default().with_timeout(3);
        assert_eq!(config.timeout_secs, 3);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }
}
