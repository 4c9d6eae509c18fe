//! Point snow-depth provider contract.
//!
//! The pipeline never talks to a data source directly; it is handed an
//! implementation of [`SnowDepthProvider`]. The NOHRSC MapServer client
//! (feature `nohrsc`) is the production implementation; tests inject stubs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::measurement::Measurement;

/// A source of snow depth at a single coordinate.
#[async_trait]
pub trait SnowDepthProvider: Send + Sync {
    /// Snow depth in meters at `(lon, lat)`.
    ///
    /// - `Ok(Some(depth))` - non-negative depth in meters
    /// - `Ok(None)` - the source has no data for this point
    /// - `Err(...)` - the query itself failed (network, bad response)
    async fn snow_depth_meters(&self, lon: f64, lat: f64) -> Result<Option<f64>>;

    /// Short name used in log output.
    fn name(&self) -> &str {
        "provider"
    }
}

/// Fixed Chicagoland measurements served when the real provider is disabled.
///
/// Keeps tests and local development off the network.
pub fn mock_measurements(timestamp: DateTime<Utc>) -> Vec<Measurement> {
    [
        (41.8781, -87.6298, 3.2, "GRID_CHICAGO_DOWNTOWN"),
        (41.9742, -87.9073, 4.5, "GRID_OHARE"),
        (41.7866, -87.7515, 3.8, "GRID_MIDWAY"),
        (42.0584, -87.6833, 5.2, "GRID_EVANSTON"),
        (41.5236, -88.0814, 2.9, "GRID_NAPERVILLE"),
    ]
    .into_iter()
    .map(|(lat, lon, amount, station)| Measurement::gridded(lat, lon, amount, station, timestamp))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::DataSource;
    use std::sync::Arc;

    struct Constant(f64);

    #[async_trait]
    impl SnowDepthProvider for Constant {
        async fn snow_depth_meters(&self, _lon: f64, _lat: f64) -> Result<Option<f64>> {
            Ok(Some(self.0))
        }
    }

    #[test]
    fn test_mock_measurements() {
        let now = Utc::now();
        let mock = mock_measurements(now);
        assert_eq!(mock.len(), 5);
        assert!(mock.iter().all(|m| m.source == DataSource::NoaaGridded));
        assert!(mock.iter().all(|m| m.timestamp == now));
        assert_eq!(mock[1].station, "GRID_OHARE");
        assert_eq!(mock[1].amount, 4.5);
    }

    #[tokio::test]
    async fn test_provider_behind_arc() {
        let provider: Arc<dyn SnowDepthProvider> = Arc::new(Constant(0.1));
        assert_eq!(provider.snow_depth_meters(-88.0, 41.0).await.unwrap(), Some(0.1));
        assert_eq!(provider.name(), "provider");
    }
}
