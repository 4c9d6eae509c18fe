//! Weather-station readings merged alongside the gridded samples.
//!
//! A [`StationSource`] reports the latest snow depth observed at a named
//! station. Station readings are direct observations: they are concatenated
//! with the gridded output and never fed into the interpolator.

use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;

use crate::error::Result;
use crate::measurement::Measurement;

/// Chicago-area airport stations queried by default.
pub const DEFAULT_STATIONS: &[&str] = &[
    "KORD", // O'Hare
    "KMDW", // Midway
    "KPWK", // Chicago Executive
];

/// A source of the latest observation at a weather station.
#[async_trait]
pub trait StationSource: Send + Sync {
    /// Latest reading at `station_id`, already in inches.
    ///
    /// - `Ok(Some(m))` - the station reported a snow depth
    /// - `Ok(None)` - the latest observation carries no snow depth
    /// - `Err(...)` - the request failed or the response was unusable
    async fn latest_reading(&self, station_id: &str) -> Result<Option<Measurement>>;

    /// Short name used in log output.
    fn name(&self) -> &str {
        "stations"
    }
}

/// Query every station concurrently and keep the readings that show snow.
///
/// A failing or slow station is logged and skipped. The result follows the
/// order of `station_ids`.
pub async fn fetch_station_readings(
    source: &dyn StationSource,
    station_ids: &[String],
    timeout: Duration,
) -> Vec<Measurement> {
    let outcomes = join_all(station_ids.iter().map(|id| async move {
        match tokio::time::timeout(timeout, source.latest_reading(id)).await {
            Ok(Ok(reading)) => reading,
            Ok(Err(e)) => {
                tracing::warn!(station = %id, error = %e, "Station query failed");
                None
            }
            Err(_) => {
                tracing::warn!(
                    station = %id,
                    timeout_ms = timeout.as_millis() as u64,
                    "Station query timed out"
                );
                None
            }
        }
    }))
    .await;

    let readings: Vec<Measurement> = outcomes
        .into_iter()
        .flatten()
        .filter(|m| m.amount.is_finite() && m.amount > 0.0)
        .collect();

    tracing::info!(
        source = source.name(),
        queried = station_ids.len(),
        with_snow = readings.len(),
        "Station readings collected"
    );

    readings
}

/// Parse a comma-separated station list, dropping blanks.
pub fn parse_station_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}
