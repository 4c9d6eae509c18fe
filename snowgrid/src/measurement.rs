//! Snowfall measurement types.
//!
//! A [`Measurement`] is a single geolocated value in inches, either read
//! directly from a source or synthesized by the grid expander. Measurements
//! are never mutated after construction; events and caches share them behind
//! [`std::sync::Arc`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Inches per meter, used to normalize provider depths.
pub const INCHES_PER_METER: f64 = 39.3701;

/// Convert a depth in meters to inches.
pub fn meters_to_inches(meters: f64) -> f64 {
    meters * INCHES_PER_METER
}

/// Provenance of a measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataSource {
    /// Direct reading from a weather station.
    NoaaNws,
    /// Gridded analysis or interpolated estimate.
    NoaaGridded,
    /// Crowd-sourced observer report.
    Cocorahs,
}

impl DataSource {
    /// Whether values from this source are estimates rather than readings.
    pub fn is_estimate(&self) -> bool {
        matches!(self, DataSource::NoaaGridded)
    }
}

/// A single geolocated snow depth observation or estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Measurement {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lon: f64,
    /// Depth in inches (non-negative).
    pub amount: f64,
    /// Where the value came from.
    pub source: DataSource,
    /// Human-readable station or grid-cell identifier.
    pub station: String,
    /// When the value was observed or generated.
    pub timestamp: DateTime<Utc>,
}

impl Measurement {
    /// Create a gridded/estimate measurement.
    pub fn gridded(
        lat: f64,
        lon: f64,
        amount: f64,
        station: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            lat,
            lon,
            amount,
            source: DataSource::NoaaGridded,
            station: station.into(),
            timestamp,
        }
    }

    /// Create a direct weather-station reading.
    pub fn station_reading(
        lat: f64,
        lon: f64,
        amount: f64,
        station: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            lat,
            lon,
            amount,
            source: DataSource::NoaaNws,
            station: station.into(),
            timestamp,
        }
    }
}

/// Station identifier for a synthesized grid cell.
///
/// Derived from coordinates rounded to two decimals so the same cell always
/// yields the same identifier.
pub fn interpolated_station_id(lat: f64, lon: f64) -> String {
    format!("INTERPOLATED_{:.2}_{:.2}", lat, lon)
}

/// A named collection of measurements for one storm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct SnowfallEvent {
    /// Identifier of the form `storm-YYYY-MM-DD`.
    pub storm_id: String,
    /// Storm date (request time for the current storm).
    pub date: DateTime<Utc>,
    /// Raw samples followed by interpolated grid points; order is not significant.
    pub measurements: Vec<Measurement>,
}

impl SnowfallEvent {
    /// Build an event from its parts.
    pub fn new(
        storm_id: impl Into<String>,
        date: DateTime<Utc>,
        measurements: Vec<Measurement>,
    ) -> Self {
        Self {
            storm_id: storm_id.into(),
            date,
            measurements,
        }
    }

    /// Largest amount in the event, or `None` when it has no measurements.
    pub fn max_amount(&self) -> Option<f64> {
        self.measurements
            .iter()
            .map(|m| m.amount)
            .fold(None, |acc, v| Some(acc.map_or(v, |a: f64| a.max(v))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meters_to_inches() {
        assert!((meters_to_inches(0.254) - 10.0).abs() < 0.001);
        assert_eq!(meters_to_inches(0.0), 0.0);
    }

    #[test]
    fn test_interpolated_station_id_rounds() {
        assert_eq!(
            interpolated_station_id(41.87812, -87.62981),
            "INTERPOLATED_41.88_-87.63"
        );
        assert_eq!(interpolated_station_id(37.0, -91.5), "INTERPOLATED_37.00_-91.50");
    }

    #[test]
    fn test_data_source_serialization() {
        let json = serde_json::to_string(&DataSource::NoaaGridded).unwrap();
        assert_eq!(json, "\"NOAA_GRIDDED\"");
        let json = serde_json::to_string(&DataSource::NoaaNws).unwrap();
        assert_eq!(json, "\"NOAA_NWS\"");
        let source: DataSource = serde_json::from_str("\"COCORAHS\"").unwrap();
        assert_eq!(source, DataSource::Cocorahs);
        assert!(!source.is_estimate());
    }

    #[test]
    fn test_station_reading_is_not_an_estimate() {
        let m = Measurement::station_reading(41.98, -87.93, 4.0, "KORD", Utc::now());
        assert_eq!(m.source, DataSource::NoaaNws);
        assert!(!m.source.is_estimate());
        assert!(Measurement::gridded(41.0, -88.0, 1.0, "G", m.timestamp)
            .source
            .is_estimate());
    }

    #[test]
    fn test_event_serializes_camel_case() {
        let now = Utc::now();
        let event = SnowfallEvent::new(
            "storm-2025-01-15",
            now,
            vec![Measurement::gridded(41.88, -87.63, 3.2, "GRID_X", now)],
        );
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"stormId\":\"storm-2025-01-15\""));
        assert!(json.contains("\"source\":\"NOAA_GRIDDED\""));
    }

    #[test]
    fn test_max_amount() {
        let now = Utc::now();
        let empty = SnowfallEvent::new("storm-2025-01-15", now, Vec::new());
        assert_eq!(empty.max_amount(), None);

        let event = SnowfallEvent::new(
            "storm-2025-01-15",
            now,
            vec![
                Measurement::gridded(41.0, -88.0, 2.5, "A", now),
                Measurement::gridded(41.5, -88.5, 7.25, "B", now),
            ],
        );
        assert_eq!(event.max_amount(), Some(7.25));
    }
}
