//! GeoJSON export and import of measurements.
//!
//! Enable the `geojson` feature to use this module.
//!
//! Each measurement becomes a `Point` feature with `[lon, lat]` coordinates
//! and its remaining fields as properties:
//!
//! ```text
//! {
//!   "type": "Feature",
//!   "geometry": { "type": "Point", "coordinates": [-87.63, 41.88] },
//!   "properties": { "amount": 3.2, "source": "NOAA_GRIDDED",
//!                   "station": "GRID_CHICAGO_DOWNTOWN", "timestamp": "..." }
//! }
//! ```

use chrono::{DateTime, Utc};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value as GeoJsonValue};

use crate::error::{Result, SnowError};
use crate::measurement::{DataSource, Measurement};

/// Convert one measurement into a point feature.
pub fn measurement_to_feature(measurement: &Measurement) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("amount".to_string(), JsonValue::from(measurement.amount));
    properties.insert(
        "source".to_string(),
        serde_json::to_value(measurement.source).unwrap_or(JsonValue::Null),
    );
    properties.insert(
        "station".to_string(),
        JsonValue::from(measurement.station.clone()),
    );
    properties.insert(
        "timestamp".to_string(),
        JsonValue::from(measurement.timestamp.to_rfc3339()),
    );

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(GeoJsonValue::Point(vec![
            measurement.lon,
            measurement.lat,
        ]))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Convert measurements into a feature collection, preserving order.
pub fn measurements_to_feature_collection(measurements: &[Measurement]) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: measurements.iter().map(measurement_to_feature).collect(),
        foreign_members: None,
    }
}

/// Read a measurement back from a point feature.
///
/// Only `amount` is required. A missing `station` defaults to the feature's
/// coordinates, a missing `source` to gridded and a missing `timestamp` to
/// `default_timestamp`.
///
/// # Errors
///
/// Returns an error if the geometry is not a point or `amount` is missing,
/// negative or not a number.
pub fn feature_to_measurement(
    feature: &Feature,
    default_timestamp: DateTime<Utc>,
) -> Result<Measurement> {
    let invalid = |message: &str| SnowError::InvalidFeature {
        message: message.to_string(),
    };

    let coord = match feature.geometry.as_ref().map(|g| &g.value) {
        Some(GeoJsonValue::Point(coord)) if coord.len() >= 2 => coord,
        Some(GeoJsonValue::Point(_)) => {
            return Err(invalid("Point must have at least 2 coordinates (lon, lat)"))
        }
        _ => return Err(invalid("Feature geometry must be a Point")),
    };
    let (lon, lat) = (coord[0], coord[1]);

    let amount = feature
        .property("amount")
        .and_then(JsonValue::as_f64)
        .ok_or_else(|| invalid("Feature is missing a numeric 'amount' property"))?;
    if !amount.is_finite() || amount < 0.0 {
        return Err(invalid("Feature 'amount' must be a non-negative number"));
    }

    let source = match feature.property("source") {
        Some(value) => serde_json::from_value::<DataSource>(value.clone())
            .map_err(|_| invalid("Feature 'source' is not a known data source"))?,
        None => DataSource::NoaaGridded,
    };

    let station = feature
        .property("station")
        .and_then(JsonValue::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("POINT_{:.2}_{:.2}", lat, lon));

    let timestamp = feature
        .property("timestamp")
        .and_then(JsonValue::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or(default_timestamp);

    Ok(Measurement {
        lat,
        lon,
        amount,
        source,
        station,
        timestamp,
    })
}

/// Read every feature of a collection as a measurement.
pub fn feature_collection_to_measurements(
    collection: &FeatureCollection,
    default_timestamp: DateTime<Utc>,
) -> Result<Vec<Measurement>> {
    collection
        .features
        .iter()
        .map(|feature| feature_to_measurement(feature, default_timestamp))
        .collect()
}
