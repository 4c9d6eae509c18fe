//! Storm identifiers and summaries.
//!
//! A storm is identified by its calendar date: `storm-YYYY-MM-DD`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SnowError};
use crate::measurement::Measurement;

const STORM_ID_PREFIX: &str = "storm-";

/// Identifier for the storm on `date`.
pub fn storm_id_for(date: NaiveDate) -> String {
    format!("{}{}", STORM_ID_PREFIX, date.format("%Y-%m-%d"))
}

/// Parse a `storm-YYYY-MM-DD` identifier into its date.
pub fn parse_storm_id(id: &str) -> Result<NaiveDate> {
    let invalid = || SnowError::InvalidStormId { id: id.to_string() };

    let date_part = id.strip_prefix(STORM_ID_PREFIX).ok_or_else(invalid)?;

    // Strict shape: 4-2-2 digits, so "storm-2025-1-5" is rejected
    let shape_ok = date_part.len() == 10
        && date_part.char_indices().all(|(i, c)| match i {
            4 | 7 => c == '-',
            _ => c.is_ascii_digit(),
        });
    if !shape_ok {
        return Err(invalid());
    }

    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|_| invalid())
}

/// Parse `id` and reject dates after `today`.
pub fn resolve_storm_date(id: &str, today: NaiveDate) -> Result<NaiveDate> {
    let date = parse_storm_id(id)?;
    if date > today {
        return Err(SnowError::FutureStorm { id: id.to_string() });
    }
    Ok(date)
}

/// Summary of a storm for the selector list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct StormMetadata {
    pub id: String,
    pub date: DateTime<Utc>,
    /// Number of measurements (stations and grid points).
    pub total_stations: usize,
    /// Largest amount in inches, rounded to one decimal; 0 when empty.
    pub max_snowfall: f64,
}

impl StormMetadata {
    /// Summarize a set of measurements.
    pub fn summarize(
        id: impl Into<String>,
        date: DateTime<Utc>,
        measurements: &[Measurement],
    ) -> Self {
        let max = measurements
            .iter()
            .map(|m| m.amount)
            .fold(0.0_f64, f64::max);

        Self {
            id: id.into(),
            date,
            total_stations: measurements.len(),
            max_snowfall: (max * 10.0).round() / 10.0,
        }
    }
}
