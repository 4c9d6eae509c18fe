//! Sampling plans for point acquisition.
//!
//! Querying the provider at every grid cell is expensive, so the default plan
//! is a short list of strategically placed points: dense where people live
//! (Chicago metro), sparse elsewhere, plus a few border points so the
//! interpolator is not forced to extrapolate outside the sampled hull.
//!
//! A uniform grid over the same bounds is kept as a fallback for comparison
//! and rollback.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::region::BoundingBox;

/// Spacing of the uniform fallback grid, in degrees (~35 miles).
pub const DEFAULT_GRID_SPACING: f64 = 0.5;

/// Relative importance of a sample point.
///
/// Used for ordering and documentation only; it never weights interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        };
        f.write_str(s)
    }
}

/// A named coordinate in a sampling plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplePoint {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub priority: Priority,
}

impl SamplePoint {
    pub fn new(name: impl Into<String>, lat: f64, lon: f64, priority: Priority) -> Self {
        Self {
            name: name.into(),
            lat,
            lon,
            priority,
        }
    }
}

use Priority::{High, Low, Medium};

const STRATEGIC_TABLE: [(&str, f64, f64, Priority); 20] = [
    // Chicago metro: 6 of 20 samples, roughly 65% of the population
    ("Chicago_Downtown", 41.88, -87.63, High),
    ("Chicago_OHare", 41.97, -87.91, High),
    ("Chicago_Midway", 41.79, -87.75, High),
    ("Evanston", 42.06, -87.68, High),
    ("Naperville", 41.76, -88.14, High),
    ("Joliet", 41.61, -87.86, Medium),
    // Northern Illinois
    ("Rockford", 42.27, -89.09, Medium),
    ("Moline_QuadCities", 41.51, -90.58, Medium),
    ("McHenry", 42.25, -88.32, Low),
    ("Ottawa", 41.44, -88.81, Low),
    // Central Illinois
    ("Peoria", 40.69, -89.59, Medium),
    ("Champaign_Urbana", 40.11, -88.24, Medium),
    ("Springfield", 39.78, -89.65, Medium),
    ("Bloomington_Normal", 40.48, -88.99, Medium),
    // Southern Illinois
    ("Belleville_StLouis", 38.63, -90.20, Medium),
    ("Carbondale", 37.73, -89.22, Low),
    ("Mount_Vernon", 38.52, -88.85, Low),
    // Border coverage for edge interpolation
    ("Border_NW_Galena", 42.48, -90.43, Low),
    ("Border_S_Cairo", 37.07, -88.63, Low),
    ("Border_E_TerreHaute", 39.48, -87.53, Low),
];

/// The strategic 20-point plan over Illinois, in table order.
pub fn strategic_points() -> Vec<SamplePoint> {
    STRATEGIC_TABLE
        .iter()
        .map(|&(name, lat, lon, priority)| SamplePoint::new(name, lat, lon, priority))
        .collect()
}

/// A uniform grid plan over `bounds` with the given spacing.
///
/// Points are named `GRID_{lat}_{lon}` with two decimals and tagged low
/// priority.
pub fn uniform_grid(bounds: &BoundingBox, spacing: f64) -> Result<Vec<SamplePoint>> {
    let points = bounds
        .lattice(spacing)?
        .into_iter()
        .map(|(lat, lon)| {
            SamplePoint::new(format!("GRID_{:.2}_{:.2}", lat, lon), lat, lon, Low)
        })
        .collect();
    Ok(points)
}

/// Which set of points to query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SamplingPlan {
    /// The fixed strategic list.
    Strategic,
    /// A uniform grid over the region bounds.
    UniformGrid { spacing: f64 },
}

impl SamplingPlan {
    /// Pick a plan from the `use_strategic_sampling` toggle.
    pub fn from_toggle(use_strategic_sampling: bool) -> Self {
        if use_strategic_sampling {
            SamplingPlan::Strategic
        } else {
            SamplingPlan::UniformGrid {
                spacing: DEFAULT_GRID_SPACING,
            }
        }
    }

    /// Materialize the plan's points.
    pub fn points(&self, bounds: &BoundingBox) -> Result<Vec<SamplePoint>> {
        match self {
            SamplingPlan::Strategic => Ok(strategic_points()),
            SamplingPlan::UniformGrid { spacing } => uniform_grid(bounds, *spacing),
        }
    }
}
