//! Inverse Distance Weighting and grid expansion.
//!
//! Distances are Euclidean in degree space. This ignores projection
//! distortion, which is acceptable over a region the size of a state.
//!
//! # Example
//!
//! ```ignore
//! use snowgrid::interpolation::{expand_grid, interpolate_idw, IdwParams};
//! use snowgrid::ILLINOIS_BOUNDS;
//!
//! let estimate = interpolate_idw(-88.0, 41.5, &samples, IdwParams::default());
//! let grid = expand_grid(&samples, 0.5, &ILLINOIS_BOUNDS)?;
//! ```

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::measurement::{interpolated_station_id, Measurement};
use crate::region::BoundingBox;

/// Samples closer than this (in degrees) are treated as an exact match.
pub const EXACT_MATCH_EPSILON: f64 = 0.001;

/// Grid cells at or below this amount (inches) are discarded as trace noise.
pub const NOISE_THRESHOLD: f64 = 0.1;

/// Default expansion lattice spacing in degrees (~35 miles).
pub const DEFAULT_GRID_RESOLUTION: f64 = 0.5;

/// Tuning parameters for [`interpolate_idw`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdwParams {
    /// Distance exponent. 2 gives the standard quadratic falloff.
    pub power: f64,
    /// Samples farther than this are excluded entirely.
    pub search_radius: Option<f64>,
}

impl Default for IdwParams {
    fn default() -> Self {
        Self {
            power: 2.0,
            search_radius: None,
        }
    }
}

impl IdwParams {
    pub fn with_power(mut self, power: f64) -> Self {
        self.power = power;
        self
    }

    pub fn with_search_radius(mut self, radius: f64) -> Self {
        self.search_radius = Some(radius);
        self
    }
}

/// Estimate the amount at `(lon, lat)` from known samples.
///
/// Returns 0.0 when there are no samples or none fall inside the search
/// radius. A sample within [`EXACT_MATCH_EPSILON`] of the query point is
/// returned as-is.
pub fn interpolate_idw(lon: f64, lat: f64, samples: &[Measurement], params: IdwParams) -> f64 {
    let mut weight_sum = 0.0;
    let mut value_sum = 0.0;

    for m in samples {
        let dx = lon - m.lon;
        let dy = lat - m.lat;
        let distance = (dx * dx + dy * dy).sqrt();

        if distance < EXACT_MATCH_EPSILON {
            return m.amount;
        }

        if let Some(radius) = params.search_radius {
            if distance > radius {
                continue;
            }
        }

        let weight = 1.0 / distance.powf(params.power);
        weight_sum += weight;
        value_sum += weight * m.amount;
    }

    if weight_sum > 0.0 {
        value_sum / weight_sum
    } else {
        0.0
    }
}

/// Expand sparse samples into a regular lattice of estimates.
///
/// Walks `bounds` inclusive in steps of `resolution`, interpolates every cell
/// against the full sample set and keeps cells above [`NOISE_THRESHOLD`].
///
/// # Errors
///
/// Malformed bounds or a non-positive resolution.
pub fn expand_grid(
    samples: &[Measurement],
    resolution: f64,
    bounds: &BoundingBox,
) -> Result<Vec<Measurement>> {
    expand_grid_at(samples, resolution, bounds, IdwParams::default(), Utc::now())
}

/// [`expand_grid`] with explicit IDW parameters and generation time.
pub fn expand_grid_at(
    samples: &[Measurement],
    resolution: f64,
    bounds: &BoundingBox,
    params: IdwParams,
    generated_at: DateTime<Utc>,
) -> Result<Vec<Measurement>> {
    let cells = bounds.lattice(resolution)?;

    let expanded = cells
        .into_iter()
        .filter_map(|(lat, lon)| {
            let amount = interpolate_idw(lon, lat, samples, params);
            (amount > NOISE_THRESHOLD).then(|| {
                Measurement::gridded(
                    lat,
                    lon,
                    amount,
                    interpolated_station_id(lat, lon),
                    generated_at,
                )
            })
        })
        .collect();

    Ok(expanded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SnowError;
    use crate::measurement::DataSource;
    use crate::region::ILLINOIS_BOUNDS;

    fn sample(lat: f64, lon: f64, amount: f64) -> Measurement {
        Measurement::gridded(lat, lon, amount, "TEST", Utc::now())
    }

    #[test]
    fn test_empty_samples_returns_zero() {
        assert_eq!(interpolate_idw(-88.0, 41.0, &[], IdwParams::default()), 0.0);
    }

    #[test]
    fn test_exact_match() {
        let samples = vec![
            sample(41.0, -88.0, 3.0),
            sample(41.88, -87.63, 7.5),
            sample(40.0, -89.0, 12.0),
        ];
        let v = interpolate_idw(-87.63, 41.88, &samples, IdwParams::default());
        assert!((v - 7.5).abs() < 1e-9);

        // Within epsilon still counts as a match
        let v = interpolate_idw(-87.6305, 41.8805, &samples, IdwParams::default());
        assert!((v - 7.5).abs() < 1e-9);
    }

    #[test]
    fn test_single_sample_invariance() {
        let samples = vec![sample(41.0, -88.0, 4.2)];
        for (lon, lat) in [(-91.0, 37.5), (-87.6, 42.4), (-88.5, 41.0)] {
            let v = interpolate_idw(lon, lat, &samples, IdwParams::default());
            assert!((v - 4.2).abs() < 1e-9);
        }
    }

    #[test]
    fn test_midpoint_is_average() {
        let samples = vec![sample(0.0, 0.0, 10.0), sample(0.0, 2.0, 2.0)];
        let v = interpolate_idw(1.0, 0.0, &samples, IdwParams::default());
        assert!((v - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_monotonic_distance_decay() {
        let samples = vec![sample(0.0, 0.0, 10.0), sample(0.0, 1.0, 2.0)];

        let mut previous = f64::INFINITY;
        for step in 1..100 {
            let lon = step as f64 / 100.0;
            let v = interpolate_idw(lon, 0.0, &samples, IdwParams::default());
            assert!(v < previous, "not decreasing at lon={}", lon);
            assert!((2.0..=10.0).contains(&v));
            previous = v;
        }
    }

    #[test]
    fn test_search_radius_excludes_samples() {
        let samples = vec![sample(0.0, 0.0, 10.0), sample(0.0, 5.0, 2.0)];
        let params = IdwParams::default().with_search_radius(1.0);

        // Only the near sample is inside the radius
        let v = interpolate_idw(0.5, 0.0, &samples, params);
        assert!((v - 10.0).abs() < 1e-9);

        // Nothing inside the radius
        let v = interpolate_idw(2.5, 0.0, &samples, params);
        assert_eq!(v, 0.0);
    }

    #[test]
    fn test_higher_power_favors_nearest() {
        let samples = vec![sample(0.0, 0.0, 10.0), sample(0.0, 1.0, 0.0)];
        let p2 = interpolate_idw(0.25, 0.0, &samples, IdwParams::default());
        let p4 = interpolate_idw(0.25, 0.0, &samples, IdwParams::default().with_power(4.0));
        assert!(p4 > p2);
    }

    #[test]
    fn test_expand_filters_trace_amounts() {
        let samples = vec![sample(41.0, -88.0, 0.05)];
        let grid = expand_grid(&samples, 0.5, &ILLINOIS_BOUNDS).unwrap();
        assert!(grid.is_empty());
    }

    #[test]
    fn test_expand_never_returns_noise() {
        let samples = vec![
            sample(41.88, -87.63, 6.0),
            sample(37.07, -88.63, 0.0),
            sample(39.78, -89.65, 0.2),
        ];
        let grid = expand_grid(&samples, 0.25, &ILLINOIS_BOUNDS).unwrap();
        assert!(!grid.is_empty());
        assert!(grid.iter().all(|m| m.amount > NOISE_THRESHOLD));
    }

    #[test]
    fn test_expand_cardinality_and_determinism() {
        let samples = vec![sample(41.0, -88.0, 5.0), sample(39.0, -90.0, 8.0)];
        let bounds = ILLINOIS_BOUNDS;
        let resolution = 0.5;
        let at = Utc::now();

        let first = expand_grid_at(&samples, resolution, &bounds, IdwParams::default(), at).unwrap();
        let second =
            expand_grid_at(&samples, resolution, &bounds, IdwParams::default(), at).unwrap();

        let rows = ((bounds.max_lat - bounds.min_lat) / resolution + 1.0).floor() as usize;
        let cols = ((bounds.max_lon - bounds.min_lon) / resolution + 1.0).floor() as usize;
        assert!(first.len() <= rows * cols);
        // Every cell is well above the threshold here
        assert_eq!(first.len(), rows * cols);
        assert_eq!(first, second);
    }

    #[test]
    fn test_expand_cell_identity() {
        let samples = vec![sample(41.0, -88.0, 5.0)];
        let grid = expand_grid(&samples, 0.5, &ILLINOIS_BOUNDS).unwrap();

        let first = &grid[0];
        assert_eq!(first.lat, 37.0);
        assert_eq!(first.lon, -91.5);
        assert_eq!(first.station, "INTERPOLATED_37.00_-91.50");
        assert_eq!(first.source, DataSource::NoaaGridded);

        let cell = grid
            .iter()
            .find(|m| m.station == "INTERPOLATED_41.00_-88.00")
            .unwrap();
        assert!((cell.amount - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_expand_rejects_malformed_input() {
        let samples = vec![sample(41.0, -88.0, 5.0)];
        let inverted = BoundingBox::new(42.5, -91.5, 37.0, -87.5);
        assert!(matches!(
            expand_grid(&samples, 0.5, &inverted),
            Err(SnowError::InvalidBounds { .. })
        ));
        assert!(matches!(
            expand_grid(&samples, 0.0, &ILLINOIS_BOUNDS),
            Err(SnowError::InvalidResolution { .. })
        ));
    }

    #[test]
    fn test_expand_empty_samples() {
        let grid = expand_grid(&[], 0.5, &ILLINOIS_BOUNDS).unwrap();
        assert!(grid.is_empty());
    }
}
