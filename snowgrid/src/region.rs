//! Geographic bounds and regular lattices.
//!
//! Lattice coordinates are always computed from integer step indices
//! (`min + i * resolution`) so the same bounds and spacing produce the same
//! cells on every run.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SnowError};

/// Largest lattice [`BoundingBox::lattice_dims`] accepts, in cells.
///
/// Illinois at 0.01° is about 220k cells; anything past this is a typo in
/// the resolution rather than a map anyone wants.
pub const MAX_LATTICE_CELLS: usize = 1_000_000;

/// A geographic bounding box in decimal degrees (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Minimum latitude (southern boundary).
    pub min_lat: f64,
    /// Minimum longitude (western boundary).
    pub min_lon: f64,
    /// Maximum latitude (northern boundary).
    pub max_lat: f64,
    /// Maximum longitude (eastern boundary).
    pub max_lon: f64,
}

/// Bounds of the reference deployment (the state of Illinois).
pub const ILLINOIS_BOUNDS: BoundingBox = BoundingBox {
    min_lat: 37.0,
    min_lon: -91.5,
    max_lat: 42.5,
    max_lon: -87.5,
};

impl BoundingBox {
    /// Create a new bounding box.
    ///
    /// # Arguments
    ///
    /// * `min_lat` - Southern boundary latitude
    /// * `min_lon` - Western boundary longitude
    /// * `max_lat` - Northern boundary latitude
    /// * `max_lon` - Eastern boundary longitude
    pub fn new(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            min_lon,
            max_lat,
            max_lon,
        }
    }

    /// Check that every edge is finite and `min <= max` on both axes.
    pub fn validate(&self) -> Result<()> {
        let finite = [self.min_lat, self.min_lon, self.max_lat, self.max_lon]
            .iter()
            .all(|v| v.is_finite());

        if !finite || self.min_lat > self.max_lat || self.min_lon > self.max_lon {
            return Err(SnowError::InvalidBounds {
                min_lat: self.min_lat,
                max_lat: self.max_lat,
                min_lon: self.min_lon,
                max_lon: self.max_lon,
            });
        }
        Ok(())
    }

    /// Whether the point lies inside the box (edges inclusive).
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lon..=self.max_lon).contains(&lon)
    }

    /// Number of lattice rows and columns for the given spacing.
    ///
    /// Each axis holds `floor((max - min) / resolution + 1)` cells. A spacing
    /// so fine that the lattice would exceed [`MAX_LATTICE_CELLS`] is rejected
    /// as an invalid resolution.
    pub fn lattice_dims(&self, resolution: f64) -> Result<(usize, usize)> {
        self.validate()?;
        if !resolution.is_finite() || resolution <= 0.0 {
            return Err(SnowError::InvalidResolution { resolution });
        }

        let rows = ((self.max_lat - self.min_lat) / resolution + 1.0).floor();
        let cols = ((self.max_lon - self.min_lon) / resolution + 1.0).floor();
        // Compare in f64 first: the `as usize` casts saturate on huge values
        if rows * cols > MAX_LATTICE_CELLS as f64 {
            return Err(SnowError::InvalidResolution { resolution });
        }

        let (rows, cols) = (rows as usize, cols as usize);
        match rows.checked_mul(cols) {
            Some(cells) if cells <= MAX_LATTICE_CELLS => Ok((rows, cols)),
            _ => Err(SnowError::InvalidResolution { resolution }),
        }
    }

    /// All lattice cells as `(lat, lon)` pairs, row-major from the south-west corner.
    pub fn lattice(&self, resolution: f64) -> Result<Vec<(f64, f64)>> {
        let (rows, cols) = self.lattice_dims(resolution)?;

        let mut cells = Vec::with_capacity(rows * cols);
        for i in 0..rows {
            let lat = self.min_lat + i as f64 * resolution;
            for j in 0..cols {
                let lon = self.min_lon + j as f64 * resolution;
                cells.push((lat, lon));
            }
        }
        Ok(cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        assert!(ILLINOIS_BOUNDS.validate().is_ok());

        let inverted = BoundingBox::new(42.5, -91.5, 37.0, -87.5);
        assert!(matches!(
            inverted.validate(),
            Err(SnowError::InvalidBounds { .. })
        ));

        let nan = BoundingBox::new(f64::NAN, -91.5, 37.0, -87.5);
        assert!(nan.validate().is_err());

        // A single point is a valid (degenerate) box
        let point = BoundingBox::new(41.0, -88.0, 41.0, -88.0);
        assert!(point.validate().is_ok());
    }

    #[test]
    fn test_contains() {
        assert!(ILLINOIS_BOUNDS.contains(41.88, -87.63));
        assert!(ILLINOIS_BOUNDS.contains(37.0, -91.5)); // corner
        assert!(!ILLINOIS_BOUNDS.contains(43.0, -88.0));
        assert!(!ILLINOIS_BOUNDS.contains(40.0, -87.0));
    }

    #[test]
    fn test_lattice_dims_illinois() {
        // 37.0..=42.5 by 0.5 → 12 rows; -91.5..=-87.5 by 0.5 → 9 cols
        assert_eq!(ILLINOIS_BOUNDS.lattice_dims(0.5).unwrap(), (12, 9));
    }

    #[test]
    fn test_lattice_dims_rejects_bad_resolution() {
        assert!(matches!(
            ILLINOIS_BOUNDS.lattice_dims(0.0),
            Err(SnowError::InvalidResolution { .. })
        ));
        assert!(ILLINOIS_BOUNDS.lattice_dims(-0.5).is_err());
        assert!(ILLINOIS_BOUNDS.lattice_dims(f64::INFINITY).is_err());
    }

    #[test]
    fn test_lattice_dims_rejects_oversized_lattice() {
        assert!(matches!(
            ILLINOIS_BOUNDS.lattice_dims(1e-9),
            Err(SnowError::InvalidResolution { .. })
        ));
        assert!(ILLINOIS_BOUNDS.lattice(1e-9).is_err());
        assert!(ILLINOIS_BOUNDS.lattice_dims(f64::MIN_POSITIVE).is_err());

        // Fine but sane spacings still work
        let (rows, cols) = ILLINOIS_BOUNDS.lattice_dims(0.01).unwrap();
        assert!(rows * cols <= MAX_LATTICE_CELLS);
    }

    #[test]
    fn test_lattice_is_index_based() {
        let bbox = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        let cells = bbox.lattice(0.25).unwrap();
        assert_eq!(cells.len(), 25);
        assert_eq!(cells[0], (0.0, 0.0));
        assert_eq!(cells[4], (0.0, 1.0));
        assert_eq!(cells[24], (1.0, 1.0));

        // Same input, same lattice
        assert_eq!(cells, bbox.lattice(0.25).unwrap());
    }

    #[test]
    fn test_lattice_single_cell() {
        let point = BoundingBox::new(41.0, -88.0, 41.0, -88.0);
        assert_eq!(point.lattice(0.5).unwrap(), vec![(41.0, -88.0)]);
    }
}
