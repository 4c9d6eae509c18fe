pub mod fetch;
pub mod grid;
pub mod interpolate;
pub mod plan;
pub mod samples;

use anyhow::{bail, Context, Result};
use snowgrid::{BoundingBox, ILLINOIS_BOUNDS};

/// Parse `min_lat,min_lon,max_lat,max_lon`, defaulting to Illinois.
pub fn parse_bounds(value: Option<&str>) -> Result<BoundingBox> {
    let Some(value) = value else {
        return Ok(ILLINOIS_BOUNDS);
    };

    let parts = value
        .split(',')
        .map(|s| {
            s.trim()
                .parse::<f64>()
                .with_context(|| format!("Invalid number in bounds: '{}'", s))
        })
        .collect::<Result<Vec<_>>>()?;

    if parts.len() != 4 {
        bail!("Bounds must be min_lat,min_lon,max_lat,max_lon, got: {}", value);
    }

    let bounds = BoundingBox::new(parts[0], parts[1], parts[2], parts[3]);
    bounds.validate()?;
    Ok(bounds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bounds() {
        assert_eq!(parse_bounds(None).unwrap(), ILLINOIS_BOUNDS);

        let bounds = parse_bounds(Some("40.0, -90.0, 41.0, -88.5")).unwrap();
        assert_eq!(bounds, BoundingBox::new(40.0, -90.0, 41.0, -88.5));

        assert!(parse_bounds(Some("40,-90,41")).is_err());
        assert!(parse_bounds(Some("40,-90,abc,-88")).is_err());
        assert!(parse_bounds(Some("41,-90,40,-88")).is_err());
    }
}
