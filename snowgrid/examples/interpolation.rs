//! Example expanding a few hand-made samples into a grid.
//!
//! Run with: cargo run --example interpolation -- [resolution]

use chrono::Utc;
use snowgrid::interpolation::{expand_grid, interpolate_idw, IdwParams};
use snowgrid::{Measurement, SnowError, ILLINOIS_BOUNDS};
use std::env;

fn main() -> Result<(), SnowError> {
    let resolution: f64 = env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(0.5);

    let now = Utc::now();
    let samples = vec![
        Measurement::gridded(41.88, -87.63, 6.5, "Chicago", now),
        Measurement::gridded(42.27, -89.09, 9.0, "Rockford", now),
        Measurement::gridded(40.69, -89.59, 3.0, "Peoria", now),
        Measurement::gridded(39.78, -89.65, 1.0, "Springfield", now),
    ];

    // Compare IDW exponents at a point between the samples
    let (lat, lon) = (41.0, -88.8);
    println!("IDW estimate at ({}, {}):", lat, lon);
    println!("{:-<50}", "");
    for power in [1.0, 2.0, 3.0] {
        let estimate = interpolate_idw(lon, lat, &samples, IdwParams::default().with_power(power));
        println!("power {:.0}: {:.2}\"", power, estimate);
    }

    let grid = expand_grid(&samples, resolution, &ILLINOIS_BOUNDS)?;
    let (rows, cols) = ILLINOIS_BOUNDS.lattice_dims(resolution)?;

    println!();
    println!(
        "Grid at {}°: {} of {} cells above the noise threshold",
        resolution,
        grid.len(),
        rows * cols
    );
    if let Some(max) = grid.iter().max_by(|a, b| a.amount.total_cmp(&b.amount)) {
        println!("Deepest cell: {} with {:.2}\"", max.station, max.amount);
    }

    Ok(())
}
