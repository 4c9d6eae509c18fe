use anyhow::{bail, Context, Result};
use chrono::Utc;
use snowgrid::interpolation::expand_grid_at;
use snowgrid::{BoundingBox, IdwParams};
use std::path::PathBuf;

use super::samples::{load_samples, write_measurements};

pub fn run(
    input: PathBuf,
    output: Option<PathBuf>,
    bounds: BoundingBox,
    resolution: f64,
    params: IdwParams,
) -> Result<()> {
    if !params.power.is_finite() || params.power <= 0.0 {
        bail!("--power must be a positive number");
    }

    let samples = load_samples(&input)?;
    if samples.is_empty() {
        println!("No samples in: {}", input.display());
        return Ok(());
    }

    let grid = expand_grid_at(&samples, resolution, &bounds, params, Utc::now())
        .context("Failed to expand grid")?;
    let (rows, cols) = bounds.lattice_dims(resolution)?;

    // Default output: <input>_grid.<ext>
    let output_path = match output {
        Some(path) => path,
        None => {
            let stem = input
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "samples".to_string());
            let extension = input
                .extension()
                .map(|e| e.to_string_lossy().into_owned())
                .unwrap_or_else(|| "csv".to_string());
            input.with_file_name(format!("{}_grid.{}", stem, extension))
        }
    };

    write_measurements(&output_path, &grid)?;

    println!(
        "{} of {} cells above the noise threshold ({} samples, {}° resolution)",
        grid.len(),
        rows * cols,
        samples.len(),
        resolution
    );
    println!("Output written to: {}", output_path.display());
    Ok(())
}
