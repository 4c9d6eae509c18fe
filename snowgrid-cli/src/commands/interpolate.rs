use anyhow::{bail, Result};
use serde::Serialize;
use snowgrid::{interpolate_idw, IdwParams};
use std::path::PathBuf;

use super::samples::load_samples;

#[derive(Serialize)]
struct EstimateResponse {
    lat: f64,
    lon: f64,
    amount: f64,
    samples: usize,
    power: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    search_radius: Option<f64>,
}

pub fn run(samples: PathBuf, lat: f64, lon: f64, params: IdwParams, json: bool) -> Result<()> {
    if !params.power.is_finite() || params.power <= 0.0 {
        bail!("--power must be a positive number");
    }

    let samples = load_samples(&samples)?;
    let amount = interpolate_idw(lon, lat, &samples, params);

    if json {
        let response = EstimateResponse {
            lat,
            lon,
            amount,
            samples: samples.len(),
            power: params.power,
            search_radius: params.search_radius,
        };
        println!("{}", serde_json::to_string(&response)?);
    } else {
        println!("{:.2}", amount);
    }

    Ok(())
}
