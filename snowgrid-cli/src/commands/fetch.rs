use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use snowgrid::geojson::measurements_to_feature_collection;
use snowgrid::stations::parse_station_list;
use snowgrid::{BoundingBox, NohrscConfig, NwsConfig, SnowfallServiceBuilder, DEFAULT_STATIONS};
use std::path::PathBuf;
use std::time::Duration;

use super::samples::write_measurements;

/// Options for a single pipeline run.
pub struct FetchOptions {
    pub bounds: BoundingBox,
    pub grid: bool,
    pub mock: bool,
    pub timeout_secs: u64,
    pub resolution: f64,
    pub nohrsc_url: Option<String>,
    pub stations: Vec<String>,
    pub no_stations: bool,
    pub nws_url: Option<String>,
    pub output: Option<PathBuf>,
    pub json: bool,
    pub geojson: bool,
}

pub fn run(options: FetchOptions) -> Result<()> {
    let mut builder = SnowfallServiceBuilder::new()
        .use_real_provider(!options.mock)
        .use_strategic_sampling(!options.grid)
        .point_timeout(Duration::from_secs(options.timeout_secs))
        .grid_resolution(options.resolution)
        .bounds(options.bounds);

    if !options.mock {
        let nohrsc = match options.nohrsc_url {
            Some(url) => NohrscConfig::with_base_url(url),
            None => NohrscConfig::default(),
        };
        builder = builder.nohrsc(
            nohrsc
                .with_timeout(options.timeout_secs)
                .with_map_extent(options.bounds),
        );

        let stations = station_list(&options.stations, options.no_stations);
        if !stations.is_empty() {
            let nws = match options.nws_url {
                Some(url) => NwsConfig::with_base_url(url),
                None => NwsConfig::default(),
            };
            builder = builder.nws(nws.with_timeout(options.timeout_secs));
        }
        builder = builder.stations(stations);
    }

    let service = builder.build().context("Failed to create snowfall service")?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(if options.mock {
        "Loading fixture measurements".to_string()
    } else {
        format!(
            "Querying NOHRSC ({} plan)",
            if options.grid { "uniform grid" } else { "strategic" }
        )
    });

    let event = runtime.block_on(service.current_event());
    pb.finish_and_clear();

    if let Some(path) = options.output {
        write_measurements(&path, &event.measurements)?;
        println!(
            "{} measurements written to: {}",
            event.measurements.len(),
            path.display()
        );
        return Ok(());
    }

    if options.json {
        println!("{}", serde_json::to_string_pretty(&event)?);
        return Ok(());
    }

    if options.geojson {
        let collection = measurements_to_feature_collection(&event.measurements);
        println!("{}", serde_json::to_string_pretty(&collection)?);
        return Ok(());
    }

    if event.measurements.is_empty() {
        println!("No snow detected ({})", event.storm_id);
        return Ok(());
    }

    let (grid, raw): (Vec<_>, Vec<_>) = event
        .measurements
        .iter()
        .partition(|m| m.station.starts_with("INTERPOLATED_"));

    println!("{}", event.storm_id);
    println!("{:-<64}", "");
    for m in &raw {
        let kind = if m.source.is_estimate() { "est" } else { "obs" };
        println!(
            "{:<32} {:>8.4} {:>9.4} {:>7.2}\" {}",
            m.station, m.lat, m.lon, m.amount, kind
        );
    }
    println!("{:-<64}", "");
    let observed = raw.iter().filter(|m| !m.source.is_estimate()).count();
    println!("Stations:    {}", observed);
    println!("Samples:     {}", raw.len() - observed);
    println!("Grid points: {}", grid.len());
    if let Some(max) = event.max_amount() {
        println!("Max depth:   {:.1}\"", max);
    }

    Ok(())
}

/// Stations to query: none with `--no-stations`, the defaults when no list was given.
fn station_list(requested: &[String], disabled: bool) -> Vec<String> {
    if disabled {
        return Vec::new();
    }
    let joined = requested.join(",");
    if joined.trim().is_empty() {
        DEFAULT_STATIONS.iter().map(|s| s.to_string()).collect()
    } else {
        parse_station_list(&joined)
    }
}
