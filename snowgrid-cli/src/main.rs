use anyhow::Result;
use clap::{Parser, Subcommand};
use snowgrid::IdwParams;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

/// Snow depth sampling and interpolation CLI tool
#[derive(Parser)]
#[command(name = "snowgrid")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Region as min_lat,min_lon,max_lat,max_lon (default: Illinois)
    #[arg(short, long, env = "SNOWGRID_BOUNDS", global = true)]
    bounds: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the sampling and interpolation pipeline once
    Fetch {
        /// Sample a uniform grid instead of the strategic points
        #[arg(short, long)]
        grid: bool,

        /// Use fixture measurements instead of querying NOHRSC
        #[arg(short, long)]
        mock: bool,

        /// Per-point query timeout in seconds
        #[arg(short, long, env = "SNOWGRID_POINT_TIMEOUT_SECS", default_value = "10")]
        timeout: u64,

        /// Expansion grid resolution in degrees
        #[arg(short, long, env = "SNOWGRID_GRID_RESOLUTION", default_value = "0.5")]
        resolution: f64,

        /// NOHRSC MapServer base URL
        #[arg(long, env = "SNOWGRID_NOHRSC_URL")]
        nohrsc_url: Option<String>,

        /// Weather stations to merge in (default: KORD,KMDW,KPWK)
        #[arg(long, env = "SNOWGRID_NWS_STATIONS", value_delimiter = ',')]
        stations: Vec<String>,

        /// Skip weather-station readings
        #[arg(long, conflicts_with = "stations")]
        no_stations: bool,

        /// NWS API base URL
        #[arg(long, env = "SNOWGRID_NWS_URL")]
        nws_url: Option<String>,

        /// Write measurements to a file (.csv or .geojson)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output the event as JSON
        #[arg(short, long, conflicts_with = "geojson")]
        json: bool,

        /// Output measurements as a GeoJSON FeatureCollection
        #[arg(long)]
        geojson: bool,
    },

    /// Show the sample points that would be queried
    Plan {
        /// Show the uniform grid instead of the strategic points
        #[arg(short, long)]
        grid: bool,

        /// Uniform grid spacing in degrees
        #[arg(short, long, default_value = "0.5")]
        spacing: f64,

        /// Output points as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Estimate snow depth at one coordinate from a samples file
    Interpolate {
        /// Samples file (CSV with lat,lon,amount or GeoJSON points)
        samples: PathBuf,

        /// Latitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// IDW distance exponent
        #[arg(short, long, default_value = "2.0")]
        power: f64,

        /// Ignore samples farther than this many degrees
        #[arg(long)]
        radius: Option<f64>,

        /// Output result as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Expand a samples file into a regular grid
    Grid {
        /// Samples file (CSV with lat,lon,amount or GeoJSON points)
        input: PathBuf,

        /// Output file (same format as input if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Grid resolution in degrees
        #[arg(short, long, default_value = "0.5")]
        resolution: f64,

        /// IDW distance exponent
        #[arg(short, long, default_value = "2.0")]
        power: f64,

        /// Ignore samples farther than this many degrees
        #[arg(long)]
        radius: Option<f64>,
    },
}

fn idw_params(power: f64, radius: Option<f64>) -> IdwParams {
    let params = IdwParams::default().with_power(power);
    match radius {
        Some(r) => params.with_search_radius(r),
        None => params,
    }
}

fn main() -> Result<()> {
    // Log to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("snowgrid=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let bounds = commands::parse_bounds(cli.bounds.as_deref())?;

    match cli.command {
        Commands::Fetch {
            grid,
            mock,
            timeout,
            resolution,
            nohrsc_url,
            stations,
            no_stations,
            nws_url,
            output,
            json,
            geojson,
        } => commands::fetch::run(commands::fetch::FetchOptions {
            bounds,
            grid,
            mock,
            timeout_secs: timeout,
            resolution,
            nohrsc_url,
            stations,
            no_stations,
            nws_url,
            output,
            json,
            geojson,
        }),
        Commands::Plan {
            grid,
            spacing,
            json,
        } => commands::plan::run(bounds, grid, spacing, json),
        Commands::Interpolate {
            samples,
            lat,
            lon,
            power,
            radius,
            json,
        } => commands::interpolate::run(samples, lat, lon, idw_params(power, radius), json),
        Commands::Grid {
            input,
            output,
            resolution,
            power,
            radius,
        } => commands::grid::run(input, output, bounds, resolution, idw_params(power, radius)),
    }
}
