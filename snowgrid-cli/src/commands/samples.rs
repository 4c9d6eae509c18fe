//! Reading and writing measurement files.
//!
//! CSV files use `lat,lon,amount[,station]` columns; `.geojson`/`.json`
//! files hold a `FeatureCollection` of points with an `amount` property.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use geojson::FeatureCollection;
use serde::{Deserialize, Serialize};
use snowgrid::geojson::{feature_collection_to_measurements, measurements_to_feature_collection};
use snowgrid::Measurement;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

#[derive(Debug, Deserialize)]
struct SampleRow {
    lat: f64,
    lon: f64,
    amount: f64,
    #[serde(default)]
    station: Option<String>,
}

#[derive(Debug, Serialize)]
struct MeasurementRow<'a> {
    station: &'a str,
    lat: f64,
    lon: f64,
    amount: f64,
    source: snowgrid::DataSource,
    timestamp: String,
}

/// File formats understood by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    GeoJson,
}

impl FileFormat {
    /// Detect the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "csv" => Ok(FileFormat::Csv),
            "geojson" | "json" => Ok(FileFormat::GeoJson),
            _ => bail!(
                "Unsupported file format: {}. Use .csv or .geojson",
                extension
            ),
        }
    }
}

/// Load samples from a CSV or GeoJSON file.
pub fn load_samples(path: &Path) -> Result<Vec<Measurement>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open samples file: {}", path.display()))?;
    let reader = BufReader::new(file);
    let now = Utc::now();

    match FileFormat::from_path(path)? {
        FileFormat::Csv => {
            let mut reader = csv::Reader::from_reader(reader);
            let mut samples = Vec::new();
            for (i, row) in reader.deserialize::<SampleRow>().enumerate() {
                // Header is line 1
                let row = row.with_context(|| format!("Invalid sample on line {}", i + 2))?;
                if !row.amount.is_finite() || row.amount < 0.0 {
                    bail!("Negative or invalid amount on line {}", i + 2);
                }
                let station = row
                    .station
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| format!("SAMPLE_{}", i + 1));
                samples.push(Measurement::gridded(row.lat, row.lon, row.amount, station, now));
            }
            Ok(samples)
        }
        FileFormat::GeoJson => {
            let collection: FeatureCollection =
                serde_json::from_reader(reader).context("Failed to parse GeoJSON")?;
            Ok(feature_collection_to_measurements(&collection, now)?)
        }
    }
}

/// Write measurements as CSV or GeoJSON, chosen by the output extension.
pub fn write_measurements(path: &Path, measurements: &[Measurement]) -> Result<()> {
    let format = FileFormat::from_path(path)?;
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    match format {
        FileFormat::Csv => {
            let mut csv_writer = csv::Writer::from_writer(writer);
            for m in measurements {
                csv_writer.serialize(MeasurementRow {
                    station: &m.station,
                    lat: m.lat,
                    lon: m.lon,
                    amount: m.amount,
                    source: m.source,
                    timestamp: m.timestamp.to_rfc3339(),
                })?;
            }
            csv_writer.flush()?;
        }
        FileFormat::GeoJson => {
            let collection = measurements_to_feature_collection(measurements);
            serde_json::to_writer_pretty(&mut writer, &collection)?;
            writer.flush()?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_csv_samples() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("samples.csv");
        fs::write(
            &path,
            "lat,lon,amount,station\n41.88,-87.63,6.5,Chicago\n40.69,-89.59,3.0,\n",
        )
        .unwrap();

        let samples = load_samples(&path).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].station, "Chicago");
        assert_eq!(samples[0].amount, 6.5);
        assert_eq!(samples[1].station, "SAMPLE_2");
    }

    #[test]
    fn test_load_csv_without_station_column() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("samples.csv");
        fs::write(&path, "lat,lon,amount\n41.0,-88.0,1.0\n").unwrap();

        let samples = load_samples(&path).unwrap();
        assert_eq!(samples[0].station, "SAMPLE_1");
    }

    #[test]
    fn test_load_csv_rejects_bad_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "lat,lon,amount\n41.0,-88.0,lots\n").unwrap();
        assert!(load_samples(&path).is_err());

        fs::write(&path, "lat,lon,amount\n41.0,-88.0,-1.0\n").unwrap();
        assert!(load_samples(&path).is_err());
    }

    #[test]
    fn test_unsupported_extension() {
        assert!(FileFormat::from_path(Path::new("samples.txt")).is_err());
        assert_eq!(
            FileFormat::from_path(Path::new("grid.GeoJSON")).unwrap(),
            FileFormat::GeoJson
        );
    }

    #[test]
    fn test_write_then_load_geojson() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("grid.geojson");
        let measurements = snowgrid::mock_measurements(Utc::now());

        write_measurements(&path, &measurements).unwrap();
        let loaded = load_samples(&path).unwrap();

        assert_eq!(loaded.len(), 5);
        assert_eq!(loaded[0].station, "GRID_CHICAGO_DOWNTOWN");
    }

    #[test]
    fn test_write_csv() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("grid.csv");
        let measurements = snowgrid::mock_measurements(Utc::now());

        write_measurements(&path, &measurements).unwrap();
        let content = fs::read_to_string(&path).unwrap();

        assert!(content.starts_with("station,lat,lon,amount,source,timestamp"));
        assert!(content.contains("GRID_OHARE,41.9742,-87.9073,4.5,NOAA_GRIDDED"));
        assert_eq!(content.lines().count(), 6);
    }
}
