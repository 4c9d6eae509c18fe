//! # snowgrid - Snow Depth Sampling and Interpolation
//!
//! Builds regional snow depth maps from a handful of point queries against a
//! gridded snow analysis service.
//!
//! ## Features
//!
//! - **Strategic sampling**: 20 points instead of a ~100 point grid, dense
//!   where people live and anchored at the borders
//! - **Parallel acquisition**: every point is queried concurrently with a
//!   per-point timeout; one bad point never sinks the batch
//! - **IDW interpolation**: sparse samples expanded into a regular lattice
//! - **TTL cache**: in-memory result cache with lazy expiry
//! - **Station readings**: latest airport observations merged alongside the
//!   gridded estimates
//!
//! ## Quick Start
//!
//! ```ignore
//! use snowgrid::{SnowfallServiceBuilder, ILLINOIS_BOUNDS};
//!
//! let service = SnowfallServiceBuilder::new()
//!     .use_real_provider(true)
//!     .nohrsc(NohrscConfig::default())
//!     .build()?;
//!
//! for m in service.current_measurements().await {
//!     println!("{} ({}, {}): {:.1}\"", m.station, m.lat, m.lon, m.amount);
//! }
//! ```
//!
//! ## Cargo features
//!
//! - `nohrsc`: NOAA NOHRSC MapServer provider (pulls in `reqwest`)
//! - `nws`: National Weather Service station client (pulls in `reqwest`)
//! - `geojson`: GeoJSON export and import of measurements
//! - `openapi`: `utoipa` schema derives for the public types

pub mod acquisition;
pub mod cache;
pub mod error;
pub mod interpolation;
pub mod measurement;
pub mod provider;
pub mod region;
pub mod sampling;
pub mod service;
pub mod stations;
pub mod storm;

#[cfg(feature = "geojson")]
pub mod geojson;

#[cfg(feature = "nohrsc")]
pub mod nohrsc;

#[cfg(feature = "nws")]
pub mod nws;

// Re-export main types at crate root for convenience
pub use acquisition::{acquire, AcquisitionReport};
pub use cache::{CacheStats, ResultCache};
pub use error::{Result, SnowError};
pub use interpolation::{expand_grid, interpolate_idw, IdwParams};
pub use measurement::{DataSource, Measurement, SnowfallEvent};
pub use provider::{mock_measurements, SnowDepthProvider};
pub use region::{BoundingBox, ILLINOIS_BOUNDS};
pub use sampling::{strategic_points, uniform_grid, Priority, SamplePoint, SamplingPlan};
pub use service::{SnowfallConfig, SnowfallService, SnowfallServiceBuilder};
pub use stations::{fetch_station_readings, StationSource, DEFAULT_STATIONS};
pub use storm::{parse_storm_id, storm_id_for, StormMetadata};

#[cfg(feature = "nohrsc")]
pub use nohrsc::{NohrscConfig, NohrscProvider};

#[cfg(feature = "nws")]
pub use nws::{NwsClient, NwsConfig};
