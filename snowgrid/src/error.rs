//! Error types for the snowgrid library.

use thiserror::Error;

/// Errors that can occur while sampling, interpolating or serving snow data.
///
/// "No snow" is never an error: empty acquisitions and empty sample sets are
/// valid steady states. These variants cover programmer and configuration
/// mistakes plus failures of a single provider query.
#[derive(Error, Debug)]
pub enum SnowError {
    /// Bounding box with `min > max` or non-finite edges.
    #[error(
        "Invalid bounds: lat {min_lat}..{max_lat}, lon {min_lon}..{max_lon} (min must not exceed max)"
    )]
    InvalidBounds {
        min_lat: f64,
        max_lat: f64,
        min_lon: f64,
        max_lon: f64,
    },

    /// Grid spacing that is zero, negative, not finite or too fine for the region.
    #[error(
        "Invalid grid resolution: {resolution} (must be a positive number of degrees yielding at most {} cells)",
        crate::region::MAX_LATTICE_CELLS
    )]
    InvalidResolution { resolution: f64 },

    /// Storm identifier that does not follow `storm-YYYY-MM-DD`.
    #[error("Invalid storm ID: {id} (expected format storm-YYYY-MM-DD)")]
    InvalidStormId { id: String },

    /// Storm identifier whose date lies after today.
    #[error("Storm date is in the future: {id}")]
    FutureStorm { id: String },

    /// The point provider rejected or failed a single query.
    #[error("Provider error: {0}")]
    Provider(String),

    /// HTTP transport or body decoding error from a network client.
    #[cfg(any(feature = "nohrsc", feature = "nws"))]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// GeoJSON feature that cannot be read as a measurement.
    #[error("Invalid feature: {message}")]
    InvalidFeature { message: String },

    /// Configuration value that could not be parsed or is missing.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result type alias using [`SnowError`].
pub type Result<T> = std::result::Result<T, SnowError>;
