//! Error types for SkyShade

use thiserror::Error;

/// Main error type for SkyShade operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Invalid extent: x [{xmin}, {xmax}], y [{ymin}, {ymax}]")]
    InvalidExtent {
        xmin: f64,
        xmax: f64,
        ymin: f64,
        ymax: f64,
    },

    #[error(
        "Unable to determine projection type from extent x [{xmin}, {xmax}], y [{ymin}, {ymax}] \
         (cell size {xdim} x {ydim})"
    )]
    UnknownProjection {
        xmin: f64,
        xmax: f64,
        ymin: f64,
        ymax: f64,
        xdim: f64,
        ydim: f64,
    },

    #[error("Mercator latitudes are invalid for data in geographic coordinates")]
    MercatorWithGeographic,

    #[error("Invalid Mercator latitudes {lat1}, {lat2}: {reason}")]
    InvalidMercator { lat1: f64, lat2: f64, reason: String },

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Insufficient memory for a {cells}-cell output raster")]
    Allocation { cells: usize },

    #[error("Worker pool error: {0}")]
    ThreadPool(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for [`Error::InvalidParameter`].
    pub fn invalid_parameter(
        name: &'static str,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Error::InvalidParameter {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for SkyShade operations
pub type Result<T> = std::result::Result<T, Error>;
