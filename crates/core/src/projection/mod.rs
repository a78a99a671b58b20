//! Projection classification from grid extent
//!
//! Grids arrive without CRS metadata, so the coordinate semantics are
//! inferred from the bounding box and cell spacing alone:
//! - small cells inside ±180°/±90° are geographic (degrees)
//! - boxes reaching beyond ±181/±91 are projected (linear units)
//! - anything else is ambiguous and rejected
//!
//! A caller may declare projected data to be normal-aspect Mercator by
//! supplying the latitude range it covers.

mod geometry;
mod scale;

pub use geometry::{Advisory, CellSpacing, GridGeometry};
pub use scale::{geographic_aspect, geographic_scale};

use crate::error::{Error, Result};
use crate::raster::Extent;
use serde::{Deserialize, Serialize};

/// Coordinate semantics of a grid's extent
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectionType {
    /// Longitude/latitude in degrees
    Geographic,
    /// Easting/northing in linear units
    Projected,
    /// Normal-aspect Mercator covering the given latitudes
    ProjectedMercator(MercatorBounds),
    /// Extent fits neither interpretation
    Unknown,
}

impl ProjectionType {
    pub fn is_geographic(&self) -> bool {
        matches!(self, ProjectionType::Geographic)
    }
}

/// Latitude range of a Mercator-projected grid, `south < north`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 2]", into = "[f64; 2]")]
pub struct MercatorBounds {
    south: f64,
    north: f64,
}

impl MercatorBounds {
    /// Validate a pair of latitudes in decimal degrees.
    ///
    /// The pair may be given in either order. Both must lie strictly
    /// inside (-90, 90) and must differ.
    pub fn new(lat1: f64, lat2: f64) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidMercator {
            lat1,
            lat2,
            reason: reason.to_string(),
        };

        if !lat1.is_finite() || !lat2.is_finite() {
            return Err(invalid("latitudes must be finite"));
        }
        if lat1 == lat2 {
            return Err(invalid("min & max latitudes cannot be equal"));
        }

        let (south, north) = if lat1 > lat2 { (lat2, lat1) } else { (lat1, lat2) };
        if south <= -90.0 || north >= 90.0 {
            return Err(invalid("latitudes must be between -90 and +90 (exclusive)"));
        }

        Ok(Self { south, north })
    }

    pub fn south(&self) -> f64 {
        self.south
    }

    pub fn north(&self) -> f64 {
        self.north
    }

    pub fn mid_latitude(&self) -> f64 {
        0.5 * (self.south + self.north)
    }
}

impl TryFrom<[f64; 2]> for MercatorBounds {
    type Error = Error;

    fn try_from(value: [f64; 2]) -> Result<Self> {
        Self::new(value[0], value[1])
    }
}

impl From<MercatorBounds> for [f64; 2] {
    fn from(value: MercatorBounds) -> Self {
        [value.south, value.north]
    }
}

/// Classify an extent with spacing `xdim` × `ydim`.
///
/// Never returns [`ProjectionType::ProjectedMercator`]; that is only ever
/// requested explicitly (see [`GridGeometry::resolve`]).
pub fn classify(extent: &Extent, xdim: f64, ydim: f64) -> ProjectionType {
    let small_cells = ydim.abs() < 0.02 && xdim.abs() < 0.02;
    let within_globe = extent.xmin > -180.01
        && extent.xmax < 180.01
        && extent.ymin > -90.01
        && extent.ymax < 90.01;

    if small_cells && within_globe {
        return ProjectionType::Geographic;
    }

    let beyond_x = extent.xmin < -181.0 || extent.xmax > 181.0;
    let beyond_y = extent.ymin < -91.0 || extent.ymax > 91.0;
    if beyond_x && beyond_y {
        return ProjectionType::Projected;
    }

    ProjectionType::Unknown
}
