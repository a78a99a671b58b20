//! Azimuth correction for non-square pixels
//!
//! A compass bearing is a straight line on the ground. On a grid whose
//! cells are wider than they are tall (or the reverse) the same line runs
//! at a different angle in row/column space, so every ray is rotated into
//! grid space before marching.

use skyshade_core::CellSpacing;

/// Grid-space bearing (degrees clockwise from the row-decreasing axis) for
/// a geographic bearing `azimuth` on cells of `xdim` × `ydim`.
///
/// Computes `atan(ydim / xdim · tan(azimuth))` in the quadrant of
/// `azimuth`. The result lies in `[0, 360)`; with square cells it equals
/// the normalised input bearing.
pub fn fix_azimuth(azimuth: f64, xdim: f64, ydim: f64) -> f64 {
    let az = azimuth.to_radians();
    let val = (ydim * az.sin()).atan2(xdim * az.cos()).to_degrees();
    let val = val.rem_euclid(360.0);
    // rem_euclid can round a tiny negative angle up to exactly 360
    if val >= 360.0 {
        0.0
    } else {
        val
    }
}

/// One unit step along a ray, in grid cells, and its length on the ground.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridDirection {
    /// Columns per step (east positive)
    pub dx: f64,
    /// Rows per step (south positive, row 0 is north)
    pub dy: f64,
    /// Horizontal ground distance covered by one step
    pub ground_step: f64,
}

impl GridDirection {
    /// Direction of a compass bearing on a grid with the given ground spacing.
    pub fn from_bearing(bearing: f64, spacing: &CellSpacing) -> Self {
        let theta = fix_azimuth(bearing, spacing.x, spacing.y).to_radians();
        let dx = theta.sin();
        let dy = -theta.cos();
        Self {
            dx,
            dy,
            ground_step: spacing.length(dx, dy),
        }
    }
}
