//! Horizontal extent of a cell-registered grid

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Bounding box of a grid in its native horizontal units.
///
/// Grids are cell-registered: `xmin`/`xmax` are the outer edges of the
/// first and last columns, `ymin`/`ymax` the outer edges of the last and
/// first rows. Row 0 is the northern edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl Extent {
    /// Create an extent, rejecting empty or non-finite boxes
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Result<Self> {
        let finite = [xmin, xmax, ymin, ymax].iter().all(|v| v.is_finite());
        if !finite || xmax <= xmin || ymax <= ymin {
            return Err(Error::InvalidExtent {
                xmin,
                xmax,
                ymin,
                ymax,
            });
        }
        Ok(Self {
            xmin,
            xmax,
            ymin,
            ymax,
        })
    }

    /// Unit-spaced extent anchored at the origin.
    pub fn unit(rows: usize, cols: usize) -> Self {
        Self {
            xmin: 0.0,
            xmax: cols as f64,
            ymin: 0.0,
            ymax: rows as f64,
        }
    }

    /// Spacing between columns: `(xmax - xmin) / cols`
    pub fn xdim(&self, cols: usize) -> f64 {
        (self.xmax - self.xmin) / cols as f64
    }

    /// Spacing between rows: `(ymax - ymin) / rows`
    pub fn ydim(&self, rows: usize) -> f64 {
        (self.ymax - self.ymin) / rows as f64
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// Latitude (or northing) halfway between the top and bottom edges
    pub fn center_y(&self) -> f64 {
        0.5 * (self.ymin + self.ymax)
    }
}
