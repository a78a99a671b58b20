//! Native and ground cell spacing for a classified grid

use super::scale::{geographic_aspect, geographic_scale};
use super::{classify, MercatorBounds, ProjectionType};
use crate::error::{Error, Result};
use crate::raster::Extent;
use std::fmt;

/// Map extents beyond this many linear units need the Mercator override.
const MAX_LINEAR_EXTENT: f64 = 1_000_000.0;

/// Edge-to-centre aspect ratio below which a geographic grid is too tall.
const DISTORTION_LIMIT: f64 = 15.0 / 16.0;

/// Horizontal size of one cell step along each grid axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellSpacing {
    /// Distance between adjacent columns
    pub x: f64,
    /// Distance between adjacent rows
    pub y: f64,
}

impl CellSpacing {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Length of a displacement of `dx` columns and `dy` rows.
    #[inline]
    pub fn length(&self, dx: f64, dy: f64) -> f64 {
        (self.x * dx).hypot(self.y * dy)
    }

    /// Pixel aspect ratio (x over y)
    pub fn aspect(&self) -> f64 {
        self.x / self.y
    }
}

/// Non-fatal findings about the input, reported before marching.
#[derive(Debug, Clone, PartialEq)]
pub enum Advisory {
    /// Geographic grid spans too much latitude for a single pixel aspect
    GeographicExtentTooLarge { center_aspect: f64, edge_aspect: f64 },
    /// Projected grid wider or taller than 1000 km without Mercator override
    ProjectedExtentTooLarge { width: f64, height: f64 },
    /// Input contains void cells
    VoidCells { count: usize },
}

impl Advisory {
    /// Emit this advisory as a `tracing` warning.
    pub fn log(&self) {
        tracing::warn!("{}", self);
    }
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::GeographicExtentTooLarge {
                center_aspect,
                edge_aspect,
            } => write!(
                f,
                "Map area too large: aspect {edge_aspect:.3} at the poleward edge vs {center_aspect:.3} \
                 at the centre (small-scale maps require data in Mercator projection); \
                 this will degrade the quality of the result"
            ),
            Advisory::ProjectedExtentTooLarge { width, height } => write!(
                f,
                "Map area too large ({width:.0} x {height:.0} units; small-scale maps require \
                 Mercator latitudes); this will degrade the quality of the result"
            ),
            Advisory::VoidCells { count } => {
                write!(f, "Input contains {count} void (NODATA) cells")
            }
        }
    }
}

/// Resolved projection and spacing of a grid, computed once per run.
#[derive(Debug, Clone)]
pub struct GridGeometry {
    pub projection: ProjectionType,
    /// Native spacing, in the extent's units
    pub native: CellSpacing,
    /// Spacing in ground units (metres for geographic grids)
    pub ground: CellSpacing,
    pub advisories: Vec<Advisory>,
}

impl GridGeometry {
    /// Classify the grid and derive its ground spacing.
    ///
    /// Fails when the projection cannot be determined, or when Mercator
    /// latitudes are supplied for geographic data. Advisories are logged
    /// as they are found and kept on the returned value.
    pub fn resolve(
        extent: &Extent,
        rows: usize,
        cols: usize,
        mercator: Option<MercatorBounds>,
    ) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(Error::InvalidDimensions {
                width: cols,
                height: rows,
            });
        }

        let xdim = extent.xdim(cols);
        let ydim = extent.ydim(rows);
        if !(xdim > 0.0 && ydim > 0.0) {
            return Err(Error::InvalidExtent {
                xmin: extent.xmin,
                xmax: extent.xmax,
                ymin: extent.ymin,
                ymax: extent.ymax,
            });
        }

        let projection = match (classify(extent, xdim, ydim), mercator) {
            (ProjectionType::Unknown, _) => {
                return Err(Error::UnknownProjection {
                    xmin: extent.xmin,
                    xmax: extent.xmax,
                    ymin: extent.ymin,
                    ymax: extent.ymax,
                    xdim,
                    ydim,
                })
            }
            (ProjectionType::Geographic, Some(_)) => return Err(Error::MercatorWithGeographic),
            (_, Some(bounds)) => ProjectionType::ProjectedMercator(bounds),
            (p, None) => p,
        };

        let native = CellSpacing::new(xdim, ydim);
        let ground = match projection {
            ProjectionType::Geographic => {
                let (xsize, ysize) = geographic_scale(extent.center_y());
                CellSpacing::new(xdim * xsize, ydim * ysize)
            }
            ProjectionType::ProjectedMercator(bounds) => {
                let k = bounds.mid_latitude().to_radians().cos();
                CellSpacing::new(xdim * k, ydim * k)
            }
            _ => native,
        };

        tracing::info!(
            ?projection,
            rows,
            cols,
            pixel_aspect = ground.aspect(),
            "resolved grid geometry"
        );

        let advisories = check_aspect(extent, &projection);
        for advisory in &advisories {
            advisory.log();
        }

        Ok(Self {
            projection,
            native,
            ground,
            advisories,
        })
    }
}

/// Check pixel aspect ratio and size of the map extent.
fn check_aspect(extent: &Extent, projection: &ProjectionType) -> Vec<Advisory> {
    let mut advisories = Vec::new();

    match projection {
        ProjectionType::Geographic => {
            let center_aspect = geographic_aspect(extent.center_y());
            let narrow_lat = if extent.ymax >= -extent.ymin {
                extent.ymax
            } else {
                extent.ymin
            };
            let edge_aspect = geographic_aspect(narrow_lat);
            if edge_aspect < center_aspect * DISTORTION_LIMIT {
                advisories.push(Advisory::GeographicExtentTooLarge {
                    center_aspect,
                    edge_aspect,
                });
            }
        }
        ProjectionType::Projected => {
            if extent.height() > MAX_LINEAR_EXTENT || extent.width() > MAX_LINEAR_EXTENT {
                advisories.push(Advisory::ProjectedExtentTooLarge {
                    width: extent.width(),
                    height: extent.height(),
                });
            }
        }
        ProjectionType::ProjectedMercator(_) | ProjectionType::Unknown => {}
    }

    advisories
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_projected_ground_is_native() {
        let extent = Extent::new(500_000.0, 501_000.0, 4_000_000.0, 4_000_500.0).unwrap();
        let g = GridGeometry::resolve(&extent, 50, 100, None).unwrap();
        assert_eq!(g.projection, ProjectionType::Projected);
        assert_relative_eq!(g.ground.x, 10.0);
        assert_relative_eq!(g.ground.y, 10.0);
        assert!(g.advisories.is_empty());
    }

    #[test]
    fn test_geographic_ground_in_metres() {
        // 1 arc-second grid at the equator
        let extent = Extent::new(10.0, 10.1, -0.05, 0.05).unwrap();
        let g = GridGeometry::resolve(&extent, 360, 360, None).unwrap();
        assert!(g.projection.is_geographic());
        assert_relative_eq!(g.ground.x, 30.92, epsilon = 0.01);
        assert_relative_eq!(g.ground.y, 30.72, epsilon = 0.01);
    }

    #[test]
    fn test_mercator_override() {
        let extent = Extent::new(500_000.0, 501_000.0, 4_000_000.0, 4_001_000.0).unwrap();
        let bounds = MercatorBounds::new(59.0, 61.0).unwrap();
        let g = GridGeometry::resolve(&extent, 100, 100, Some(bounds)).unwrap();
        assert_eq!(g.projection, ProjectionType::ProjectedMercator(bounds));
        assert_relative_eq!(g.ground.x, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_mercator_rejected_for_geographic() {
        let extent = Extent::new(10.0, 10.1, 45.0, 45.1).unwrap();
        let bounds = MercatorBounds::new(40.0, 50.0).unwrap();
        let err = GridGeometry::resolve(&extent, 100, 100, Some(bounds)).unwrap_err();
        assert!(matches!(err, Error::MercatorWithGeographic));
    }

    #[test]
    fn test_unknown_is_fatal() {
        let extent = Extent::new(0.0, 10.0, 0.0, 10.0).unwrap();
        let err = GridGeometry::resolve(&extent, 10, 10, None).unwrap_err();
        assert!(matches!(err, Error::UnknownProjection { .. }));
    }

    #[test]
    fn test_large_projected_extent_warns() {
        let extent = Extent::new(0.0, 2_000_000.0, 1_000.0, 501_000.0).unwrap();
        let g = GridGeometry::resolve(&extent, 500, 2000, None).unwrap();
        assert!(matches!(
            g.advisories.as_slice(),
            [Advisory::ProjectedExtentTooLarge { .. }]
        ));
    }

    #[test]
    fn test_large_projected_extent_silent_with_mercator() {
        let extent = Extent::new(0.0, 2_000_000.0, 1_000.0, 501_000.0).unwrap();
        let bounds = MercatorBounds::new(10.0, 20.0).unwrap();
        let g = GridGeometry::resolve(&extent, 500, 2000, Some(bounds)).unwrap();
        assert!(g.advisories.is_empty());
    }

    #[test]
    fn test_tall_geographic_extent_warns() {
        let extent = Extent::new(-1.0, 0.0, 0.0, 70.0).unwrap();
        let g = GridGeometry::resolve(&extent, 7000, 100, None).unwrap();
        assert!(matches!(
            g.advisories.as_slice(),
            [Advisory::GeographicExtentTooLarge { .. }]
        ));
    }

    #[test]
    fn test_length_uses_anisotropic_spacing() {
        let s = CellSpacing::new(3.0, 4.0);
        assert_relative_eq!(s.length(1.0, 1.0), 5.0);
        assert_relative_eq!(s.length(0.0, -2.0), 8.0);
    }
}
