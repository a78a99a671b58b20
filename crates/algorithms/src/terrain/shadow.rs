//! Solar shadow casting
//!
//! Two ray-marching strategies over a DEM lit by a sun at a given azimuth
//! and elevation:
//!
//! - **Exact**: every cell marches a ray toward the sun, rising at the sun's
//!   elevation angle, and sums how far the terrain pokes above it. The
//!   output is `ln(volume)` for shaded cells and 0 for lit cells.
//! - **Fast sweep**: rays start only on the grid edges and travel with the
//!   light, carrying a falling horizon. Cells found below the horizon for
//!   two or more consecutive steps get the depth below it.

use crate::terrain::azimuth::GridDirection;
use crate::terrain::grid_cell;
use serde::{Deserialize, Serialize};
use skyshade_core::{
    software_id, Advisory, Algorithm, CellSpacing, Error, GridGeometry, MercatorBounds, Raster,
    RasterElement, Result,
};
use skyshade_parallel::{default_workers, RowPool};

/// Speeds below this are treated as no motion along an axis
const MIN_AXIS_SPEED: f64 = 1e-9;

/// Horizontal boundary handling for the fast sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EdgeMode {
    /// Columns wrap around; only the north and south edges seed rays
    #[default]
    Periodic,
    /// Rays stop at every edge; all four edges seed rays
    Bounded,
}

/// Shadow algorithm, fixed once per run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShadowAlgorithm {
    /// Per-cell march toward the sun
    #[default]
    Exact,
    /// Per-edge sweep along the light
    FastSweep(EdgeMode),
}

/// Parameters for shadow casting
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowParams {
    /// Sun azimuth in degrees clockwise from north (default 315)
    pub azimuth: f64,
    /// Sun elevation above the horizon in degrees, 0 to 90 (default 45)
    pub elevation: f64,
    pub algorithm: ShadowAlgorithm,
    /// Latitude range for Mercator-projected input
    pub mercator: Option<MercatorBounds>,
    /// Worker threads for the exact algorithm (default: available CPUs)
    pub workers: usize,
}

impl Default for ShadowParams {
    fn default() -> Self {
        Self {
            azimuth: 315.0,
            elevation: 45.0,
            algorithm: ShadowAlgorithm::Exact,
            mercator: None,
            workers: default_workers(),
        }
    }
}

impl ShadowParams {
    fn validate(&self) -> Result<()> {
        if !self.azimuth.is_finite() {
            return Err(Error::invalid_parameter(
                "azimuth",
                self.azimuth,
                "sun azimuth must be finite",
            ));
        }
        if !(0.0..=90.0).contains(&self.elevation) {
            return Err(Error::invalid_parameter(
                "elevation",
                self.elevation,
                "sun elevation must be between 0 and 90 degrees",
            ));
        }
        if self.workers == 0 {
            return Err(Error::invalid_parameter(
                "workers",
                self.workers,
                "at least one worker is required",
            ));
        }
        Ok(())
    }
}

/// Per-step ray displacement toward the sun.
///
/// `x` and `y` are in grid cells (row 0 north), `z` is the rise of the
/// sun line per step in elevation units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunVector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl SunVector {
    /// Sun vector for a ground bearing and elevation on a grid with the
    /// given ground spacing.
    pub fn new(azimuth: f64, elevation: f64, spacing: &CellSpacing) -> Self {
        let dir = GridDirection::from_bearing(azimuth.rem_euclid(360.0), spacing);
        let el = elevation.to_radians();
        Self {
            x: dir.dx * el.cos(),
            y: dir.dy * el.cos(),
            z: el.sin() * dir.ground_step,
        }
    }
}

/// Shade raster and provenance for the grid writer
#[derive(Debug, Clone)]
pub struct ShadowResult {
    pub shade: Raster<f32>,
    pub software: String,
    pub advisories: Vec<Advisory>,
}

/// Shadow caster algorithm
#[derive(Debug, Clone, Default)]
pub struct ShadowCaster;

impl Algorithm for ShadowCaster {
    type Input = Raster<f32>;
    type Output = ShadowResult;
    type Params = ShadowParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Shadow"
    }

    fn description(&self) -> &'static str {
        "Cast terrain shadows for a sun position"
    }

    fn execute(&self, input: &Self::Input, params: Self::Params) -> Result<Self::Output> {
        cast_shadows(input, params)
    }
}

/// Cast shadows over a DEM.
///
/// # Arguments
/// * `dem` - Input DEM; voids carry the NODATA sentinel
/// * `params` - Sun position, algorithm and worker count
///
/// # Returns
/// [`ShadowResult`] whose raster has the DEM's shape and extent. Exact mode
/// writes 1 for void cells; fast sweep writes 0.
pub fn cast_shadows(dem: &Raster<f32>, params: ShadowParams) -> Result<ShadowResult> {
    params.validate()?;

    let (rows, cols) = dem.shape();
    let geometry = GridGeometry::resolve(dem.extent(), rows, cols, params.mercator)?;
    let mut advisories = geometry.advisories.clone();

    let stats = dem.statistics();
    if stats.void_count > 0 {
        let advisory = Advisory::VoidCells {
            count: stats.void_count,
        };
        advisory.log();
        advisories.push(advisory);
    }
    let z_max = stats.max.map_or(f64::NEG_INFINITY, |z| z.as_f64());

    let sun = SunVector::new(params.azimuth, params.elevation, &geometry.ground);

    tracing::info!(
        rows,
        cols,
        algorithm = ?params.algorithm,
        azimuth = params.azimuth,
        elevation = params.elevation,
        z_min = stats.min.map_or(f64::NAN, |z| z.as_f64()),
        z_max,
        valid_cells = stats.valid_count,
        "casting shadows"
    );

    let shade = match params.algorithm {
        ShadowAlgorithm::Exact => exact_shadows(dem, &sun, z_max, params.workers)?,
        ShadowAlgorithm::FastSweep(edges) => swept_shadows(dem, &sun, z_max, edges)?,
    };

    Ok(ShadowResult {
        shade: Raster::from_elevations(shade, rows, cols, *dem.extent())?,
        software: software_id(),
        advisories,
    })
}

fn exact_shadows(dem: &Raster<f32>, sun: &SunVector, z_max: f64, workers: usize) -> Result<Vec<f32>> {
    let (rows, cols) = dem.shape();
    let mut shade = Raster::<f32>::buffer(rows, cols, 0.0)?;
    let pool = RowPool::new(workers)?;

    pool.run(rows, cols, shade.as_mut_slice(), |block, chunk: &mut [f32]| {
        for (row, out) in block.rows.clone().zip(chunk.chunks_mut(cols)) {
            for (col, value) in out.iter_mut().enumerate() {
                *value = shadow_volume(dem, row, col, sun, z_max);
            }
        }
    });

    Ok(shade)
}

/// March from (row, col) toward the sun and return the log shadow volume.
fn shadow_volume(dem: &Raster<f32>, row: usize, col: usize, sun: &SunVector, z_max: f64) -> f32 {
    let (rows, cols) = dem.shape();
    let z0 = unsafe { dem.get_unchecked(row, col) };
    if z0.is_void() {
        return 1.0;
    }

    let mut x = col as f64;
    let mut y = row as f64;
    let mut ray = z0.as_f64();
    let mut volume = 0.0_f64;

    while ray <= z_max {
        let Some((r, c)) = grid_cell(x, y, rows, cols) else {
            break;
        };

        let z = unsafe { dem.get_unchecked(r, c) };
        if !z.is_void() {
            let z = z.as_f64();
            if z > ray {
                volume += z - ray;
            }
        }

        x += sun.x;
        y += sun.y;
        ray += sun.z;
    }

    if volume == 0.0 {
        0.0
    } else {
        volume.ln() as f32
    }
}

fn swept_shadows(dem: &Raster<f32>, sun: &SunVector, z_max: f64, edges: EdgeMode) -> Result<Vec<f32>> {
    let (rows, cols) = dem.shape();
    // NaN marks cells no sweep has reached yet
    let mut shade = Raster::<f32>::buffer(rows, cols, f32::NAN)?;

    if let Some(budget) = traversal_budget(sun, rows, cols, edges) {
        let sweep = Sweep {
            dem,
            sun,
            z_max,
            periodic: edges == EdgeMode::Periodic,
            budget,
        };

        if sweep.periodic && sun.y.abs() <= MIN_AXIS_SPEED {
            // Light runs along the rows and never reaches a row edge, so
            // every row gets its own ray, wrapping round the columns
            for row in 0..rows {
                sweep.run(row, 0, &mut shade);
            }
        } else {
            let mut edge_rows = vec![0, rows - 1];
            edge_rows.dedup();
            for &row in &edge_rows {
                for col in 0..cols {
                    sweep.run(row, col, &mut shade);
                }
            }
        }

        if edges == EdgeMode::Bounded {
            let mut edge_cols = vec![0, cols - 1];
            edge_cols.dedup();
            for &col in &edge_cols {
                for row in 0..rows {
                    sweep.run(row, col, &mut shade);
                }
            }
        }

        tracing::debug!(budget, ?edges, "edge sweeps done");
    } else {
        tracing::debug!("sun overhead, nothing to sweep");
    }

    for value in shade.iter_mut().filter(|v| v.is_nan()) {
        *value = 0.0;
    }
    Ok(shade)
}

/// Maximum steps one sweep may take before it must have left the grid.
///
/// `None` when the light has no horizontal motion at all.
fn traversal_budget(sun: &SunVector, rows: usize, cols: usize, edges: EdgeMode) -> Option<usize> {
    let crossing = |cells: usize, speed: f64| {
        if speed.abs() > MIN_AXIS_SPEED {
            cells as f64 / speed.abs()
        } else {
            f64::INFINITY
        }
    };
    let cross_x = crossing(cols, sun.x);
    let cross_y = crossing(rows, sun.y);

    let steps = match edges {
        EdgeMode::Bounded => cross_x.min(cross_y),
        // Columns wrap, so only leaving through a row edge ends a ray.
        // An east-west ray gets two laps: the second carries the horizon
        // found on the first back past its start column.
        EdgeMode::Periodic if cross_y.is_finite() => cross_y,
        EdgeMode::Periodic => 2.0 * cross_x,
    };
    if !steps.is_finite() {
        return None;
    }

    let cap = rows.saturating_mul(cols).saturating_mul(2) as f64;
    Some(steps.min(cap).ceil() as usize + 1)
}

struct Sweep<'a> {
    dem: &'a Raster<f32>,
    sun: &'a SunVector,
    z_max: f64,
    periodic: bool,
    budget: usize,
}

impl Sweep<'_> {
    /// Carry a horizon from a start cell along the light direction.
    fn run(&self, row: usize, col: usize, shade: &mut [f32]) {
        let (rows, cols) = self.dem.shape();
        let mut x = col as f64;
        let mut y = row as f64;
        let mut horizon = f64::NEG_INFINITY;
        let mut below = 0usize;

        for _ in 0..self.budget {
            if horizon > self.z_max {
                break;
            }
            let Some((r, c)) = self.locate(x, y, rows, cols) else {
                break;
            };

            let idx = r * cols + c;
            let z = unsafe { self.dem.get_unchecked(r, c) };
            if z.is_void() {
                shade[idx] = 0.0;
                below = 0;
            } else {
                let z = z.as_f64();
                if z >= horizon {
                    if shade[idx].is_nan() {
                        shade[idx] = 0.0;
                    }
                    below = 0;
                    horizon = z;
                } else {
                    below += 1;
                    shade[idx] = if below > 1 { (horizon - z) as f32 } else { 0.0 };
                }
            }

            x -= self.sun.x;
            y -= self.sun.y;
            horizon -= self.sun.z;
        }
    }

    fn locate(&self, x: f64, y: f64, rows: usize, cols: usize) -> Option<(usize, usize)> {
        if !self.periodic {
            return grid_cell(x, y, rows, cols);
        }
        let r = y.round();
        if !(r >= 0.0 && r < rows as f64) {
            return None;
        }
        let c = (x.round() as i64).rem_euclid(cols as i64);
        Some((r as usize, c as usize))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyshade_core::Extent;

    /// Projected DEM with 1 m cells
    fn dem(rows: usize, cols: usize, f: impl Fn(usize, usize) -> f32) -> Raster<f32> {
        let mut data = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                data.push(f(row, col));
            }
        }
        let extent = Extent::new(
            500_000.0,
            500_000.0 + cols as f64,
            4_000_000.0,
            4_000_000.0 + rows as f64,
        )
        .unwrap();
        Raster::from_elevations(data, rows, cols, extent).unwrap()
    }

    fn params(azimuth: f64, elevation: f64, algorithm: ShadowAlgorithm) -> ShadowParams {
        ShadowParams {
            azimuth,
            elevation,
            algorithm,
            workers: 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_sun_vector_from_south() {
        let sun = SunVector::new(180.0, 45.0, &CellSpacing::new(1.0, 1.0));
        assert!(sun.x.abs() < 1e-12);
        assert!((sun.y - 45f64.to_radians().cos()).abs() < 1e-12);
        assert!((sun.z - 45f64.to_radians().sin()).abs() < 1e-12);
    }

    #[test]
    fn test_uniform_terrain_unshaded() {
        let dem = dem(5, 5, |_, _| 100.0);
        let result = cast_shadows(&dem, params(180.0, 45.0, ShadowAlgorithm::Exact)).unwrap();
        assert!(result.shade.data().iter().all(|&v| v == 0.0));
        assert!(result.software.starts_with("SkyShade v"));
    }

    #[test]
    fn test_overhead_sun_unshaded() {
        let dem = dem(7, 7, |r, c| ((r * 13 + c * 7) % 11) as f32 * 10.0);
        let result = cast_shadows(&dem, params(0.0, 90.0, ShadowAlgorithm::Exact)).unwrap();
        assert!(result.shade.data().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_ridge_shades_the_side_away_from_the_sun() {
        // North-south ridge at column 4, sun in the east
        let dem = dem(5, 9, |_, c| if c == 4 { 50.0 } else { 0.0 });
        let result = cast_shadows(&dem, params(90.0, 45.0, ShadowAlgorithm::Exact)).unwrap();

        let west = result.shade.get(2, 2).unwrap();
        let east = result.shade.get(2, 6).unwrap();
        let expected = (50.0 - 3.0 * 45f64.to_radians().sin()).ln() as f32;
        assert!((west - expected).abs() < 1e-4, "got {}", west);
        assert_eq!(east, 0.0);
        assert_eq!(result.shade.get(2, 4).unwrap(), 0.0);
    }

    #[test]
    fn test_void_source_cell_is_lit() {
        let dem = dem(3, 3, |r, c| if (r, c) == (1, 1) { f32::void() } else { 10.0 });
        let result = cast_shadows(&dem, params(45.0, 30.0, ShadowAlgorithm::Exact)).unwrap();
        assert_eq!(result.shade.get(1, 1).unwrap(), 1.0);
        assert!(result
            .advisories
            .contains(&Advisory::VoidCells { count: 1 }));
    }

    #[test]
    fn test_exact_identical_across_workers() {
        let dem = dem(23, 17, |r, c| ((r * 31 + c * 17) % 23) as f32 * 3.0);
        let one = cast_shadows(&dem, ShadowParams { workers: 1, ..params(200.0, 20.0, ShadowAlgorithm::Exact) }).unwrap();
        let many = cast_shadows(&dem, ShadowParams { workers: 6, ..params(200.0, 20.0, ShadowAlgorithm::Exact) }).unwrap();
        assert_eq!(one.shade.data(), many.shade.data());
    }

    #[test]
    fn test_fast_sweep_ridge() {
        // East-west ridge on row 6, sun in the south, light travels north
        let dem = dem(9, 5, |r, _| if r == 6 { 50.0 } else { 0.0 });
        let algorithm = ShadowAlgorithm::FastSweep(EdgeMode::Bounded);
        let result = cast_shadows(&dem, params(180.0, 45.0, algorithm)).unwrap();
        let shade = &result.shade;

        assert_eq!(shade.get(8, 2).unwrap(), 0.0);
        assert_eq!(shade.get(6, 2).unwrap(), 0.0);
        // First step below the horizon is provisionally lit
        assert_eq!(shade.get(5, 2).unwrap(), 0.0);
        let depth = shade.get(4, 2).unwrap();
        assert!(depth > 45.0 && depth < 50.0, "got {}", depth);
        assert!(shade.get(0, 2).unwrap() > 0.0);
    }

    #[test]
    fn test_fast_sweep_uniform_is_lit() {
        let dem = dem(6, 6, |_, _| 20.0);
        for edges in [EdgeMode::Periodic, EdgeMode::Bounded] {
            let result =
                cast_shadows(&dem, params(135.0, 30.0, ShadowAlgorithm::FastSweep(edges))).unwrap();
            assert!(result.shade.data().iter().all(|&v| v == 0.0));
        }
    }

    #[test]
    fn test_fast_sweep_degenerate_suns_terminate() {
        let dem = dem(8, 8, |r, c| (r * c) as f32);
        for (az, el) in [(90.0, 10.0), (270.0, 0.0), (0.0, 90.0)] {
            let result = cast_shadows(
                &dem,
                params(az, el, ShadowAlgorithm::FastSweep(EdgeMode::Periodic)),
            )
            .unwrap();
            assert!(result.shade.data().iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn test_fast_sweep_east_west_sun_periodic() {
        // North-south ridge at column 5, sun low in the west
        let dem = dem(9, 12, |_, c| if c == 5 { 80.0 } else { 0.0 });
        let periodic = cast_shadows(
            &dem,
            params(270.0, 10.0, ShadowAlgorithm::FastSweep(EdgeMode::Periodic)),
        )
        .unwrap();
        let bounded = cast_shadows(
            &dem,
            params(270.0, 10.0, ShadowAlgorithm::FastSweep(EdgeMode::Bounded)),
        )
        .unwrap();

        for row in 0..9 {
            for col in 7..12 {
                assert!(periodic.shade.get(row, col).unwrap() > 70.0, "({}, {})", row, col);
                assert!(bounded.shade.get(row, col).unwrap() > 70.0, "({}, {})", row, col);
            }
            assert_eq!(periodic.shade.get(row, 5).unwrap(), 0.0);
            // The shadow wraps past the east edge only with periodic columns
            assert!(periodic.shade.get(row, 2).unwrap() > 70.0);
            assert_eq!(bounded.shade.get(row, 2).unwrap(), 0.0);
        }
    }

    #[test]
    fn test_fast_sweep_shadow_wraps_across_east_edge() {
        let dem = dem(9, 12, |_, c| if c == 5 { 80.0 } else { 0.0 });
        let west_of_ridge = |result: &ShadowResult| {
            (0..9)
                .flat_map(|r| (0..5).map(move |c| (r, c)))
                .filter(|&(r, c)| result.shade.get(r, c).unwrap() > 0.0)
                .count()
        };

        let periodic = cast_shadows(
            &dem,
            params(250.0, 5.0, ShadowAlgorithm::FastSweep(EdgeMode::Periodic)),
        )
        .unwrap();
        let bounded = cast_shadows(
            &dem,
            params(250.0, 5.0, ShadowAlgorithm::FastSweep(EdgeMode::Bounded)),
        )
        .unwrap();

        assert!(west_of_ridge(&periodic) > 0);
        assert_eq!(west_of_ridge(&bounded), 0);
    }

    #[test]
    fn test_fast_sweep_void_is_lit_and_resets_count() {
        // Horizontal sun from the south: the horizon stays at the ridge top
        let dem = dem(9, 5, |r, c| match (r, c) {
            (6, _) => 50.0,
            (3, 2) => f32::void(),
            _ => 0.0,
        });
        let result = cast_shadows(
            &dem,
            params(180.0, 0.0, ShadowAlgorithm::FastSweep(EdgeMode::Periodic)),
        )
        .unwrap();
        let column: Vec<f32> = (0..9).map(|r| result.shade.get(r, 2).unwrap()).collect();

        assert_eq!(column[5], 0.0);
        assert_eq!(column[4], 50.0);
        assert_eq!(column[3], 0.0);
        // First cell past the void counts as a fresh first step below
        assert_eq!(column[2], 0.0);
        assert_eq!(column[1], 50.0);
        // Neighbouring column without the void stays dark
        assert_eq!(result.shade.get(2, 1).unwrap(), 50.0);
    }

    #[test]
    fn test_exact_void_sample_adds_nothing() {
        // Ridge at column 4 with a hole in row 2, sun in the east
        let dem = dem(5, 9, |r, c| match (r, c) {
            (2, 4) => f32::void(),
            (_, 4) => 50.0,
            _ => 0.0,
        });
        let result = cast_shadows(&dem, params(90.0, 45.0, ShadowAlgorithm::Exact)).unwrap();

        assert_eq!(result.shade.get(2, 2).unwrap(), 0.0);
        assert_eq!(result.shade.get(2, 4).unwrap(), 1.0);
        let expected = (50.0 - 3.0 * 45f64.to_radians().sin()).ln() as f32;
        assert!((result.shade.get(1, 2).unwrap() - expected).abs() < 1e-4);
    }

    #[test]
    fn test_invalid_sun_rejected() {
        let dem = dem(3, 3, |_, _| 0.0);
        assert!(cast_shadows(&dem, params(180.0, 95.0, ShadowAlgorithm::Exact)).is_err());
        assert!(cast_shadows(&dem, params(180.0, -1.0, ShadowAlgorithm::Exact)).is_err());
        assert!(cast_shadows(&dem, params(f64::NAN, 45.0, ShadowAlgorithm::Exact)).is_err());
    }

    #[test]
    fn test_unit_extent_is_unknown_projection() {
        let dem = Raster::filled(4, 4, 1.0_f32);
        let err = cast_shadows(&dem, ShadowParams::default()).unwrap_err();
        assert!(matches!(err, Error::UnknownProjection { .. }));
    }

    #[test]
    fn test_params_from_json() {
        let p: ShadowParams = serde_json::from_str(
            r#"{"azimuth": 120.0, "elevation": 30.0, "algorithm": {"FastSweep": "Bounded"}, "mercator": [61.0, 59.0]}"#,
        )
        .unwrap();
        assert_eq!(p.algorithm, ShadowAlgorithm::FastSweep(EdgeMode::Bounded));
        assert_eq!(p.mercator.unwrap().south(), 59.0);
        assert!(p.workers >= 1);

        let bad = serde_json::from_str::<ShadowParams>(r#"{"mercator": [10.0, 10.0]}"#);
        assert!(bad.is_err());
    }
}
