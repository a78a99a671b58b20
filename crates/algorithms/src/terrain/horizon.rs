//! Horizon scanning: sky view factor as positive/negative openness
//!
//! For each cell, radial profiles are marched outward along equally spaced
//! azimuths. Each profile yields an upper horizon (steepest rise, never
//! below the horizontal) and a lower horizon (steepest drop, never above
//! it). The sines of the horizons that pass outlier rejection are averaged
//! into positive and negative openness.

use crate::terrain::azimuth::GridDirection;
use crate::terrain::grid_cell;
use serde::{Deserialize, Serialize};
use skyshade_core::{
    software_id, Advisory, Algorithm, CellSpacing, Error, GridGeometry, MercatorBounds, Raster,
    RasterElement, Result,
};
use skyshade_parallel::{default_workers, RowPool};

/// Horizons at or beyond this angle (degrees) are treated as spikes or voids
const OUTLIER_LIMIT_DEG: f64 = 70.0;

/// Parameters for horizon scanning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HorizonParams {
    /// Number of radial profiles per cell (default 8)
    pub directions: usize,
    /// Distance between samples along a profile, in cells (default 5)
    pub stride: usize,
    /// Profile length in cells (default 45)
    pub max_distance: usize,
    /// Latitude range for Mercator-projected input
    pub mercator: Option<MercatorBounds>,
    /// Worker threads (default: available CPUs)
    pub workers: usize,
}

impl Default for HorizonParams {
    fn default() -> Self {
        Self {
            directions: 8,
            stride: 5,
            max_distance: 45,
            mercator: None,
            workers: default_workers(),
        }
    }
}

impl HorizonParams {
    fn validate(&self) -> Result<()> {
        let positive = [
            ("directions", self.directions),
            ("stride", self.stride),
            ("max_distance", self.max_distance),
            ("workers", self.workers),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(Error::invalid_parameter(name, value, "must be > 0"));
            }
        }
        if self.stride > self.max_distance {
            return Err(Error::invalid_parameter(
                "stride",
                self.stride,
                format!("must not exceed max_distance ({})", self.max_distance),
            ));
        }
        Ok(())
    }
}

/// Upper and lower horizon of one profile, in radians
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleSample {
    pub upper: f64,
    pub lower: f64,
}

/// Positive and negative openness rasters and provenance for the grid writer
#[derive(Debug, Clone)]
pub struct OpennessResult {
    pub positive: Raster<f32>,
    pub negative: Raster<f32>,
    pub software: String,
    pub advisories: Vec<Advisory>,
}

/// Horizon scanner algorithm
#[derive(Debug, Clone, Default)]
pub struct HorizonScanner;

impl Algorithm for HorizonScanner {
    type Input = Raster<f32>;
    type Output = OpennessResult;
    type Params = HorizonParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "SkyViewFactor"
    }

    fn description(&self) -> &'static str {
        "Positive and negative openness from multi-directional horizon scans"
    }

    fn execute(&self, input: &Self::Input, params: Self::Params) -> Result<Self::Output> {
        sky_view_factor(input, params)
    }
}

/// Profile directions for `count` equally spaced bearings, starting north.
pub fn profile_directions(count: usize, spacing: &CellSpacing) -> Vec<GridDirection> {
    (0..count)
        .map(|i| GridDirection::from_bearing(360.0 * i as f64 / count as f64, spacing))
        .collect()
}

/// Horizon angles at (row, col) along each direction.
///
/// Samples lie at `stride`, `2·stride`, … cells out to `max_distance`, each
/// taken from the nearest cell (a zero stride is taken as 1). Void samples
/// are skipped. A direction with no usable sample gives `None`. A void or
/// out-of-range base cell gives `None` everywhere.
pub fn horizon_profile(
    dem: &Raster<f32>,
    row: usize,
    col: usize,
    directions: &[GridDirection],
    stride: usize,
    max_distance: usize,
) -> Vec<Option<AngleSample>> {
    let mut samples = Vec::with_capacity(directions.len());
    horizon_profile_into(dem, row, col, directions, stride, max_distance, &mut samples);
    samples
}

/// Same as [`horizon_profile`], writing into `samples` so one buffer can
/// serve a whole row block.
pub fn horizon_profile_into(
    dem: &Raster<f32>,
    row: usize,
    col: usize,
    directions: &[GridDirection],
    stride: usize,
    max_distance: usize,
    samples: &mut Vec<Option<AngleSample>>,
) {
    samples.clear();
    let (rows, cols) = dem.shape();
    let stride = stride.max(1);
    let z0 = match dem.get(row, col) {
        Ok(z) if !z.is_void() => z.as_f64(),
        _ => {
            samples.resize(directions.len(), None);
            return;
        }
    };

    samples.extend(directions.iter().map(|dir| {
        let mut max_angle = f64::NEG_INFINITY;
        let mut min_angle = f64::INFINITY;

        for d in (stride..=max_distance).step_by(stride) {
            let d = d as f64;
            let Some((r, c)) = grid_cell(
                col as f64 + dir.dx * d,
                row as f64 + dir.dy * d,
                rows,
                cols,
            ) else {
                break;
            };

            let z = unsafe { dem.get_unchecked(r, c) };
            if z.is_void() {
                continue;
            }

            let angle = ((z.as_f64() - z0) / (d * dir.ground_step)).atan();
            max_angle = max_angle.max(angle);
            min_angle = min_angle.min(angle);
        }

        if max_angle == f64::NEG_INFINITY {
            None
        } else {
            Some(AngleSample {
                upper: max_angle.max(0.0),
                lower: min_angle.min(0.0),
            })
        }
    }));
}

/// Mean sine of the upper and lower horizons that lie strictly inside
/// ±70°. `None` for a side where no horizon survives.
pub fn openness(samples: &[Option<AngleSample>]) -> (Option<f64>, Option<f64>) {
    let limit = OUTLIER_LIMIT_DEG.to_radians();
    let accept = |a: f64| a > -limit && a < limit;

    let mean_sin = |pick: fn(&AngleSample) -> f64| {
        let (sum, n) = samples
            .iter()
            .flatten()
            .map(pick)
            .filter(|&a| accept(a))
            .fold((0.0, 0usize), |(sum, n), a| (sum + a.sin(), n + 1));
        (n > 0).then(|| sum / n as f64)
    };

    (mean_sin(|s| s.upper), mean_sin(|s| s.lower))
}

/// Compute positive and negative openness for every cell of a DEM.
///
/// # Arguments
/// * `dem` - Input DEM; voids carry the NODATA sentinel
/// * `params` - Profile count, stride, length and worker count
///
/// # Returns
/// [`OpennessResult`] with two rasters of the DEM's shape and extent.
/// Cells that are void, or whose horizons were all rejected, hold NODATA.
pub fn sky_view_factor(dem: &Raster<f32>, params: HorizonParams) -> Result<OpennessResult> {
    params.validate()?;

    let (rows, cols) = dem.shape();
    let geometry = GridGeometry::resolve(dem.extent(), rows, cols, params.mercator)?;
    let mut advisories = geometry.advisories.clone();

    let void_count = dem.statistics().void_count;
    if void_count > 0 {
        let advisory = Advisory::VoidCells { count: void_count };
        advisory.log();
        advisories.push(advisory);
    }

    let directions = profile_directions(params.directions, &geometry.ground);

    tracing::info!(
        rows,
        cols,
        directions = params.directions,
        stride = params.stride,
        max_distance = params.max_distance,
        workers = params.workers,
        "scanning horizons"
    );

    let mut positive = Raster::<f32>::buffer(rows, cols, f32::void())?;
    let mut negative = Raster::<f32>::buffer(rows, cols, f32::void())?;
    let pool = RowPool::new(params.workers)?;

    pool.run(
        rows,
        cols,
        (positive.as_mut_slice(), negative.as_mut_slice()),
        |block, (pos, neg): (&mut [f32], &mut [f32])| {
            let mut samples = Vec::with_capacity(directions.len());
            let out_rows = pos.chunks_mut(cols).zip(neg.chunks_mut(cols));
            for (row, (pos_row, neg_row)) in block.rows.clone().zip(out_rows) {
                for col in 0..cols {
                    horizon_profile_into(
                        dem,
                        row,
                        col,
                        &directions,
                        params.stride,
                        params.max_distance,
                        &mut samples,
                    );
                    let (up, down) = openness(&samples);
                    pos_row[col] = up.map_or(f32::void(), |v| v as f32);
                    neg_row[col] = down.map_or(f32::void(), |v| v as f32);
                }
            }
        },
    );

    let extent = *dem.extent();
    Ok(OpennessResult {
        positive: Raster::from_elevations(positive, rows, cols, extent)?,
        negative: Raster::from_elevations(negative, rows, cols, extent)?,
        software: software_id(),
        advisories,
    })
}
