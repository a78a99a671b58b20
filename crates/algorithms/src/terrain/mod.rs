//! Terrain ray marching
//!
//! Algorithms that march rays across a Digital Elevation Model:
//! - Shadow: terrain shadows cast by the sun (exact or fast sweep)
//! - Horizon: multi-directional horizon scans giving positive and
//!   negative openness (sky view factor)
//!
//! Every ray is rotated into grid space by the azimuth corrector first,
//! so a compass bearing stays straight on grids with non-square cells.

mod azimuth;
mod horizon;
mod shadow;

pub use azimuth::{fix_azimuth, GridDirection};
pub use horizon::{
    horizon_profile, horizon_profile_into, openness, profile_directions, sky_view_factor,
    AngleSample, HorizonParams, HorizonScanner, OpennessResult,
};
pub use shadow::{
    cast_shadows, EdgeMode, ShadowAlgorithm, ShadowCaster, ShadowParams, ShadowResult, SunVector,
};

/// Nearest grid cell to a fractional (x = column, y = row) position.
#[inline]
pub(crate) fn grid_cell(x: f64, y: f64, rows: usize, cols: usize) -> Option<(usize, usize)> {
    let c = x.round();
    let r = y.round();
    if r >= 0.0 && c >= 0.0 && r < rows as f64 && c < cols as f64 {
        Some((r as usize, c as usize))
    } else {
        None
    }
}
