//! # SkyShade Algorithms
//!
//! Terrain ray-marching analyses over a DEM:
//!
//! - **Shadow caster**: shade intensity for a sun position, by per-cell
//!   ray march or per-edge sweep
//! - **Horizon scanner**: positive and negative openness from horizon
//!   angles in several directions
//!
//! Both read a [`skyshade_core::Raster<f32>`] and return rasters of the same
//! shape, together with the provenance identifier for the grid writer.

pub mod terrain;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::terrain::{
        cast_shadows, sky_view_factor, EdgeMode, HorizonParams, HorizonScanner, OpennessResult,
        ShadowAlgorithm, ShadowCaster, ShadowParams, ShadowResult,
    };
    pub use skyshade_core::prelude::*;
}
