//! # SkyShade Core
//!
//! Core types for the SkyShade terrain ray-marching engine.
//!
//! This crate provides:
//! - `Raster<T>`: row-major elevation grid with its `Extent`
//! - Projection classification and ground cell spacing
//! - The `Algorithm` trait shared by the terrain analyses
//! - The provenance identifier stamped on every output

pub mod error;
pub mod projection;
pub mod raster;

pub use error::{Error, Result};
pub use projection::{
    Advisory, CellSpacing, GridGeometry, MercatorBounds, ProjectionType,
};
pub use raster::{Extent, Raster, RasterElement};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::projection::{GridGeometry, MercatorBounds, ProjectionType};
    pub use crate::raster::{Extent, Raster, RasterElement};
    pub use crate::Algorithm;
}

/// Name written into output headers
pub const SOFTWARE_NAME: &str = "SkyShade";

/// Software/provenance identifier handed to grid writers with every output.
pub fn software_id() -> String {
    format!("{} v{}", SOFTWARE_NAME, env!("CARGO_PKG_VERSION"))
}

/// Core trait for all algorithms in SkyShade.
///
/// Algorithms are pure functions that transform input data according to parameters.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm. Inputs are borrowed: a DEM is read-only for the run.
    fn execute(&self, input: &Self::Input, params: Self::Params) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: &Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
