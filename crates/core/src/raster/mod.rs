//! Raster data structures

mod element;
mod extent;
mod grid;

pub use element::RasterElement;
pub use extent::Extent;
pub use grid::{Raster, RasterStatistics};
