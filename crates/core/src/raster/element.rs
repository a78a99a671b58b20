//! Elevation cell value trait

use num_traits::{Float, NumCast};
use std::fmt::Debug;

/// Trait for floating point types that can hold an elevation sample.
///
/// Voids are marked with [`RasterElement::void`], the ESRI float grid
/// NODATA value (`-3.4028235e38`). NaN is treated as void as well so
/// grids coming from other readers need no conversion pass.
pub trait RasterElement:
    Float + Copy + Debug + PartialOrd + NumCast + Send + Sync + 'static
{
    /// The NODATA sentinel for this type
    fn void() -> Self;

    /// Any value at or below this bound is treated as void.
    fn void_floor() -> Self;

    /// Check if this value represents a void sample
    #[inline]
    fn is_void(self) -> bool {
        self.is_nan() || self <= Self::void_floor()
    }

    /// Widen to `f64` for ray marching arithmetic
    #[inline]
    fn as_f64(self) -> f64 {
        NumCast::from(self).unwrap_or(f64::NAN)
    }

    /// Narrow from `f64` when writing an output cell
    #[inline]
    fn from_f64(value: f64) -> Self {
        NumCast::from(value).unwrap_or_else(Self::void)
    }
}

impl RasterElement for f32 {
    fn void() -> Self {
        -3.402_823_5e38
    }

    fn void_floor() -> Self {
        -1.0e38
    }
}

impl RasterElement for f64 {
    fn void() -> Self {
        -3.402_823_47e38
    }

    fn void_floor() -> Self {
        -1.0e38
    }
}
