//! Main Raster type

use crate::error::{Error, Result};
use crate::raster::{Extent, RasterElement};
use ndarray::Array2;

/// An elevation (or derived) grid with its horizontal extent.
///
/// `Raster<T>` stores values of type `T` row-major, row 0 being the
/// northern edge. Voids carry the [`RasterElement::void`] sentinel.
///
/// # Example
///
/// ```ignore
/// use skyshade_core::{Extent, Raster};
///
/// let extent = Extent::new(500_000.0, 500_300.0, 4_100_000.0, 4_100_300.0)?;
/// let dem = Raster::from_elevations(elevations, 10, 10, extent)?;
/// let z = dem.get(3, 4)?;
/// ```
#[derive(Debug, Clone)]
pub struct Raster<T: RasterElement> {
    /// Cell values in row-major order (row, col)
    data: Array2<T>,
    /// Native-unit bounding box
    extent: Extent,
}

impl<T: RasterElement> Raster<T> {
    /// Create a new raster filled with zeros on a unit extent
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::filled(rows, cols, T::zero())
    }

    /// Create a new raster filled with a specific value on a unit extent
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self {
            data: Array2::from_elem((rows, cols), value),
            extent: Extent::unit(rows, cols),
        }
    }

    /// Create a raster from a flat row-major buffer on a unit extent
    pub fn from_vec(data: Vec<T>, rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 || data.len() != rows * cols {
            return Err(Error::InvalidDimensions {
                width: cols,
                height: rows,
            });
        }

        let array = Array2::from_shape_vec((rows, cols), data)
            .map_err(|e| Error::Other(e.to_string()))?;

        Ok(Self {
            extent: Extent::unit(rows, cols),
            data: array,
        })
    }

    /// Create a raster from the buffer, shape and extent handed over by a
    /// grid reader.
    pub fn from_elevations(data: Vec<T>, rows: usize, cols: usize, extent: Extent) -> Result<Self> {
        let mut raster = Self::from_vec(data, rows, cols)?;
        raster.extent = extent;
        Ok(raster)
    }

    /// Allocate a `rows × cols` output buffer, reporting exhaustion as an error
    /// instead of aborting.
    pub fn buffer(rows: usize, cols: usize, fill: T) -> Result<Vec<T>> {
        let cells = rows
            .checked_mul(cols)
            .ok_or(Error::InvalidDimensions { width: cols, height: rows })?;
        let mut buf = Vec::new();
        buf.try_reserve_exact(cells)
            .map_err(|_| Error::Allocation { cells })?;
        buf.resize(cells, fill);
        Ok(buf)
    }

    // Dimensions

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the raster is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    // Data access

    /// Get value at (row, col)
    pub fn get(&self, row: usize, col: usize) -> Result<T> {
        self.data
            .get((row, col))
            .copied()
            .ok_or(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            })
    }

    /// Get value at (row, col) without bounds checking
    ///
    /// # Safety
    /// Caller must ensure row < self.rows() and col < self.cols()
    #[inline]
    pub unsafe fn get_unchecked(&self, row: usize, col: usize) -> T {
        unsafe { *self.data.uget((row, col)) }
    }

    /// Set value at (row, col)
    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        if row >= self.rows() || col >= self.cols() {
            return Err(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            });
        }
        self.data[(row, col)] = value;
        Ok(())
    }

    /// Get a reference to the underlying array
    pub fn data(&self) -> &Array2<T> {
        &self.data
    }

    /// Consume the raster and return the flat row-major buffer for a writer
    pub fn into_vec(self) -> Vec<T> {
        let (vec, _offset) = self.data.into_raw_vec_and_offset();
        vec
    }

    // Metadata

    /// Get the extent
    pub fn extent(&self) -> &Extent {
        &self.extent
    }

    // Statistics

    /// Elevation range and void count, skipping voids
    pub fn statistics(&self) -> RasterStatistics<T> {
        let mut min: Option<T> = None;
        let mut max: Option<T> = None;
        let mut count: usize = 0;

        for &value in self.data.iter() {
            if value.is_void() {
                continue;
            }

            if min.map_or(true, |m| value < m) {
                min = Some(value);
            }
            if max.map_or(true, |m| value > m) {
                max = Some(value);
            }

            count += 1;
        }

        RasterStatistics {
            min,
            max,
            valid_count: count,
            void_count: self.len() - count,
        }
    }
}

/// Elevation range and cell counts of a raster
#[derive(Debug, Clone)]
pub struct RasterStatistics<T> {
    pub min: Option<T>,
    pub max: Option<T>,
    pub valid_count: usize,
    pub void_count: usize,
}
