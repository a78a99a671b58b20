//! # SkyShade Parallel
//!
//! Row-partitioned worker pool shared by the terrain analyses.
//!
//! Rows are split statically into one contiguous block per worker. Workers
//! read the shared input and write only their own block of each output,
//! so no locking is needed and results are identical for any worker count.

pub mod partition;
pub mod pool;

pub use partition::{partition_rows, RowBlock, WorkerId};
pub use pool::{default_workers, RowChunks, RowPool};
