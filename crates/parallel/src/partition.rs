//! Static row partitioning

use std::fmt;
use std::ops::Range;

/// Index of a worker task within a pool run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerId(usize);

impl WorkerId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "worker-{}", self.0)
    }
}

/// A contiguous range of rows owned by one worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowBlock {
    pub worker: WorkerId,
    pub rows: Range<usize>,
}

impl RowBlock {
    /// Number of rows in the block
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Split `nrows` rows into `workers` contiguous blocks.
///
/// Worker `id` owns `[id·nrows/workers, (id+1)·nrows/workers)`. Blocks are
/// returned in row order, cover every row exactly once, and differ in size
/// by at most one row. With more workers than rows some blocks are empty.
pub fn partition_rows(nrows: usize, workers: usize) -> Vec<RowBlock> {
    let workers = workers.max(1);
    let bound = |id: usize| ((id as u128 * nrows as u128) / workers as u128) as usize;

    (0..workers)
        .map(|id| RowBlock {
            worker: WorkerId::new(id),
            rows: bound(id).min(nrows)..bound(id + 1).min(nrows),
        })
        .collect()
}
