//! Fixed worker pool over disjoint row blocks

use crate::partition::{partition_rows, RowBlock};
use skyshade_core::{Error, Result};
use std::time::Instant;

/// Output buffers that can be cut into disjoint leading row ranges.
///
/// Implemented for row-major slices and for pairs of them, so an analysis
/// with two output rasters hands each worker both of its row ranges.
pub trait RowChunks: Send + Sized {
    /// Split off the first `rows` rows, each `cols` cells wide.
    fn split_rows(self, rows: usize, cols: usize) -> (Self, Self);
}

impl<T: Send> RowChunks for &mut [T] {
    fn split_rows(self, rows: usize, cols: usize) -> (Self, Self) {
        self.split_at_mut(rows * cols)
    }
}

impl<A: RowChunks, B: RowChunks> RowChunks for (A, B) {
    fn split_rows(self, rows: usize, cols: usize) -> (Self, Self) {
        let (a_head, a_tail) = self.0.split_rows(rows, cols);
        let (b_head, b_tail) = self.1.split_rows(rows, cols);
        ((a_head, b_head), (a_tail, b_tail))
    }
}

/// A fixed pool of OS threads that processes a raster in static row blocks.
///
/// Each run partitions the rows with [`partition_rows`] and dispatches one
/// task per block. A task receives its [`RowBlock`] and exclusive access to
/// that block's rows of every output buffer; the input is shared read-only
/// through the closure. There is no work stealing between blocks, so the
/// result never depends on scheduling.
pub struct RowPool {
    pool: rayon::ThreadPool,
    workers: usize,
}

impl RowPool {
    /// Build a pool with `workers` threads.
    pub fn new(workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(Error::invalid_parameter(
                "workers",
                workers,
                "at least one worker is required",
            ));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("skyshade-worker-{i}"))
            .build()
            .map_err(|e| Error::ThreadPool(e.to_string()))?;

        Ok(Self { pool, workers })
    }

    /// Run `work` over every row block of an `nrows × cols` raster and
    /// block until all blocks have finished.
    pub fn run<O, F>(&self, nrows: usize, cols: usize, outputs: O, work: F)
    where
        O: RowChunks,
        F: Fn(&RowBlock, O) + Sync,
    {
        let blocks = partition_rows(nrows, self.workers);
        let work = &work;

        self.pool.scope(|scope| {
            let mut rest = outputs;
            for block in &blocks {
                let (mine, tail) = rest.split_rows(block.len(), cols);
                rest = tail;
                if block.is_empty() {
                    continue;
                }
                scope.spawn(move |_| {
                    let started = Instant::now();
                    work(block, mine);
                    tracing::debug!(
                        worker = %block.worker,
                        rows = ?block.rows,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "row block done"
                    );
                });
            }
        });
    }
}

/// Get the number of available CPU cores
pub fn default_workers() -> usize {
    rayon::current_num_threads()
}
