//! # Multithreaded Gustavson multiplication
//!
//! The result is allocated at the dense worst case and split into contiguous,
//! non-overlapping row blocks, one per worker. Each worker owns the value,
//! column and row-pointer slices of its block exclusively, so no two workers
//! ever write the same memory and no synchronization is needed. A and B are
//! shared read-only. Workers are plain OS threads spawned per call inside a
//! [`std::thread::scope`]; the calling thread blocks until all of them have
//! joined and then compacts the result once.

use std::ops::Range;
use std::thread;

use tracing::{debug, trace};

use crate::error::{Result, SpgemmError};
use crate::kernels::gustavson::{accumulate_row, fill_dense_rows};
use crate::kernels::{ensure_multipliable, Kernel, Scalar};
use crate::matrix::{compact, Capacity, SparseMatrixCSR, SpgemmConfig};

/// Decides how many workers to spawn for a matrix with `n_rows` rows
///
/// `clamp(min(n_rows / 40, n_rows / 4, hardware_threads), 2, n_rows)`, with
/// the thresholds and hardware thread count taken from `config`.
pub fn thread_count(n_rows: usize, config: &SpgemmConfig) -> usize {
    let by_values = n_rows / config.rows_per_thread.max(1);
    let by_rows = n_rows / config.min_rows_per_thread.max(1);

    by_values
        .min(by_rows)
        .min(config.system_params.n_threads)
        .max(config.min_threads)
        .min(n_rows)
}

/// Splits `0..n_rows` into `n_threads` contiguous ranges
///
/// The first `n_rows % n_threads` ranges get one extra row; the last range
/// always ends at `n_rows`. A thread count of zero is treated as one.
pub fn partition_rows(n_rows: usize, n_threads: usize) -> Vec<Range<usize>> {
    let n_threads = n_threads.max(1);
    let step = n_rows / n_threads;
    let rest = n_rows % n_threads;

    let mut ranges = Vec::with_capacity(n_threads);
    let mut prev = 0;
    for worker in 0..n_threads {
        let len = if worker < rest { step + 1 } else { step };
        ranges.push(prev..prev + len);
        prev += len;
    }

    if let Some(last) = ranges.last_mut() {
        last.end = n_rows;
    }

    ranges
}

/// One worker's exclusive share of the result buffer
struct RowBlock<'a, T> {
    rows: Range<usize>,
    values: &'a mut [T],
    col_idx: &'a mut [usize],
    row_ends: &'a mut [usize],
}

/// Carves the result buffers into one disjoint block per partition range
fn split_blocks<'a, T>(
    partition: &[Range<usize>],
    n_cols: usize,
    mut values: &'a mut [T],
    mut col_idx: &'a mut [usize],
    mut row_ends: &'a mut [usize],
) -> Vec<RowBlock<'a, T>> {
    let mut blocks = Vec::with_capacity(partition.len());

    for rows in partition {
        let slots = rows.len() * n_cols;

        let (block_values, rest_values) = std::mem::take(&mut values).split_at_mut(slots);
        let (block_cols, rest_cols) = std::mem::take(&mut col_idx).split_at_mut(slots);
        let (block_ends, rest_ends) = std::mem::take(&mut row_ends).split_at_mut(rows.len());
        values = rest_values;
        col_idx = rest_cols;
        row_ends = rest_ends;

        blocks.push(RowBlock {
            rows: rows.clone(),
            values: block_values,
            col_idx: block_cols,
            row_ends: block_ends,
        });
    }

    blocks
}

fn multiply_block<T: Scalar>(
    a: &SparseMatrixCSR<T>,
    b: &SparseMatrixCSR<T>,
    n_cols: usize,
    block: RowBlock<'_, T>,
) {
    trace!(start = block.rows.start, end = block.rows.end, "worker started");
    fill_dense_rows(
        block.rows,
        n_cols,
        block.values,
        block.col_idx,
        block.row_ends,
        |row, values, cols| accumulate_row(a, b, row, values, cols),
    );
}

/// Row-partitioned multithreaded Gustavson kernel
#[derive(Debug, Clone, Copy)]
pub struct ParallelKernel<'c> {
    config: &'c SpgemmConfig,
}

impl<'c> ParallelKernel<'c> {
    pub fn new(config: &'c SpgemmConfig) -> Self {
        Self { config }
    }
}

impl<'c, T: Scalar> Kernel<T> for ParallelKernel<'c> {
    fn name(&self) -> &'static str {
        "parallel"
    }

    fn multiply(
        &self,
        a: &SparseMatrixCSR<T>,
        b: &SparseMatrixCSR<T>,
    ) -> Result<SparseMatrixCSR<T>> {
        ensure_multipliable(a, b)?;

        let mut result = SparseMatrixCSR::allocate(a.n_rows, b.n_cols, Capacity::WorstCase)?;
        let n_cols = result.n_cols;

        let n_threads = thread_count(a.n_rows, self.config);
        let partition = partition_rows(a.n_rows, n_threads);
        debug!(n_threads, n_rows = a.n_rows, "spawning multiplication workers");

        let blocks = split_blocks(
            &partition,
            n_cols,
            &mut result.values,
            &mut result.col_idx,
            &mut result.row_ptr[1..],
        );

        // Leaving the scope joins every worker spawned so far, including
        // when a later spawn fails
        thread::scope(|scope| {
            let mut handles = Vec::with_capacity(blocks.len());

            for (worker, block) in blocks.into_iter().enumerate() {
                let handle = thread::Builder::new()
                    .name(format!("csrmult-worker-{}", worker))
                    .spawn_scoped(scope, move || multiply_block(a, b, n_cols, block))
                    .map_err(SpgemmError::ThreadStart)?;
                handles.push(handle);
            }

            for handle in handles {
                if let Err(payload) = handle.join() {
                    std::panic::resume_unwind(payload);
                }
            }

            Ok::<(), SpgemmError>(())
        })?;

        let removed = compact(&mut result);
        debug!(nnz = result.nnz(), removed, "multithreaded multiplication finished");

        Ok(result)
    }
}
