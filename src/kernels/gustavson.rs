//! Row-wise Gustavson multiplication into a dense-sized output buffer
//!
//! The result is allocated with `n_rows × n_cols` slots. Entry `(r, c)` is
//! accumulated directly at offset `r * n_cols + c`, so no search structure is
//! needed, and row `r` ends at `(r + 1) * n_cols` regardless of how many of its
//! slots were touched. The compactor removes the untouched gaps afterwards.

use std::ops::Range;

use tracing::debug;

use crate::error::Result;
use crate::kernels::{ensure_multipliable, Kernel, Scalar};
use crate::matrix::{compact, Capacity, SparseMatrixCSR};

/// Adds `a_val * b_val` for every `(col, b_val)` pair into the dense row
#[inline]
pub(crate) fn scatter_products<T: Scalar>(
    a_val: T,
    cols: &[usize],
    values: &[T],
    out_values: &mut [T],
    out_cols: &mut [usize],
) {
    for (&col, &b_val) in cols.iter().zip(values) {
        out_values[col] += a_val * b_val;
        out_cols[col] = col;
    }
}

/// Accumulates row `row` of `a × b` into a dense row segment
///
/// `out_values` and `out_cols` are the `b.n_cols` slots that belong to the
/// row. Touched slots get their column index written; untouched ones keep
/// their zero value and are dropped by compaction.
pub fn accumulate_row<T: Scalar>(
    a: &SparseMatrixCSR<T>,
    b: &SparseMatrixCSR<T>,
    row: usize,
    out_values: &mut [T],
    out_cols: &mut [usize],
) {
    let a_row = a.row(row);
    for (&k, &a_val) in a_row.cols.iter().zip(a_row.values) {
        let b_row = b.row(k);
        scatter_products(a_val, b_row.cols, b_row.values, out_values, out_cols);
    }
}

/// Runs `accumulate` for each row in `rows` over its dense slot segment
///
/// `values` and `col_idx` hold exactly `rows.len() * n_cols` slots and
/// `row_ends` holds `row_ptr[rows.start + 1..rows.end + 1]`.
pub(crate) fn fill_dense_rows<T, F>(
    rows: Range<usize>,
    n_cols: usize,
    values: &mut [T],
    col_idx: &mut [usize],
    row_ends: &mut [usize],
    accumulate: F,
) where
    T: Scalar,
    F: Fn(usize, &mut [T], &mut [usize]),
{
    if n_cols == 0 {
        row_ends.fill(0);
        return;
    }

    let segments = values.chunks_mut(n_cols).zip(col_idx.chunks_mut(n_cols));

    for ((row, (row_values, row_cols)), end) in rows.zip(segments).zip(row_ends.iter_mut()) {
        accumulate(row, row_values, row_cols);
        *end = (row + 1) * n_cols;
    }
}

/// Allocates a worst-case result, fills it row by row and compacts it
pub(crate) fn multiply_dense_sized<T, F>(
    a: &SparseMatrixCSR<T>,
    b: &SparseMatrixCSR<T>,
    accumulate: F,
) -> Result<SparseMatrixCSR<T>>
where
    T: Scalar,
    F: Fn(usize, &mut [T], &mut [usize]),
{
    ensure_multipliable(a, b)?;

    let mut result = SparseMatrixCSR::allocate(a.n_rows, b.n_cols, Capacity::WorstCase)?;
    let n_cols = result.n_cols;

    fill_dense_rows(
        0..a.n_rows,
        n_cols,
        &mut result.values,
        &mut result.col_idx,
        &mut result.row_ptr[1..],
        accumulate,
    );

    let removed = compact(&mut result);
    debug!(nnz = result.nnz(), removed, "dense-sized multiplication finished");

    Ok(result)
}

/// Scalar Gustavson kernel without output size prediction
#[derive(Debug, Clone, Copy, Default)]
pub struct GustavsonKernel;

impl<T: Scalar> Kernel<T> for GustavsonKernel {
    fn name(&self) -> &'static str {
        "gustavson"
    }

    fn multiply(
        &self,
        a: &SparseMatrixCSR<T>,
        b: &SparseMatrixCSR<T>,
    ) -> Result<SparseMatrixCSR<T>> {
        multiply_dense_sized(a, b, |row, values, cols| {
            accumulate_row(a, b, row, values, cols)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SpgemmError;

    #[test]
    fn test_reference_scenario() {
        let a = SparseMatrixCSR::new(2, 3, vec![0, 2, 3], vec![0, 1, 2], vec![1.0f32, 2.0, 3.0]);
        let b = SparseMatrixCSR::new(3, 2, vec![0, 1, 1, 2], vec![1, 0], vec![4.0f32, 5.0]);

        let c = GustavsonKernel.multiply(&a, &b).unwrap();

        assert_eq!(c.n_rows, 2);
        assert_eq!(c.n_cols, 2);
        assert_eq!(c.row_ptr, vec![0, 1, 2]);
        assert_eq!(c.col_idx, vec![1, 0]);
        assert_eq!(c.values, vec![4.0, 15.0]);
    }

    #[test]
    fn test_dense_product() {
        // A = [1 2; 0 3], B = [4 5; 6 7] => C = [16 19; 18 21]
        let a = SparseMatrixCSR::new(2, 2, vec![0, 2, 3], vec![0, 1, 1], vec![1, 2, 3]);
        let b = SparseMatrixCSR::new(2, 2, vec![0, 2, 4], vec![0, 1, 0, 1], vec![4, 5, 6, 7]);

        let c = GustavsonKernel.multiply(&a, &b).unwrap();

        assert_eq!(c.row_ptr, vec![0, 2, 4]);
        assert_eq!(c.col_idx, vec![0, 1, 0, 1]);
        assert_eq!(c.values, vec![16, 19, 18, 21]);
    }

    #[test]
    fn test_cancellation_is_compacted() {
        // Row 0 of the product is 1*1 + 1*(-1) = 0 in column 0
        let a = SparseMatrixCSR::new(1, 2, vec![0, 2], vec![0, 1], vec![1i64, 1]);
        let b = SparseMatrixCSR::new(2, 2, vec![0, 1, 3], vec![0, 0, 1], vec![1i64, -1, 5]);

        let c = GustavsonKernel.multiply(&a, &b).unwrap();

        assert_eq!(c.row_ptr, vec![0, 1]);
        assert_eq!(c.col_idx, vec![1]);
        assert_eq!(c.values, vec![5]);
    }

    #[test]
    fn test_incompatible() {
        let a = SparseMatrixCSR::<f32>::zeros(2, 3);
        let b = SparseMatrixCSR::<f32>::zeros(2, 2);
        assert!(matches!(
            GustavsonKernel.multiply(&a, &b),
            Err(SpgemmError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_fill_dense_rows_sets_row_ends() {
        let a = SparseMatrixCSR::<i32>::identity(3);
        let b = SparseMatrixCSR::<i32>::identity(3);
        let mut values = vec![0; 6];
        let mut cols = vec![0; 6];
        let mut ends = vec![0; 2];

        fill_dense_rows(1..3, 3, &mut values, &mut cols, &mut ends, |row, v, c| {
            accumulate_row(&a, &b, row, v, c)
        });

        assert_eq!(ends, vec![6, 9]);
        assert_eq!(values, vec![0, 1, 0, 0, 0, 1]);
        assert_eq!(cols, vec![0, 1, 0, 0, 0, 2]);
    }
}
