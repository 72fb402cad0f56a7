//! Gustavson multiplication with a predicted output size
//!
//! Instead of reserving `n_rows × n_cols` slots, the result is allocated at
//! the size returned by [`predict_nnz`]. Each output row is built by
//! append-or-merge: a product is added to the entry of the same column if
//! the row already has one, otherwise it is appended at the row's end.

use tracing::debug;

use crate::error::Result;
use crate::kernels::{ensure_multipliable, Kernel, Scalar};
use crate::matrix::{compact, predict_nnz, Capacity, SparseMatrixCSR};

/// Size-predicted Gustavson kernel
#[derive(Debug, Clone, Copy, Default)]
pub struct PredictedKernel;

impl<T: Scalar> Kernel<T> for PredictedKernel {
    fn name(&self) -> &'static str {
        "predicted"
    }

    fn multiply(
        &self,
        a: &SparseMatrixCSR<T>,
        b: &SparseMatrixCSR<T>,
    ) -> Result<SparseMatrixCSR<T>> {
        ensure_multipliable(a, b)?;

        let predicted = predict_nnz(a, b)?;
        debug!(predicted, "allocating size-predicted result");

        let mut result =
            SparseMatrixCSR::allocate(a.n_rows, b.n_cols, Capacity::Predicted(predicted))?;

        // `end` never passes `predicted`: every append is one of the counted products
        let mut end = 0;
        for row in 0..a.n_rows {
            let row_begin = end;
            let a_row = a.row(row);

            for (&k, &a_val) in a_row.cols.iter().zip(a_row.values) {
                let b_row = b.row(k);

                for (&col, &b_val) in b_row.cols.iter().zip(b_row.values) {
                    let product = a_val * b_val;

                    match result.col_idx[row_begin..end].iter().position(|&c| c == col) {
                        Some(offset) => result.values[row_begin + offset] += product,
                        None => {
                            result.values[end] = product;
                            result.col_idx[end] = col;
                            end += 1;
                        }
                    }
                }
            }

            result.row_ptr[row + 1] = end;
        }

        result.values.truncate(end);
        result.col_idx.truncate(end);

        // Products can still cancel to an exact zero
        let removed = compact(&mut result);
        debug!(predicted, nnz = result.nnz(), removed, "size-predicted multiplication finished");

        Ok(result)
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

        let c = PredictedKernel.multiply(&a, &b).unwrap();

        assert_eq!(c.row_ptr, vec![0, 1, 2]);
        assert_eq!(c.col_idx, vec![1, 0]);
        assert_eq!(c.values, vec![4.0, 15.0]);
    }

    #[test]
    fn test_merges_repeated_columns() {
        // Both products of the single row land on column 2
        let a = SparseMatrixCSR::new(1, 2, vec![0, 2], vec![0, 1], vec![2, 3]);
        let b = SparseMatrixCSR::new(2, 3, vec![0, 2, 3], vec![2, 0, 2], vec![1, 4, 5]);

        let c = PredictedKernel.multiply(&a, &b).unwrap();

        // Entries keep first-appearance order: column 2, then column 0
        assert_eq!(c.row_ptr, vec![0, 2]);
        assert_eq!(c.col_idx, vec![2, 0]);
        assert_eq!(c.values, vec![2 + 15, 8]);
    }

    #[test]
    fn test_buffers_shrink_to_true_size() {
        let a = SparseMatrixCSR::new(1, 2, vec![0, 2], vec![0, 1], vec![1, 1]);
        let b = SparseMatrixCSR::new(2, 3, vec![0, 1, 2], vec![0, 0], vec![1, 1]);

        let c = PredictedKernel.multiply(&a, &b).unwrap();

        assert_eq!(c.nnz(), 1);
        assert_eq!(c.col_idx.len(), 1);
        assert_eq!(c.values, vec![2]);
    }

    #[test]
    fn test_empty_product() {
        let a = SparseMatrixCSR::<f64>::zeros(4, 4);
        let b = SparseMatrixCSR::<f64>::identity(4);

        let c = PredictedKernel.multiply(&a, &b).unwrap();

        assert_eq!(c.nnz(), 0);
        assert_eq!(c.row_ptr, vec![0; 5]);
    }

    #[test]
    fn test_cancellation_is_compacted() {
        let a = SparseMatrixCSR::new(2, 2, vec![0, 2, 3], vec![0, 1, 1], vec![1i64, 1, 2]);
        let b = SparseMatrixCSR::new(2, 2, vec![0, 1, 3], vec![0, 0, 1], vec![1i64, -1, 5]);

        let c = PredictedKernel.multiply(&a, &b).unwrap();

        assert_eq!(c.row_ptr, vec![0, 1, 3]);
        assert_eq!(c.col_idx, vec![1, 0, 1]);
        assert_eq!(c.values, vec![5, -2, 10]);
    }

    #[test]
    fn test_incompatible() {
        let a = SparseMatrixCSR::<f32>::zeros(2, 3);
        let b = SparseMatrixCSR::<f32>::zeros(2, 2);
        assert!(matches!(
            PredictedKernel.multiply(&a, &b),
            Err(SpgemmError::DimensionMismatch { .. })
        ));
    }
}
