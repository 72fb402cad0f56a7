//! Output size prediction for the size-predicted Gustavson kernel

use num_traits::Num;

use crate::error::Result;
use crate::matrix::SparseMatrixCSR;
use crate::utils::try_filled_vec;

/// Predicts an upper bound on the number of nonzeros in `A × B`
///
/// For every inner index `k` the number of entries of A in column `k` times
/// the length of row `k` of B is exactly the number of multiply-accumulate
/// operations Gustavson's algorithm performs for that index. The sum over
/// `k` bounds the number of distinct output entries from above; it
/// overcounts whenever two products land on the same output column.
///
/// The result is clamped to `a.n_rows * b.n_cols`. Sums that would overflow
/// saturate and are clamped the same way.
///
/// The caller must have checked that the matrices can be multiplied.
pub fn predict_nnz<T>(a: &SparseMatrixCSR<T>, b: &SparseMatrixCSR<T>) -> Result<usize>
where
    T: Copy + Num,
{
    let max_nnz = a.n_rows.saturating_mul(b.n_cols);

    let mut col_count_a = try_filled_vec(a.n_cols, 0usize)?;
    for &col in &a.col_idx {
        col_count_a[col] += 1;
    }

    let predicted = col_count_a
        .iter()
        .zip(b.row_ptr.windows(2))
        .map(|(&count, bounds)| count.saturating_mul(bounds[1] - bounds[0]))
        .fold(0usize, usize::saturating_add);

    Ok(predicted.min(max_nnz))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prediction_counts_products() {
        // A = [1 2; 0 3], B = [4 5; 6 7]
        let a = SparseMatrixCSR::new(2, 2, vec![0, 2, 3], vec![0, 1, 1], vec![1, 2, 3]);
        let b = SparseMatrixCSR::new(2, 2, vec![0, 2, 4], vec![0, 1, 0, 1], vec![4, 5, 6, 7]);

        // column 0 of A: 1 entry * 2, column 1 of A: 2 entries * 2 = 6, clamped to 4
        assert_eq!(predict_nnz(&a, &b).unwrap(), 4);
    }

    #[test]
    fn test_prediction_for_sparse_operands() {
        let a = SparseMatrixCSR::new(2, 3, vec![0, 2, 3], vec![0, 1, 2], vec![1.0, 2.0, 3.0]);
        let b = SparseMatrixCSR::new(3, 2, vec![0, 1, 1, 2], vec![1, 0], vec![4.0, 5.0]);

        // col 0 * row 0 = 1, col 1 * row 1 = 0, col 2 * row 2 = 1
        assert_eq!(predict_nnz(&a, &b).unwrap(), 2);
    }

    #[test]
    fn test_prediction_empty_operand() {
        let a = SparseMatrixCSR::<f32>::zeros(100, 100);
        let b = SparseMatrixCSR::<f32>::identity(100);
        assert_eq!(predict_nnz(&a, &b).unwrap(), 0);
    }

    #[test]
    fn test_prediction_overcounts_collisions() {
        // Both products of row 0 land on column 0 of the result
        let a = SparseMatrixCSR::new(1, 2, vec![0, 2], vec![0, 1], vec![1, 1]);
        let b = SparseMatrixCSR::new(2, 3, vec![0, 1, 2], vec![0, 0], vec![1, 1]);
        assert_eq!(predict_nnz(&a, &b).unwrap(), 2);
    }
}
