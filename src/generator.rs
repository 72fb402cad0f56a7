//! Seeded random CSR matrices for tests, benchmarks and the `generate` command

use num_traits::FromPrimitive;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::constants::MAX_GENERATED_VALUE;
use crate::error::{Result, SpgemmError, ValidationError};
use crate::kernels::Scalar;
use crate::matrix::SparseMatrixCSR;
use crate::utils::row_ptr_len;

/// Generates a random `n_rows × n_cols` matrix
///
/// Each row holds on average `density * n_cols` entries at distinct columns,
/// stored in ascending column order. Values are drawn uniformly from
/// `1..=100`, so no zero is ever stored. The same seed always yields the same
/// matrix. `density` is clamped to `[0, 1]`; NaN counts as 0.
///
/// # Errors
///
/// [`SpgemmError::Validation`] if a dimension is zero.
pub fn generate<T>(n_rows: usize, n_cols: usize, density: f64, seed: u64) -> Result<SparseMatrixCSR<T>>
where
    T: Scalar + FromPrimitive,
{
    if n_rows == 0 || n_cols == 0 {
        return Err(ValidationError::ZeroInShape { n_rows, n_cols }.into());
    }

    let density = if density.is_nan() { 0.0 } else { density.clamp(0.0, 1.0) };
    let per_row = density * n_cols as f64;
    let whole = per_row.floor();
    let fraction = per_row - whole;
    let whole = whole as usize;

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let ptr_len = row_ptr_len(n_rows)?;
    let mut row_ptr = Vec::new();
    row_ptr
        .try_reserve_exact(ptr_len)
        .map_err(|_| SpgemmError::Allocation { requested: ptr_len })?;
    let mut col_idx = Vec::new();
    let mut values = Vec::new();
    row_ptr.push(0);

    for _ in 0..n_rows {
        let extra = usize::from(rng.gen_bool(fraction));
        let count = (whole + extra).min(n_cols);

        let mut cols = index::sample(&mut rng, n_cols, count).into_vec();
        cols.sort_unstable();

        for col in cols {
            let raw = rng.gen_range(1..=MAX_GENERATED_VALUE);
            let value = T::from_u32(raw).ok_or_else(|| SpgemmError::Conversion {
                reason: format!("{} does not fit the element type", raw),
            })?;
            col_idx.push(col);
            values.push(value);
        }
        row_ptr.push(col_idx.len());
    }

    debug!(n_rows, n_cols, nnz = values.len(), seed, "generated random matrix");
    Ok(SparseMatrixCSR {
        n_rows,
        n_cols,
        row_ptr,
        col_idx,
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::validate;

    #[test]
    fn test_generated_matrix_is_valid() {
        let m: SparseMatrixCSR<f32> = generate(50, 30, 0.2, 7).unwrap();
        assert!(validate(&m).is_ok());
        assert!(m.values.iter().all(|&v| (1.0..=100.0).contains(&v)));
    }

    #[test]
    fn test_rows_are_sorted_and_distinct() {
        let m: SparseMatrixCSR<i32> = generate(40, 40, 0.5, 11).unwrap();
        for row in 0..m.n_rows {
            let cols = m.row(row).cols;
            assert!(cols.windows(2).all(|w| w[0] < w[1]), "row {}", row);
        }
    }

    #[test]
    fn test_same_seed_same_matrix() {
        let a: SparseMatrixCSR<f64> = generate(20, 25, 0.3, 42).unwrap();
        let b: SparseMatrixCSR<f64> = generate(20, 25, 0.3, 42).unwrap();
        assert_eq!(a.row_ptr, b.row_ptr);
        assert_eq!(a.col_idx, b.col_idx);
        assert_eq!(a.values, b.values);
    }

    #[test]
    fn test_density_extremes() {
        let empty: SparseMatrixCSR<u32> = generate(5, 5, 0.0, 1).unwrap();
        assert_eq!(empty.nnz(), 0);

        let full: SparseMatrixCSR<u32> = generate(5, 5, 1.0, 1).unwrap();
        assert_eq!(full.nnz(), 25);

        let clamped: SparseMatrixCSR<u32> = generate(5, 5, 3.0, 1).unwrap();
        assert_eq!(clamped.nnz(), 25);
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let result: Result<SparseMatrixCSR<f32>> = generate(0, 5, 0.5, 1);
        assert!(matches!(
            result,
            Err(SpgemmError::Validation(ValidationError::ZeroInShape { .. }))
        ));
    }

    #[test]
    fn test_unrepresentable_row_count_is_reported() {
        let result: Result<SparseMatrixCSR<f32>> = generate(usize::MAX, 1, 0.0, 1);
        assert!(matches!(result, Err(SpgemmError::Allocation { .. })));
    }
}
