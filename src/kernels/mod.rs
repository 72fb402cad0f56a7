//! Multiplication kernels
//!
//! Every kernel implements the same [`Kernel::multiply`] contract: check that
//! the operands can be multiplied, allocate the result, compute it, and hand
//! back a CSR matrix that stores no zeros. They differ in how the output is
//! sized and how the inner loop is executed.
//!
//! | id | kernel | output sizing |
//! |----|--------|---------------|
//! | 0 | [`crate::parallel::ParallelKernel`] (or [`PredictedKernel`] below the thresholds) | dense worst case |
//! | 1 | [`DenseKernel`] | dense arrays |
//! | 2 | [`GustavsonKernel`] | dense worst case |
//! | 3 | [`SimdKernel<4>`] | dense worst case |
//! | 4 | [`SimdKernel<8>`] (or [`DenseKernel`] without 8-lane hardware) | dense worst case |
//! | 5 | [`PredictedKernel`] | predicted |

pub mod dense;
pub mod gustavson;
pub mod predicted;
pub mod simd;

use std::fmt;

use crate::error::{Result, SpgemmError};
use crate::matrix::SparseMatrixCSR;

pub use dense::DenseKernel;
pub use gustavson::{accumulate_row, GustavsonKernel};
pub use predicted::PredictedKernel;
pub use simd::{accumulate_row_lanes, Scalar, SimdKernel};

/// A sparse matrix multiplication strategy
pub trait Kernel<T: Scalar> {
    /// Short human-readable name used in logs
    fn name(&self) -> &'static str;

    /// Computes `a × b`
    ///
    /// # Errors
    ///
    /// [`SpgemmError::DimensionMismatch`] before anything is allocated if the
    /// operands are incompatible, otherwise whatever the kernel's allocation
    /// or execution strategy can fail with.
    fn multiply(&self, a: &SparseMatrixCSR<T>, b: &SparseMatrixCSR<T>)
        -> Result<SparseMatrixCSR<T>>;
}

/// Selectable multiplication implementations, by their numeric id
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Multithreaded Gustavson, or size-predicted Gustavson for small inputs
    #[default]
    Main = 0,
    /// Dense triple loop, the correctness baseline
    Dense = 1,
    /// Scalar Gustavson with a dense-sized output buffer
    Gustavson = 2,
    /// Gustavson with 4-lane batches
    Simd4 = 3,
    /// Gustavson with 8-lane batches
    Simd8 = 4,
    /// Gustavson with a predicted output size
    Predicted = 5,
}

impl Algorithm {
    /// All implementations in id order
    pub const ALL: [Algorithm; 6] = [
        Algorithm::Main,
        Algorithm::Dense,
        Algorithm::Gustavson,
        Algorithm::Simd4,
        Algorithm::Simd8,
        Algorithm::Predicted,
    ];

    /// Numeric id of the implementation
    pub fn id(&self) -> u8 {
        *self as u8
    }
}

impl TryFrom<u8> for Algorithm {
    type Error = SpgemmError;

    fn try_from(id: u8) -> Result<Self> {
        Algorithm::ALL
            .get(usize::from(id))
            .copied()
            .ok_or(SpgemmError::InvalidAlgorithm(id))
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Algorithm::Main => "main",
            Algorithm::Dense => "dense",
            Algorithm::Gustavson => "gustavson",
            Algorithm::Simd4 => "simd-4",
            Algorithm::Simd8 => "simd-8",
            Algorithm::Predicted => "predicted",
        };
        write!(f, "V{} ({})", self.id(), name)
    }
}

/// Whether `a × b` is defined: `a.n_cols == b.n_rows` and no dimension is zero
pub fn can_multiply<T>(a: &SparseMatrixCSR<T>, b: &SparseMatrixCSR<T>) -> bool {
    a.n_cols == b.n_rows && a.n_rows >= 1 && a.n_cols >= 1 && b.n_rows >= 1 && b.n_cols >= 1
}

/// Fails with [`SpgemmError::DimensionMismatch`] unless `a × b` is defined
pub fn ensure_multipliable<T>(a: &SparseMatrixCSR<T>, b: &SparseMatrixCSR<T>) -> Result<()> {
    if can_multiply(a, b) {
        Ok(())
    } else {
        Err(SpgemmError::DimensionMismatch {
            a_rows: a.n_rows,
            a_cols: a.n_cols,
            b_rows: b.n_rows,
            b_cols: b.n_cols,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_algorithm_ids() {
        for (id, algorithm) in Algorithm::ALL.iter().enumerate() {
            assert_eq!(algorithm.id() as usize, id);
            assert_eq!(Algorithm::try_from(id as u8).unwrap(), *algorithm);
        }
        assert!(matches!(
            Algorithm::try_from(6),
            Err(SpgemmError::InvalidAlgorithm(6))
        ));
        assert_eq!(Algorithm::default(), Algorithm::Main);
    }

    #[test]
    fn test_can_multiply() {
        let a = SparseMatrixCSR::<f32>::zeros(2, 3);
        let b = SparseMatrixCSR::<f32>::zeros(3, 2);
        let c = SparseMatrixCSR::<f32>::zeros(2, 2);

        assert!(can_multiply(&a, &b));
        assert!(can_multiply(&b, &a));
        assert!(!can_multiply(&a, &c));
    }

    #[test]
    fn test_zero_dimension_is_incompatible() {
        let a = SparseMatrixCSR::<f32>::zeros(0, 3);
        let b = SparseMatrixCSR::<f32>::zeros(3, 2);
        assert!(!can_multiply(&a, &b));

        let a = SparseMatrixCSR::<f32>::zeros(2, 3);
        let b = SparseMatrixCSR::<f32>::zeros(3, 0);
        assert!(matches!(
            ensure_multipliable(&a, &b),
            Err(SpgemmError::DimensionMismatch { b_cols: 0, .. })
        ));
    }
}
