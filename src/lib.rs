//! # csrmult: sparse matrix multiplication in CSR format
//!
//! Multiplies two sparse matrices stored in Compressed Sparse Row format and
//! returns a third one. Six interchangeable implementations trade memory use,
//! vectorization and parallelism against each other.
//!
//! ## Overview
//!
//! - **Data model**: [`SparseMatrixCSR`] with a [`validate`] pass for inputs
//!   coming from outside
//! - **Kernels**: dense reference, scalar Gustavson, 4- and 8-lane batched
//!   Gustavson, size-predicted Gustavson and a multithreaded Gustavson, all
//!   behind the [`Kernel`] trait
//! - **Dispatch**: [`multiply`] picks a kernel from an [`Algorithm`] and
//!   applies the runtime fallbacks
//! - **Post-processing**: every result is compacted so it stores no zeros
//!
//! ## Usage
//!
//! ```
//! use csrmult::{multiply, Algorithm, SparseMatrixCSR};
//!
//! // A = [1 2 0; 0 0 3], B = [0 4; 0 0; 5 0]
//! let a = SparseMatrixCSR::new(2, 3, vec![0, 2, 3], vec![0, 1, 2], vec![1.0f32, 2.0, 3.0]);
//! let b = SparseMatrixCSR::new(3, 2, vec![0, 1, 1, 2], vec![1, 0], vec![4.0f32, 5.0]);
//!
//! let c = multiply(&a, &b, Algorithm::Main).unwrap();
//! assert_eq!(c.row_ptr, vec![0, 1, 2]);
//! assert_eq!(c.col_idx, vec![1, 0]);
//! assert_eq!(c.values, vec![4.0, 15.0]);
//! ```

pub mod constants;
pub mod error;
pub mod generator;
pub mod io;
pub mod kernels;
pub mod matrix;
pub mod parallel;
pub mod utils;

use tracing::{debug, warn};

// Re-export primary components
pub use error::{MatrixFileError, Result, SpgemmError, ValidationError};
pub use generator::generate;
pub use io::{read_matrix, read_matrix_file, write_matrix, write_matrix_file};
pub use kernels::{
    can_multiply, Algorithm, DenseKernel, GustavsonKernel, Kernel, PredictedKernel, Scalar,
    SimdKernel,
};
pub use matrix::{
    compact, predict_nnz, simd_capability, structurally_equal, validate, Capacity, LaneWidth,
    SparseMatrixCSR, SpgemmConfig, SystemParameters,
};
pub use parallel::{partition_rows, thread_count, ParallelKernel};
pub use utils::formats::{from_sprs_csr, to_sprs_csr};

/// Multiplies `a × b` with the chosen implementation and the default config
///
/// # Errors
///
/// [`SpgemmError::DimensionMismatch`] if `a.n_cols != b.n_rows` or a
/// dimension is zero, [`SpgemmError::Allocation`] if a result buffer cannot
/// be obtained, [`SpgemmError::Conversion`] if the dense kernel cannot build
/// its arrays and [`SpgemmError::ThreadStart`] if a worker cannot be spawned.
pub fn multiply<T: Scalar>(
    a: &SparseMatrixCSR<T>,
    b: &SparseMatrixCSR<T>,
    algorithm: Algorithm,
) -> Result<SparseMatrixCSR<T>> {
    multiply_with_config(a, b, algorithm, &SpgemmConfig::default())
}

/// Multiplies `a × b` with the chosen implementation and an explicit config
///
/// [`Algorithm::Main`] runs the multithreaded kernel only when `nnz(a)` and
/// the row count of `a` reach the thresholds in `config`, and the size-
/// predicted kernel otherwise. [`Algorithm::Simd8`] falls back to the dense
/// kernel when the CPU has no native 8-lane `f32` unit.
pub fn multiply_with_config<T: Scalar>(
    a: &SparseMatrixCSR<T>,
    b: &SparseMatrixCSR<T>,
    algorithm: Algorithm,
    config: &SpgemmConfig,
) -> Result<SparseMatrixCSR<T>> {
    let kernel: Box<dyn Kernel<T> + '_> = match algorithm {
        Algorithm::Main => {
            if config.use_threads(a.nnz(), a.n_rows) {
                Box::new(ParallelKernel::new(config))
            } else {
                debug!(
                    nnz = a.nnz(),
                    n_rows = a.n_rows,
                    "input below threading thresholds, using size-predicted kernel"
                );
                Box::new(PredictedKernel)
            }
        }
        Algorithm::Dense => Box::new(DenseKernel),
        Algorithm::Gustavson => Box::new(GustavsonKernel),
        Algorithm::Simd4 => Box::new(SimdKernel::<{ constants::LANES_128 }>),
        Algorithm::Simd8 => {
            if LaneWidth::Eight.is_supported() {
                Box::new(SimdKernel::<{ constants::LANES_256 }>)
            } else {
                warn!(
                    lanes = simd_capability(),
                    "no native 8-lane vector unit, falling back to the dense kernel"
                );
                Box::new(DenseKernel)
            }
        }
        Algorithm::Predicted => Box::new(PredictedKernel),
    };

    debug!(%algorithm, kernel = kernel.name(), "dispatching multiplication");
    kernel.multiply(a, b)
}

/// Version information for the csrmult library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> (SparseMatrixCSR<f32>, SparseMatrixCSR<f32>) {
        let a = SparseMatrixCSR::new(2, 3, vec![0, 2, 3], vec![0, 1, 2], vec![1.0, 2.0, 3.0]);
        let b = SparseMatrixCSR::new(3, 2, vec![0, 1, 1, 2], vec![1, 0], vec![4.0, 5.0]);
        (a, b)
    }

    #[test]
    fn test_every_algorithm_on_scenario() {
        let (a, b) = scenario();
        let expected = SparseMatrixCSR::new(2, 2, vec![0, 1, 2], vec![1, 0], vec![4.0, 15.0]);

        for algorithm in Algorithm::ALL {
            let c = multiply(&a, &b, algorithm).unwrap();
            assert_eq!(c, expected, "{}", algorithm);
        }
    }

    #[test]
    fn test_every_algorithm_rejects_incompatible() {
        let a = SparseMatrixCSR::<f32>::zeros(2, 3);
        let b = SparseMatrixCSR::<f32>::zeros(2, 2);

        for algorithm in Algorithm::ALL {
            assert!(
                matches!(
                    multiply(&a, &b, algorithm),
                    Err(SpgemmError::DimensionMismatch { a_rows: 2, a_cols: 3, b_rows: 2, b_cols: 2 })
                ),
                "{}",
                algorithm
            );
        }
    }

    #[test]
    fn test_main_uses_threads_above_threshold() {
        // Low thresholds force the multithreaded path on a small input
        let config = SpgemmConfig {
            parallel_nnz_threshold: 1,
            ..SpgemmConfig::with_threads(4)
        };
        let a = SparseMatrixCSR::<i64>::identity(64);
        let c = multiply_with_config(&a, &a, Algorithm::Main, &config).unwrap();
        assert_eq!(c, a);
    }

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
