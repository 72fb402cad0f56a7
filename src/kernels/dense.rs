//! Reference dense kernel
//!
//! Converts both operands to dense arrays, multiplies them with the classic
//! triple loop and converts the product back. `O(rows_A × cols_B × cols_A)`
//! time and `O(rows × cols)` memory: only useful as a correctness baseline.

use tracing::debug;

use crate::error::Result;
use crate::kernels::{ensure_multipliable, Kernel, Scalar};
use crate::matrix::dense::{csr_to_dense, dense_to_csr, dense_zeros};
use crate::matrix::SparseMatrixCSR;

/// Dense triple-loop multiplication through CSR ↔ dense conversion
#[derive(Debug, Clone, Copy, Default)]
pub struct DenseKernel;

impl<T: Scalar> Kernel<T> for DenseKernel {
    fn name(&self) -> &'static str {
        "dense"
    }

    fn multiply(
        &self,
        a: &SparseMatrixCSR<T>,
        b: &SparseMatrixCSR<T>,
    ) -> Result<SparseMatrixCSR<T>> {
        ensure_multipliable(a, b)?;

        let dense_a = csr_to_dense(a)?;
        let dense_b = csr_to_dense(b)?;
        let mut dense_c = dense_zeros::<T>(a.n_rows, b.n_cols)?;

        for (i, mut c_row) in dense_c.outer_iter_mut().enumerate() {
            for j in 0..b.n_cols {
                for k in 0..a.n_cols {
                    c_row[j] += dense_a[[i, k]] * dense_b[[k, j]];
                }
            }
        }

        let result = dense_to_csr(&dense_c)?;
        debug!(nnz = result.nnz(), "dense multiplication finished");
        Ok(result)
    }
}
