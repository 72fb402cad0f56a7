//! Conversion between CSR and row-major dense form
//!
//! Only the dense reference kernel goes through these conversions. Failures
//! surface as [`SpgemmError::Conversion`].

use ndarray::Array2;
use num_traits::Num;

use crate::error::{Result, SpgemmError};
use crate::matrix::SparseMatrixCSR;
use crate::utils::{checked_len, try_filled_vec};

fn conversion_error(err: SpgemmError) -> SpgemmError {
    SpgemmError::Conversion {
        reason: err.to_string(),
    }
}

/// Allocates a zero-filled `n_rows × n_cols` array
pub fn dense_zeros<T>(n_rows: usize, n_cols: usize) -> Result<Array2<T>>
where
    T: Copy + Num,
{
    let len = checked_len(n_rows, n_cols).map_err(conversion_error)?;
    let buf = try_filled_vec(len, T::zero()).map_err(conversion_error)?;

    Array2::from_shape_vec((n_rows, n_cols), buf).map_err(|e| SpgemmError::Conversion {
        reason: e.to_string(),
    })
}

/// Scatters the entries of a CSR matrix into a zero-filled dense array
pub fn csr_to_dense<T>(csr: &SparseMatrixCSR<T>) -> Result<Array2<T>>
where
    T: Copy + Num,
{
    let mut dense = dense_zeros(csr.n_rows, csr.n_cols)?;

    for (i, mut row) in dense.outer_iter_mut().enumerate() {
        let view = csr.row(i);
        for (&col, &value) in view.cols.iter().zip(view.values) {
            row[col] = value;
        }
    }

    Ok(dense)
}

/// Builds a CSR matrix from the nonzero cells of a dense array
///
/// Cells are visited in row-major order, so every row of the result is
/// sorted by column.
pub fn dense_to_csr<T>(dense: &Array2<T>) -> Result<SparseMatrixCSR<T>>
where
    T: Copy + Num,
{
    let (n_rows, n_cols) = dense.dim();
    let nnz = dense.iter().filter(|v| !v.is_zero()).count();

    let mut values = Vec::new();
    let mut col_idx = Vec::new();
    let mut row_ptr = Vec::new();
    values
        .try_reserve_exact(nnz)
        .and_then(|_| col_idx.try_reserve_exact(nnz))
        .and_then(|_| row_ptr.try_reserve_exact(n_rows.saturating_add(1)))
        .map_err(|e| SpgemmError::Conversion {
            reason: e.to_string(),
        })?;

    row_ptr.push(0);
    for row in dense.outer_iter() {
        for (col, &value) in row.iter().enumerate() {
            if !value.is_zero() {
                values.push(value);
                col_idx.push(col);
            }
        }
        row_ptr.push(values.len());
    }

    Ok(SparseMatrixCSR {
        n_rows,
        n_cols,
        row_ptr,
        col_idx,
        values,
    })
}
