//! Utilities for converting between our matrix format and `sprs`

use num_traits::Num;
use sprs::CsMat;

use crate::matrix::equality::sorted_entries;
use crate::matrix::SparseMatrixCSR;

/// Converts our CSR matrix to a `sprs` CSR matrix
///
/// `sprs` requires sorted indices within each row, so each row is sorted by
/// column on the way out. The input is left untouched.
pub fn to_sprs_csr<T>(matrix: &SparseMatrixCSR<T>) -> CsMat<T>
where
    T: Copy + Num + Default,
{
    let (col_idx, values) = sorted_entries(matrix);
    CsMat::new(
        (matrix.n_rows, matrix.n_cols),
        matrix.row_ptr.clone(),
        col_idx,
        values,
    )
}

/// Converts a `sprs` matrix to our CSR format, converting CSC storage first
///
/// Explicitly stored zeros are dropped so the result never stores a zero.
pub fn from_sprs_csr<T>(matrix: CsMat<T>) -> SparseMatrixCSR<T>
where
    T: Copy + Num + Default,
{
    let matrix = if matrix.is_csr() {
        matrix
    } else {
        matrix.to_csr()
    };

    let (n_rows, n_cols) = matrix.shape();
    let (indptr, indices, data) = matrix.into_raw_storage();

    let mut row_ptr = Vec::with_capacity(n_rows + 1);
    let mut col_idx = Vec::with_capacity(indices.len());
    let mut values = Vec::with_capacity(data.len());
    row_ptr.push(0);

    for bounds in indptr.windows(2) {
        for k in bounds[0]..bounds[1] {
            if data[k] != T::zero() {
                col_idx.push(indices[k]);
                values.push(data[k]);
            }
        }
        row_ptr.push(col_idx.len());
    }

    SparseMatrixCSR::new(n_rows, n_cols, row_ptr, col_idx, values)
}
