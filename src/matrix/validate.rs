//! CSR well-formedness checks
//!
//! The kernels trust their inputs, so every matrix that enters the engine
//! from outside should pass through [`validate`] first.

use num_traits::Num;

use crate::error::ValidationError;
use crate::matrix::SparseMatrixCSR;

/// Checks every CSR invariant, reporting the first violation found
///
/// Rules, in the order they are checked:
/// 1. both dimensions are at least 1
/// 2. `row_ptr` has `n_rows + 1` entries, which must be representable
/// 3. `col_idx` and `values` have the same length
/// 4. there are no more values than `n_rows * n_cols`
/// 5. `row_ptr` starts at 0, never decreases, and no row is longer than `n_cols`
/// 6. `row_ptr[n_rows]` equals the number of values
/// 7. every column index is below `n_cols`
/// 8. no stored value is zero
pub fn validate<T>(matrix: &SparseMatrixCSR<T>) -> Result<(), ValidationError>
where
    T: Copy + Num,
{
    let n_rows = matrix.n_rows;
    let n_cols = matrix.n_cols;
    let nnz = matrix.values.len();

    if n_rows == 0 || n_cols == 0 {
        return Err(ValidationError::ZeroInShape { n_rows, n_cols });
    }

    let expected = n_rows
        .checked_add(1)
        .ok_or(ValidationError::TooManyRows { n_rows })?;
    if matrix.row_ptr.len() != expected {
        return Err(ValidationError::RowPtrLength {
            len: matrix.row_ptr.len(),
            n_rows,
            expected,
        });
    }

    if matrix.col_idx.len() != nnz {
        return Err(ValidationError::LengthMismatch {
            col_idx: matrix.col_idx.len(),
            values: nnz,
        });
    }

    // An overflowing product means any realistic nnz fits
    if let Some(max_nnz) = n_rows.checked_mul(n_cols) {
        if nnz > max_nnz {
            return Err(ValidationError::TooManyValues { nnz, n_rows, n_cols });
        }
    }

    if matrix.row_ptr[0] != 0 {
        return Err(ValidationError::RowPtrStart(matrix.row_ptr[0]));
    }

    for (idx, pair) in matrix.row_ptr.windows(2).enumerate() {
        let (curr, next) = (pair[0], pair[1]);
        if next < curr {
            return Err(ValidationError::RowPtrNotSorted { idx, curr, next });
        }
        if next - curr > n_cols {
            return Err(ValidationError::RowTooLong {
                row: idx,
                len: next - curr,
                n_cols,
            });
        }
    }

    let last = matrix.row_ptr[n_rows];
    if last != nnz {
        return Err(ValidationError::RowPtrEnd { last, nnz });
    }

    if let Some(position) = matrix.col_idx.iter().position(|&col| col >= n_cols) {
        return Err(ValidationError::ColIndexOutOfBounds {
            position,
            col: matrix.col_idx[position],
            n_cols,
        });
    }

    if let Some(position) = matrix.values.iter().position(|v| v.is_zero()) {
        return Err(ValidationError::ExplicitZero { position });
    }

    Ok(())
}
