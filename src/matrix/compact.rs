//! Removal of zero-valued placeholder entries from kernel output

use num_traits::Num;
use tracing::trace;

use crate::matrix::SparseMatrixCSR;

/// Removes every stored zero from `matrix`, rewriting its row pointers
///
/// The scan walks the buffers in row order, moving each nonzero entry to the
/// next free compacted slot. Afterwards `row_ptr[r + 1]` equals the original
/// row end minus the number of entries removed so far, and the `values` and
/// `col_idx` arrays are shrunk to the true nonzero count. When that count is
/// zero both arrays are left allocated with length 0.
///
/// Running it on a matrix that stores no zeros changes nothing. Returns the
/// number of removed entries.
pub fn compact<T>(matrix: &mut SparseMatrixCSR<T>) -> usize
where
    T: Copy + Num,
{
    let mut kept = 0;
    let mut removed = 0;
    let mut row_begin = matrix.row_ptr[0];

    for row in 1..matrix.row_ptr.len() {
        let row_end = matrix.row_ptr[row];

        for idx in row_begin..row_end {
            let value = matrix.values[idx];
            if value.is_zero() {
                removed += 1;
            } else {
                matrix.values[kept] = value;
                matrix.col_idx[kept] = matrix.col_idx[idx];
                kept += 1;
            }
        }

        matrix.row_ptr[row] = row_end - removed;
        row_begin = row_end;
    }

    // Slots past the last row end are never part of any row
    matrix.values.truncate(kept);
    matrix.col_idx.truncate(kept);
    matrix.values.shrink_to_fit();
    matrix.col_idx.shrink_to_fit();

    trace!(kept, removed, "compacted result buffers");
    removed
}
