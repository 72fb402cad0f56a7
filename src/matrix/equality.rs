//! Order-independent structural comparison of CSR matrices
//!
//! Different kernels emit the entries of a row in different column orders,
//! so two results are compared after sorting each row of a copy by column.

use crate::matrix::SparseMatrixCSR;

/// Insertion-sorts `(col, value)` pairs by column, stable for equal columns
fn sort_row<T: Copy>(cols: &mut [usize], values: &mut [T]) {
    for i in 1..cols.len() {
        let mut j = i;
        while j > 0 && cols[j] < cols[j - 1] {
            cols.swap(j, j - 1);
            values.swap(j, j - 1);
            j -= 1;
        }
    }
}

/// Returns copies of `col_idx` and `values` with every row sorted by column
pub fn sorted_entries<T: Copy>(matrix: &SparseMatrixCSR<T>) -> (Vec<usize>, Vec<T>) {
    let mut cols = matrix.col_idx.clone();
    let mut values = matrix.values.clone();

    for bounds in matrix.row_ptr.windows(2) {
        let (begin, end) = (bounds[0], bounds[1]);
        sort_row(&mut cols[begin..end], &mut values[begin..end]);
    }

    (cols, values)
}

/// Checks whether two CSR matrices represent the same sparse matrix
///
/// They are equal iff dimensions, nnz and row pointers are identical and,
/// after sorting each row by column, the column indices and values match
/// element-wise. Neither input is modified.
pub fn structurally_equal<T>(a: &SparseMatrixCSR<T>, b: &SparseMatrixCSR<T>) -> bool
where
    T: Copy + PartialEq,
{
    if a.n_rows != b.n_rows
        || a.n_cols != b.n_cols
        || a.values.len() != b.values.len()
        || a.col_idx.len() != b.col_idx.len()
        || a.row_ptr != b.row_ptr
    {
        return false;
    }

    sorted_entries(a) == sorted_entries(b)
}

impl<T> PartialEq for SparseMatrixCSR<T>
where
    T: Copy + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        structurally_equal(self, other)
    }
}
