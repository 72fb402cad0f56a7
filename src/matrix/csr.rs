//! Compressed Sparse Row (CSR) matrix format implementation

use std::fmt;
use std::ops::Range;

use num_traits::Num;

use crate::error::Result;
use crate::matrix::validate::validate;
use crate::utils::{checked_len, row_ptr_len, try_filled_vec};

/// A sparse matrix in Compressed Sparse Row (CSR) format
///
/// The CSR format stores a sparse matrix using three arrays:
/// - row_ptr: Array of size n_rows + 1 containing indices into col_idx and values arrays
/// - col_idx: Array of size nnz containing column indices of non-zero elements
/// - values: Array of size nnz containing the non-zero values
///
/// Entries inside a row are not required to be sorted by column. The matrix
/// owns its three arrays exclusively; dropping it releases all of them.
#[derive(Clone)]
pub struct SparseMatrixCSR<T> {
    /// Number of rows in the matrix
    pub n_rows: usize,

    /// Number of columns in the matrix
    pub n_cols: usize,

    /// Row pointers (size: n_rows + 1)
    /// row_ptr[i] is the index in col_idx and values where row i starts
    /// row_ptr[n_rows] is equal to nnz
    pub row_ptr: Vec<usize>,

    /// Column indices (size: nnz)
    pub col_idx: Vec<usize>,

    /// Non-zero values (size: nnz)
    pub values: Vec<T>,
}

/// How many nonzero slots to reserve when allocating an output matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capacity {
    /// `n_rows * n_cols` slots, addressed densely as `row * n_cols + col`
    WorstCase,
    /// An explicit slot count, usually from [`crate::matrix::predict_nnz`]
    Predicted(usize),
}

/// Borrowed view of the stored entries of one row
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a, T> {
    /// Column index of each entry
    pub cols: &'a [usize],
    /// Value of each entry
    pub values: &'a [T],
}

impl<'a, T> RowView<'a, T> {
    /// Number of stored entries in the row
    pub fn len(&self) -> usize {
        self.cols.len()
    }

    /// Whether the row has no stored entries
    pub fn is_empty(&self) -> bool {
        self.cols.is_empty()
    }
}

impl<T> SparseMatrixCSR<T>
where
    T: Copy + Num,
{
    /// Creates a new CSR matrix with the given dimensions and data
    ///
    /// # Panics
    ///
    /// Panics if the input arrays are inconsistent:
    /// - row_ptr.len() must be n_rows + 1
    /// - col_idx.len() must equal values.len()
    /// - row_ptr[n_rows] must equal col_idx.len()
    ///
    /// Use [`SparseMatrixCSR::try_new`] to run the full validator instead.
    pub fn new(
        n_rows: usize,
        n_cols: usize,
        row_ptr: Vec<usize>,
        col_idx: Vec<usize>,
        values: Vec<T>,
    ) -> Self {
        assert_eq!(row_ptr.len(), n_rows + 1, "row_ptr.len() must be n_rows + 1");
        assert_eq!(col_idx.len(), values.len(), "col_idx.len() must equal values.len()");
        assert_eq!(
            row_ptr[n_rows],
            col_idx.len(),
            "row_ptr[n_rows] must equal col_idx.len()"
        );

        for &col in &col_idx {
            assert!(col < n_cols, "Column index {} out of bounds (n_cols = {})", col, n_cols);
        }

        Self {
            n_rows,
            n_cols,
            row_ptr,
            col_idx,
            values,
        }
    }

    /// Creates a CSR matrix after checking every CSR invariant
    ///
    /// # Errors
    ///
    /// Returns [`crate::SpgemmError::Validation`] describing the first rule
    /// the arrays break.
    pub fn try_new(
        n_rows: usize,
        n_cols: usize,
        row_ptr: Vec<usize>,
        col_idx: Vec<usize>,
        values: Vec<T>,
    ) -> Result<Self> {
        let matrix = Self {
            n_rows,
            n_cols,
            row_ptr,
            col_idx,
            values,
        };
        validate(&matrix)?;
        Ok(matrix)
    }

    /// Allocates an empty output matrix with zero-filled buffers
    ///
    /// Either all three arrays are obtained or none is: on failure nothing
    /// has been handed out and the partially built buffers are dropped.
    pub fn allocate(n_rows: usize, n_cols: usize, capacity: Capacity) -> Result<Self> {
        let slots = match capacity {
            Capacity::WorstCase => checked_len(n_rows, n_cols)?,
            Capacity::Predicted(slots) => slots,
        };

        let ptr_len = row_ptr_len(n_rows)?;

        let values = try_filled_vec(slots, T::zero())?;
        let col_idx = try_filled_vec(slots, 0usize)?;
        let row_ptr = try_filled_vec(ptr_len, 0usize)?;

        Ok(Self {
            n_rows,
            n_cols,
            row_ptr,
            col_idx,
            values,
        })
    }

    /// Returns the number of non-zero elements in the matrix
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Index range of row `i` inside `col_idx` and `values`
    pub fn row_range(&self, i: usize) -> Range<usize> {
        self.row_ptr[i]..self.row_ptr[i + 1]
    }

    /// Returns the stored entries of row `i`
    pub fn row(&self, i: usize) -> RowView<'_, T> {
        let range = self.row_range(i);
        RowView {
            cols: &self.col_idx[range.clone()],
            values: &self.values[range],
        }
    }

    /// Returns an iterator over the non-zero elements in row i
    ///
    /// Each item is a tuple (col_idx, value) representing a non-zero element
    pub fn row_iter(&self, i: usize) -> impl Iterator<Item = (usize, &T)> {
        assert!(i < self.n_rows, "Row index out of bounds");

        let range = self.row_range(i);

        self.col_idx[range.clone()]
            .iter()
            .zip(&self.values[range])
            .map(|(&col, val)| (col, val))
    }

    /// Creates an empty matrix with the given dimensions
    pub fn zeros(n_rows: usize, n_cols: usize) -> Self {
        Self {
            n_rows,
            n_cols,
            row_ptr: vec![0; n_rows + 1],
            col_idx: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Creates an identity matrix of the given size
    pub fn identity(n: usize) -> Self {
        Self {
            n_rows: n,
            n_cols: n,
            row_ptr: (0..=n).collect(),
            col_idx: (0..n).collect(),
            values: vec![T::one(); n],
        }
    }
}

impl<T: fmt::Debug + Copy + Num> fmt::Debug for SparseMatrixCSR<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SparseMatrixCSR {{")?;
        writeln!(f, "  dimensions: {} × {}", self.n_rows, self.n_cols)?;
        writeln!(f, "  nnz: {}", self.nnz())?;

        // Print a sample of the matrix content
        let max_rows_to_print = 5.min(self.n_rows);

        if max_rows_to_print > 0 && self.row_ptr.len() == self.n_rows + 1 {
            writeln!(f, "  content sample:")?;

            for i in 0..max_rows_to_print {
                write!(f, "    row {}: ", i)?;
                let start = self.row_ptr[i];
                let end = self.row_ptr[i + 1].min(self.values.len());

                if start >= end {
                    writeln!(f, "(empty)")?;
                } else {
                    let max_elements = 5.min(end - start);

                    for j in start..(start + max_elements) {
                        write!(f, "({}, {:?}) ", self.col_idx[j], self.values[j])?;
                    }

                    if end - start > max_elements {
                        write!(f, "... ({} more)", end - start - max_elements)?;
                    }

                    writeln!(f)?;
                }
            }

            if self.n_rows > max_rows_to_print {
                writeln!(f, "    ... ({} more rows)", self.n_rows - max_rows_to_print)?;
            }
        }

        write!(f, "}}")
    }
}
