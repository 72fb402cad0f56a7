//! Error types for CSR construction and multiplication
//!
//! Every fallible operation returns one of these directly. There is no shared
//! "last error" state, so a failed call can never leak into the next one.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the multiplication engine
#[derive(Error, Debug)]
pub enum SpgemmError {
    /// `A.n_cols != B.n_rows`, or one of the operands has a zero dimension
    #[error("Incompatible matrix dimensions: {a_rows}x{a_cols} and {b_rows}x{b_cols}")]
    DimensionMismatch {
        a_rows: usize,
        a_cols: usize,
        b_rows: usize,
        b_cols: usize,
    },

    /// A buffer could not be obtained, or its size overflows `usize`
    #[error("Failed to allocate buffer of {requested} elements")]
    Allocation { requested: usize },

    /// Conversion between CSR and dense form failed (dense kernel only)
    #[error("Error converting matrix (CSR-2D array): {reason}")]
    Conversion { reason: String },

    /// A worker thread could not be spawned
    #[error("Error starting a thread during matrix multiplication: {0}")]
    ThreadStart(#[source] std::io::Error),

    /// The implementation id is outside `0..=5`
    #[error("The implementation to use cannot be {0}")]
    InvalidAlgorithm(u8),

    /// The matrix violates a CSR invariant
    #[error("Invalid CSR matrix: {0}")]
    Validation(#[from] ValidationError),
}

/// CSR well-formedness violations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Shape cannot contain zeros: {n_rows}x{n_cols}")]
    ZeroInShape { n_rows: usize, n_cols: usize },

    #[error("Invalid row pointers: length {len} for {n_rows} rows (expected {expected})")]
    RowPtrLength {
        len: usize,
        n_rows: usize,
        expected: usize,
    },

    #[error("Too many rows: {n_rows} leaves no room for the closing row pointer")]
    TooManyRows { n_rows: usize },

    #[error("Length mismatch: {col_idx} column indices but {values} values")]
    LengthMismatch { col_idx: usize, values: usize },

    #[error("Too many values: {nnz} for a {n_rows}x{n_cols} matrix")]
    TooManyValues {
        nnz: usize,
        n_rows: usize,
        n_cols: usize,
    },

    #[error("First row pointer must be 0, got {0}")]
    RowPtrStart(usize),

    #[error("Row pointer not sorted at index {idx}: {curr} > {next}")]
    RowPtrNotSorted { idx: usize, curr: usize, next: usize },

    #[error("Row {row} holds {len} entries but the matrix has {n_cols} columns")]
    RowTooLong { row: usize, len: usize, n_cols: usize },

    #[error("Last row pointer is {last} but there are {nnz} values")]
    RowPtrEnd { last: usize, nnz: usize },

    #[error("Column index out of bounds at position {position}: {col} >= {n_cols}")]
    ColIndexOutOfBounds {
        position: usize,
        col: usize,
        n_cols: usize,
    },

    #[error("Explicit zero value stored at position {position}")]
    ExplicitZero { position: usize },
}

/// Errors produced while reading or writing the text matrix format
#[derive(Error, Debug)]
pub enum MatrixFileError {
    #[error("Could not open file \"{path}\"")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Error reading matrix: {0}")]
    Read(#[source] io::Error),

    #[error("Error writing matrix: {0}")]
    Write(#[source] io::Error),

    /// The text does not follow the four-line layout
    #[error("Matrix is not correctly formatted (line {line}): {reason}")]
    Format { line: usize, reason: String },

    /// The text parsed, but the arrays do not form a valid CSR matrix
    #[error("Matrix is not correctly formatted: {0}")]
    Invalid(#[from] ValidationError),
}

/// Convenience alias used throughout the crate
pub type Result<T, E = SpgemmError> = std::result::Result<T, E>;
