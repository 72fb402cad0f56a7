//! Utility functions and helpers

pub mod formats;

use crate::error::{Result, SpgemmError};

/// Multiplies two buffer dimensions, reporting overflow as an allocation failure
pub fn checked_len(rows: usize, cols: usize) -> Result<usize> {
    rows.checked_mul(cols)
        .ok_or(SpgemmError::Allocation { requested: usize::MAX })
}

/// Length of the row pointer array for `n_rows` rows
pub fn row_ptr_len(n_rows: usize) -> Result<usize> {
    n_rows
        .checked_add(1)
        .ok_or(SpgemmError::Allocation { requested: usize::MAX })
}

/// Allocates a vector of `len` copies of `value`
///
/// Unlike `vec![value; len]` this reports allocator failure as
/// [`SpgemmError::Allocation`] instead of aborting the process.
pub fn try_filled_vec<T: Clone>(len: usize, value: T) -> Result<Vec<T>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| SpgemmError::Allocation { requested: len })?;
    buf.resize(len, value);
    Ok(buf)
}
