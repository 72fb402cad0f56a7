// Matrix data structures and operations

pub mod compact;
pub mod config;
pub mod csr;
pub mod dense;
pub mod equality;
pub mod predict;
pub mod validate;

pub use compact::compact;
pub use config::{simd_capability, LaneWidth, SpgemmConfig, SystemParameters};
pub use csr::{Capacity, RowView, SparseMatrixCSR};
pub use dense::{csr_to_dense, dense_to_csr};
pub use equality::structurally_equal;
pub use predict::predict_nnz;
pub use validate::validate;
