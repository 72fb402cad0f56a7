//! Lane-batched Gustavson kernels
//!
//! When a row of B has at least `LANES` entries left, the A value is
//! broadcast across a vector, multiplied with `LANES` contiguous B values in
//! one operation, and the products are scattered with a scalar loop over the
//! batch's column indices (the destinations are data-dependent, so the
//! scatter itself cannot be vectorized). Fewer than `LANES` remaining
//! entries go through the scalar tail shared with [`super::GustavsonKernel`].
//!
//! The batch multiply lives on the [`Scalar`] trait. Its default body is a
//! portable loop; `f32` overrides it with SSE/AVX on x86_64 and NEON on
//! aarch64.

use std::fmt;
use std::ops::AddAssign;

use num_traits::Num;

use crate::constants::{LANES_128, LANES_256};
use crate::error::Result;
use crate::kernels::gustavson::{multiply_dense_sized, scatter_products};
use crate::kernels::Kernel;
use crate::matrix::SparseMatrixCSR;

/// Numeric element type accepted by every kernel
pub trait Scalar: Copy + Num + AddAssign + PartialEq + Send + Sync + fmt::Debug + 'static {
    /// Multiplies the first `LANES` elements of `lanes` by `scalar`
    ///
    /// `lanes` must hold at least `LANES` elements.
    #[inline]
    fn broadcast_mul<const LANES: usize>(scalar: Self, lanes: &[Self]) -> [Self; LANES] {
        std::array::from_fn(|i| scalar * lanes[i])
    }

    /// Whether the value is an ordinary number (integers always are)
    #[inline]
    fn is_finite(self) -> bool {
        true
    }
}

impl Scalar for f64 {
    #[inline]
    fn is_finite(self) -> bool {
        f64::is_finite(self)
    }
}
impl Scalar for i32 {}
impl Scalar for i64 {}
impl Scalar for u32 {}
impl Scalar for u64 {}

impl Scalar for f32 {
    #[inline]
    fn is_finite(self) -> bool {
        f32::is_finite(self)
    }

    #[inline]
    fn broadcast_mul<const LANES: usize>(scalar: f32, lanes: &[f32]) -> [f32; LANES] {
        assert!(lanes.len() >= LANES, "batch shorter than lane count");

        #[cfg(target_arch = "x86_64")]
        {
            if LANES == LANES_128 {
                let mut out = [0.0f32; LANES];
                // SAFETY: SSE is part of the x86_64 baseline and both pointers
                // cover at least four floats.
                unsafe { x86::mul4_sse(scalar, lanes.as_ptr(), out.as_mut_ptr()) };
                return out;
            }
            if LANES == LANES_256 && std::is_x86_feature_detected!("avx") {
                let mut out = [0.0f32; LANES];
                // SAFETY: AVX support was checked above and both pointers
                // cover at least eight floats.
                unsafe { x86::mul8_avx(scalar, lanes.as_ptr(), out.as_mut_ptr()) };
                return out;
            }
        }

        #[cfg(target_arch = "aarch64")]
        {
            if LANES == LANES_128 {
                let mut out = [0.0f32; LANES];
                // SAFETY: NEON is mandatory on aarch64 and both pointers cover
                // at least four floats.
                unsafe { neon::mul4(scalar, lanes.as_ptr(), out.as_mut_ptr()) };
                return out;
            }
        }

        std::array::from_fn(|i| scalar * lanes[i])
    }
}

#[cfg(target_arch = "x86_64")]
mod x86 {
    use std::arch::x86_64::*;

    #[inline]
    pub unsafe fn mul4_sse(scalar: f32, src: *const f32, dst: *mut f32) {
        let a = _mm_set1_ps(scalar);
        let b = _mm_loadu_ps(src);
        _mm_storeu_ps(dst, _mm_mul_ps(b, a));
    }

    #[target_feature(enable = "avx")]
    pub unsafe fn mul8_avx(scalar: f32, src: *const f32, dst: *mut f32) {
        let a = _mm256_set1_ps(scalar);
        let b = _mm256_loadu_ps(src);
        _mm256_storeu_ps(dst, _mm256_mul_ps(b, a));
    }
}

#[cfg(target_arch = "aarch64")]
mod neon {
    use std::arch::aarch64::*;

    #[inline]
    pub unsafe fn mul4(scalar: f32, src: *const f32, dst: *mut f32) {
        let a = vdupq_n_f32(scalar);
        let b = vld1q_f32(src);
        vst1q_f32(dst, vmulq_f32(b, a));
    }
}

/// Accumulates row `row` of `a × b` into a dense row segment in `LANES` batches
///
/// Same contract as [`super::accumulate_row`].
pub fn accumulate_row_lanes<T: Scalar, const LANES: usize>(
    a: &SparseMatrixCSR<T>,
    b: &SparseMatrixCSR<T>,
    row: usize,
    out_values: &mut [T],
    out_cols: &mut [usize],
) {
    let a_row = a.row(row);
    for (&k, &a_val) in a_row.cols.iter().zip(a_row.values) {
        let b_row = b.row(k);
        let mut col_batches = b_row.cols.chunks_exact(LANES);
        let mut value_batches = b_row.values.chunks_exact(LANES);

        for (cols, values) in (&mut col_batches).zip(&mut value_batches) {
            let products = T::broadcast_mul::<LANES>(a_val, values);
            for (&col, product) in cols.iter().zip(products) {
                out_values[col] += product;
                out_cols[col] = col;
            }
        }

        scatter_products(
            a_val,
            col_batches.remainder(),
            value_batches.remainder(),
            out_values,
            out_cols,
        );
    }
}

/// Gustavson kernel with `LANES`-wide batched multiplication
#[derive(Debug, Clone, Copy, Default)]
pub struct SimdKernel<const LANES: usize>;

impl<T: Scalar, const LANES: usize> Kernel<T> for SimdKernel<LANES> {
    fn name(&self) -> &'static str {
        match LANES {
            LANES_128 => "simd-4",
            LANES_256 => "simd-8",
            _ => "simd",
        }
    }

    fn multiply(
        &self,
        a: &SparseMatrixCSR<T>,
        b: &SparseMatrixCSR<T>,
    ) -> Result<SparseMatrixCSR<T>> {
        multiply_dense_sized(a, b, |row, values, cols| {
            accumulate_row_lanes::<T, LANES>(a, b, row, values, cols)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::GustavsonKernel;

    /// One row of A against a long row of B, so batches and a tail both run
    fn long_row_operands(len: usize) -> (SparseMatrixCSR<f32>, SparseMatrixCSR<f32>) {
        let a = SparseMatrixCSR::new(1, 1, vec![0, 1], vec![0], vec![3.0]);
        let cols: Vec<usize> = (0..len).rev().collect();
        let values: Vec<f32> = (1..=len).map(|v| v as f32).collect();
        let b = SparseMatrixCSR::new(1, len, vec![0, len], cols, values);
        (a, b)
    }

    #[test]
    fn test_broadcast_mul_f32() {
        let lanes = [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
        assert_eq!(f32::broadcast_mul::<4>(2.0, &lanes), [2.0, 4.0, 6.0, 8.0]);
        assert_eq!(
            f32::broadcast_mul::<8>(0.5, &lanes),
            [0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0]
        );
    }

    #[test]
    fn test_broadcast_mul_portable() {
        assert_eq!(i64::broadcast_mul::<4>(-2, &[1, 2, 3, 4]), [-2, -4, -6, -8]);
        assert_eq!(f64::broadcast_mul::<2>(1.5, &[2.0, 4.0, 8.0]), [3.0, 6.0]);
    }

    #[test]
    fn test_remainder_lengths() {
        for len in [1, 3, 4, 5, 7, 8, 9, 13, 16, 17] {
            let (a, b) = long_row_operands(len);
            let expected = GustavsonKernel.multiply(&a, &b).unwrap();

            assert_eq!(SimdKernel::<4>.multiply(&a, &b).unwrap(), expected, "len {}", len);
            assert_eq!(SimdKernel::<8>.multiply(&a, &b).unwrap(), expected, "len {}", len);
        }
    }

    #[test]
    fn test_reference_scenario() {
        let a = SparseMatrixCSR::new(2, 3, vec![0, 2, 3], vec![0, 1, 2], vec![1.0f32, 2.0, 3.0]);
        let b = SparseMatrixCSR::new(3, 2, vec![0, 1, 1, 2], vec![1, 0], vec![4.0f32, 5.0]);

        let c = SimdKernel::<4>.multiply(&a, &b).unwrap();
        assert_eq!(c.row_ptr, vec![0, 1, 2]);
        assert_eq!(c.col_idx, vec![1, 0]);
        assert_eq!(c.values, vec![4.0, 15.0]);
    }

    #[test]
    fn test_kernel_names() {
        assert_eq!(Kernel::<f32>::name(&SimdKernel::<4>), "simd-4");
        assert_eq!(Kernel::<f32>::name(&SimdKernel::<8>), "simd-8");
    }
}
