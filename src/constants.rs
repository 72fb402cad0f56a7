//! Centralized constants for the csrmult library
//!
//! Thresholds that drive kernel selection and thread partitioning live here
//! rather than being scattered through the kernels.

// ============================================================================
// DISPATCH THRESHOLDS
// ============================================================================

/// Number of selectable multiplication implementations (ids `0..=5`)
pub const NUMBER_OF_IMPLEMENTATIONS: u8 = 6;

/// Below this many nonzeros in A the main implementation stays single-threaded
pub const PARALLEL_NNZ_THRESHOLD: usize = 10_000;

// ============================================================================
// THREAD PARTITIONING
// ============================================================================

/// Minimum number of worker threads spawned by the multithreaded kernel
pub const MIN_THREADS: usize = 2;

/// Rows of A per worker used for the first thread-count bound
pub const THREAD_COND_MIN_VALUES: usize = 40;

/// Rows of A per worker used for the second thread-count bound
pub const THREAD_COND_MIN_ROWS: usize = 4;

// ============================================================================
// SIMD LANES
// ============================================================================

/// Lanes in a 128-bit register of `f32`
pub const LANES_128: usize = 4;

/// Lanes in a 256-bit register of `f32`
pub const LANES_256: usize = 8;

// ============================================================================
// GENERATOR
// ============================================================================

/// Largest value produced by the synthetic matrix generator
pub const MAX_GENERATED_VALUE: u32 = 100;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_bounds_are_ordered() {
        // rows / THREAD_COND_MIN_VALUES is the tighter of the two bounds
        assert!(THREAD_COND_MIN_VALUES > THREAD_COND_MIN_ROWS);
        assert!(MIN_THREADS >= 2);
    }

    #[test]
    fn test_lane_widths() {
        assert_eq!(LANES_256, 2 * LANES_128);
    }
}
