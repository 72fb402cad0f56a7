//! Configuration and system parameters for the multiplication engine

use crate::constants::{
    LANES_128, LANES_256, MIN_THREADS, PARALLEL_NNZ_THRESHOLD, THREAD_COND_MIN_ROWS,
    THREAD_COND_MIN_VALUES,
};

/// Vector width used by the SIMD-batched Gustavson kernels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneWidth {
    /// 4 lanes (128-bit registers of `f32`)
    Four,
    /// 8 lanes (256-bit registers of `f32`)
    Eight,
}

impl LaneWidth {
    /// Number of scalar lanes
    pub fn lanes(&self) -> usize {
        match self {
            LaneWidth::Four => LANES_128,
            LaneWidth::Eight => LANES_256,
        }
    }

    /// Whether the running CPU can process this many `f32` lanes natively
    pub fn is_supported(&self) -> bool {
        simd_capability() >= self.lanes()
    }
}

/// Detects the widest native `f32` vector on the running CPU, in lanes
///
/// Returns 8 with AVX, 4 on any other x86_64 (SSE is baseline) or aarch64
/// (NEON), and 1 where no vector unit is known.
pub fn simd_capability() -> usize {
    #[cfg(target_arch = "x86_64")]
    {
        #[cfg(target_feature = "avx")]
        {
            return LANES_256;
        }
        #[cfg(not(target_feature = "avx"))]
        {
            if std::is_x86_feature_detected!("avx") {
                return LANES_256;
            } else {
                return LANES_128;
            }
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        return LANES_128;
    }

    // Fallback for other architectures
    #[allow(unreachable_code)]
    1
}

/// System parameters for performance tuning
#[derive(Debug, Clone)]
pub struct SystemParameters {
    /// Number of hardware threads available to the multithreaded kernel
    pub n_threads: usize,
}

impl Default for SystemParameters {
    fn default() -> Self {
        Self {
            n_threads: num_cpus::get(),
        }
    }
}

/// Configuration for kernel dispatch and thread partitioning
#[derive(Debug, Clone)]
pub struct SpgemmConfig {
    /// System parameters for performance tuning
    pub system_params: SystemParameters,

    /// The main implementation stays single-threaded while `nnz(A)` is below this
    pub parallel_nnz_threshold: usize,

    /// Lower bound on worker threads
    pub min_threads: usize,

    /// Thread count is bounded by `n_rows / rows_per_thread`
    pub rows_per_thread: usize,

    /// Thread count is also bounded by `n_rows / min_rows_per_thread`
    pub min_rows_per_thread: usize,
}

impl Default for SpgemmConfig {
    fn default() -> Self {
        Self {
            system_params: SystemParameters::default(),
            parallel_nnz_threshold: PARALLEL_NNZ_THRESHOLD,
            min_threads: MIN_THREADS,
            rows_per_thread: THREAD_COND_MIN_VALUES,
            min_rows_per_thread: THREAD_COND_MIN_ROWS,
        }
    }
}

impl SpgemmConfig {
    /// Default configuration with an explicit hardware thread count
    pub fn with_threads(n_threads: usize) -> Self {
        Self {
            system_params: SystemParameters { n_threads },
            ..Self::default()
        }
    }

    /// Whether the main implementation should spawn threads for `A`
    pub fn use_threads(&self, a_nnz: usize, a_rows: usize) -> bool {
        a_nnz >= self.parallel_nnz_threshold && a_rows >= self.min_threads
    }
}
