//! Benchmark profiles and utilities for the Kernarg marshaling layer.
//!
//! Provides pre-built [`MarshalConfig`] profiles for benchmarking:
//!
//! - [`navi_profile`]: a rover navigation problem (40 controls, 2673
//!   parameters, 40 ALM constraints, 15 penalty constraints)
//! - [`small_profile`]: the 2/1/1 scenario used throughout the tests
//! - [`fill_vector`]: deterministic input vectors via seed

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use kernarg_core::ProblemDims;
use kernarg_engine::{KernelSet, MarshalConfig};
use kernarg_test_utils::quadratic_kernels;

/// Dimensions of the navigation profile. `nxi = n1 + 1`.
pub fn navi_dims() -> ProblemDims {
    ProblemDims::for_alm(40, 2673, 40, 15)
}

/// Build the navigation benchmark profile with the reference kernels.
///
/// The packed buffer is `40 + 41 + 2673 = 2754` doubles.
pub fn navi_profile() -> MarshalConfig {
    MarshalConfig::new(navi_dims(), KernelSet::from_array(quadratic_kernels()))
}

/// Build a small profile: `nu = 2, nxi = 1, np = 1, n1 = 3, n2 = 2`.
///
/// Dominated by per-call overhead rather than copying.
pub fn small_profile() -> MarshalConfig {
    MarshalConfig::new(
        ProblemDims::new(2, 1, 1, 3, 2),
        KernelSet::from_array(quadratic_kernels()),
    )
}

/// Generate a deterministic vector of `len` values in `[-1, 1)`.
///
/// Uses a simple LCG on the seed so runs are reproducible without an RNG
/// dependency.
pub fn fill_vector(len: usize, seed: u64) -> Vec<f64> {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    (0..len)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            // Top 53 bits give a uniform double in [0, 1).
            let unit = (state >> 11) as f64 / (1u64 << 53) as f64;
            2.0 * unit - 1.0
        })
        .collect()
}

/// Input vectors `(u, xi, p)` sized for `dims`, seeded distinctly.
pub fn inputs_for(dims: &ProblemDims, seed: u64) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    (
        fill_vector(dims.nu, seed),
        fill_vector(dims.nxi, seed.wrapping_add(1)),
        fill_vector(dims.np, seed.wrapping_add(2)),
    )
}
