//! Test utilities and reference kernels for Kernarg development.
//!
//! Provides small, closed-form [`Kernel`] implementations whose outputs
//! are easy to predict by hand, plus probes for status forwarding and
//! workspace plumbing. See [`fixtures`] for the individual kernels.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{
    ConstStatusKernel, CountingKernel, EchoKernel, QuadraticCost, QuadraticGradient,
    ScaleMapping, ShiftMapping, WorkspaceProbeKernel,
};

use kernarg_core::{Kernel, ProblemDims};

/// The reference kernel set in registration order: [`QuadraticCost`],
/// [`QuadraticGradient`], [`ShiftMapping`] as F1, [`ScaleMapping`] as F2.
pub fn quadratic_kernels() -> [Box<dyn Kernel>; 4] {
    [
        Box::new(QuadraticCost),
        Box::new(QuadraticGradient),
        Box::new(ShiftMapping),
        Box::new(ScaleMapping),
    ]
}

/// `nu = 2, nxi = 1, np = 1` with the given mapping output sizes.
pub fn scenario_dims(n1: usize, n2: usize) -> ProblemDims {
    ProblemDims::new(2, 1, 1, n1, n2)
}

/// Reference cost `0.5 * (1 + sum(p)) * |u|^2 + sum(xi) * sum(u)`.
pub fn quadratic_cost_value(u: &[f64], xi: &[f64], p: &[f64]) -> f64 {
    let s = 1.0 + p.iter().sum::<f64>();
    let norm_sq: f64 = u.iter().map(|x| x * x).sum();
    0.5 * s * norm_sq + xi.iter().sum::<f64>() * u.iter().sum::<f64>()
}

/// Reference gradient of [`quadratic_cost_value`] with respect to `u`.
pub fn quadratic_gradient_value(u: &[f64], xi: &[f64], p: &[f64]) -> Vec<f64> {
    let s = 1.0 + p.iter().sum::<f64>();
    let shift: f64 = xi.iter().sum();
    u.iter().map(|x| s * x + shift).collect()
}
