//! Kernarg: argument marshaling between an augmented Lagrangian /
//! penalty solver and its four generated evaluator kernels.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Kernarg sub-crates. For most users, adding `kernarg` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use kernarg::prelude::*;
//!
//! // phi(u, xi, p) = 0.5 * |u|^2 + xi0 * p0.
//! struct HalfNorm;
//! impl Kernel for HalfNorm {
//!     fn name(&self) -> &str { "half_norm" }
//!     fn sizes(&self) -> KernelSizes { KernelSizes::minimal(KernelId::Cost) }
//!     fn eval(&self, mut call: KernelCall<'_>) -> i32 {
//!         let u = call.arg(0).unwrap_or(&[]);
//!         let xi = call.arg(1).unwrap_or(&[]);
//!         let p = call.arg(2).unwrap_or(&[]);
//!         let norm_sq: f64 = u.iter().map(|x| x * x).sum();
//!         call.output()[0] = 0.5 * norm_sq + xi[0] * p[0];
//!         0
//!     }
//! }
//!
//! // Mappings and gradient that only report a status.
//! struct Unused(KernelId);
//! impl Kernel for Unused {
//!     fn name(&self) -> &str { self.0.name() }
//!     fn sizes(&self) -> KernelSizes { KernelSizes::minimal(self.0) }
//!     fn eval(&self, _call: KernelCall<'_>) -> i32 { 0 }
//! }
//!
//! let kernels = KernelSet::new(
//!     HalfNorm,
//!     Unused(KernelId::Gradient),
//!     Unused(KernelId::MappingF1),
//!     Unused(KernelId::MappingF2),
//! );
//! let dims = ProblemDims::for_alm(2, 1, 0, 0);
//! let mut ctx = MarshalContext::new(MarshalConfig::new(dims, kernels)).unwrap();
//!
//! let mut phi = [0.0];
//! let status = ctx.cost(&[3.0, 4.0], &[2.0], &[0.5], &mut phi).unwrap();
//! assert!(status.is_success());
//! assert_eq!(phi[0], 13.5);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `kernarg-core` | Dimensions, kernel trait, statuses, errors |
//! | [`arena`] | `kernarg-arena` | Packed layout, scratch buffer, workspaces |
//! | [`engine`] | `kernarg-engine` | Marshaling contexts and dispatchers |
//! | [`ffi`] | `kernarg-ffi` | Native kernel adapter and C ABI |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and errors (`kernarg-core`).
///
/// Contains [`types::ProblemDims`], the [`types::Kernel`] trait and its
/// [`types::KernelCall`] frame, and [`types::KernelStatus`].
pub use kernarg_core as types;

/// Packed scratch space and per-kernel workspaces (`kernarg-arena`).
pub use kernarg_arena as arena;

/// Marshaling contexts (`kernarg-engine`).
///
/// [`engine::MarshalContext`] owns the buffers for one solver instance and
/// exposes the four dispatchers.
pub use kernarg_engine as engine;

/// Native kernel adapter and C ABI (`kernarg-ffi`).
///
/// [`ffi::NativeKernel`] wraps a generated evaluator so it can be
/// registered like any other [`types::Kernel`].
pub use kernarg_ffi as ffi;

/// Common imports for typical Kernarg usage.
///
/// ```rust
/// use kernarg::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use kernarg_core::{Kernel, KernelCall, KernelId, KernelSizes, KernelStatus, ProblemDims};

    // Errors
    pub use kernarg_core::{DispatchError, KernelError, ShapeError};

    // Engine
    pub use kernarg_engine::{ConfigError, KernelSet, MarshalConfig, MarshalContext};

    // Native kernels
    pub use kernarg_ffi::NativeKernel;
}
