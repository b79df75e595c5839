//! Core types and traits for the Kernarg argument-marshaling layer.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by the rest of the workspace: problem dimensions,
//! kernel identities and scratch sizes, the [`Kernel`] trait with its
//! per-call [`KernelCall`] frame, status codes, and error types.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod dims;
pub mod error;
pub mod kernel;
pub mod status;

pub use dims::{ProblemDims, Segment};
pub use error::{DispatchError, KernelError, ShapeError};
pub use kernel::{Kernel, KernelCall, KernelId, KernelSizes, RawCallParts};
pub use status::KernelStatus;
