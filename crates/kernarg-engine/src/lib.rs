//! Marshaling contexts and kernel dispatchers for Kernarg.
//!
//! A [`MarshalContext`] is the per-solver-instance owner of packed scratch
//! space and the four kernels' workspaces. Its dispatchers (`cost`,
//! `gradient`, `mapping_f1`, `mapping_f2`) pack the caller's vectors,
//! bind the output buffer, invoke the kernel, and return its status
//! verbatim. Dispatch takes `&mut self`, so two calls can never race on
//! the same scratch space.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod context;
pub mod kernels;

pub use config::{ConfigError, MarshalConfig};
pub use context::MarshalContext;
pub use kernels::{KernelSet, KernelSetBuilder};
