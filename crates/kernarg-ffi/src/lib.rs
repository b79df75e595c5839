//! C ABI and native kernel adapter for Kernarg.
//!
//! Two halves:
//!
//! - [`NativeKernel`] adapts a generated evaluator with the native calling
//!   convention (`int f(const double**, double**, long long*, double*, void*)`)
//!   to the [`Kernel`](kernarg_core::Kernel) trait, so it can be driven
//!   from Rust through a [`MarshalContext`](kernarg_engine::MarshalContext).
//! - A handle-based C API (`kernarg_config_*`, `kernarg_context_*`, and the
//!   four dispatchers) for callers on the other side of the boundary.
//!
//! Every exported function returns a [`KernargStatus`] code. Marshaling
//! failures are negative; a kernel's own status is written verbatim to a
//! separate out-parameter so the two can never be confused.
//!
//! This crate is one of two that may contain `unsafe` code (along with
//! `kernarg-arena`).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

/// Run an FFI body, converting a caught panic into `KernargStatus::Panicked`.
///
/// `return` inside the body returns from the guarded closure.
macro_rules! ffi_guard {
    ($body:block) => {
        ffi_guard_or!($crate::status::KernargStatus::Panicked as i32, $body)
    };
}

/// Like [`ffi_guard!`] with an explicit value for the panic path.
macro_rules! ffi_guard_or {
    ($on_panic:expr, $body:block) => {
        match ::std::panic::catch_unwind(::std::panic::AssertUnwindSafe(|| $body)) {
            Ok(v) => v,
            Err(_) => {
                ::tracing::error!("panic caught at FFI boundary");
                $on_panic
            }
        }
    };
}

/// Lock a mutex or return `KernargStatus::InternalError` if it is poisoned.
macro_rules! ffi_lock {
    ($mutex:expr) => {
        match $mutex.lock() {
            Ok(guard) => guard,
            Err(_) => return $crate::status::KernargStatus::InternalError as i32,
        }
    };
}

pub mod config;
pub mod context;
mod handle;
pub mod native;
pub mod status;
pub mod types;

pub use native::{KernelFn, NativeError, NativeKernel, WorkFn};
pub use status::KernargStatus;
pub use types::{KernargDims, KernargKernelDef, KernargKernelId};
