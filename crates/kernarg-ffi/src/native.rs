//! Adapter from generated native evaluators to the [`Kernel`] trait.
//!
//! A generated evaluator exposes
//!
//! ```c
//! int f(const double** arg, double** res, long long* iw, double* w, void* mem);
//! int f_work(long long* sz_arg, long long* sz_res, long long* sz_iw, long long* sz_w);
//! ```
//!
//! [`NativeKernel`] holds the entry point and its sizes. On every call it
//! takes the argument table (filled from the views, extra slots null),
//! the bound result table, and the workspaces from the [`KernelCall`],
//! all preallocated by the arena, and passes a null `mem`.

#![allow(unsafe_code)]

use std::ffi::c_void;
use std::fmt;
use std::ptr;

use kernarg_core::{Kernel, KernelCall, KernelSizes};

/// Native evaluator entry point.
pub type KernelFn = unsafe extern "C" fn(
    arg: *const *const f64,
    res: *mut *mut f64,
    iw: *mut i64,
    w: *mut f64,
    mem: *mut c_void,
) -> i32;

/// Native size query: writes `sz_arg`, `sz_res`, `sz_iw`, `sz_w`.
pub type WorkFn =
    unsafe extern "C" fn(sz_arg: *mut i64, sz_res: *mut i64, sz_iw: *mut i64, sz_w: *mut i64) -> i32;

/// Errors from querying a native evaluator's sizes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NativeError {
    /// The size query returned a nonzero status.
    WorkQueryFailed {
        /// Status returned by the query.
        status: i32,
    },
    /// The size query reported a negative size.
    NegativeSize {
        /// Which size (`sz_arg`, `sz_res`, `sz_iw`, or `sz_w`).
        which: &'static str,
        /// The reported value.
        value: i64,
    },
}

impl fmt::Display for NativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WorkQueryFailed { status } => {
                write!(f, "work size query returned status {status}")
            }
            Self::NegativeSize { which, value } => {
                write!(f, "work size query reported {which} = {value}")
            }
        }
    }
}

impl std::error::Error for NativeError {}

/// A native evaluator driven through the [`Kernel`] trait.
pub struct NativeKernel {
    name: String,
    eval: KernelFn,
    sizes: KernelSizes,
}

impl NativeKernel {
    /// Wrap `eval` with explicitly supplied sizes.
    ///
    /// # Safety
    ///
    /// `eval` must be safe to call with `sizes.sz_arg` argument pointers
    /// (each pointing at the matching view, or null beyond the views), a
    /// result table of `sizes.sz_res` slots with slot 0 bound to an output
    /// buffer of the kernel's declared length, workspaces of exactly
    /// `sz_iw` / `sz_w` elements (null when zero), and a null `mem`. It must
    /// not retain any of these pointers after returning, and it must be
    /// callable from whichever thread owns the context.
    pub unsafe fn new(name: impl Into<String>, eval: KernelFn, sizes: KernelSizes) -> Self {
        Self {
            name: name.into(),
            eval,
            sizes,
        }
    }

    /// Wrap `eval`, taking sizes from its companion `work` query.
    ///
    /// # Safety
    ///
    /// Same contract as [`NativeKernel::new`]; additionally `work` must be
    /// safe to call with four valid out-pointers.
    pub unsafe fn from_work_fn(
        name: impl Into<String>,
        eval: KernelFn,
        work: WorkFn,
    ) -> Result<Self, NativeError> {
        let (mut sz_arg, mut sz_res, mut sz_iw, mut sz_w) = (0i64, 0i64, 0i64, 0i64);
        // SAFETY: all four pointers are to live locals.
        let status = unsafe { work(&mut sz_arg, &mut sz_res, &mut sz_iw, &mut sz_w) };
        if status != 0 {
            return Err(NativeError::WorkQueryFailed { status });
        }
        let conv = |which, value: i64| {
            usize::try_from(value).map_err(|_| NativeError::NegativeSize { which, value })
        };
        let sizes = KernelSizes::new(
            conv("sz_arg", sz_arg)?,
            conv("sz_res", sz_res)?,
            conv("sz_iw", sz_iw)?,
            conv("sz_w", sz_w)?,
        );
        let name = name.into();
        tracing::debug!(name = %name, ?sizes, "native kernel sizes queried");
        // SAFETY: forwarded caller contract.
        Ok(unsafe { Self::new(name, eval, sizes) })
    }
}

impl Kernel for NativeKernel {
    fn name(&self) -> &str {
        &self.name
    }

    fn sizes(&self) -> KernelSizes {
        self.sizes
    }

    fn eval(&self, mut call: KernelCall<'_>) -> i32 {
        let raw = call.raw_parts();
        // SAFETY: `raw.arg` holds `sz_arg` entries pointing at views that
        // borrow the scratch buffer for the call frame's lifetime. `raw.res`
        // has slot 0 bound to the output buffer, and the workspaces have the
        // declared lengths (null when empty). The rest is the contract
        // accepted in `NativeKernel::new`.
        unsafe { (self.eval)(raw.arg, raw.res, raw.iw, raw.w, ptr::null_mut()) }
    }
}
