//! Context lifecycle and dispatch FFI.
//!
//! Each context lives behind its own `Arc<Mutex<MarshalContext>>`, so the
//! global table lock is held only for handle lookup and different
//! contexts can dispatch from different threads at the same time. Calls
//! on one context are serialized by its mutex.
//!
//! Dispatchers return a [`KernargStatus`]. When that is `KERNARG_STATUS_OK`
//! the kernel ran and its own return value has been written, unmodified,
//! to `*status_out`. On any other code the kernel was not invoked and
//! `*status_out` is left untouched.

use std::slice;
use std::sync::{Arc, Mutex};

use kernarg_core::{KernelStatus, ShapeError};
use kernarg_engine::MarshalContext;

use crate::config::configs;
use crate::handle::HandleTable;
use crate::status::KernargStatus;
use crate::types::KernargDims;

type ContextArc = Arc<Mutex<MarshalContext>>;

static CONTEXTS: Mutex<HandleTable<ContextArc>> = Mutex::new(HandleTable::new());

/// Clone the Arc for a context handle, briefly locking the global table.
fn get_context(handle: u64) -> Option<ContextArc> {
    CONTEXTS.lock().ok()?.get(handle).cloned()
}

/// View a caller vector. A zero length accepts a null pointer.
///
/// # Safety
///
/// When `len > 0`, `ptr` must point at `len` readable doubles that stay
/// valid and unaliased by writes for `'a`.
#[allow(unsafe_code)]
unsafe fn input<'a>(ptr: *const f64, len: usize) -> Option<&'a [f64]> {
    if len == 0 {
        return Some(&[]);
    }
    if ptr.is_null() {
        return None;
    }
    // SAFETY: non-null with `len` elements per caller contract.
    Some(unsafe { slice::from_raw_parts(ptr, len) })
}

/// View a caller output buffer. A zero length accepts a null pointer.
///
/// # Safety
///
/// When `len > 0`, `ptr` must point at `len` writable doubles not aliased
/// by any input for `'a`.
#[allow(unsafe_code)]
unsafe fn output<'a>(ptr: *mut f64, len: usize) -> Option<&'a mut [f64]> {
    if len == 0 {
        return Some(Default::default());
    }
    if ptr.is_null() {
        return None;
    }
    // SAFETY: non-null with `len` elements per caller contract.
    Some(unsafe { slice::from_raw_parts_mut(ptr, len) })
}

/// Look up the context, run one dispatch, and report the kernel status.
#[allow(unsafe_code)]
fn dispatch(
    handle: u64,
    status_out: *mut i32,
    run: impl FnOnce(&mut MarshalContext) -> Result<KernelStatus, ShapeError>,
) -> i32 {
    if status_out.is_null() {
        return KernargStatus::InvalidArgument as i32;
    }
    let Some(ctx_arc) = get_context(handle) else {
        return KernargStatus::InvalidHandle as i32;
    };
    let mut ctx = ffi_lock!(ctx_arc);
    match run(&mut *ctx) {
        Ok(status) => {
            // SAFETY: status_out is non-null and valid per caller contract.
            unsafe { *status_out = status.code() };
            KernargStatus::Ok as i32
        }
        Err(e) => {
            tracing::debug!(error = %e, "ffi dispatch rejected");
            KernargStatus::from(&e) as i32
        }
    }
}

// ── Lifecycle ───────────────────────────────────────────────────

/// Build a context from a config handle. Consumes the config.
///
/// On success, writes the context handle to `out` and returns
/// `KERNARG_STATUS_OK`. On failure the config is still consumed.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn kernarg_context_create(config_handle: u64, out: *mut u64) -> i32 {
    ffi_guard!({
        // Remove first so the config is consumed on every path.
        let builder = match ffi_lock!(configs()).remove(config_handle) {
            Some(b) => b,
            None => return KernargStatus::InvalidHandle as i32,
        };
        if out.is_null() {
            return KernargStatus::InvalidArgument as i32;
        }
        let config = match builder.build() {
            Ok(c) => c,
            Err(status) => return status as i32,
        };
        let ctx = match MarshalContext::new(config) {
            Ok(ctx) => ctx,
            Err(e) => {
                tracing::debug!(error = %e, "context config rejected");
                return KernargStatus::from(&e) as i32;
            }
        };
        let handle = ffi_lock!(CONTEXTS).insert(Arc::new(Mutex::new(ctx)));
        // SAFETY: out is non-null and valid per caller contract.
        unsafe { *out = handle };
        KernargStatus::Ok as i32
    })
}

/// Destroy a context, releasing its scratch space and workspaces.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn kernarg_context_destroy(handle: u64) -> i32 {
    ffi_guard!({
        match ffi_lock!(CONTEXTS).remove(handle) {
            Some(_) => KernargStatus::Ok as i32,
            None => KernargStatus::InvalidHandle as i32,
        }
    })
}

/// Write the context's problem dimensions to `out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn kernarg_context_dims(handle: u64, out: *mut KernargDims) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return KernargStatus::InvalidArgument as i32;
        }
        let Some(ctx_arc) = get_context(handle) else {
            return KernargStatus::InvalidHandle as i32;
        };
        let dims = KernargDims::from(ffi_lock!(ctx_arc).dims());
        // SAFETY: out is non-null and valid per caller contract.
        unsafe { *out = dims };
        KernargStatus::Ok as i32
    })
}

// ── Dispatchers ─────────────────────────────────────────────────

/// Evaluate the cost into `out[0]` (`n_out` must be 1).
///
/// Null pointers are accepted for zero-length vectors.
#[no_mangle]
#[allow(unsafe_code)]
#[allow(clippy::too_many_arguments)]
pub extern "C" fn kernarg_cost(
    handle: u64,
    u: *const f64,
    nu: usize,
    xi: *const f64,
    nxi: usize,
    p: *const f64,
    np: usize,
    out: *mut f64,
    n_out: usize,
    status_out: *mut i32,
) -> i32 {
    ffi_guard!({
        // SAFETY: pointer/length pairs are valid per caller contract.
        let views = unsafe { (input(u, nu), input(xi, nxi), input(p, np), output(out, n_out)) };
        let (Some(u), Some(xi), Some(p), Some(out)) = views else {
            return KernargStatus::InvalidArgument as i32;
        };
        dispatch(handle, status_out, |ctx| ctx.cost(u, xi, p, out))
    })
}

/// Evaluate the gradient into `out` (`n_out` must be `nu`).
#[no_mangle]
#[allow(unsafe_code)]
#[allow(clippy::too_many_arguments)]
pub extern "C" fn kernarg_gradient(
    handle: u64,
    u: *const f64,
    nu: usize,
    xi: *const f64,
    nxi: usize,
    p: *const f64,
    np: usize,
    out: *mut f64,
    n_out: usize,
    status_out: *mut i32,
) -> i32 {
    ffi_guard!({
        // SAFETY: pointer/length pairs are valid per caller contract.
        let views = unsafe { (input(u, nu), input(xi, nxi), input(p, np), output(out, n_out)) };
        let (Some(u), Some(xi), Some(p), Some(out)) = views else {
            return KernargStatus::InvalidArgument as i32;
        };
        dispatch(handle, status_out, |ctx| ctx.gradient(u, xi, p, out))
    })
}

/// Evaluate mapping F1 into `out` (`n_out` must be `n1`).
#[no_mangle]
#[allow(unsafe_code)]
#[allow(clippy::too_many_arguments)]
pub extern "C" fn kernarg_mapping_f1(
    handle: u64,
    u: *const f64,
    nu: usize,
    p: *const f64,
    np: usize,
    out: *mut f64,
    n_out: usize,
    status_out: *mut i32,
) -> i32 {
    ffi_guard!({
        // SAFETY: pointer/length pairs are valid per caller contract.
        let views = unsafe { (input(u, nu), input(p, np), output(out, n_out)) };
        let (Some(u), Some(p), Some(out)) = views else {
            return KernargStatus::InvalidArgument as i32;
        };
        dispatch(handle, status_out, |ctx| ctx.mapping_f1(u, p, out))
    })
}

/// Evaluate mapping F2 into `out` (`n_out` must be `n2`).
#[no_mangle]
#[allow(unsafe_code)]
#[allow(clippy::too_many_arguments)]
pub extern "C" fn kernarg_mapping_f2(
    handle: u64,
    u: *const f64,
    nu: usize,
    p: *const f64,
    np: usize,
    out: *mut f64,
    n_out: usize,
    status_out: *mut i32,
) -> i32 {
    ffi_guard!({
        // SAFETY: pointer/length pairs are valid per caller contract.
        let views = unsafe { (input(u, nu), input(p, np), output(out, n_out)) };
        let (Some(u), Some(p), Some(out)) = views else {
            return KernargStatus::InvalidArgument as i32;
        };
        dispatch(handle, status_out, |ctx| ctx.mapping_f2(u, p, out))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_handles_rejected() {
        let mut out = 0u64;
        assert_eq!(
            kernarg_context_create(u64::MAX, &mut out),
            KernargStatus::InvalidHandle as i32
        );
        assert_eq!(kernarg_context_destroy(u64::MAX), KernargStatus::InvalidHandle as i32);
        let mut dims = KernargDims::default();
        assert_eq!(
            kernarg_context_dims(u64::MAX, &mut dims),
            KernargStatus::InvalidHandle as i32
        );
    }

    #[test]
    fn null_status_out_rejected_before_lookup() {
        let mut out = [0.0];
        assert_eq!(
            kernarg_mapping_f1(
                u64::MAX,
                std::ptr::null(),
                0,
                std::ptr::null(),
                0,
                out.as_mut_ptr(),
                1,
                std::ptr::null_mut()
            ),
            KernargStatus::InvalidArgument as i32
        );
    }

    #[test]
    fn null_with_nonzero_length_rejected() {
        let mut status = 0;
        assert_eq!(
            kernarg_cost(
                u64::MAX,
                std::ptr::null(),
                2,
                std::ptr::null(),
                0,
                std::ptr::null(),
                0,
                std::ptr::null_mut(),
                0,
                &mut status
            ),
            KernargStatus::InvalidArgument as i32
        );
    }

    #[test]
    fn incomplete_config_is_consumed() {
        let mut cfg = 0u64;
        assert_eq!(crate::config::kernarg_config_create(&mut cfg), 0);
        let mut ctx = 0u64;
        assert_eq!(
            kernarg_context_create(cfg, &mut ctx),
            KernargStatus::ConfigError as i32
        );
        assert_eq!(
            crate::config::kernarg_config_destroy(cfg),
            KernargStatus::InvalidHandle as i32
        );
    }
}
