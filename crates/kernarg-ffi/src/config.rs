//! Config builder FFI: accumulate dimensions and kernels behind a handle.
//!
//! C callers create a builder, set the dimensions, register all four
//! kernels, then pass the handle to `kernarg_context_create`, which
//! consumes it.

use std::ffi::{c_char, CStr};
use std::sync::Mutex;

use kernarg_core::{KernelId, ProblemDims};
use kernarg_engine::{KernelSet, KernelSetBuilder, MarshalConfig};

use crate::handle::HandleTable;
use crate::native::{KernelFn, NativeKernel, WorkFn};
use crate::status::KernargStatus;
use crate::types::{KernargDims, KernargKernelDef};

static CONFIGS: Mutex<HandleTable<ConfigBuilder>> = Mutex::new(HandleTable::new());

/// Internal builder accumulated by FFI calls.
#[derive(Default)]
pub(crate) struct ConfigBuilder {
    pub dims: Option<ProblemDims>,
    pub kernels: KernelSetBuilder,
}

impl ConfigBuilder {
    /// Finish into an engine config. Fails if dimensions were never set
    /// or a kernel is missing.
    pub fn build(self) -> Result<MarshalConfig, KernargStatus> {
        let dims = self.dims.ok_or(KernargStatus::ConfigError)?;
        let kernels: KernelSet = self
            .kernels
            .build()
            .map_err(|e| KernargStatus::from(&e))?;
        Ok(MarshalConfig::new(dims, kernels))
    }
}

pub(crate) fn configs() -> &'static Mutex<HandleTable<ConfigBuilder>> {
    &CONFIGS
}

/// Read an optional C string, falling back to `default`.
///
/// # Safety
///
/// `name` must be null or point at a null-terminated string.
#[allow(unsafe_code)]
unsafe fn name_or(name: *const c_char, default: &str) -> Option<String> {
    if name.is_null() {
        return Some(default.to_owned());
    }
    // SAFETY: non-null and null-terminated per caller contract.
    unsafe { CStr::from_ptr(name) }
        .to_str()
        .ok()
        .map(str::to_owned)
}

// ── FFI functions ───────────────────────────────────────────────

/// Create a new config builder. Returns handle via `out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn kernarg_config_create(out: *mut u64) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return KernargStatus::InvalidArgument as i32;
        }
        let handle = ffi_lock!(CONFIGS).insert(ConfigBuilder::default());
        // SAFETY: out is non-null and valid per caller contract.
        unsafe { *out = handle };
        KernargStatus::Ok as i32
    })
}

/// Destroy a config builder without building a context.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn kernarg_config_destroy(handle: u64) -> i32 {
    ffi_guard!({
        match ffi_lock!(CONFIGS).remove(handle) {
            Some(_) => KernargStatus::Ok as i32,
            None => KernargStatus::InvalidHandle as i32,
        }
    })
}

/// Set the problem dimensions.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn kernarg_config_set_dims(handle: u64, dims: *const KernargDims) -> i32 {
    ffi_guard!({
        if dims.is_null() {
            return KernargStatus::InvalidArgument as i32;
        }
        // SAFETY: dims is non-null and valid per caller contract.
        let dims = unsafe { *dims };
        let Some(dims) = dims.to_problem_dims() else {
            return KernargStatus::InvalidArgument as i32;
        };
        let mut table = ffi_lock!(CONFIGS);
        match table.get_mut(handle) {
            Some(builder) => {
                builder.dims = Some(dims);
                KernargStatus::Ok as i32
            }
            None => KernargStatus::InvalidHandle as i32,
        }
    })
}

fn register(
    handle: u64,
    kernel: i32,
    native: impl FnOnce(KernelId) -> Result<NativeKernel, KernargStatus>,
) -> i32 {
    let Some(id) = KernelId::from_raw(kernel) else {
        return KernargStatus::InvalidArgument as i32;
    };
    let native = match native(id) {
        Ok(k) => k,
        Err(status) => return status as i32,
    };
    let mut table = ffi_lock!(CONFIGS);
    let Some(builder) = table.get_mut(handle) else {
        return KernargStatus::InvalidHandle as i32;
    };
    match builder.kernels.insert(id, native) {
        Ok(()) => KernargStatus::Ok as i32,
        Err(e) => KernargStatus::from(&e) as i32,
    }
}

/// Register a native kernel with explicitly declared sizes.
///
/// `kernel` is a `KernargKernelId` discriminant. Registering the same
/// kernel twice fails with `CONFIG_ERROR`.
///
/// The caller guarantees that `def->eval` honours the native calling
/// convention for the declared sizes and stays callable for the lifetime
/// of any context built from this config.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn kernarg_config_set_kernel(
    handle: u64,
    kernel: i32,
    def: *const KernargKernelDef,
) -> i32 {
    ffi_guard!({
        if def.is_null() {
            return KernargStatus::InvalidArgument as i32;
        }
        // SAFETY: def is non-null and valid per caller contract.
        let def = unsafe { *def };
        register(handle, kernel, |id| {
            let eval = def.eval.ok_or(KernargStatus::InvalidArgument)?;
            let sizes = def.sizes().ok_or(KernargStatus::InvalidArgument)?;
            // SAFETY: name is null or null-terminated per caller contract.
            let name = unsafe { name_or(def.name, id.name()) }
                .ok_or(KernargStatus::InvalidArgument)?;
            // SAFETY: eval honours the declared sizes per caller contract.
            Ok(unsafe { NativeKernel::new(name, eval, sizes) })
        })
    })
}

/// Register a native kernel, querying its sizes from `work`.
///
/// `name` may be null. Same lifetime contract as
/// `kernarg_config_set_kernel`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn kernarg_config_set_kernel_work(
    handle: u64,
    kernel: i32,
    name: *const c_char,
    eval: Option<KernelFn>,
    work: Option<WorkFn>,
) -> i32 {
    ffi_guard!({
        let (Some(eval), Some(work)) = (eval, work) else {
            return KernargStatus::InvalidArgument as i32;
        };
        register(handle, kernel, |id| {
            // SAFETY: name is null or null-terminated per caller contract.
            let name =
                unsafe { name_or(name, id.name()) }.ok_or(KernargStatus::InvalidArgument)?;
            // SAFETY: eval and work honour the native convention per caller contract.
            unsafe { NativeKernel::from_work_fn(name, eval, work) }
                .map_err(|e| KernargStatus::from(&e))
        })
    })
}
