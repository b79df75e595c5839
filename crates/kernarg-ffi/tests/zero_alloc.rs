//! Integration test: steady-state dispatch performs no heap allocation,
//! whatever the native evaluator's declared argument-slot count.
//!
//! A counting global allocator tallies allocations per thread, so tests
//! running in parallel do not see each other's traffic.

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;
use std::ffi::c_void;
use std::ptr;

use kernarg_core::{KernelId, KernelSizes, ProblemDims};
use kernarg_engine::{KernelSet, MarshalConfig, MarshalContext};
use kernarg_ffi::config::{
    kernarg_config_create, kernarg_config_set_dims, kernarg_config_set_kernel,
};
use kernarg_ffi::context::{
    kernarg_context_create, kernarg_context_destroy, kernarg_cost, kernarg_mapping_f1,
};
use kernarg_ffi::{
    KernargDims, KernargKernelDef, KernargKernelId, KernargStatus, KernelFn, NativeKernel,
};

struct CountingAlloc;

thread_local! {
    static ALLOCS: Cell<usize> = const { Cell::new(0) };
}

fn bump() {
    let _ = ALLOCS.try_with(|n| n.set(n.get() + 1));
}

unsafe impl GlobalAlloc for CountingAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        bump();
        System.alloc(layout)
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        bump();
        System.alloc_zeroed(layout)
    }

    unsafe fn realloc(&self, p: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        bump();
        System.realloc(p, layout, new_size)
    }

    unsafe fn dealloc(&self, p: *mut u8, layout: Layout) {
        System.dealloc(p, layout)
    }
}

#[global_allocator]
static GLOBAL: CountingAlloc = CountingAlloc;

/// Allocations made on this thread while running `f`.
fn allocations_during(f: impl FnOnce()) -> usize {
    let before = ALLOCS.with(Cell::get);
    f();
    ALLOCS.with(Cell::get) - before
}

/// `res[0][0] = sum of every non-null argument's first entry`.
unsafe extern "C" fn sum_heads(
    arg: *const *const f64,
    res: *mut *mut f64,
    _iw: *mut i64,
    _w: *mut f64,
    _mem: *mut c_void,
) -> i32 {
    let mut total = 0.0;
    for k in 0..3 {
        let a = *arg.add(k);
        if !a.is_null() {
            total += *a;
        }
    }
    **res = total;
    0
}

unsafe extern "C" fn fill_ones(
    _arg: *const *const f64,
    res: *mut *mut f64,
    _iw: *mut i64,
    _w: *mut f64,
    _mem: *mut c_void,
) -> i32 {
    **res = 1.0;
    0
}

fn native_context(sz_arg: usize) -> MarshalContext {
    let native = |id: KernelId, eval: KernelFn, sz_arg: usize| unsafe {
        NativeKernel::new(id.name(), eval, KernelSizes::new(sz_arg, 2, 4, 8))
    };
    let kernels = KernelSet::new(
        native(KernelId::Cost, sum_heads, sz_arg),
        native(KernelId::Gradient, fill_ones, sz_arg),
        native(KernelId::MappingF1, fill_ones, sz_arg.max(2)),
        native(KernelId::MappingF2, fill_ones, sz_arg.max(2)),
    );
    MarshalContext::new(MarshalConfig::new(ProblemDims::new(1, 1, 1, 1, 1), kernels)).unwrap()
}

#[test]
fn native_dispatch_does_not_allocate_for_any_arg_slot_count() {
    for sz_arg in [3, 8, 9, 16, 64] {
        let mut ctx = native_context(sz_arg);
        let (u, xi, p) = ([1.0], [2.0], [4.0]);
        let (mut phi, mut grad, mut f1, mut f2) = ([0.0], [0.0], [0.0], [0.0]);

        // First call registers tracing callsites.
        ctx.cost(&u, &xi, &p, &mut phi).unwrap();

        let allocs = allocations_during(|| {
            for _ in 0..100 {
                ctx.cost(&u, &xi, &p, &mut phi).unwrap();
                ctx.gradient(&u, &xi, &p, &mut grad).unwrap();
                ctx.mapping_f1(&u, &p, &mut f1).unwrap();
                ctx.mapping_f2(&u, &p, &mut f2).unwrap();
            }
        });
        assert_eq!(allocs, 0, "sz_arg = {sz_arg}");
        assert_eq!(phi, [7.0]);
        assert_eq!((grad, f1, f2), ([1.0], [1.0], [1.0]));
    }
}

#[test]
fn c_abi_dispatch_does_not_allocate() {
    const OK: i32 = KernargStatus::Ok as i32;
    let mut cfg = 0u64;
    assert_eq!(kernarg_config_create(&mut cfg), OK);
    let dims = KernargDims {
        nu: 1,
        nxi: 1,
        np: 1,
        n1: 1,
        n2: 1,
    };
    assert_eq!(kernarg_config_set_dims(cfg, &dims), OK);
    for (id, eval) in [
        (KernargKernelId::Cost, sum_heads as KernelFn),
        (KernargKernelId::Gradient, fill_ones as KernelFn),
        (KernargKernelId::MappingF1, fill_ones as KernelFn),
        (KernargKernelId::MappingF2, fill_ones as KernelFn),
    ] {
        let def = KernargKernelDef {
            name: ptr::null(),
            eval: Some(eval),
            sz_arg: 12,
            sz_res: 1,
            sz_iw: 0,
            sz_w: 0,
        };
        assert_eq!(kernarg_config_set_kernel(cfg, id as i32, &def), OK);
    }
    let mut ctx = 0u64;
    assert_eq!(kernarg_context_create(cfg, &mut ctx), OK);

    let (u, xi, p) = ([1.0], [2.0], [4.0]);
    let (mut phi, mut f1) = ([0.0], [0.0]);
    let mut status = -1;
    let dispatch = |phi: &mut [f64; 1], f1: &mut [f64; 1], status: &mut i32| {
        let rc = kernarg_cost(
            ctx, u.as_ptr(), 1, xi.as_ptr(), 1, p.as_ptr(), 1, phi.as_mut_ptr(), 1, status,
        );
        assert_eq!((rc, *status), (OK, 0));
        let rc = kernarg_mapping_f1(ctx, u.as_ptr(), 1, p.as_ptr(), 1, f1.as_mut_ptr(), 1, status);
        assert_eq!((rc, *status), (OK, 0));
    };
    dispatch(&mut phi, &mut f1, &mut status);

    let allocs = allocations_during(|| {
        for _ in 0..100 {
            dispatch(&mut phi, &mut f1, &mut status);
        }
    });
    assert_eq!(allocs, 0);
    assert_eq!((phi, f1), ([7.0], [1.0]));
    assert_eq!(kernarg_context_destroy(ctx), OK);
}
