//! Reusable kernel test fixtures.
//!
//! - [`QuadraticCost`] / [`QuadraticGradient`]: a closed-form cost and its gradient.
//! - [`ShiftMapping`] / [`ScaleMapping`]: elementwise `(u, p)` mappings.
//! - [`EchoKernel`]: copies one argument view into the output.
//! - [`ConstStatusKernel`]: returns a fixed status, writes nothing.
//! - [`CountingKernel`]: wraps another kernel and counts invocations.
//! - [`WorkspaceProbeKernel`]: reports the workspace it was handed.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use kernarg_core::{Kernel, KernelCall, KernelId, KernelSizes};

fn arg<'a>(call: &KernelCall<'a>, index: usize) -> &'a [f64] {
    call.arg(index).unwrap_or(&[])
}

/// `phi = 0.5 * (1 + sum(p)) * |u|^2 + sum(xi) * sum(u)`.
pub struct QuadraticCost;

impl Kernel for QuadraticCost {
    fn name(&self) -> &str {
        "quadratic_cost"
    }

    fn sizes(&self) -> KernelSizes {
        KernelSizes::minimal(KernelId::Cost)
    }

    fn eval(&self, mut call: KernelCall<'_>) -> i32 {
        let (u, xi, p) = (arg(&call, 0), arg(&call, 1), arg(&call, 2));
        let value = crate::quadratic_cost_value(u, xi, p);
        match call.output().first_mut() {
            Some(slot) => {
                *slot = value;
                0
            }
            None => 1,
        }
    }
}

/// `grad_i = (1 + sum(p)) * u_i + sum(xi)`.
pub struct QuadraticGradient;

impl Kernel for QuadraticGradient {
    fn name(&self) -> &str {
        "quadratic_grad"
    }

    fn sizes(&self) -> KernelSizes {
        KernelSizes::minimal(KernelId::Gradient)
    }

    fn eval(&self, mut call: KernelCall<'_>) -> i32 {
        let (u, xi, p) = (arg(&call, 0), arg(&call, 1), arg(&call, 2));
        let s = 1.0 + p.iter().sum::<f64>();
        let shift: f64 = xi.iter().sum();
        for (o, x) in call.output().iter_mut().zip(u) {
            *o = s * x + shift;
        }
        0
    }
}

/// `out[k] = u[k % nu] + p[k % np]`. Empty inputs contribute zero.
pub struct ShiftMapping;

impl Kernel for ShiftMapping {
    fn name(&self) -> &str {
        "shift_mapping"
    }

    fn sizes(&self) -> KernelSizes {
        KernelSizes::minimal(KernelId::MappingF1)
    }

    fn eval(&self, mut call: KernelCall<'_>) -> i32 {
        let (u, p) = (arg(&call, 0), arg(&call, 1));
        for (k, o) in call.output().iter_mut().enumerate() {
            *o = cyclic(u, k) + cyclic(p, k);
        }
        0
    }
}

/// `out[k] = u[k % nu] * p[k % np]`. Empty inputs contribute one.
pub struct ScaleMapping;

impl Kernel for ScaleMapping {
    fn name(&self) -> &str {
        "scale_mapping"
    }

    fn sizes(&self) -> KernelSizes {
        KernelSizes::minimal(KernelId::MappingF2)
    }

    fn eval(&self, mut call: KernelCall<'_>) -> i32 {
        let (u, p) = (arg(&call, 0), arg(&call, 1));
        for (k, o) in call.output().iter_mut().enumerate() {
            let a = if u.is_empty() { 1.0 } else { u[k % u.len()] };
            let b = if p.is_empty() { 1.0 } else { p[k % p.len()] };
            *o = a * b;
        }
        0
    }
}

fn cyclic(v: &[f64], k: usize) -> f64 {
    if v.is_empty() {
        0.0
    } else {
        v[k % v.len()]
    }
}

/// Copies argument view `arg_index` into the output, cycling if the
/// output is longer. Useful for checking which data a kernel was shown.
pub struct EchoKernel {
    pub arg_index: usize,
    pub sizes: KernelSizes,
}

impl EchoKernel {
    pub fn new(arg_index: usize, kernel: KernelId) -> Self {
        Self {
            arg_index,
            sizes: KernelSizes::minimal(kernel),
        }
    }
}

impl Kernel for EchoKernel {
    fn name(&self) -> &str {
        "echo"
    }

    fn sizes(&self) -> KernelSizes {
        self.sizes
    }

    fn eval(&self, mut call: KernelCall<'_>) -> i32 {
        let Some(src) = call.arg(self.arg_index) else {
            return -1;
        };
        for (k, o) in call.output().iter_mut().enumerate() {
            *o = cyclic(src, k);
        }
        0
    }
}

/// Returns a fixed status and leaves the output untouched.
pub struct ConstStatusKernel {
    pub name: String,
    pub status: i32,
    pub sizes: KernelSizes,
}

impl ConstStatusKernel {
    /// Minimal sizes for `kernel`.
    pub fn for_kernel(status: i32, kernel: KernelId) -> Self {
        Self::with_sizes(status, KernelSizes::minimal(kernel))
    }

    pub fn with_sizes(status: i32, sizes: KernelSizes) -> Self {
        Self {
            name: "const_status".to_string(),
            status,
            sizes,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Kernel for ConstStatusKernel {
    fn name(&self) -> &str {
        &self.name
    }

    fn sizes(&self) -> KernelSizes {
        self.sizes
    }

    fn eval(&self, _call: KernelCall<'_>) -> i32 {
        self.status
    }
}

/// Delegates to an inner kernel and counts calls.
///
/// The counter is shared so it stays observable after the kernel has been
/// moved into a context.
pub struct CountingKernel {
    inner: Box<dyn Kernel>,
    calls: Arc<AtomicUsize>,
}

impl CountingKernel {
    pub fn new(inner: impl Kernel) -> Self {
        Self {
            inner: Box::new(inner),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Handle to the call counter.
    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl Kernel for CountingKernel {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn sizes(&self) -> KernelSizes {
        self.inner.sizes()
    }

    fn eval(&self, call: KernelCall<'_>) -> i32 {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.inner.eval(call)
    }
}

/// Writes `iw.len() + w.len() + result_slots` into `out[0]` and dirties
/// both workspaces.
///
/// Fails with status `-1` if it is handed workspaces that do not match its
/// declared sizes.
pub struct WorkspaceProbeKernel {
    pub sizes: KernelSizes,
}

impl WorkspaceProbeKernel {
    pub fn new(sizes: KernelSizes) -> Self {
        Self { sizes }
    }
}

impl Kernel for WorkspaceProbeKernel {
    fn name(&self) -> &str {
        "workspace_probe"
    }

    fn sizes(&self) -> KernelSizes {
        self.sizes
    }

    fn eval(&self, mut call: KernelCall<'_>) -> i32 {
        let slots = call.result_slots();
        let iw_len = call.iw().len();
        let w_len = call.w().len();
        if iw_len != self.sizes.sz_iw || w_len != self.sizes.sz_w || slots != self.sizes.sz_res {
            return -1;
        }
        call.iw().fill(1);
        call.w().fill(1.0);
        if let Some(o) = call.output().first_mut() {
            *o = (iw_len + w_len + slots) as f64;
        }
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr;

    fn run(kernel: &dyn Kernel, args: &[&[f64]], out: &mut [f64]) -> i32 {
        let sizes = kernel.sizes();
        let mut argv = vec![ptr::null(); sizes.sz_arg];
        let mut res = vec![ptr::null_mut(); sizes.sz_res];
        let mut iw = vec![0i64; sizes.sz_iw];
        let mut w = vec![0.0; sizes.sz_w];
        kernel.eval(KernelCall::new(args, out, &mut argv, &mut res, &mut iw, &mut w))
    }

    #[test]
    fn shift_and_scale_cycle_inputs() {
        let u: &[f64] = &[1.0, 2.0];
        let p: &[f64] = &[10.0];
        let mut out = [0.0; 3];
        assert_eq!(run(&ShiftMapping, &[u, p], &mut out), 0);
        assert_eq!(out, [11.0, 12.0, 11.0]);
        assert_eq!(run(&ScaleMapping, &[u, p], &mut out), 0);
        assert_eq!(out, [10.0, 20.0, 10.0]);
    }

    #[test]
    fn mappings_tolerate_empty_inputs() {
        let empty: &[f64] = &[];
        let mut out = [5.0; 2];
        assert_eq!(run(&ShiftMapping, &[empty, empty], &mut out), 0);
        assert_eq!(out, [0.0, 0.0]);
        assert_eq!(run(&ScaleMapping, &[empty, empty], &mut out), 0);
        assert_eq!(out, [1.0, 1.0]);
    }

    #[test]
    fn quadratic_cost_needs_an_output_slot() {
        let u: &[f64] = &[1.0];
        let mut out: [f64; 0] = [];
        assert_eq!(run(&QuadraticCost, &[u, u, u], &mut out), 1);
    }

    #[test]
    fn counting_kernel_counts() {
        let k = CountingKernel::new(ConstStatusKernel::for_kernel(4, KernelId::Cost));
        let counter = k.counter();
        let u: &[f64] = &[0.0];
        let mut out = [0.0];
        assert_eq!(run(&k, &[u, u, u], &mut out), 4);
        assert_eq!(run(&k, &[u, u, u], &mut out), 4);
        assert_eq!(counter.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn echo_rejects_missing_argument() {
        let u: &[f64] = &[1.0];
        let mut out = [0.0];
        assert_eq!(run(&EchoKernel::new(2, KernelId::MappingF1), &[u, u], &mut out), -1);
    }
}
