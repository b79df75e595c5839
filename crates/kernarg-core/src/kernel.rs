//! The [`Kernel`] trait, kernel identities, scratch sizes, and the
//! per-call [`KernelCall`] frame.
//!
//! Kernels are black-box evaluators. The marshaling layer hands each one a
//! set of argument views into packed scratch space, an output buffer bound
//! into slot 0 of a result table, and two preallocated workspaces. What the
//! kernel computes is its own business; it reports back with an integer
//! status that is passed to the caller untouched.

use std::fmt;
use std::ptr;

/// Identifies one of the four evaluator kernels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KernelId {
    /// Cost function `phi(u, xi, p)`, scalar output.
    Cost,
    /// Gradient of the cost with respect to `u`, output length `nu`.
    Gradient,
    /// Constraint mapping F1 (ALM constraints), output length `n1`.
    MappingF1,
    /// Constraint mapping F2 (penalty constraints), output length `n2`.
    MappingF2,
}

impl KernelId {
    /// All kernels in registration order.
    pub const ALL: [KernelId; 4] = [
        KernelId::Cost,
        KernelId::Gradient,
        KernelId::MappingF1,
        KernelId::MappingF2,
    ];

    /// Stable index in `0..4`, matching the position in [`KernelId::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Short name used in logs and error messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::Cost => "cost",
            Self::Gradient => "grad",
            Self::MappingF1 => "mapping_f1",
            Self::MappingF2 => "mapping_f2",
        }
    }

    /// Number of argument views the kernel receives.
    ///
    /// Cost and gradient see `(u, xi, p)`; the mappings see `(u, p)`.
    pub fn arity(self) -> usize {
        match self {
            Self::Cost | Self::Gradient => 3,
            Self::MappingF1 | Self::MappingF2 => 2,
        }
    }

    /// Whether the kernel consumes the auxiliary vector.
    pub fn reads_auxiliary(self) -> bool {
        self.arity() == 3
    }

    /// Convert a raw discriminant (as used across the C boundary).
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(Self::Cost),
            1 => Some(Self::Gradient),
            2 => Some(Self::MappingF1),
            3 => Some(Self::MappingF2),
            _ => None,
        }
    }
}

impl fmt::Display for KernelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Scratch requirements declared by a kernel.
///
/// Mirrors the four work sizes a generated evaluator reports: number of
/// argument slots, number of result slots, integer workspace length, and
/// real workspace length. Any of them may be zero except where the
/// dispatcher needs a slot (validated by the engine).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct KernelSizes {
    /// Number of argument pointer slots.
    pub sz_arg: usize,
    /// Number of result pointer slots.
    pub sz_res: usize,
    /// Integer workspace length (in `i64` elements).
    pub sz_iw: usize,
    /// Real workspace length (in `f64` elements).
    pub sz_w: usize,
}

impl KernelSizes {
    /// Create sizes from explicit values.
    pub fn new(sz_arg: usize, sz_res: usize, sz_iw: usize, sz_w: usize) -> Self {
        Self {
            sz_arg,
            sz_res,
            sz_iw,
            sz_w,
        }
    }

    /// Smallest valid sizes for a kernel: one slot per argument, one
    /// result slot, no workspace.
    pub fn minimal(kernel: KernelId) -> Self {
        Self::new(kernel.arity(), 1, 0, 0)
    }

    /// Same sizes with the given workspace lengths.
    pub fn with_workspace(self, sz_iw: usize, sz_w: usize) -> Self {
        Self {
            sz_iw,
            sz_w,
            ..self
        }
    }
}

/// A black-box evaluator invoked by the dispatchers.
///
/// # Contract
///
/// - `eval()` MUST be a pure function of the argument views: the same
///   views produce the same output and status.
/// - `sizes()` is queried once when a context is built; the workspaces
///   handed to `eval()` have exactly those lengths.
/// - The returned status is forwarded verbatim. `0` conventionally means
///   success; any other value is evaluator-defined.
///
/// # Examples
///
/// A cost kernel computing `0.5 * |u|^2`:
///
/// ```
/// use kernarg_core::{Kernel, KernelCall, KernelId, KernelSizes};
///
/// struct HalfNormSquared;
///
/// impl Kernel for HalfNormSquared {
///     fn name(&self) -> &str { "half_norm_squared" }
///
///     fn sizes(&self) -> KernelSizes { KernelSizes::minimal(KernelId::Cost) }
///
///     fn eval(&self, mut call: KernelCall<'_>) -> i32 {
///         let u = call.arg(0).unwrap_or(&[]);
///         let value = 0.5 * u.iter().map(|x| x * x).sum::<f64>();
///         call.output()[0] = value;
///         0
///     }
/// }
///
/// assert_eq!(HalfNormSquared.name(), "half_norm_squared");
/// ```
pub trait Kernel: Send + 'static {
    /// Human-readable name for logging and error reporting.
    fn name(&self) -> &str;

    /// Scratch sizes this kernel requires.
    fn sizes(&self) -> KernelSizes;

    /// Evaluate the kernel.
    fn eval(&self, call: KernelCall<'_>) -> i32;
}

impl<K: Kernel + ?Sized> Kernel for Box<K> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn sizes(&self) -> KernelSizes {
        (**self).sizes()
    }

    fn eval(&self, call: KernelCall<'_>) -> i32 {
        (**self).eval(call)
    }
}

/// Everything a kernel sees during one invocation.
///
/// Built by the arena's workspace right before the kernel runs. On
/// construction the output buffer is bound into slot 0 of the result
/// table. When the frame is dropped every argument and result slot is
/// nulled, so no pointer to caller or scratch memory outlives the call.
pub struct KernelCall<'a> {
    args: &'a [&'a [f64]],
    out: &'a mut [f64],
    argv: &'a mut [*const f64],
    res: &'a mut [*mut f64],
    iw: &'a mut [i64],
    w: &'a mut [f64],
}

/// Raw pointers for evaluators using the native calling convention.
///
/// Empty workspaces are passed as null.
#[derive(Clone, Copy, Debug)]
pub struct RawCallParts {
    /// Argument table: one pointer per view, null in the remaining slots.
    pub arg: *const *const f64,
    /// Result table with slot 0 bound to the output buffer.
    pub res: *mut *mut f64,
    /// Integer workspace, or null when empty.
    pub iw: *mut i64,
    /// Real workspace, or null when empty.
    pub w: *mut f64,
}

impl<'a> KernelCall<'a> {
    /// Assemble a call frame and bind `out` into result slot 0.
    ///
    /// `argv` is the preallocated argument-pointer table; it is only
    /// filled when a native evaluator asks for [`raw_parts`](Self::raw_parts).
    ///
    /// # Panics
    ///
    /// Panics if `res` has no slots. Engine validation rejects kernels
    /// declaring `sz_res == 0`.
    pub fn new(
        args: &'a [&'a [f64]],
        out: &'a mut [f64],
        argv: &'a mut [*const f64],
        res: &'a mut [*mut f64],
        iw: &'a mut [i64],
        w: &'a mut [f64],
    ) -> Self {
        assert!(!res.is_empty(), "result table has no slot to bind the output");
        res[0] = out.as_mut_ptr();
        Self {
            args,
            out,
            argv,
            res,
            iw,
            w,
        }
    }

    /// All argument views in slot order.
    pub fn args(&self) -> &[&'a [f64]] {
        self.args
    }

    /// Argument view at `index`, if present.
    pub fn arg(&self, index: usize) -> Option<&'a [f64]> {
        self.args.get(index).copied()
    }

    /// Output buffer bound to result slot 0.
    pub fn output(&mut self) -> &mut [f64] {
        self.out
    }

    /// Integer workspace.
    pub fn iw(&mut self) -> &mut [i64] {
        self.iw
    }

    /// Real workspace.
    pub fn w(&mut self) -> &mut [f64] {
        self.w
    }

    /// Number of result slots available.
    pub fn result_slots(&self) -> usize {
        self.res.len()
    }

    /// Number of argument-pointer slots available.
    pub fn arg_slots(&self) -> usize {
        self.argv.len()
    }

    /// The argument-pointer table as last filled by
    /// [`raw_parts`](Self::raw_parts).
    pub fn arg_table(&self) -> &[*const f64] {
        self.argv
    }

    /// Raw pointers for a native evaluator.
    ///
    /// Fills the argument table from the views (slots past the last view
    /// are nulled) and re-binds result slot 0 from the output buffer so
    /// the pointer is derived from the most recent borrow. Views beyond
    /// the table length are not passed; the engine rejects kernels whose
    /// `sz_arg` is below their arity.
    pub fn raw_parts(&mut self) -> RawCallParts {
        debug_assert!(self.argv.len() >= self.args.len());
        self.argv.fill(ptr::null());
        for (slot, view) in self.argv.iter_mut().zip(self.args) {
            *slot = view.as_ptr();
        }
        self.res[0] = self.out.as_mut_ptr();
        RawCallParts {
            arg: self.argv.as_ptr(),
            res: self.res.as_mut_ptr(),
            iw: if self.iw.is_empty() {
                ptr::null_mut()
            } else {
                self.iw.as_mut_ptr()
            },
            w: if self.w.is_empty() {
                ptr::null_mut()
            } else {
                self.w.as_mut_ptr()
            },
        }
    }
}

impl Drop for KernelCall<'_> {
    fn drop(&mut self) {
        self.argv.fill(ptr::null());
        self.res.fill(ptr::null_mut());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_per_kernel() {
        assert_eq!(KernelId::Cost.arity(), 3);
        assert_eq!(KernelId::Gradient.arity(), 3);
        assert_eq!(KernelId::MappingF1.arity(), 2);
        assert_eq!(KernelId::MappingF2.arity(), 2);
        assert!(!KernelId::MappingF1.reads_auxiliary());
    }

    #[test]
    fn index_matches_all_order() {
        for (i, id) in KernelId::ALL.iter().enumerate() {
            assert_eq!(id.index(), i);
            assert_eq!(KernelId::from_raw(i as i32), Some(*id));
        }
        assert_eq!(KernelId::from_raw(4), None);
        assert_eq!(KernelId::from_raw(-1), None);
    }

    #[test]
    fn minimal_sizes_cover_arity() {
        let s = KernelSizes::minimal(KernelId::MappingF2);
        assert_eq!(s, KernelSizes::new(2, 1, 0, 0));
        let s = s.with_workspace(4, 8);
        assert_eq!((s.sz_iw, s.sz_w), (4, 8));
    }

    #[test]
    fn new_binds_slot_zero_and_drop_clears_it() {
        let u = [1.0, 2.0];
        let args: [&[f64]; 1] = [&u];
        let mut out = [0.0; 2];
        let out_ptr = out.as_mut_ptr();
        let mut argv = [ptr::null(); 1];
        let mut res = [ptr::null_mut(); 2];
        let mut iw: [i64; 0] = [];
        let mut w: [f64; 0] = [];
        {
            let call = KernelCall::new(&args, &mut out, &mut argv, &mut res, &mut iw, &mut w);
            assert_eq!(call.result_slots(), 2);
            assert_eq!(call.arg(0), Some(&u[..]));
            assert_eq!(call.arg(1), None);
        }
        assert!(res[0].is_null());
        assert!(res[1].is_null());
        assert!(!out_ptr.is_null());
    }

    #[test]
    fn raw_parts_nulls_empty_workspaces() {
        let args: [&[f64]; 0] = [];
        let mut out = [0.0; 1];
        let mut argv: [*const f64; 0] = [];
        let mut res = [ptr::null_mut(); 1];
        let mut iw: [i64; 0] = [];
        let mut w = [0.0; 3];
        let mut call = KernelCall::new(&args, &mut out, &mut argv, &mut res, &mut iw, &mut w);
        let raw = call.raw_parts();
        assert!(raw.iw.is_null());
        assert!(!raw.w.is_null());
        assert!(!raw.res.is_null());
    }

    #[test]
    fn raw_parts_fills_argument_table_and_pads_with_null() {
        let (u, p) = ([1.0, 2.0], [3.0]);
        let args: [&[f64]; 2] = [&u, &p];
        let mut out = [0.0; 1];
        let mut argv = [p.as_ptr(); 4];
        let mut res = [ptr::null_mut(); 2];
        let mut iw: [i64; 0] = [];
        let mut w: [f64; 0] = [];
        {
            let mut call =
                KernelCall::new(&args, &mut out, &mut argv, &mut res, &mut iw, &mut w);
            assert_eq!(call.arg_slots(), 4);
            let raw = call.raw_parts();
            assert_eq!(raw.arg, call.arg_table().as_ptr());
            assert_eq!(
                call.arg_table(),
                &[u.as_ptr(), p.as_ptr(), ptr::null(), ptr::null()]
            );
        }
        assert!(argv.iter().all(|s| s.is_null()));
        assert!(res.iter().all(|s| s.is_null()));
    }

    #[test]
    #[should_panic(expected = "result table has no slot")]
    fn new_rejects_empty_result_table() {
        let args: [&[f64]; 0] = [];
        let mut out = [0.0; 1];
        let mut argv: [*const f64; 0] = [];
        let mut res: [*mut f64; 0] = [];
        let mut iw: [i64; 0] = [];
        let mut w: [f64; 0] = [];
        let _ = KernelCall::new(&args, &mut out, &mut argv, &mut res, &mut iw, &mut w);
    }

    #[test]
    fn writes_through_output_reach_caller() {
        let p = [3.0];
        let args: [&[f64]; 1] = [&p];
        let mut out = [0.0; 1];
        let mut argv = [ptr::null(); 1];
        let mut res = [ptr::null_mut(); 1];
        let mut iw: [i64; 0] = [];
        let mut w: [f64; 0] = [];
        {
            let mut call = KernelCall::new(&args, &mut out, &mut argv, &mut res, &mut iw, &mut w);
            let v = call.arg(0).unwrap()[0];
            call.output()[0] = v * 2.0;
        }
        assert_eq!(out, [6.0]);
    }
}
