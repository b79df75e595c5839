//! `#[repr(C)]` types shared with C callers.

use std::ffi::c_char;

use kernarg_core::{KernelId, KernelSizes, ProblemDims};

use crate::native::KernelFn;

/// Kernel selector for `kernarg_config_set_kernel*`.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KernargKernelId {
    /// Cost `phi(u, xi, p)`.
    Cost = 0,
    /// Gradient of the cost with respect to `u`.
    Gradient = 1,
    /// ALM constraint mapping `F1(u, p)`.
    MappingF1 = 2,
    /// Penalty constraint mapping `F2(u, p)`.
    MappingF2 = 3,
}

impl From<KernargKernelId> for KernelId {
    fn from(id: KernargKernelId) -> Self {
        match id {
            KernargKernelId::Cost => KernelId::Cost,
            KernargKernelId::Gradient => KernelId::Gradient,
            KernargKernelId::MappingF1 => KernelId::MappingF1,
            KernargKernelId::MappingF2 => KernelId::MappingF2,
        }
    }
}

/// Problem dimensions as seen from C.
///
/// Fixed-width `u64` fields for ABI portability (not `usize`).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KernargDims {
    /// Number of decision variables.
    pub nu: u64,
    /// Length of the auxiliary vector.
    pub nxi: u64,
    /// Number of static parameters.
    pub np: u64,
    /// Output dimension of F1.
    pub n1: u64,
    /// Output dimension of F2.
    pub n2: u64,
}

const _: () = assert!(std::mem::size_of::<KernargDims>() == 40);

impl KernargDims {
    /// Convert to native dimensions, rejecting values that do not fit `usize`.
    pub fn to_problem_dims(self) -> Option<ProblemDims> {
        let conv = |v: u64| usize::try_from(v).ok();
        Some(ProblemDims::new(
            conv(self.nu)?,
            conv(self.nxi)?,
            conv(self.np)?,
            conv(self.n1)?,
            conv(self.n2)?,
        ))
    }
}

impl From<&ProblemDims> for KernargDims {
    fn from(d: &ProblemDims) -> Self {
        Self {
            nu: d.nu as u64,
            nxi: d.nxi as u64,
            np: d.np as u64,
            n1: d.n1 as u64,
            n2: d.n2 as u64,
        }
    }
}

/// A native kernel described from C: entry point plus declared sizes.
///
/// `name` may be null, in which case the kernel id's short name is used.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct KernargKernelDef {
    /// Null-terminated kernel name, or null.
    pub name: *const c_char,
    /// Evaluator entry point (must not be null).
    pub eval: Option<KernelFn>,
    /// Number of argument pointer slots.
    pub sz_arg: u64,
    /// Number of result pointer slots.
    pub sz_res: u64,
    /// Integer workspace length.
    pub sz_iw: u64,
    /// Real workspace length.
    pub sz_w: u64,
}

impl KernargKernelDef {
    /// Declared sizes, or `None` if any does not fit `usize`.
    pub fn sizes(&self) -> Option<KernelSizes> {
        let conv = |v: u64| usize::try_from(v).ok();
        Some(KernelSizes::new(
            conv(self.sz_arg)?,
            conv(self.sz_res)?,
            conv(self.sz_iw)?,
            conv(self.sz_w)?,
        ))
    }
}
