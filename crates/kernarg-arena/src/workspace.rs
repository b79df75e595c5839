//! Per-kernel integer workspace, real workspace, and pointer tables.
//!
//! A [`Workspace`] is sized from a kernel's declared [`KernelSizes`] once
//! and reused for every call of that kernel. Zero-sized requirements are
//! simply empty vectors.

use std::mem::size_of;

use kernarg_core::{KernelCall, KernelSizes};

use crate::raw::{ArgTable, ResultTable};

/// Whether `len` elements of `T` fit in a single allocation.
pub(crate) fn fits_allocation<T>(len: usize) -> bool {
    len.checked_mul(size_of::<T>())
        .is_some_and(|bytes| bytes <= isize::MAX as usize)
}

/// Scratch memory owned by one kernel's dispatcher.
pub struct Workspace {
    sizes: KernelSizes,
    iw: Vec<i64>,
    w: Vec<f64>,
    args: ArgTable,
    results: ResultTable,
}

impl Workspace {
    /// Whether every region `sizes` asks for can be allocated.
    ///
    /// [`Workspace::new`] panics on sizes for which this is false; the
    /// engine checks it while validating a config.
    pub fn fits(sizes: KernelSizes) -> bool {
        fits_allocation::<i64>(sizes.sz_iw)
            && fits_allocation::<f64>(sizes.sz_w)
            && fits_allocation::<*const f64>(sizes.sz_arg)
            && fits_allocation::<*mut f64>(sizes.sz_res)
    }

    /// Allocate zeroed workspaces and null pointer tables matching `sizes`.
    pub fn new(sizes: KernelSizes) -> Self {
        Self {
            sizes,
            iw: vec![0; sizes.sz_iw],
            w: vec![0.0; sizes.sz_w],
            args: ArgTable::new(sizes.sz_arg),
            results: ResultTable::new(sizes.sz_res),
        }
    }

    /// Build a call frame: bind `out` into result slot 0 and lend out
    /// the workspaces and the argument table.
    ///
    /// # Panics
    ///
    /// Panics if the result table has no slots (`sz_res == 0`).
    pub fn call<'a>(&'a mut self, args: &'a [&'a [f64]], out: &'a mut [f64]) -> KernelCall<'a> {
        KernelCall::new(
            args,
            out,
            self.args.slots_mut(),
            self.results.slots_mut(),
            &mut self.iw,
            &mut self.w,
        )
    }

    /// Declared sizes.
    pub fn sizes(&self) -> KernelSizes {
        self.sizes
    }

    /// Integer workspace contents.
    pub fn iw(&self) -> &[i64] {
        &self.iw
    }

    /// Real workspace contents.
    pub fn w(&self) -> &[f64] {
        &self.w
    }

    /// The argument-pointer table.
    pub fn args(&self) -> &ArgTable {
        &self.args
    }

    /// The result table.
    pub fn results(&self) -> &ResultTable {
        &self.results
    }

    /// Memory usage of all four regions in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.iw.len() * size_of::<i64>()
            + self.w.len() * size_of::<f64>()
            + self.args.memory_bytes()
            + self.results.memory_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regions_match_declared_sizes() {
        let ws = Workspace::new(KernelSizes::new(3, 2, 5, 7));
        assert_eq!(ws.iw().len(), 5);
        assert_eq!(ws.w().len(), 7);
        assert_eq!(ws.results().len(), 2);
        assert_eq!(ws.args().len(), 3);
        assert_eq!(ws.memory_bytes(), 5 * 8 + 7 * 8 + 3 * 8 + 2 * 8);
    }

    #[test]
    fn oversized_regions_do_not_fit() {
        assert!(Workspace::fits(KernelSizes::new(3, 1, 1 << 20, 1 << 20)));
        let huge = usize::MAX / 4;
        assert!(!Workspace::fits(KernelSizes::new(3, 1, 0, huge)));
        assert!(!Workspace::fits(KernelSizes::new(3, 1, huge, 0)));
        assert!(!Workspace::fits(KernelSizes::new(huge, 1, 0, 0)));
        assert!(!Workspace::fits(KernelSizes::new(3, huge, 0, 0)));
    }

    #[test]
    fn zero_sizes_give_empty_regions() {
        let ws = Workspace::new(KernelSizes::new(2, 1, 0, 0));
        assert!(ws.iw().is_empty());
        assert!(ws.w().is_empty());
    }

    #[test]
    fn call_binds_then_releases_every_slot() {
        let mut ws = Workspace::new(KernelSizes::new(1, 1, 2, 2));
        let u = [4.0];
        let args: [&[f64]; 1] = [&u];
        let mut out = [0.0];
        {
            let mut call = ws.call(&args, &mut out);
            call.iw()[1] = 9;
            call.w()[0] = 1.5;
            call.output()[0] = 8.0;
            let _ = call.raw_parts();
        }
        assert!(!ws.results().is_bound());
        assert!(!ws.args().is_bound());
        assert_eq!(ws.iw(), &[0, 9]);
        assert_eq!(ws.w(), &[1.5, 0.0]);
        assert_eq!(out, [8.0]);
    }

    #[test]
    #[should_panic(expected = "result table has no slot")]
    fn call_without_result_slot_panics() {
        let mut ws = Workspace::new(KernelSizes::new(1, 0, 0, 0));
        let args: [&[f64]; 0] = [];
        let mut out = [0.0];
        let _ = ws.call(&args, &mut out);
    }
}
