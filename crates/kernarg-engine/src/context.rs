//! Per-solver marshaling context.
//!
//! [`MarshalContext`] owns one packed [`ScratchBuffer`] and one
//! [`Workspace`] per kernel. Every dispatcher follows the same sequence:
//!
//! 1. check the output buffer and input lengths,
//! 2. pack the inputs into scratch space,
//! 3. derive argument views from the fixed segment offsets,
//! 4. bind the output into result slot 0 and invoke the kernel,
//! 5. return the kernel's status untouched.
//!
//! # Ownership model
//!
//! `MarshalContext` is [`Send`] but not shared: every dispatcher takes
//! `&mut self`, so two evaluations can never interleave on the same
//! scratch space. Independent solver instances each build their own
//! context.

use kernarg_arena::{Layout, ScratchBuffer, Workspace};
use kernarg_core::{
    DispatchError, Kernel, KernelId, KernelStatus, ProblemDims, ShapeError,
};

use crate::config::{ConfigError, MarshalConfig};

// Fails to compile if any field is !Send.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<MarshalContext>();
    }
};

/// One kernel together with its preallocated workspace.
struct KernelSlot {
    kernel: Box<dyn Kernel>,
    workspace: Workspace,
}

impl KernelSlot {
    fn new(kernel: Box<dyn Kernel>) -> Self {
        let workspace = Workspace::new(kernel.sizes());
        Self { kernel, workspace }
    }

    fn invoke(&mut self, id: KernelId, args: &[&[f64]], out: &mut [f64]) -> KernelStatus {
        let call = self.workspace.call(args, out);
        let status = KernelStatus(self.kernel.eval(call));
        if status.is_success() {
            tracing::trace!(kernel = %id, name = self.kernel.name(), "kernel returned");
        } else {
            tracing::debug!(
                kernel = %id,
                name = self.kernel.name(),
                status = status.code(),
                "kernel returned nonzero status"
            );
        }
        status
    }
}

/// Scratch space, workspaces, and dispatchers for one solver instance.
///
/// # Example
///
/// ```ignore
/// let mut ctx = MarshalContext::new(MarshalConfig::new(dims, kernels))?;
/// let status = ctx.cost(&u, &xi, &p, &mut phi)?;
/// let status = ctx.gradient(&u, &xi, &p, &mut grad)?;
/// let status = ctx.mapping_f1(&u, &p, &mut f1)?;
/// ```
pub struct MarshalContext {
    scratch: ScratchBuffer,
    slots: [KernelSlot; 4],
}

impl MarshalContext {
    /// Validate `config` and allocate every buffer the dispatchers need.
    ///
    /// Nothing is allocated after this returns.
    pub fn new(config: MarshalConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let layout = Layout::new(&config.dims)?;
        let [cost, gradient, f1, f2] = config.kernels.into_array();
        let ctx = Self {
            scratch: ScratchBuffer::new(layout),
            slots: [
                KernelSlot::new(cost),
                KernelSlot::new(gradient),
                KernelSlot::new(f1),
                KernelSlot::new(f2),
            ],
        };
        tracing::debug!(
            dims = %config.dims,
            packed_len = ctx.scratch.len(),
            memory_bytes = ctx.memory_bytes(),
            "marshal context created"
        );
        Ok(ctx)
    }

    /// Evaluate the cost `phi(u, xi, p)` into `out` (length 1).
    pub fn cost(
        &mut self,
        u: &[f64],
        xi: &[f64],
        p: &[f64],
        out: &mut [f64],
    ) -> Result<KernelStatus, ShapeError> {
        self.dispatch_full(KernelId::Cost, u, xi, p, out)
    }

    /// Evaluate the gradient of the cost with respect to `u` into `out`
    /// (length `nu`).
    pub fn gradient(
        &mut self,
        u: &[f64],
        xi: &[f64],
        p: &[f64],
        out: &mut [f64],
    ) -> Result<KernelStatus, ShapeError> {
        self.dispatch_full(KernelId::Gradient, u, xi, p, out)
    }

    /// Evaluate the ALM constraint mapping `F1(u, p)` into `out`
    /// (length `n1`).
    pub fn mapping_f1(
        &mut self,
        u: &[f64],
        p: &[f64],
        out: &mut [f64],
    ) -> Result<KernelStatus, ShapeError> {
        self.dispatch_reduced(KernelId::MappingF1, u, p, out)
    }

    /// Evaluate the penalty constraint mapping `F2(u, p)` into `out`
    /// (length `n2`).
    pub fn mapping_f2(
        &mut self,
        u: &[f64],
        p: &[f64],
        out: &mut [f64],
    ) -> Result<KernelStatus, ShapeError> {
        self.dispatch_reduced(KernelId::MappingF2, u, p, out)
    }

    /// Evaluate the cost and return its value, treating a nonzero kernel
    /// status as an error.
    pub fn cost_value(&mut self, u: &[f64], xi: &[f64], p: &[f64]) -> Result<f64, DispatchError> {
        let mut out = [0.0];
        self.cost(u, xi, p, &mut out)?.into_result(KernelId::Cost)?;
        Ok(out[0])
    }

    /// Dispatch by kernel id. `xi` is ignored for the constraint mappings.
    pub fn dispatch(
        &mut self,
        id: KernelId,
        u: &[f64],
        xi: &[f64],
        p: &[f64],
        out: &mut [f64],
    ) -> Result<KernelStatus, ShapeError> {
        if id.reads_auxiliary() {
            self.dispatch_full(id, u, xi, p, out)
        } else {
            self.dispatch_reduced(id, u, p, out)
        }
    }

    fn dispatch_full(
        &mut self,
        id: KernelId,
        u: &[f64],
        xi: &[f64],
        p: &[f64],
        out: &mut [f64],
    ) -> Result<KernelStatus, ShapeError> {
        ShapeError::check_output(id, self.dims().output_len(id), out.len())?;
        self.scratch.pack_full(u, xi, p)?;
        tracing::trace!(kernel = %id, "dispatch");
        let args = self.scratch.views_full();
        Ok(self.slots[id.index()].invoke(id, &args, out))
    }

    fn dispatch_reduced(
        &mut self,
        id: KernelId,
        u: &[f64],
        p: &[f64],
        out: &mut [f64],
    ) -> Result<KernelStatus, ShapeError> {
        ShapeError::check_output(id, self.dims().output_len(id), out.len())?;
        self.scratch.pack_reduced(u, p)?;
        tracing::trace!(kernel = %id, "dispatch");
        let args = self.scratch.views_reduced();
        Ok(self.slots[id.index()].invoke(id, &args, out))
    }

    /// Pack `(u, xi, p)` without invoking a kernel.
    pub fn pack_full(&mut self, u: &[f64], xi: &[f64], p: &[f64]) -> Result<(), ShapeError> {
        self.scratch.pack_full(u, xi, p)
    }

    /// Pack `(u, p)` without invoking a kernel.
    pub fn pack_reduced(&mut self, u: &[f64], p: &[f64]) -> Result<(), ShapeError> {
        self.scratch.pack_reduced(u, p)
    }

    /// Problem dimensions.
    pub fn dims(&self) -> &ProblemDims {
        self.scratch.dims()
    }

    /// Segment layout of the scratch buffer.
    pub fn layout(&self) -> &Layout {
        self.scratch.layout()
    }

    /// The packed scratch buffer.
    pub fn scratch(&self) -> &ScratchBuffer {
        &self.scratch
    }

    /// Workspace owned by one kernel.
    pub fn workspace(&self, id: KernelId) -> &Workspace {
        &self.slots[id.index()].workspace
    }

    /// Name reported by one kernel.
    pub fn kernel_name(&self, id: KernelId) -> &str {
        self.slots[id.index()].kernel.name()
    }

    /// Total bytes held by scratch space and all workspaces.
    pub fn memory_bytes(&self) -> usize {
        self.scratch.memory_bytes()
            + self
                .slots
                .iter()
                .map(|s| s.workspace.memory_bytes())
                .sum::<usize>()
    }
}
