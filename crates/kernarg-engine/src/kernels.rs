//! The four-kernel set and its builder.

use indexmap::IndexMap;
use kernarg_core::{Kernel, KernelId};

use crate::config::ConfigError;

/// Cost, gradient, and the two constraint mappings, in [`KernelId::ALL`] order.
pub struct KernelSet {
    kernels: [Box<dyn Kernel>; 4],
}

impl KernelSet {
    /// Bundle four kernels.
    pub fn new(
        cost: impl Kernel,
        gradient: impl Kernel,
        mapping_f1: impl Kernel,
        mapping_f2: impl Kernel,
    ) -> Self {
        Self {
            kernels: [
                Box::new(cost),
                Box::new(gradient),
                Box::new(mapping_f1),
                Box::new(mapping_f2),
            ],
        }
    }

    /// Bundle four boxed kernels already in [`KernelId::ALL`] order.
    pub fn from_array(kernels: [Box<dyn Kernel>; 4]) -> Self {
        Self { kernels }
    }

    /// Start an incremental registration.
    pub fn builder() -> KernelSetBuilder {
        KernelSetBuilder::new()
    }

    /// The kernel registered for `id`.
    pub fn get(&self, id: KernelId) -> &dyn Kernel {
        &*self.kernels[id.index()]
    }

    /// Iterate `(id, kernel)` in [`KernelId::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (KernelId, &dyn Kernel)> + '_ {
        KernelId::ALL
            .into_iter()
            .zip(self.kernels.iter().map(|k| &**k))
    }

    pub(crate) fn into_array(self) -> [Box<dyn Kernel>; 4] {
        self.kernels
    }
}

/// Incremental, insertion-ordered kernel registry.
///
/// Used where kernels arrive one at a time (e.g. across the C boundary).
/// Registering the same [`KernelId`] twice is an error rather than a
/// silent overwrite.
#[derive(Default)]
pub struct KernelSetBuilder {
    kernels: IndexMap<KernelId, Box<dyn Kernel>>,
}

impl KernelSetBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self {
            kernels: IndexMap::with_capacity(KernelId::ALL.len()),
        }
    }

    /// Register a kernel.
    pub fn insert(&mut self, id: KernelId, kernel: impl Kernel) -> Result<(), ConfigError> {
        self.insert_boxed(id, Box::new(kernel))
    }

    /// Register an already boxed kernel.
    pub fn insert_boxed(&mut self, id: KernelId, kernel: Box<dyn Kernel>) -> Result<(), ConfigError> {
        if self.kernels.contains_key(&id) {
            return Err(ConfigError::DuplicateKernel { kernel: id });
        }
        self.kernels.insert(id, kernel);
        Ok(())
    }

    /// Register a kernel, consuming and returning the builder.
    pub fn with(mut self, id: KernelId, kernel: impl Kernel) -> Result<Self, ConfigError> {
        self.insert(id, kernel)?;
        Ok(self)
    }

    /// Whether `id` has been registered.
    pub fn contains(&self, id: KernelId) -> bool {
        self.kernels.contains_key(&id)
    }

    /// Registered kernels in insertion order.
    pub fn registered(&self) -> impl Iterator<Item = KernelId> + '_ {
        self.kernels.keys().copied()
    }

    /// Finish registration. All four kernels must be present.
    pub fn build(mut self) -> Result<KernelSet, ConfigError> {
        let mut take = |id: KernelId| {
            self.kernels
                .swap_remove(&id)
                .ok_or(ConfigError::MissingKernel { kernel: id })
        };
        let cost = take(KernelId::Cost)?;
        let gradient = take(KernelId::Gradient)?;
        let mapping_f1 = take(KernelId::MappingF1)?;
        let mapping_f2 = take(KernelId::MappingF2)?;
        Ok(KernelSet::from_array([cost, gradient, mapping_f1, mapping_f2]))
    }
}
