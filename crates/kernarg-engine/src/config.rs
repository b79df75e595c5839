//! Context configuration, validation, and error types.
//!
//! [`MarshalConfig`] is the builder-input for a [`MarshalContext`](crate::MarshalContext).
//! [`validate()`](MarshalConfig::validate) checks structural invariants
//! once at construction so the dispatch path never has to.

use std::error::Error;
use std::fmt;

use kernarg_arena::{Layout, LayoutError, Workspace};
use kernarg_core::{KernelId, KernelSizes, ProblemDims};

use crate::kernels::KernelSet;

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while building a kernel set or validating a config.
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// Dimensions do not produce a valid layout.
    Layout(LayoutError),
    /// A kernel was not registered.
    MissingKernel {
        /// The kernel that is missing.
        kernel: KernelId,
    },
    /// A kernel was registered twice.
    DuplicateKernel {
        /// The kernel registered twice.
        kernel: KernelId,
    },
    /// A kernel declares fewer argument slots than it receives views.
    ArgSlotsTooFew {
        /// The offending kernel.
        kernel: KernelId,
        /// Declared `sz_arg`.
        declared: usize,
        /// Number of views the dispatcher passes.
        required: usize,
    },
    /// A kernel declares no result slot to bind its output into.
    NoResultSlot {
        /// The offending kernel.
        kernel: KernelId,
    },
    /// A kernel declares a workspace or pointer table too large to allocate.
    WorkspaceTooLarge {
        /// The offending kernel.
        kernel: KernelId,
        /// Declared sizes.
        sizes: KernelSizes,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Layout(e) => write!(f, "layout: {e}"),
            Self::MissingKernel { kernel } => write!(f, "kernel '{kernel}' not registered"),
            Self::DuplicateKernel { kernel } => {
                write!(f, "kernel '{kernel}' registered more than once")
            }
            Self::ArgSlotsTooFew {
                kernel,
                declared,
                required,
            } => write!(
                f,
                "kernel '{kernel}' declares {declared} argument slots, needs at least {required}"
            ),
            Self::NoResultSlot { kernel } => {
                write!(f, "kernel '{kernel}' declares no result slot")
            }
            Self::WorkspaceTooLarge { kernel, sizes } => {
                write!(f, "kernel '{kernel}' declares unallocatable sizes {sizes:?}")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Layout(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LayoutError> for ConfigError {
    fn from(e: LayoutError) -> Self {
        Self::Layout(e)
    }
}

// ── MarshalConfig ──────────────────────────────────────────────────

/// Complete configuration for one marshaling context.
pub struct MarshalConfig {
    /// Problem dimensions.
    pub dims: ProblemDims,
    /// The four evaluator kernels.
    pub kernels: KernelSet,
}

impl MarshalConfig {
    /// Bundle dimensions and kernels.
    pub fn new(dims: ProblemDims, kernels: KernelSet) -> Self {
        Self { dims, kernels }
    }

    /// Validate all structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1. Packed buffer must be allocatable.
        Layout::new(&self.dims)?;

        // 2. Every kernel must accept its views and have a result slot.
        for (id, kernel) in self.kernels.iter() {
            let sizes = kernel.sizes();
            if sizes.sz_arg < id.arity() {
                return Err(ConfigError::ArgSlotsTooFew {
                    kernel: id,
                    declared: sizes.sz_arg,
                    required: id.arity(),
                });
            }
            if sizes.sz_res == 0 {
                return Err(ConfigError::NoResultSlot { kernel: id });
            }
            if !Workspace::fits(sizes) {
                return Err(ConfigError::WorkspaceTooLarge { kernel: id, sizes });
            }
        }
        Ok(())
    }
}
