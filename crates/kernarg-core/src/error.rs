//! Error types for the marshaling layer.
//!
//! Two failure classes reach callers: shape errors (a vector of the wrong
//! length, detected before scratch space is touched) and kernel errors (a
//! nonzero status, carried verbatim). [`DispatchError`] unifies them for
//! callers who want a single `?`-able type.

use std::error::Error;
use std::fmt;

use crate::dims::Segment;
use crate::kernel::KernelId;
use crate::status::KernelStatus;

/// A caller-supplied vector does not have its declared length.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShapeError {
    /// An input segment (`u`, `xi`, or `p`) has the wrong length.
    Segment {
        /// Which segment was mis-sized.
        segment: Segment,
        /// Declared length.
        expected: usize,
        /// Length supplied by the caller.
        actual: usize,
    },
    /// The output buffer does not match the kernel's output dimension.
    Output {
        /// Kernel whose output buffer was mis-sized.
        kernel: KernelId,
        /// Declared output length.
        expected: usize,
        /// Length supplied by the caller.
        actual: usize,
    },
}

impl ShapeError {
    /// Check a segment length, returning a [`ShapeError::Segment`] on mismatch.
    pub fn check_segment(segment: Segment, expected: usize, actual: usize) -> Result<(), Self> {
        if expected == actual {
            Ok(())
        } else {
            Err(Self::Segment {
                segment,
                expected,
                actual,
            })
        }
    }

    /// Check an output length, returning a [`ShapeError::Output`] on mismatch.
    pub fn check_output(kernel: KernelId, expected: usize, actual: usize) -> Result<(), Self> {
        if expected == actual {
            Ok(())
        } else {
            Err(Self::Output {
                kernel,
                expected,
                actual,
            })
        }
    }
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Segment {
                segment,
                expected,
                actual,
            } => write!(
                f,
                "segment '{segment}' has length {actual}, expected {expected}"
            ),
            Self::Output {
                kernel,
                expected,
                actual,
            } => write!(
                f,
                "output buffer for '{kernel}' has length {actual}, expected {expected}"
            ),
        }
    }
}

impl Error for ShapeError {}

/// A kernel returned a nonzero status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KernelError {
    /// The kernel that failed.
    pub kernel: KernelId,
    /// The status it returned, unmodified.
    pub status: KernelStatus,
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "kernel '{}' returned status {}",
            self.kernel, self.status
        )
    }
}

impl Error for KernelError {}

/// Either failure class from a dispatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchError {
    /// Input or output vector mis-sized.
    Shape(ShapeError),
    /// Kernel reported failure.
    Kernel(KernelError),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shape(e) => write!(f, "shape: {e}"),
            Self::Kernel(e) => write!(f, "kernel: {e}"),
        }
    }
}

impl Error for DispatchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Shape(e) => Some(e),
            Self::Kernel(e) => Some(e),
        }
    }
}

impl From<ShapeError> for DispatchError {
    fn from(e: ShapeError) -> Self {
        Self::Shape(e)
    }
}

impl From<KernelError> for DispatchError {
    fn from(e: KernelError) -> Self {
        Self::Kernel(e)
    }
}
