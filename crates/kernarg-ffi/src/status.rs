//! C-compatible status codes.
//!
//! [`KernargStatus`] covers marshaling outcomes only. A kernel's own
//! return value never passes through this type; it is handed back to the
//! caller unmodified through a separate out-parameter.

use kernarg_core::ShapeError;
use kernarg_engine::ConfigError;

use crate::native::NativeError;

/// C-compatible status code returned by all FFI functions.
///
/// `Ok` = 0, all errors are negative. Values are ABI-stable.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KernargStatus {
    /// Success. For dispatchers this means the kernel ran; its own status
    /// is in `status_out`.
    Ok = 0,
    /// Handle is invalid or was already destroyed.
    InvalidHandle = -1,
    /// An argument is null, out of range, or otherwise invalid.
    InvalidArgument = -2,
    /// Configuration validation error.
    ConfigError = -3,
    /// An input or output vector has the wrong length.
    ShapeMismatch = -4,
    /// A kernel's size query returned a nonzero status or negative sizes.
    KernelQueryFailed = -5,
    /// Internal error (e.g. poisoned mutex after a prior panic).
    InternalError = -20,
    /// A Rust panic was caught at the FFI boundary.
    Panicked = -128,
}

impl From<&ConfigError> for KernargStatus {
    fn from(_e: &ConfigError) -> Self {
        KernargStatus::ConfigError
    }
}

impl From<&ShapeError> for KernargStatus {
    fn from(_e: &ShapeError) -> Self {
        KernargStatus::ShapeMismatch
    }
}

impl From<&NativeError> for KernargStatus {
    fn from(e: &NativeError) -> Self {
        match e {
            NativeError::WorkQueryFailed { .. } | NativeError::NegativeSize { .. } => {
                KernargStatus::KernelQueryFailed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernarg_core::{KernelId, Segment};

    #[test]
    fn status_code_values_are_stable() {
        assert_eq!(KernargStatus::Ok as i32, 0);
        assert_eq!(KernargStatus::InvalidHandle as i32, -1);
        assert_eq!(KernargStatus::InvalidArgument as i32, -2);
        assert_eq!(KernargStatus::ConfigError as i32, -3);
        assert_eq!(KernargStatus::ShapeMismatch as i32, -4);
        assert_eq!(KernargStatus::KernelQueryFailed as i32, -5);
        assert_eq!(KernargStatus::InternalError as i32, -20);
        assert_eq!(KernargStatus::Panicked as i32, -128);
    }

    #[test]
    fn shape_error_to_status() {
        let e = ShapeError::Segment {
            segment: Segment::Parameter,
            expected: 2,
            actual: 1,
        };
        assert_eq!(KernargStatus::from(&e), KernargStatus::ShapeMismatch);
    }

    #[test]
    fn native_error_to_status() {
        assert_eq!(
            KernargStatus::from(&NativeError::WorkQueryFailed { status: 1 }),
            KernargStatus::KernelQueryFailed
        );
        assert_eq!(
            KernargStatus::from(&ConfigError::MissingKernel {
                kernel: KernelId::Gradient
            }),
            KernargStatus::ConfigError
        );
    }
}
