//! Verbatim kernel status codes.

use std::fmt;

use crate::error::KernelError;
use crate::kernel::KernelId;

/// The integer a kernel returned, exactly as returned.
///
/// The marshaling layer has no basis for interpreting evaluator-specific
/// codes, so it never rewrites them. `0` is success by convention.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KernelStatus(pub i32);

impl KernelStatus {
    /// The conventional success code.
    pub const SUCCESS: KernelStatus = KernelStatus(0);

    /// The raw code.
    pub fn code(self) -> i32 {
        self.0
    }

    /// Whether the code is `0`.
    pub fn is_success(self) -> bool {
        self.0 == 0
    }

    /// Turn a nonzero code into a [`KernelError`] naming the kernel.
    pub fn into_result(self, kernel: KernelId) -> Result<(), KernelError> {
        if self.is_success() {
            Ok(())
        } else {
            Err(KernelError {
                kernel,
                status: self,
            })
        }
    }
}

impl fmt::Display for KernelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for KernelStatus {
    fn from(v: i32) -> Self {
        Self(v)
    }
}

impl From<KernelStatus> for i32 {
    fn from(s: KernelStatus) -> Self {
        s.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_success() {
        assert!(KernelStatus(0).is_success());
        assert!(KernelStatus::SUCCESS.into_result(KernelId::Cost).is_ok());
    }

    #[test]
    fn nonzero_codes_survive_into_error() {
        for code in [1, -1, 42, i32::MIN, i32::MAX] {
            let err = KernelStatus(code)
                .into_result(KernelId::MappingF2)
                .unwrap_err();
            assert_eq!(err.status.code(), code);
            assert_eq!(err.kernel, KernelId::MappingF2);
        }
    }

    #[test]
    fn i32_round_trip() {
        let s: KernelStatus = 7.into();
        assert_eq!(i32::from(s), 7);
    }
}
