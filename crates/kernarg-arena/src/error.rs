//! Arena-specific error types.

use std::error::Error;
use std::fmt;

use kernarg_core::ProblemDims;

/// Errors that can occur while computing a layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LayoutError {
    /// `nu + nxi + np` doubles do not fit in one allocation.
    LengthOverflow {
        /// The offending dimensions.
        dims: ProblemDims,
    },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LengthOverflow { dims } => {
                write!(f, "packed length exceeds the allocation limit ({dims})")
            }
        }
    }
}

impl Error for LayoutError {}
