//! Problem dimensions and the three argument segments.

use std::fmt;

use crate::kernel::KernelId;

/// One of the three argument vectors packed side by side in scratch space.
///
/// The discriminant order is the packing order: decision first, then
/// auxiliary, then parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Segment {
    /// Decision vector `u`, length `nu`.
    Decision,
    /// Auxiliary vector `xi = (c, y)`, length `nxi`.
    Auxiliary,
    /// Static parameter vector `p`, length `np`.
    Parameter,
}

impl Segment {
    /// All segments in packing order.
    pub const ALL: [Segment; 3] = [Segment::Decision, Segment::Auxiliary, Segment::Parameter];

    /// Short symbolic name (`u`, `xi`, `p`).
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Decision => "u",
            Self::Auxiliary => "xi",
            Self::Parameter => "p",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Sizes of one optimisation problem instance.
///
/// These are configure-time constants: the marshaling layer never
/// computes them, it only checks callers against them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProblemDims {
    /// Number of decision variables.
    pub nu: usize,
    /// Length of the auxiliary vector.
    pub nxi: usize,
    /// Number of static parameters.
    pub np: usize,
    /// Output dimension of mapping F1 (ALM constraints).
    pub n1: usize,
    /// Output dimension of mapping F2 (PM constraints).
    pub n2: usize,
}

impl ProblemDims {
    /// Create dimensions from explicit values.
    pub fn new(nu: usize, nxi: usize, np: usize, n1: usize, n2: usize) -> Self {
        Self {
            nu,
            nxi,
            np,
            n1,
            n2,
        }
    }

    /// Dimensions for an augmented-Lagrangian problem where the auxiliary
    /// vector is `xi = (c, y)`: one penalty parameter followed by `n1`
    /// multipliers.
    pub fn for_alm(nu: usize, np: usize, n1: usize, n2: usize) -> Self {
        Self::new(nu, n1 + 1, np, n1, n2)
    }

    /// Length of a single segment.
    pub fn segment_len(&self, segment: Segment) -> usize {
        match segment {
            Segment::Decision => self.nu,
            Segment::Auxiliary => self.nxi,
            Segment::Parameter => self.np,
        }
    }

    /// Total packed length `nu + nxi + np`, or `None` on overflow.
    pub fn total_len(&self) -> Option<usize> {
        self.nu.checked_add(self.nxi)?.checked_add(self.np)
    }

    /// Declared output length of a kernel.
    pub fn output_len(&self, kernel: KernelId) -> usize {
        match kernel {
            KernelId::Cost => 1,
            KernelId::Gradient => self.nu,
            KernelId::MappingF1 => self.n1,
            KernelId::MappingF2 => self.n2,
        }
    }
}

impl fmt::Display for ProblemDims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "nu={} nxi={} np={} n1={} n2={}",
            self.nu, self.nxi, self.np, self.n1, self.n2
        )
    }
}
