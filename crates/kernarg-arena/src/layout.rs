//! Segment offsets within packed scratch space.
//!
//! A [`Layout`] is computed once from [`ProblemDims`] and never changes.
//! Offsets are stored as plain integers; they only become slices when a
//! [`ScratchBuffer`](crate::ScratchBuffer) resolves them.

use std::fmt;
use std::ops::Range;

use kernarg_core::{ProblemDims, Segment};

use crate::error::LayoutError;
use crate::workspace::fits_allocation;

/// Position of one segment inside the scratch buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubRange {
    offset: usize,
    len: usize,
}

impl SubRange {
    pub(crate) fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }

    /// First element index.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Length in `f64` elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the segment has zero length.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// One past the last element index.
    pub fn end(&self) -> usize {
        self.offset + self.len
    }

    /// As an index range.
    pub fn range(&self) -> Range<usize> {
        self.offset..self.end()
    }
}

impl fmt::Display for SubRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.offset, self.end())
    }
}

/// Offsets of `u`, `xi`, and `p` in packing order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout {
    dims: ProblemDims,
    ranges: [SubRange; 3],
    total_len: usize,
}

impl Layout {
    /// Compute the layout for the given dimensions.
    ///
    /// Returns [`LayoutError::LengthOverflow`] if the packed buffer of
    /// `nu + nxi + np` doubles cannot be allocated.
    pub fn new(dims: &ProblemDims) -> Result<Self, LayoutError> {
        let total_len = dims
            .total_len()
            .filter(|&len| fits_allocation::<f64>(len))
            .ok_or(LayoutError::LengthOverflow { dims: *dims })?;

        let mut ranges = [SubRange::new(0, 0); 3];
        let mut cursor = 0usize;
        for segment in Segment::ALL {
            let len = dims.segment_len(segment);
            ranges[segment as usize] = SubRange::new(cursor, len);
            cursor += len;
        }
        debug_assert_eq!(cursor, total_len);

        Ok(Self {
            dims: *dims,
            ranges,
            total_len,
        })
    }

    /// Location of a segment.
    pub fn range(&self, segment: Segment) -> SubRange {
        self.ranges[segment as usize]
    }

    /// Packed length `nu + nxi + np`.
    pub fn total_len(&self) -> usize {
        self.total_len
    }

    /// Dimensions this layout was computed from.
    pub fn dims(&self) -> &ProblemDims {
        &self.dims
    }
}
