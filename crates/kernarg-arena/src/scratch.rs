//! Packed `[u | xi | p]` scratch space and the two packers.
//!
//! [`ScratchBuffer`] is allocated once at the packed length and never
//! resized. The packers are its only writers: every dispatch repacks
//! before the kernel runs, so a kernel never observes data from a
//! previous call in a segment it reads.

use kernarg_core::{ProblemDims, Segment, ShapeError};

use crate::layout::Layout;

/// Contiguous storage for the decision, auxiliary, and parameter vectors.
///
/// # Example (conceptual)
///
/// ```ignore
/// scratch.pack_full(&u, &xi, &p)?;
/// let [u, xi, p] = scratch.views_full();
/// // hand the views to a cost or gradient kernel
/// ```
pub struct ScratchBuffer {
    layout: Layout,
    /// Backing storage, exactly `layout.total_len()` elements.
    data: Vec<f64>,
}

impl ScratchBuffer {
    /// Allocate zeroed scratch space for a layout.
    pub fn new(layout: Layout) -> Self {
        Self {
            data: vec![0.0; layout.total_len()],
            layout,
        }
    }

    /// Copy `u`, `xi`, and `p` into their segments.
    ///
    /// All three lengths are checked before anything is written, so a
    /// [`ShapeError`] leaves the buffer exactly as it was.
    pub fn pack_full(&mut self, u: &[f64], xi: &[f64], p: &[f64]) -> Result<(), ShapeError> {
        let dims = *self.layout.dims();
        ShapeError::check_segment(Segment::Decision, dims.nu, u.len())?;
        ShapeError::check_segment(Segment::Auxiliary, dims.nxi, xi.len())?;
        ShapeError::check_segment(Segment::Parameter, dims.np, p.len())?;

        self.copy_into(Segment::Decision, u);
        self.copy_into(Segment::Auxiliary, xi);
        self.copy_into(Segment::Parameter, p);
        Ok(())
    }

    /// Copy `u` and `p` into their segments, leaving `xi` untouched.
    ///
    /// The constraint mappings do not receive the auxiliary segment, so
    /// whatever a previous [`pack_full`](Self::pack_full) left there stays.
    pub fn pack_reduced(&mut self, u: &[f64], p: &[f64]) -> Result<(), ShapeError> {
        let dims = *self.layout.dims();
        ShapeError::check_segment(Segment::Decision, dims.nu, u.len())?;
        ShapeError::check_segment(Segment::Parameter, dims.np, p.len())?;

        self.copy_into(Segment::Decision, u);
        self.copy_into(Segment::Parameter, p);
        Ok(())
    }

    fn copy_into(&mut self, segment: Segment, src: &[f64]) {
        let range = self.layout.range(segment).range();
        self.data[range].copy_from_slice(src);
    }

    /// Read one segment.
    pub fn segment(&self, segment: Segment) -> &[f64] {
        &self.data[self.layout.range(segment).range()]
    }

    /// Argument views for cost and gradient: `(u, xi, p)`.
    pub fn views_full(&self) -> [&[f64]; 3] {
        [
            self.segment(Segment::Decision),
            self.segment(Segment::Auxiliary),
            self.segment(Segment::Parameter),
        ]
    }

    /// Argument views for the constraint mappings: `(u, p)`.
    pub fn views_reduced(&self) -> [&[f64]; 2] {
        [
            self.segment(Segment::Decision),
            self.segment(Segment::Parameter),
        ]
    }

    /// The whole packed buffer.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Packed length in `f64` elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the buffer has zero length (all dimensions zero).
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The layout this buffer was built from.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Dimensions this buffer was built for.
    pub fn dims(&self) -> &ProblemDims {
        self.layout.dims()
    }

    /// Memory usage of the backing storage in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.data.len() * std::mem::size_of::<f64>()
    }
}
