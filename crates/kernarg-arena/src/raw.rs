//! Argument- and result-pointer tables.
//!
//! The native calling convention hands evaluators an array of input
//! pointers and an array of output pointers. [`ArgTable`] and
//! [`ResultTable`] preallocate both once per kernel so a dispatch never
//! touches the heap. During one call the argument table holds the view
//! pointers and result slot 0 holds the caller's output buffer; every
//! slot of both tables is nulled again when the call frame drops.
//!
//! This is the only module in the crate with `unsafe` code.

#![allow(unsafe_code)]

use std::ptr;

/// Preallocated array of `sz_arg` input pointers.
///
/// Slots hold null outside a call.
pub struct ArgTable {
    slots: Vec<*const f64>,
}

// SAFETY: the table owns no pointees. Slots are non-null only while a
// `KernelCall` holds `&mut` borrows of the table and shared borrows of
// the views, and the call frame nulls them on drop.
unsafe impl Send for ArgTable {}

impl ArgTable {
    /// Create a table with `len` null slots.
    pub fn new(len: usize) -> Self {
        Self {
            slots: vec![ptr::null(); len],
        }
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the table has no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Mutable access to the slots for building a call frame.
    pub fn slots_mut(&mut self) -> &mut [*const f64] {
        &mut self.slots
    }

    /// Whether any slot currently holds a pointer.
    pub fn is_bound(&self) -> bool {
        self.slots.iter().any(|s| !s.is_null())
    }

    /// Memory usage of the slot array in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.slots.len() * std::mem::size_of::<*const f64>()
    }
}

/// Preallocated array of `sz_res` output pointers.
///
/// Slots hold null outside a call. The dispatcher binds slot 0; a native
/// evaluator may use the others as scratch during the call.
pub struct ResultTable {
    slots: Vec<*mut f64>,
}

// SAFETY: the table owns no pointees. Slots are non-null only while a
// `KernelCall` holds `&mut` borrows of both the table and the output
// buffer, and the call frame nulls every slot on drop. Moving the table
// to another thread between calls therefore moves nothing but nulls.
unsafe impl Send for ResultTable {}

impl ResultTable {
    /// Create a table with `len` null slots.
    pub fn new(len: usize) -> Self {
        Self {
            slots: vec![ptr::null_mut(); len],
        }
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the table has no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Mutable access to the slots for building a call frame.
    pub fn slots_mut(&mut self) -> &mut [*mut f64] {
        &mut self.slots
    }

    /// Whether any slot currently holds a pointer.
    pub fn is_bound(&self) -> bool {
        self.slots.iter().any(|s| !s.is_null())
    }

    /// Memory usage of the slot array in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.slots.len() * std::mem::size_of::<*mut f64>()
    }
}
