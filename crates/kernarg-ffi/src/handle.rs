//! Slot+generation handle table for config builders and contexts.
//!
//! A handle packs a slot index (high 32 bits) and a generation (low 32
//! bits). Removing a value bumps the slot's generation, so a destroyed
//! handle keeps resolving to `None` instead of to whatever reuses the
//! slot. Destroying twice is a no-op.
//!
//! This is the usual generational handle-table pattern for C APIs: a free
//! list of vacated slots, and a slot is retired for good once its
//! generation counter would wrap.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct RawHandle {
    slot: u32,
    generation: u32,
}

impl RawHandle {
    fn pack(self) -> u64 {
        (u64::from(self.slot) << 32) | u64::from(self.generation)
    }

    fn unpack(handle: u64) -> Self {
        Self {
            slot: (handle >> 32) as u32,
            generation: handle as u32,
        }
    }
}

struct Entry<T> {
    generation: u32,
    value: Option<T>,
}

/// Maps opaque `u64` handles to owned values.
pub(crate) struct HandleTable<T> {
    entries: Vec<Entry<T>>,
    vacant: Vec<u32>,
}

impl<T> HandleTable<T> {
    /// Create an empty table (usable in a `static`).
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            vacant: Vec::new(),
        }
    }

    /// Store a value and return its handle.
    pub fn insert(&mut self, value: T) -> u64 {
        if let Some(slot) = self.vacant.pop() {
            let entry = &mut self.entries[slot as usize];
            entry.value = Some(value);
            return RawHandle {
                slot,
                generation: entry.generation,
            }
            .pack();
        }
        let slot = self.entries.len() as u32;
        self.entries.push(Entry {
            generation: 0,
            value: Some(value),
        });
        RawHandle {
            slot,
            generation: 0,
        }
        .pack()
    }

    fn entry(&self, handle: u64) -> Option<&Entry<T>> {
        let raw = RawHandle::unpack(handle);
        self.entries
            .get(raw.slot as usize)
            .filter(|e| e.generation == raw.generation)
    }

    /// Look up a live handle.
    pub fn get(&self, handle: u64) -> Option<&T> {
        self.entry(handle)?.value.as_ref()
    }

    /// Look up a live handle mutably.
    pub fn get_mut(&mut self, handle: u64) -> Option<&mut T> {
        let raw = RawHandle::unpack(handle);
        let entry = self.entries.get_mut(raw.slot as usize)?;
        if entry.generation != raw.generation {
            return None;
        }
        entry.value.as_mut()
    }

    /// Take the value out and invalidate the handle.
    ///
    /// A slot whose generation wraps to 0 is retired for good; reusing it
    /// would let a generation-0 handle from its first life resolve again.
    pub fn remove(&mut self, handle: u64) -> Option<T> {
        let raw = RawHandle::unpack(handle);
        let entry = self.entries.get_mut(raw.slot as usize)?;
        if entry.generation != raw.generation {
            return None;
        }
        let value = entry.value.take()?;
        entry.generation = entry.generation.wrapping_add(1);
        if entry.generation != 0 {
            self.vacant.push(raw.slot);
        }
        Some(value)
    }

    /// Number of live values.
    #[cfg(test)]
    pub fn live(&self) -> usize {
        self.entries.iter().filter(|e| e.value.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_lookup() {
        let mut table = HandleTable::new();
        let h = table.insert("ctx");
        assert_eq!(table.get(h), Some(&"ctx"));
        *table.get_mut(h).unwrap() = "ctx2";
        assert_eq!(table.get(h), Some(&"ctx2"));
        assert_eq!(table.live(), 1);
    }

    #[test]
    fn destroyed_handle_is_dead_for_good() {
        let mut table = HandleTable::new();
        let old = table.insert(1u8);
        assert_eq!(table.remove(old), Some(1));
        assert_eq!(table.remove(old), None);

        let new = table.insert(2u8);
        assert_eq!(RawHandle::unpack(new).slot, RawHandle::unpack(old).slot);
        assert_ne!(new, old);
        assert_eq!(table.get(old), None);
        assert_eq!(table.get_mut(old), None);
        assert_eq!(table.get(new), Some(&2));
    }

    #[test]
    fn never_issued_handle_is_rejected() {
        let table: HandleTable<u8> = HandleTable::new();
        assert_eq!(table.get(0), None);
        assert_eq!(table.get(u64::MAX), None);
    }

    #[test]
    fn wrapped_generation_retires_slot() {
        let mut table = HandleTable::new();
        let h = table.insert(0u8);
        table.remove(h);
        table.entries[0].generation = u32::MAX;
        let last = table.insert(1u8);
        assert_eq!(RawHandle::unpack(last).generation, u32::MAX);
        table.remove(last);

        assert_eq!(table.entries[0].generation, 0);
        assert!(table.vacant.is_empty());
        assert_eq!(table.get(h), None);
        let fresh = table.insert(2u8);
        assert_eq!(RawHandle::unpack(fresh).slot, 1);
    }
}
