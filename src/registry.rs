//! Handle registry
//!
//! SPI and I2C opens hand out opaque integer handles. The registry is a
//! generational arena: a handle packs a slot index with the slot's
//! generation counter, so a numeric value that belonged to a closed
//! resource never resolves again, even after the slot is reused.

use crate::error::{Error, Result};

/// Opaque resource handle returned by SPI/I2C open operations.
///
/// Valid only against the [`Pi`](crate::Pi) instance that issued it, and
/// only until the corresponding close (or the session ends). The numeric
/// value is stable for the lifetime of the resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(u32);

impl Handle {
    pub(crate) fn new(index: u16, generation: u16) -> Handle {
        Handle((generation as u32) << 16 | index as u32)
    }

    /// Numeric value of the handle.
    pub fn value(self) -> u32 {
        self.0
    }

    fn index(self) -> usize {
        (self.0 & 0xffff) as usize
    }

    fn generation(self) -> u16 {
        (self.0 >> 16) as u16
    }
}

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct Slot<T> {
    generation: u16,
    entry: Option<T>,
}

/// Generational arena mapping handles to per-resource state.
pub(crate) struct HandleRegistry<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u16>,
}

impl<T> HandleRegistry<T> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Store a resource record, returning its handle.
    pub(crate) fn insert(&mut self, entry: T) -> Result<Handle> {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.entry = Some(entry);
            return Ok(Handle::new(index, slot.generation));
        }
        if self.slots.len() > u16::MAX as usize {
            return Err(Error::NoHandle);
        }
        let index = self.slots.len() as u16;
        self.slots.push(Slot {
            generation: 0,
            entry: Some(entry),
        });
        Ok(Handle::new(index, 0))
    }

    /// Resolve a handle to its resource record.
    pub(crate) fn get(&self, handle: Handle) -> Result<&T> {
        self.slots
            .get(handle.index())
            .filter(|slot| slot.generation == handle.generation())
            .and_then(|slot| slot.entry.as_ref())
            .ok_or(Error::BadHandle)
    }

    /// Remove a resource record, invalidating the handle.
    pub(crate) fn remove(&mut self, handle: Handle) -> Result<T> {
        let slot = self
            .slots
            .get_mut(handle.index())
            .filter(|slot| slot.generation == handle.generation())
            .ok_or(Error::BadHandle)?;
        let entry = slot.entry.take().ok_or(Error::BadHandle)?;
        // Bump the generation so a stale copy of this handle can never
        // resolve against a future occupant of the slot.
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index() as u16);
        Ok(entry)
    }

    /// Remove every record, invalidating every outstanding handle.
    pub(crate) fn drain(&mut self) -> Vec<T> {
        let mut entries = Vec::new();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if let Some(entry) = slot.entry.take() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(index as u16);
                entries.push(entry);
            }
        }
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get() {
        let mut reg = HandleRegistry::new();
        let h = reg.insert("spi0").unwrap();
        assert_eq!(*reg.get(h).unwrap(), "spi0");
    }

    #[test]
    fn distinct_resources_get_distinct_handles() {
        let mut reg = HandleRegistry::new();
        let a = reg.insert(0u32).unwrap();
        let b = reg.insert(1u32).unwrap();
        assert_ne!(a, b);
        reg.remove(a).unwrap();
        // Closing one leaves the other usable.
        assert_eq!(*reg.get(b).unwrap(), 1);
    }

    #[test]
    fn removed_handle_stops_resolving() {
        let mut reg = HandleRegistry::new();
        let h = reg.insert(7u32).unwrap();
        assert_eq!(reg.remove(h).unwrap(), 7);
        assert!(matches!(reg.get(h), Err(Error::BadHandle)));
        assert!(matches!(reg.remove(h), Err(Error::BadHandle)));
    }

    #[test]
    fn reused_slot_does_not_honor_stale_handle() {
        let mut reg = HandleRegistry::new();
        let stale = reg.insert(1u32).unwrap();
        reg.remove(stale).unwrap();
        let fresh = reg.insert(2u32).unwrap();
        // Same slot, different generation, different numeric value.
        assert_ne!(stale.value(), fresh.value());
        assert!(matches!(reg.get(stale), Err(Error::BadHandle)));
        assert_eq!(*reg.get(fresh).unwrap(), 2);
    }

    #[test]
    fn drain_invalidates_everything() {
        let mut reg = HandleRegistry::new();
        let a = reg.insert(1u32).unwrap();
        let b = reg.insert(2u32).unwrap();
        let mut drained = reg.drain();
        drained.sort();
        assert_eq!(drained, vec![1, 2]);
        assert!(reg.get(a).is_err());
        assert!(reg.get(b).is_err());
    }
}
