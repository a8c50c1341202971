//! Fixed-capacity element blocks.

use crate::error::{AllocationTarget, DequeError};

/// A block of element slots, allocated whole and freed whole.
///
/// A vacant slot is `None`. The deque writes a slot when it constructs an
/// element there and takes it when the element is destroyed or moved out; a
/// chunk is never resized.
#[derive(Debug)]
pub struct Chunk<T> {
    slots: Box<[Option<T>]>,
}

impl<T> Chunk<T> {
    /// Allocates a chunk of `capacity` vacant slots on the global heap.
    ///
    /// # Errors
    ///
    /// Returns [`DequeError::AllocationFailed`] when the heap refuses the
    /// request.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, DequeError> {
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(capacity)
            .map_err(|_| DequeError::AllocationFailed {
                target: AllocationTarget::Chunk,
                slots: capacity,
            })?;
        slots.resize_with(capacity, || None);
        Ok(Self {
            slots: slots.into_boxed_slice(),
        })
    }

    /// Number of slots.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    #[must_use]
    pub fn live(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    #[inline]
    pub(crate) fn slot(&self, offset: usize) -> Option<&T> {
        self.slots[offset].as_ref()
    }

    #[inline]
    pub(crate) fn slot_mut(&mut self, offset: usize) -> Option<&mut T> {
        self.slots[offset].as_mut()
    }

    /// Stores `value` in a vacant slot.
    #[inline]
    pub(crate) fn write(&mut self, offset: usize, value: T) {
        debug_assert!(self.slots[offset].is_none(), "slot {offset} is occupied");
        self.slots[offset] = Some(value);
    }

    #[inline]
    pub(crate) fn take(&mut self, offset: usize) -> Option<T> {
        self.slots[offset].take()
    }

    pub(crate) fn slots_mut(&mut self) -> std::slice::IterMut<'_, Option<T>> {
        self.slots.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_new_chunk_is_vacant() {
        let chunk: Chunk<i32> = Chunk::try_with_capacity(16).unwrap();
        assert_eq!(chunk.capacity(), 16);
        assert_eq!(chunk.live(), 0);
        assert_eq!(chunk.slot(15), None);
    }

    #[rstest]
    fn test_write_then_take() {
        let mut chunk = Chunk::try_with_capacity(4).unwrap();
        chunk.write(2, "two");
        assert_eq!(chunk.live(), 1);
        assert_eq!(chunk.slot(2), Some(&"two"));
        assert_eq!(chunk.take(2), Some("two"));
        assert_eq!(chunk.live(), 0);
    }

    #[rstest]
    fn test_slot_mut_updates_in_place() {
        let mut chunk = Chunk::try_with_capacity(2).unwrap();
        chunk.write(0, 10);
        if let Some(value) = chunk.slot_mut(0) {
            *value += 1;
        }
        assert_eq!(chunk.slot(0), Some(&11));
    }
}
