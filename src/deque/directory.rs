//! The outer addressing level: an array of chunk handles with a floating origin.
//!
//! Logical node `k` lives in physical slot `origin + k`, so node indices stay
//! stable while the array is reallocated and re-centred underneath them.

use super::chunk::Chunk;
use crate::alloc::ChunkAllocator;
use crate::config::GrowthPolicy;
use crate::error::{AllocationTarget, DequeError};

pub(crate) struct Directory<T> {
    slots: Vec<Option<Chunk<T>>>,
    origin: isize,
}

/// The array a [`Directory::grow`] replaced, kept so the growth can be
/// undone without allocating.
pub(crate) struct Retired<T> {
    slots: Vec<Option<Chunk<T>>>,
    origin: isize,
}

impl<T> Directory<T> {
    pub(crate) const fn empty() -> Self {
        Self {
            slots: Vec::new(),
            origin: 0,
        }
    }

    /// Allocates a directory for `nodes` nodes starting at node 0, with the
    /// same amount of headroom on either side.
    pub(crate) fn try_for_nodes<A: ChunkAllocator<T>>(
        nodes: usize,
        policy: &GrowthPolicy,
        allocator: &mut A,
    ) -> Result<Self, DequeError> {
        let len = policy.initial_directory_len(nodes);
        let slots = allocate_slots(len, allocator)?;
        Ok(Self {
            slots,
            origin: signed(len / 3),
        })
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    #[cfg(test)]
    pub(crate) const fn origin(&self) -> isize {
        self.origin
    }

    #[inline]
    fn physical(&self, node: isize) -> Option<usize> {
        let index = usize::try_from(self.origin.checked_add(node)?).ok()?;
        (index < self.slots.len()).then_some(index)
    }

    #[inline]
    pub(crate) fn contains(&self, node: isize) -> bool {
        self.physical(node).is_some()
    }

    #[inline]
    pub(crate) fn chunk(&self, node: isize) -> Option<&Chunk<T>> {
        self.slots[self.physical(node)?].as_ref()
    }

    #[inline]
    pub(crate) fn chunk_mut(&mut self, node: isize) -> Option<&mut Chunk<T>> {
        let index = self.physical(node)?;
        self.slots[index].as_mut()
    }

    /// Places `chunk` at `node`, which must be covered and vacant.
    pub(crate) fn install(&mut self, node: isize, chunk: Chunk<T>) {
        if let Some(index) = self.physical(node) {
            debug_assert!(self.slots[index].is_none(), "node {node} already populated");
            self.slots[index] = Some(chunk);
        }
    }

    pub(crate) fn remove(&mut self, node: isize) -> Option<Chunk<T>> {
        let index = self.physical(node)?;
        self.slots[index].take()
    }

    /// Number of populated slots.
    pub(crate) fn populated(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Moves the origin so node 0 sits in the middle. Only valid while no
    /// chunk is held.
    pub(crate) fn recenter(&mut self) {
        debug_assert_eq!(self.populated(), 0);
        self.origin = signed(self.slots.len() / 3);
    }

    /// Reallocates so nodes `first..=last` are covered, re-centred with
    /// headroom on both sides.
    ///
    /// Chunk handles are moved, never copied or freed. If the new array cannot
    /// be obtained the directory is left untouched. On success the replaced
    /// array is returned for [`restore`](Self::restore).
    pub(crate) fn grow<A: ChunkAllocator<T>>(
        &mut self,
        first: isize,
        last: isize,
        policy: &GrowthPolicy,
        allocator: &mut A,
    ) -> Result<Retired<T>, DequeError> {
        debug_assert!(first <= last);
        let span = usize::try_from(last - first + 1).unwrap_or(usize::MAX);
        let len = policy.grown_directory_len(span);
        let mut slots = allocate_slots(len, allocator)?;
        let origin = signed((len - span) / 2) - first;

        for (index, slot) in self.slots.iter_mut().enumerate() {
            if let Some(chunk) = slot.take() {
                let node = signed(index) - self.origin;
                debug_assert!((first..=last).contains(&node), "stray chunk at node {node}");
                slots[usize::try_from(origin + node).unwrap_or_default()] = Some(chunk);
            }
        }

        log_debug!(
            old_len = self.slots.len(),
            new_len = len,
            old_origin = self.origin,
            new_origin = origin,
            "directory grown"
        );
        Ok(Retired {
            slots: std::mem::replace(&mut self.slots, slots),
            origin: std::mem::replace(&mut self.origin, origin),
        })
    }

    /// Moves every chunk back into `retired` and reinstates it, undoing a
    /// [`grow`](Self::grow). Every held chunk must lie in the range the
    /// retired array covered.
    pub(crate) fn restore(&mut self, retired: Retired<T>) {
        let Retired {
            slots: mut restored,
            origin,
        } = retired;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if let Some(chunk) = slot.take() {
                let node = signed(index) - self.origin;
                let target = usize::try_from(origin + node)
                    .ok()
                    .and_then(|physical| restored.get_mut(physical));
                debug_assert!(target.is_some(), "chunk at node {node} outside the restored range");
                if let Some(target) = target {
                    *target = Some(chunk);
                }
            }
        }
        log_debug!(
            len = restored.len(),
            origin,
            "directory growth undone"
        );
        self.slots = restored;
        self.origin = origin;
    }

    pub(crate) fn slots_mut(&mut self) -> std::slice::IterMut<'_, Option<Chunk<T>>> {
        self.slots.iter_mut()
    }

    /// Removes every remaining chunk.
    pub(crate) fn drain(&mut self) -> impl Iterator<Item = Chunk<T>> + '_ {
        self.slots.iter_mut().filter_map(Option::take)
    }
}

/// Vec lengths never exceed `isize::MAX`.
#[allow(clippy::cast_possible_wrap)]
const fn signed(value: usize) -> isize {
    value as isize
}

fn allocate_slots<T, A: ChunkAllocator<T>>(
    len: usize,
    allocator: &mut A,
) -> Result<Vec<Option<Chunk<T>>>, DequeError> {
    let failure = DequeError::AllocationFailed {
        target: AllocationTarget::Directory,
        slots: len,
    };
    if let Err(error) = allocator.reserve_directory(len) {
        log_warn!(slots = len, "directory allocation refused");
        return Err(error);
    }
    let mut slots = Vec::new();
    if slots.try_reserve_exact(len).is_err() {
        log_warn!(slots = len, "directory allocation failed");
        return Err(failure);
    }
    slots.resize_with(len, || None);
    Ok(slots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::Global;
    use rstest::rstest;

    fn chunk() -> Chunk<i32> {
        Chunk::try_with_capacity(4).unwrap()
    }

    #[rstest]
    fn test_initial_directory_centres_node_zero() {
        let directory: Directory<i32> =
            Directory::try_for_nodes(2, &GrowthPolicy::default(), &mut Global).unwrap();
        assert_eq!(directory.len(), 6);
        assert_eq!(directory.origin(), 2);
        assert!(directory.contains(-2));
        assert!(directory.contains(3));
        assert!(!directory.contains(-3));
        assert!(!directory.contains(4));
    }

    #[rstest]
    fn test_install_and_remove() {
        let mut directory: Directory<i32> =
            Directory::try_for_nodes(1, &GrowthPolicy::default(), &mut Global).unwrap();
        directory.install(0, chunk());
        assert!(directory.chunk(0).is_some());
        assert_eq!(directory.populated(), 1);
        assert!(directory.remove(0).is_some());
        assert_eq!(directory.populated(), 0);
    }

    #[rstest]
    fn test_grow_moves_chunks_and_keeps_node_indices() {
        let mut directory: Directory<i32> =
            Directory::try_for_nodes(1, &GrowthPolicy::default(), &mut Global).unwrap();
        let mut first = chunk();
        first.write(0, 7);
        directory.install(0, first);
        directory.install(1, chunk());

        directory
            .grow(0, 2, &GrowthPolicy::default(), &mut Global)
            .unwrap();

        assert_eq!(directory.len(), 9);
        assert_eq!(directory.origin(), 3);
        assert_eq!(directory.populated(), 2);
        assert_eq!(directory.chunk(0).and_then(|chunk| chunk.slot(0)), Some(&7));
        assert!(directory.contains(2));
        assert!(directory.contains(-3));
    }

    #[rstest]
    fn test_restore_undoes_grow() {
        let mut directory: Directory<i32> =
            Directory::try_for_nodes(1, &GrowthPolicy::default(), &mut Global).unwrap();
        let mut first = chunk();
        first.write(3, 11);
        directory.install(1, first);

        let retired = directory
            .grow(0, 2, &GrowthPolicy::default(), &mut Global)
            .unwrap();
        assert_eq!(directory.len(), 9);

        directory.restore(retired);
        assert_eq!(directory.len(), 3);
        assert_eq!(directory.origin(), 1);
        assert_eq!(directory.populated(), 1);
        assert_eq!(directory.chunk(1).and_then(|chunk| chunk.slot(3)), Some(&11));
    }

    #[rstest]
    fn test_recenter_resets_origin() {
        let mut directory: Directory<i32> =
            Directory::try_for_nodes(3, &GrowthPolicy::default(), &mut Global).unwrap();
        directory
            .grow(4, 5, &GrowthPolicy::default(), &mut Global)
            .unwrap();
        directory.recenter();
        assert_eq!(directory.origin(), 2);
    }
}
