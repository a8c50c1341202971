//! Pluggable allocation strategies.
//!
//! Every chunk a [`ChunkedDeque`](crate::ChunkedDeque) allocates or frees, and
//! every element it constructs or destroys, goes through a
//! [`ChunkAllocator`]. Host code can plug in pooled, arena-backed, tracking or
//! fault-injecting strategies without the container knowing which one it
//! talks to.
//!
//! - [`Global`]: the default, backed by the global heap.
//! - [`Counting`]: wraps another strategy and records what it was asked to do.

use crate::deque::Chunk;
use crate::error::{DequeError, Rejected};

/// Allocation and construction strategy for a chunked deque.
///
/// All methods have defaults that defer to the global heap and plain moves,
/// so an implementation only overrides the hooks it cares about.
///
/// # Contract
///
/// - `allocate_chunk` returns a chunk of exactly `capacity` vacant slots.
/// - `construct` either returns the value to store or hands it back inside a
///   [`Rejected`]; it must not drop the value on failure.
/// - `deallocate_chunk` and `destroy` cannot fail.
pub trait ChunkAllocator<T> {
    /// Obtains storage for one chunk.
    ///
    /// # Errors
    ///
    /// Returns [`DequeError::AllocationFailed`] when no storage is available.
    fn allocate_chunk(&mut self, capacity: usize) -> Result<Chunk<T>, DequeError> {
        Chunk::try_with_capacity(capacity)
    }

    /// Releases a chunk. Every slot is vacant when this is called.
    fn deallocate_chunk(&mut self, chunk: Chunk<T>) {
        drop(chunk);
    }

    /// Consulted before the directory is (re)allocated to hold `slots` handles.
    ///
    /// # Errors
    ///
    /// Returning an error aborts the growth; the directory stays as it was.
    fn reserve_directory(&mut self, slots: usize) -> Result<(), DequeError> {
        let _ = slots;
        Ok(())
    }

    /// Prepares `value` for storage in a slot.
    ///
    /// Called for every element written into the container, including each
    /// relocation performed while shifting for `insert` and `remove`.
    ///
    /// # Errors
    ///
    /// Hands the value back when it cannot be constructed.
    fn construct(&mut self, value: T) -> Result<T, Rejected<T>> {
        Ok(value)
    }

    /// Constructs a copy of `source` for a deep copy of the container.
    ///
    /// # Errors
    ///
    /// Returns [`DequeError::ConstructionFailed`] when the copy is refused.
    fn construct_clone(&mut self, source: &T) -> Result<T, DequeError>
    where
        T: Clone,
    {
        Ok(source.clone())
    }

    /// Destroys an element the container is discarding.
    fn destroy(&mut self, value: T) {
        drop(value);
    }
}

/// The global heap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Global;

impl<T> ChunkAllocator<T> for Global {}

/// Counters recorded by [`Counting`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AllocationStats {
    /// Chunks handed out.
    pub chunks_allocated: usize,
    /// Chunks returned.
    pub chunks_freed: usize,
    /// Directory reallocations approved.
    pub directory_allocations: usize,
    /// Elements constructed, including relocations and copies.
    pub constructed: usize,
    /// Elements destroyed by the container.
    pub destroyed: usize,
}

impl AllocationStats {
    /// Chunks currently held by the container.
    #[must_use]
    pub const fn live_chunks(&self) -> usize {
        self.chunks_allocated.saturating_sub(self.chunks_freed)
    }
}

/// A strategy wrapper that counts every request it forwards.
///
/// # Examples
///
/// ```rust
/// use blockdeque::{ChunkedDeque, Counting};
///
/// let mut deque: ChunkedDeque<i32, Counting> = ChunkedDeque::with_allocator(Counting::default());
/// for value in 0..100 {
///     deque.push_back(value).unwrap();
/// }
/// let stats = deque.allocator().stats();
/// assert_eq!(stats.live_chunks(), deque.chunk_count());
/// assert_eq!(stats.constructed, 100);
/// ```
#[derive(Debug, Default)]
pub struct Counting<A = Global> {
    inner: A,
    stats: AllocationStats,
}

impl<A> Counting<A> {
    /// Wraps `inner` with zeroed counters.
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            stats: AllocationStats::default(),
        }
    }

    /// Returns the counters recorded so far.
    pub const fn stats(&self) -> AllocationStats {
        self.stats
    }

    /// Returns the wrapped strategy.
    pub const fn inner(&self) -> &A {
        &self.inner
    }

    /// Zeroes the counters. Chunks still held are carried over as
    /// `chunks_allocated` so [`AllocationStats::live_chunks`] stays exact.
    pub fn reset(&mut self) {
        self.stats = AllocationStats {
            chunks_allocated: self.stats.live_chunks(),
            ..AllocationStats::default()
        };
    }
}

/// A copy starts with fresh counters; it tracks a different container.
impl<A: Clone> Clone for Counting<A> {
    fn clone(&self) -> Self {
        Self::new(self.inner.clone())
    }
}

impl<T, A: ChunkAllocator<T>> ChunkAllocator<T> for Counting<A> {
    fn allocate_chunk(&mut self, capacity: usize) -> Result<Chunk<T>, DequeError> {
        let chunk = self.inner.allocate_chunk(capacity)?;
        self.stats.chunks_allocated += 1;
        Ok(chunk)
    }

    fn deallocate_chunk(&mut self, chunk: Chunk<T>) {
        self.stats.chunks_freed += 1;
        self.inner.deallocate_chunk(chunk);
    }

    fn reserve_directory(&mut self, slots: usize) -> Result<(), DequeError> {
        self.inner.reserve_directory(slots)?;
        self.stats.directory_allocations += 1;
        Ok(())
    }

    fn construct(&mut self, value: T) -> Result<T, Rejected<T>> {
        let value = self.inner.construct(value)?;
        self.stats.constructed += 1;
        Ok(value)
    }

    fn construct_clone(&mut self, source: &T) -> Result<T, DequeError>
    where
        T: Clone,
    {
        let value = self.inner.construct_clone(source)?;
        self.stats.constructed += 1;
        Ok(value)
    }

    fn destroy(&mut self, value: T) {
        self.stats.destroyed += 1;
        self.inner.destroy(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_global_allocates_vacant_chunk() {
        let chunk: Chunk<i32> = ChunkAllocator::<i32>::allocate_chunk(&mut Global, 8).unwrap();
        assert_eq!(chunk.capacity(), 8);
        assert_eq!(chunk.live(), 0);
    }

    #[rstest]
    fn test_counting_tracks_chunks() {
        let mut allocator = Counting::new(Global);
        let chunk: Chunk<String> = allocator.allocate_chunk(4).unwrap();
        assert_eq!(allocator.stats().chunks_allocated, 1);
        assert_eq!(allocator.stats().live_chunks(), 1);

        allocator.deallocate_chunk(chunk);
        assert_eq!(allocator.stats().chunks_freed, 1);
        assert_eq!(allocator.stats().live_chunks(), 0);
    }

    #[rstest]
    fn test_counting_tracks_construction() {
        let mut allocator = Counting::new(Global);
        let value = ChunkAllocator::<i32>::construct(&mut allocator, 3).unwrap();
        let copy = ChunkAllocator::<i32>::construct_clone(&mut allocator, &value).unwrap();
        ChunkAllocator::<i32>::destroy(&mut allocator, copy);

        let stats = allocator.stats();
        assert_eq!(stats.constructed, 2);
        assert_eq!(stats.destroyed, 1);
    }

    #[rstest]
    fn test_counting_reset_keeps_live_chunks() {
        let mut allocator = Counting::new(Global);
        let first: Chunk<i32> = allocator.allocate_chunk(4).unwrap();
        let second: Chunk<i32> = allocator.allocate_chunk(4).unwrap();
        ChunkAllocator::<i32>::construct(&mut allocator, 1).unwrap();

        allocator.reset();
        assert_eq!(allocator.stats().chunks_allocated, 2);
        assert_eq!(allocator.stats().constructed, 0);

        allocator.deallocate_chunk(first);
        assert_eq!(allocator.stats().chunks_freed, 1);
        assert_eq!(allocator.stats().live_chunks(), 1);

        allocator.deallocate_chunk(second);
        assert_eq!(allocator.stats().live_chunks(), 0);
    }

    #[rstest]
    fn test_live_chunks_never_underflows() {
        let stats = AllocationStats {
            chunks_freed: 3,
            ..AllocationStats::default()
        };
        assert_eq!(stats.live_chunks(), 0);
    }

    #[rstest]
    fn test_counting_clone_resets_stats() {
        let mut allocator = Counting::new(Global);
        ChunkAllocator::<u8>::reserve_directory(&mut allocator, 3).unwrap();
        assert_eq!(allocator.stats().directory_allocations, 1);

        let copy = allocator.clone();
        assert_eq!(copy.stats(), AllocationStats::default());
    }
}
