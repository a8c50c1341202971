//! Chunked double-ended queue.
//!
//! # Overview
//!
//! [`ChunkedDeque`] stores its elements in fixed-size [`Chunk`]s reached
//! through a directory of chunk handles. An element's address is a
//! [`Position`]: a node index relative to the directory origin plus an offset
//! inside that node's chunk. This gives:
//!
//! - amortized O(1) `push_front`, `push_back`, `pop_front` and `pop_back`
//! - O(1) indexed access and O(1) random-access position arithmetic
//! - O(min(i, n - i)) `insert` and `remove` at index `i`
//!
//! Chunks are allocated lazily when the first element is written into a node
//! and freed as soon as the last element leaves it. The directory is
//! reallocated and re-centred when either end runs past it; chunk handles are
//! moved, so elements never move during growth.
//!
//! # Failure Semantics
//!
//! Allocation and element construction go through a [`ChunkAllocator`] that
//! may refuse. Every mutating operation either completes or returns an error
//! with the container exactly as it was before the call:
//!
//! - A refused push frees any chunk allocated for it.
//! - A refused relocation in the middle of `insert`/`remove` replays the
//!   moves made so far in reverse.
//! - A refused element during pre-sized construction or a deep copy drops
//!   the partial copy, releasing everything it held.
//!
//! # Examples
//!
//! ```rust
//! use blockdeque::ChunkedDeque;
//!
//! let mut deque: ChunkedDeque<i32> = ChunkedDeque::new();
//! deque.push_back(2).unwrap();
//! deque.push_back(3).unwrap();
//! deque.push_front(1).unwrap();
//!
//! assert_eq!(deque.len(), 3);
//! assert_eq!(deque[0], 1);
//! assert_eq!(deque.at(2), Ok(&3));
//!
//! deque.insert(1, 10).unwrap();
//! assert_eq!(deque.iter().copied().collect::<Vec<_>>(), vec![1, 10, 2, 3]);
//! ```

mod chunk;
mod cursor;
mod directory;
mod iter;
mod position;
mod rollback;

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Index, IndexMut};

pub use chunk::Chunk;
pub use cursor::{Cursor, CursorMut};
pub use iter::{IntoIter, Iter, IterMut};
pub use position::Position;

use directory::{Directory, Retired};
use rollback::ShiftLog;

use crate::alloc::{ChunkAllocator, Global};
use crate::config::GrowthPolicy;
use crate::error::{DequeError, PolicyError, Rejected};

/// Chunk capacity used when none is given.
pub const DEFAULT_NODE_SIZE: usize = 32;

/// A double-ended queue of `NODE_SIZE`-slot chunks.
///
/// `A` supplies chunk storage and constructs and destroys elements; see
/// [`ChunkAllocator`].
///
/// # Examples
///
/// ```rust
/// use blockdeque::ChunkedDeque;
///
/// let mut deque: ChunkedDeque<i32, _, 4> = ChunkedDeque::with_allocator(blockdeque::Global);
/// for value in 0..10 {
///     deque.push_back(value).unwrap();
/// }
/// assert_eq!(deque.chunk_count(), 3);
/// assert_eq!(deque.pop_front(), Some(0));
/// ```
pub struct ChunkedDeque<T, A: ChunkAllocator<T> = Global, const NODE_SIZE: usize = DEFAULT_NODE_SIZE>
{
    directory: Directory<T>,
    begin: Position<NODE_SIZE>,
    end: Position<NODE_SIZE>,
    len: usize,
    policy: GrowthPolicy,
    allocator: A,
}

static_assertions::assert_impl_all!(ChunkedDeque<i32>: Send, Sync);
static_assertions::assert_not_impl_any!(ChunkedDeque<std::rc::Rc<i32>>: Send, Sync);

/// A slot made writable ahead of a write, with what it took to get there.
struct Reservation<T> {
    node: isize,
    fresh: bool,
    retired: Option<Retired<T>>,
}

/// Converts a length or index bounded by `isize::MAX` into a step count.
#[allow(clippy::cast_possible_wrap)]
const fn steps(count: usize) -> isize {
    count as isize
}

/// Number of nodes needed to hold `count` elements.
const fn nodes_for(count: usize, node_size: usize) -> usize {
    count.div_ceil(node_size)
}

impl<T, const NODE_SIZE: usize> ChunkedDeque<T, Global, NODE_SIZE> {
    /// Creates an empty deque on the global heap. Nothing is allocated until
    /// the first element arrives.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            directory: Directory::empty(),
            begin: Position::new(0, 0),
            end: Position::new(0, 0),
            len: 0,
            policy: GrowthPolicy::new(),
            allocator: Global,
        }
    }

    /// Creates an empty deque with a custom growth policy.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`] if the policy is invalid.
    pub fn with_policy(policy: GrowthPolicy) -> Result<Self, PolicyError> {
        Self::with_policy_in(policy, Global)
    }

    /// Creates a deque of `len` copies of `value`.
    ///
    /// # Errors
    ///
    /// Returns an allocation error; nothing is leaked.
    pub fn try_from_elem(len: usize, value: &T) -> Result<Self, DequeError>
    where
        T: Clone,
    {
        Self::try_from_elem_in(len, value, Global)
    }

    /// Creates a deque of `len` default values.
    ///
    /// # Errors
    ///
    /// Returns an allocation error; nothing is leaked.
    pub fn try_with_len(len: usize) -> Result<Self, DequeError>
    where
        T: Default,
    {
        Self::try_with_len_in(len, Global)
    }

    /// Creates a deque of `len` copies of `value`.
    ///
    /// # Panics
    ///
    /// Panics if the storage cannot be allocated.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use blockdeque::ChunkedDeque;
    ///
    /// let mut deque: ChunkedDeque<i32> = ChunkedDeque::from_elem(5, &7);
    /// deque.insert(2, 99).unwrap();
    /// assert_eq!(deque.iter().copied().collect::<Vec<_>>(), vec![7, 7, 99, 7, 7, 7]);
    /// ```
    #[must_use]
    pub fn from_elem(len: usize, value: &T) -> Self
    where
        T: Clone,
    {
        Self::try_from_elem(len, value)
            .unwrap_or_else(|error| panic!("failed to build deque: {error}"))
    }

    /// Creates a deque of `len` default values.
    ///
    /// # Panics
    ///
    /// Panics if the storage cannot be allocated.
    #[must_use]
    pub fn with_len(len: usize) -> Self
    where
        T: Default,
    {
        Self::try_with_len(len).unwrap_or_else(|error| panic!("failed to build deque: {error}"))
    }
}

impl<T, A: ChunkAllocator<T>, const NODE_SIZE: usize> ChunkedDeque<T, A, NODE_SIZE> {
    /// Creates an empty deque that allocates through `allocator`.
    pub fn with_allocator(allocator: A) -> Self {
        Self {
            directory: Directory::empty(),
            begin: Position::new(0, 0),
            end: Position::new(0, 0),
            len: 0,
            policy: GrowthPolicy::new(),
            allocator,
        }
    }

    /// Creates an empty deque with a custom growth policy and allocator.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`] if the policy is invalid.
    pub fn with_policy_in(policy: GrowthPolicy, allocator: A) -> Result<Self, PolicyError> {
        policy.validate()?;
        let mut deque = Self::with_allocator(allocator);
        deque.policy = policy;
        Ok(deque)
    }

    /// Creates a deque of `len` copies of `value` in `allocator`.
    ///
    /// The directory is sized to three times the nodes needed, with the
    /// elements in the middle third.
    ///
    /// # Errors
    ///
    /// Returns the first allocation or construction failure; everything
    /// built before it is released.
    pub fn try_from_elem_in(len: usize, value: &T, allocator: A) -> Result<Self, DequeError>
    where
        T: Clone,
    {
        let mut deque = Self::with_allocator(allocator);
        deque.prepare(len)?;
        for _ in 0..len {
            deque.push_back_with(|allocator| allocator.construct_clone(value))?;
        }
        Ok(deque)
    }

    /// Creates a deque of `len` default values in `allocator`.
    ///
    /// # Errors
    ///
    /// Returns the first allocation or construction failure; everything
    /// built before it is released.
    pub fn try_with_len_in(len: usize, allocator: A) -> Result<Self, DequeError>
    where
        T: Default,
    {
        let mut deque = Self::with_allocator(allocator);
        deque.prepare(len)?;
        for _ in 0..len {
            deque.push_back_with(|allocator| {
                allocator
                    .construct(T::default())
                    .map_err(Rejected::into_error)
            })?;
        }
        Ok(deque)
    }

    /// Collects `iter` into a deque that allocates through `allocator`.
    ///
    /// # Errors
    ///
    /// Returns the first allocation or construction failure; everything
    /// built before it is released.
    pub fn try_from_iter_in<I>(iter: I, allocator: A) -> Result<Self, DequeError>
    where
        I: IntoIterator<Item = T>,
    {
        let iter = iter.into_iter();
        let mut deque = Self::with_allocator(allocator);
        deque.prepare(iter.size_hint().0)?;
        for value in iter {
            deque.push_back(value)?;
        }
        Ok(deque)
    }

    /// Returns the allocation strategy.
    #[inline]
    pub const fn allocator(&self) -> &A {
        &self.allocator
    }

    /// Returns the allocation strategy mutably.
    #[inline]
    pub const fn allocator_mut(&mut self) -> &mut A {
        &mut self.allocator
    }

    /// Returns the growth policy.
    #[inline]
    pub const fn policy(&self) -> &GrowthPolicy {
        &self.policy
    }

    /// Returns the number of elements.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the deque holds no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Slots per chunk.
    #[inline]
    #[must_use]
    pub const fn node_size(&self) -> usize {
        NODE_SIZE
    }

    /// Length of the chunk directory, populated or not.
    #[must_use]
    pub fn directory_len(&self) -> usize {
        self.directory.len()
    }

    /// Number of chunks currently allocated.
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.directory.populated()
    }

    // =========================================================================
    // Positions
    // =========================================================================

    /// Position of the first element, or [`end`](Self::end) when empty.
    #[inline]
    pub const fn begin(&self) -> Position<NODE_SIZE> {
        self.begin
    }

    /// Position one past the last element.
    #[inline]
    pub const fn end(&self) -> Position<NODE_SIZE> {
        self.end
    }

    /// Position of the element at `index`, if in range.
    #[inline]
    pub const fn position(&self, index: usize) -> Option<Position<NODE_SIZE>> {
        if index < self.len {
            Some(self.begin.advance(steps(index)))
        } else {
            None
        }
    }

    /// Logical index of `position`, if it names a live element.
    #[allow(clippy::cast_sign_loss)]
    pub fn index_of(&self, position: Position<NODE_SIZE>) -> Option<usize> {
        (self.begin <= position && position < self.end)
            .then(|| position.difference(self.begin) as usize)
    }

    /// Element at `position`, if it names a live element.
    pub fn get_at(&self, position: Position<NODE_SIZE>) -> Option<&T> {
        self.index_of(position)?;
        self.slot(position)
    }

    // =========================================================================
    // Element access
    // =========================================================================

    /// Returns the element at `index`, or `None` if out of range.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.slot(self.position(index)?)
    }

    /// Returns the element at `index` mutably, or `None` if out of range.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        let position = self.position(index)?;
        self.slot_mut(position)
    }

    /// Bounds-checked access.
    ///
    /// # Errors
    ///
    /// Returns [`DequeError::OutOfRange`] with the index and current length.
    pub fn at(&self, index: usize) -> Result<&T, DequeError> {
        let len = self.len;
        self.get(index).ok_or(DequeError::OutOfRange { index, len })
    }

    /// Bounds-checked mutable access.
    ///
    /// # Errors
    ///
    /// Returns [`DequeError::OutOfRange`] with the index and current length.
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, DequeError> {
        let len = self.len;
        self.get_mut(index).ok_or(DequeError::OutOfRange { index, len })
    }

    /// Returns the first element.
    pub fn front(&self) -> Option<&T> {
        self.get(0)
    }

    /// Returns the last element.
    pub fn back(&self) -> Option<&T> {
        self.get(self.len.checked_sub(1)?)
    }

    /// Returns the first element mutably.
    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.get_mut(0)
    }

    /// Returns the last element mutably.
    pub fn back_mut(&mut self) -> Option<&mut T> {
        let index = self.len.checked_sub(1)?;
        self.get_mut(index)
    }

    /// Returns `true` if any element equals `value`.
    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.iter().any(|element| element == value)
    }

    // =========================================================================
    // Iteration
    // =========================================================================

    /// Iterates front to back; `.rev()` iterates back to front.
    pub fn iter(&self) -> Iter<'_, T, NODE_SIZE> {
        Iter::new(&self.directory, self.begin, self.end)
    }

    /// Iterates front to back with mutable access.
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut::new(self.directory.slots_mut(), self.len)
    }

    /// Read-only cursor at the first element.
    pub fn cursor_front(&self) -> Cursor<'_, T, A, NODE_SIZE> {
        Cursor::new(self, self.begin)
    }

    /// Read-only cursor at the last element, or at the end when empty.
    pub fn cursor_back(&self) -> Cursor<'_, T, A, NODE_SIZE> {
        let position = self.len.checked_sub(1).map_or(self.end, |_| self.end.advance(-1));
        Cursor::new(self, position)
    }

    /// Read-only cursor at `index`; `index == len()` gives the end cursor.
    ///
    /// # Errors
    ///
    /// Returns [`DequeError::OutOfRange`] past the end.
    pub fn cursor_at(&self, index: usize) -> Result<Cursor<'_, T, A, NODE_SIZE>, DequeError> {
        self.checked_cursor_position(index)
            .map(|position| Cursor::new(self, position))
    }

    /// Mutable cursor at the first element.
    pub fn cursor_front_mut(&mut self) -> CursorMut<'_, T, A, NODE_SIZE> {
        let position = self.begin;
        CursorMut::new(self, position)
    }

    /// Mutable cursor at `index`; `index == len()` gives the end cursor.
    ///
    /// # Errors
    ///
    /// Returns [`DequeError::OutOfRange`] past the end.
    pub fn cursor_at_mut(
        &mut self,
        index: usize,
    ) -> Result<CursorMut<'_, T, A, NODE_SIZE>, DequeError> {
        let position = self.checked_cursor_position(index)?;
        Ok(CursorMut::new(self, position))
    }

    fn checked_cursor_position(&self, index: usize) -> Result<Position<NODE_SIZE>, DequeError> {
        if index > self.len {
            return Err(DequeError::OutOfRange {
                index,
                len: self.len,
            });
        }
        Ok(self.begin.advance(steps(index)))
    }

    // =========================================================================
    // Push / pop
    // =========================================================================

    /// Appends `value`.
    ///
    /// # Errors
    ///
    /// Returns an allocation or construction failure; the deque is unchanged
    /// and `value` is dropped.
    pub fn push_back(&mut self, value: T) -> Result<(), DequeError> {
        self.push_back_with(|allocator| allocator.construct(value).map_err(Rejected::into_error))
    }

    /// Prepends `value`.
    ///
    /// # Errors
    ///
    /// Returns an allocation or construction failure; the deque is unchanged
    /// and `value` is dropped.
    pub fn push_front(&mut self, value: T) -> Result<(), DequeError> {
        self.push_front_with(|allocator| allocator.construct(value).map_err(Rejected::into_error))
    }

    /// Appends the element built by `make`, which runs once the slot is
    /// ready and receives the allocation strategy.
    ///
    /// # Errors
    ///
    /// Returns an allocation failure, or the error `make` returns; the deque
    /// is unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use blockdeque::{ChunkAllocator, ChunkedDeque, Rejected};
    ///
    /// let mut deque: ChunkedDeque<String> = ChunkedDeque::new();
    /// deque
    ///     .push_back_with(|allocator| {
    ///         allocator
    ///             .construct(String::from("built in place"))
    ///             .map_err(Rejected::into_error)
    ///     })
    ///     .unwrap();
    /// assert_eq!(deque.back().map(String::as_str), Some("built in place"));
    /// ```
    pub fn push_back_with<F>(&mut self, make: F) -> Result<(), DequeError>
    where
        F: FnOnce(&mut A) -> Result<T, DequeError>,
    {
        let unallocated = self.directory.len() == 0;
        if self.is_empty() {
            self.bootstrap()?;
        }
        let target = self.end;
        let reservation = match self.reserve_back() {
            Ok(reservation) => reservation,
            Err(error) => {
                self.discard_directory(unallocated);
                return Err(error);
            }
        };
        match make(&mut self.allocator) {
            Ok(value) => {
                self.write_slot(target, value);
                self.end.increment();
                self.len += 1;
                Ok(())
            }
            Err(error) => {
                self.cancel(reservation);
                self.discard_directory(unallocated);
                Err(error)
            }
        }
    }

    /// Prepends the element built by `make`, which runs once the slot is
    /// ready and receives the allocation strategy.
    ///
    /// # Errors
    ///
    /// Returns an allocation failure, or the error `make` returns; the deque
    /// is unchanged.
    pub fn push_front_with<F>(&mut self, make: F) -> Result<(), DequeError>
    where
        F: FnOnce(&mut A) -> Result<T, DequeError>,
    {
        let unallocated = self.directory.len() == 0;
        if self.is_empty() {
            self.bootstrap()?;
        }
        let target = self.begin.advance(-1);
        let reservation = match self.reserve_front() {
            Ok(reservation) => reservation,
            Err(error) => {
                self.discard_directory(unallocated);
                return Err(error);
            }
        };
        match make(&mut self.allocator) {
            Ok(value) => {
                self.write_slot(target, value);
                self.begin = target;
                self.len += 1;
                Ok(())
            }
            Err(error) => {
                self.cancel(reservation);
                self.discard_directory(unallocated);
                Err(error)
            }
        }
    }

    /// Removes and returns the last element, or `None` if empty.
    pub fn pop_back(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let last = self.end.advance(-1);
        let value = self.take_slot(last);
        if last.offset() == 0 || last == self.begin {
            self.release_chunk(last.node());
        }
        self.end = last;
        self.len -= 1;
        value
    }

    /// Removes and returns the first element, or `None` if empty.
    pub fn pop_front(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let first = self.begin;
        let value = self.take_slot(first);
        let next = first.advance(1);
        if next.offset() == 0 || next == self.end {
            self.release_chunk(first.node());
        }
        self.begin = next;
        self.len -= 1;
        value
    }

    // =========================================================================
    // Insert / remove
    // =========================================================================

    /// Inserts `value` so it ends up at `index`, shifting the elements
    /// between `index` and the nearer end by one slot.
    ///
    /// # Errors
    ///
    /// Returns [`DequeError::OutOfRange`] if `index > len()`, or an
    /// allocation or construction failure. On failure every shifted element
    /// is moved back and the deque is unchanged.
    pub fn insert(&mut self, index: usize, value: T) -> Result<(), DequeError> {
        if index > self.len {
            return Err(DequeError::OutOfRange {
                index,
                len: self.len,
            });
        }
        if index == self.len {
            return self.push_back(value);
        }
        if index == 0 {
            return self.push_front(value);
        }

        if index < self.len - index {
            let opened = self.begin.advance(-1);
            let reservation = self.reserve_front()?;
            let target = self.begin.advance(steps(index) - 1);
            let mut log = ShiftLog::new();
            let mut from = self.begin;
            while from <= target {
                let to = from.advance(-1);
                if let Err(error) = self.relocate(from, to, &mut log) {
                    return Err(self.abort_insert(log, reservation, error));
                }
                from.increment();
            }
            if let Err(error) = self.place(target, value) {
                return Err(self.abort_insert(log, reservation, error));
            }
            self.begin = opened;
        } else {
            let reservation = self.reserve_back()?;
            let target = self.begin.advance(steps(index));
            let mut log = ShiftLog::new();
            let mut from = self.end.advance(-1);
            while from >= target {
                let to = from.advance(1);
                if let Err(error) = self.relocate(from, to, &mut log) {
                    return Err(self.abort_insert(log, reservation, error));
                }
                from.decrement();
            }
            if let Err(error) = self.place(target, value) {
                return Err(self.abort_insert(log, reservation, error));
            }
            self.end.increment();
        }
        self.len += 1;
        Ok(())
    }

    /// Removes and returns the element at `index`, shifting the elements
    /// between `index` and the nearer end by one slot.
    ///
    /// # Errors
    ///
    /// Returns [`DequeError::OutOfRange`] if `index >= len()`, or a
    /// construction failure while shifting. On failure every shifted element
    /// is moved back, the removed element is restored and the deque is
    /// unchanged.
    pub fn remove(&mut self, index: usize) -> Result<T, DequeError> {
        let out_of_range = DequeError::OutOfRange {
            index,
            len: self.len,
        };
        let target = self.position(index).ok_or_else(|| out_of_range.clone())?;
        if index == 0 {
            return self.pop_front().ok_or(out_of_range);
        }
        if index == self.len - 1 {
            return self.pop_back().ok_or(out_of_range);
        }
        let removed = self.take_slot(target).ok_or(out_of_range)?;

        let mut log = ShiftLog::new();
        if index < self.len - 1 - index {
            let mut from = target.advance(-1);
            while from >= self.begin {
                let to = from.advance(1);
                if let Err(error) = self.relocate(from, to, &mut log) {
                    self.rollback(log);
                    self.write_slot(target, removed);
                    return Err(error);
                }
                from.decrement();
            }
            let vacated = self.begin;
            let next = vacated.advance(1);
            if next.offset() == 0 || next == self.end {
                self.release_chunk(vacated.node());
            }
            self.begin = next;
        } else {
            let mut from = target.advance(1);
            while from < self.end {
                let to = from.advance(-1);
                if let Err(error) = self.relocate(from, to, &mut log) {
                    self.rollback(log);
                    self.write_slot(target, removed);
                    return Err(error);
                }
                from.increment();
            }
            let vacated = self.end.advance(-1);
            if vacated.offset() == 0 || vacated == self.begin {
                self.release_chunk(vacated.node());
            }
            self.end = vacated;
        }
        self.len -= 1;
        Ok(removed)
    }

    /// Swaps the elements at `first` and `second`.
    ///
    /// # Errors
    ///
    /// Returns [`DequeError::OutOfRange`] naming the first bad index.
    pub fn swap(&mut self, first: usize, second: usize) -> Result<(), DequeError> {
        let len = self.len;
        let left = self
            .position(first)
            .ok_or(DequeError::OutOfRange { index: first, len })?;
        let right = self
            .position(second)
            .ok_or(DequeError::OutOfRange { index: second, len })?;
        if left == right {
            return Ok(());
        }
        if let (Some(left_value), Some(right_value)) = (self.take_slot(left), self.take_slot(right))
        {
            self.write_slot(left, right_value);
            self.write_slot(right, left_value);
        }
        Ok(())
    }

    /// Destroys every element and frees every chunk. The directory is kept.
    pub fn clear(&mut self) {
        self.destroy_all();
        self.directory.recenter();
        self.begin = Position::new(0, 0);
        self.end = self.begin;
    }

    // =========================================================================
    // Copying
    // =========================================================================

    /// Deep-copies the deque into a directory sized for exactly its elements.
    ///
    /// The copy gets a clone of the allocator.
    ///
    /// # Errors
    ///
    /// Returns the first allocation or construction failure; everything
    /// copied before it is released.
    pub fn try_clone(&self) -> Result<Self, DequeError>
    where
        T: Clone,
        A: Clone,
    {
        let mut copy = Self::with_allocator(self.allocator.clone());
        copy.policy = self.policy;
        copy.prepare(self.len)?;
        for value in self {
            copy.push_back_with(|allocator| allocator.construct_clone(value))?;
        }
        Ok(copy)
    }

    /// Replaces the contents with a deep copy of `source`.
    ///
    /// # Errors
    ///
    /// Returns the first allocation or construction failure; `self` is left
    /// untouched.
    pub fn try_clone_from(&mut self, source: &Self) -> Result<(), DequeError>
    where
        T: Clone,
        A: Clone,
    {
        *self = source.try_clone()?;
        Ok(())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    #[inline]
    fn slot(&self, position: Position<NODE_SIZE>) -> Option<&T> {
        self.directory
            .chunk(position.node())?
            .slot(position.offset())
    }

    #[inline]
    fn slot_mut(&mut self, position: Position<NODE_SIZE>) -> Option<&mut T> {
        self.directory
            .chunk_mut(position.node())?
            .slot_mut(position.offset())
    }

    #[inline]
    fn take_slot(&mut self, position: Position<NODE_SIZE>) -> Option<T> {
        self.directory
            .chunk_mut(position.node())?
            .take(position.offset())
    }

    #[inline]
    fn write_slot(&mut self, position: Position<NODE_SIZE>, value: T) {
        if let Some(chunk) = self.directory.chunk_mut(position.node()) {
            chunk.write(position.offset(), value);
        }
    }

    /// Lays out a fresh directory for `count` elements starting at node 0.
    fn prepare(&mut self, count: usize) -> Result<(), DequeError> {
        debug_assert!(self.is_empty());
        if count == 0 {
            return Ok(());
        }
        self.directory = Directory::try_for_nodes(
            nodes_for(count, NODE_SIZE),
            &self.policy,
            &mut self.allocator,
        )?;
        self.begin = Position::new(0, 0);
        self.end = self.begin;
        Ok(())
    }

    /// Resets an empty deque so node 0 is centred in a directory.
    fn bootstrap(&mut self) -> Result<(), DequeError> {
        if self.directory.len() == 0 {
            self.directory = Directory::try_for_nodes(0, &self.policy, &mut self.allocator)?;
        } else {
            self.directory.recenter();
        }
        self.begin = Position::new(0, 0);
        self.end = self.begin;
        Ok(())
    }

    /// Drops the directory a failed push bootstrapped, if the deque had none.
    fn discard_directory(&mut self, unallocated: bool) {
        if unallocated {
            self.directory = Directory::empty();
        }
    }

    /// Makes the slot at `end` writable.
    fn reserve_back(&mut self) -> Result<Reservation<T>, DequeError> {
        let beyond = self.end.advance(1).node();
        let retired = if self.directory.contains(beyond) {
            None
        } else {
            Some(self.directory.grow(
                self.begin.node(),
                beyond,
                &self.policy,
                &mut self.allocator,
            )?)
        };
        self.reserve_node(self.end.node(), retired)
    }

    /// Makes the slot before `begin` writable.
    fn reserve_front(&mut self) -> Result<Reservation<T>, DequeError> {
        let before = self.begin.advance(-1).node();
        let retired = if self.directory.contains(before) {
            None
        } else {
            Some(self.directory.grow(
                before,
                self.end.node(),
                &self.policy,
                &mut self.allocator,
            )?)
        };
        self.reserve_node(before, retired)
    }

    fn reserve_node(
        &mut self,
        node: isize,
        retired: Option<Retired<T>>,
    ) -> Result<Reservation<T>, DequeError> {
        match self.ensure_chunk(node) {
            Ok(fresh) => Ok(Reservation {
                node,
                fresh,
                retired,
            }),
            Err(error) => {
                if let Some(retired) = retired {
                    self.directory.restore(retired);
                }
                Err(error)
            }
        }
    }

    /// Undoes a reservation whose slot was never filled.
    fn cancel(&mut self, reservation: Reservation<T>) {
        if reservation.fresh {
            self.release_chunk(reservation.node);
        }
        if let Some(retired) = reservation.retired {
            self.directory.restore(retired);
        }
    }

    fn ensure_chunk(&mut self, node: isize) -> Result<bool, DequeError> {
        if self.directory.chunk(node).is_some() {
            return Ok(false);
        }
        match self.allocator.allocate_chunk(NODE_SIZE) {
            Ok(chunk) => {
                self.directory.install(node, chunk);
                Ok(true)
            }
            Err(error) => {
                log_warn!(node, "chunk allocation failed");
                Err(error)
            }
        }
    }

    fn release_chunk(&mut self, node: isize) {
        if let Some(chunk) = self.directory.remove(node) {
            self.allocator.deallocate_chunk(chunk);
        }
    }

    /// Moves the element at `from` into the vacant slot `to` through the
    /// allocator. On refusal the element is put back at `from`.
    fn relocate(
        &mut self,
        from: Position<NODE_SIZE>,
        to: Position<NODE_SIZE>,
        log: &mut ShiftLog<NODE_SIZE>,
    ) -> Result<(), DequeError> {
        let Some(value) = self.take_slot(from) else {
            return Ok(());
        };
        match self.allocator.construct(value) {
            Ok(value) => {
                self.write_slot(to, value);
                log.record(from, to);
                Ok(())
            }
            Err(rejected) => {
                self.write_slot(from, rejected.value);
                Err(rejected.error)
            }
        }
    }

    /// Constructs `value` into the vacant slot at `target`.
    fn place(&mut self, target: Position<NODE_SIZE>, value: T) -> Result<(), DequeError> {
        let value = self
            .allocator
            .construct(value)
            .map_err(Rejected::into_error)?;
        self.write_slot(target, value);
        Ok(())
    }

    /// Replays `log` newest first with plain moves.
    fn rollback(&mut self, log: ShiftLog<NODE_SIZE>) {
        for entry in log.unwind() {
            if let Some(value) = self.take_slot(entry.to) {
                self.write_slot(entry.from, value);
            }
        }
    }

    fn abort_insert(
        &mut self,
        log: ShiftLog<NODE_SIZE>,
        reservation: Reservation<T>,
        error: DequeError,
    ) -> DequeError {
        self.rollback(log);
        self.cancel(reservation);
        error
    }

    /// Destroys every live element through the allocator and frees every
    /// chunk.
    fn destroy_all(&mut self) {
        let mut position = self.begin;
        while position < self.end {
            if let Some(value) = self.take_slot(position) {
                self.allocator.destroy(value);
            }
            position.increment();
        }
        let allocator = &mut self.allocator;
        for chunk in self.directory.drain() {
            allocator.deallocate_chunk(chunk);
        }
        self.len = 0;
    }
}

impl<T, A: ChunkAllocator<T>, const NODE_SIZE: usize> Drop for ChunkedDeque<T, A, NODE_SIZE> {
    fn drop(&mut self) {
        self.destroy_all();
    }
}

impl<T, A: ChunkAllocator<T> + Default, const NODE_SIZE: usize> Default
    for ChunkedDeque<T, A, NODE_SIZE>
{
    fn default() -> Self {
        Self::with_allocator(A::default())
    }
}

/// # Panics
///
/// Panics if the copy cannot be allocated or constructed; use
/// [`ChunkedDeque::try_clone`] to handle that case.
impl<T: Clone, A: ChunkAllocator<T> + Clone, const NODE_SIZE: usize> Clone
    for ChunkedDeque<T, A, NODE_SIZE>
{
    fn clone(&self) -> Self {
        self.try_clone()
            .unwrap_or_else(|error| panic!("failed to clone deque: {error}"))
    }

    fn clone_from(&mut self, source: &Self) {
        if let Err(error) = self.try_clone_from(source) {
            panic!("failed to clone deque: {error}");
        }
    }
}

impl<T: fmt::Debug, A: ChunkAllocator<T>, const NODE_SIZE: usize> fmt::Debug
    for ChunkedDeque<T, A, NODE_SIZE>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T, A, B, const NODE_SIZE: usize, const OTHER_NODE_SIZE: usize>
    PartialEq<ChunkedDeque<T, B, OTHER_NODE_SIZE>> for ChunkedDeque<T, A, NODE_SIZE>
where
    T: PartialEq,
    A: ChunkAllocator<T>,
    B: ChunkAllocator<T>,
{
    fn eq(&self, other: &ChunkedDeque<T, B, OTHER_NODE_SIZE>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq, A: ChunkAllocator<T>, const NODE_SIZE: usize> Eq for ChunkedDeque<T, A, NODE_SIZE> {}

impl<T: PartialOrd, A: ChunkAllocator<T>, const NODE_SIZE: usize> PartialOrd
    for ChunkedDeque<T, A, NODE_SIZE>
{
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord, A: ChunkAllocator<T>, const NODE_SIZE: usize> Ord for ChunkedDeque<T, A, NODE_SIZE> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T: Hash, A: ChunkAllocator<T>, const NODE_SIZE: usize> Hash for ChunkedDeque<T, A, NODE_SIZE> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len.hash(state);
        for element in self {
            element.hash(state);
        }
    }
}

impl<T, A: ChunkAllocator<T>, const NODE_SIZE: usize> Index<usize>
    for ChunkedDeque<T, A, NODE_SIZE>
{
    type Output = T;

    fn index(&self, index: usize) -> &T {
        let len = self.len;
        self.get(index).unwrap_or_else(|| {
            panic!("index out of bounds: the len is {len} but the index is {index}")
        })
    }
}

impl<T, A: ChunkAllocator<T>, const NODE_SIZE: usize> IndexMut<usize>
    for ChunkedDeque<T, A, NODE_SIZE>
{
    fn index_mut(&mut self, index: usize) -> &mut T {
        let len = self.len;
        self.get_mut(index).unwrap_or_else(|| {
            panic!("index out of bounds: the len is {len} but the index is {index}")
        })
    }
}

/// # Panics
///
/// Panics if an element cannot be allocated or constructed.
impl<T, A: ChunkAllocator<T>, const NODE_SIZE: usize> Extend<T> for ChunkedDeque<T, A, NODE_SIZE> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            if let Err(error) = self.push_back(value) {
                panic!("failed to extend deque: {error}");
            }
        }
    }
}

impl<'a, T: Copy + 'a, A: ChunkAllocator<T>, const NODE_SIZE: usize> Extend<&'a T>
    for ChunkedDeque<T, A, NODE_SIZE>
{
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

/// # Panics
///
/// Panics if an element cannot be allocated.
impl<T, const NODE_SIZE: usize> FromIterator<T> for ChunkedDeque<T, Global, NODE_SIZE> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::try_from_iter_in(iter, Global)
            .unwrap_or_else(|error| panic!("failed to collect into deque: {error}"))
    }
}

impl<T, const NODE_SIZE: usize, const LEN: usize> From<[T; LEN]>
    for ChunkedDeque<T, Global, NODE_SIZE>
{
    fn from(array: [T; LEN]) -> Self {
        array.into_iter().collect()
    }
}

impl<T, const NODE_SIZE: usize> From<Vec<T>> for ChunkedDeque<T, Global, NODE_SIZE> {
    fn from(vector: Vec<T>) -> Self {
        vector.into_iter().collect()
    }
}

impl<T, A: ChunkAllocator<T>, const NODE_SIZE: usize> IntoIterator
    for ChunkedDeque<T, A, NODE_SIZE>
{
    type Item = T;
    type IntoIter = IntoIter<T, A, NODE_SIZE>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self)
    }
}

impl<'a, T, A: ChunkAllocator<T>, const NODE_SIZE: usize> IntoIterator
    for &'a ChunkedDeque<T, A, NODE_SIZE>
{
    type Item = &'a T;
    type IntoIter = Iter<'a, T, NODE_SIZE>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, A: ChunkAllocator<T>, const NODE_SIZE: usize> IntoIterator
    for &'a mut ChunkedDeque<T, A, NODE_SIZE>
{
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
