//! Read-only and mutable views over a [`Position`].
//!
//! A [`Cursor`] shares the deque and can be copied freely. A [`CursorMut`]
//! borrows it exclusively and can edit through the current position. A
//! `CursorMut` converts into a `Cursor`, never the other way round.

use std::fmt;

use super::ChunkedDeque;
use super::position::Position;
use crate::alloc::ChunkAllocator;
use crate::error::DequeError;

/// A read-only random-access position within a deque.
///
/// Valid positions run from the first element to one past the last.
///
/// # Examples
///
/// ```rust
/// use blockdeque::ChunkedDeque;
///
/// let deque: ChunkedDeque<char> = "abcdef".chars().collect();
/// let mut cursor = deque.cursor_front();
/// assert!(cursor.advance(3));
/// assert_eq!(cursor.current(), Some(&'d'));
/// assert_eq!(cursor.distance(&deque.cursor_front()), 3);
/// assert!(!cursor.advance(10));
/// ```
pub struct Cursor<'a, T, A: ChunkAllocator<T>, const NODE_SIZE: usize> {
    deque: &'a ChunkedDeque<T, A, NODE_SIZE>,
    position: Position<NODE_SIZE>,
}

impl<T, A: ChunkAllocator<T>, const NODE_SIZE: usize> Clone for Cursor<'_, T, A, NODE_SIZE> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, A: ChunkAllocator<T>, const NODE_SIZE: usize> Copy for Cursor<'_, T, A, NODE_SIZE> {}

impl<'a, T, A: ChunkAllocator<T>, const NODE_SIZE: usize> Cursor<'a, T, A, NODE_SIZE> {
    pub(crate) const fn new(
        deque: &'a ChunkedDeque<T, A, NODE_SIZE>,
        position: Position<NODE_SIZE>,
    ) -> Self {
        Self { deque, position }
    }

    /// The underlying position.
    pub const fn position(&self) -> Position<NODE_SIZE> {
        self.position
    }

    /// Logical index of the current element; `None` at the end.
    pub fn index(&self) -> Option<usize> {
        self.deque.index_of(self.position)
    }

    /// The current element; `None` at the end.
    pub fn current(&self) -> Option<&'a T> {
        self.deque.get_at(self.position)
    }

    /// Moves one element forward. Returns `false` if already at the end.
    pub fn move_next(&mut self) -> bool {
        self.advance(1)
    }

    /// Moves one element back. Returns `false` if already at the front.
    pub fn move_prev(&mut self) -> bool {
        self.advance(-1)
    }

    /// Moves `steps` elements in O(1). Returns `false`, leaving the cursor
    /// where it was, if the target lies outside the deque.
    pub fn advance(&mut self, steps: isize) -> bool {
        match seek(self.deque, self.position, steps) {
            Some(position) => {
                self.position = position;
                true
            }
            None => false,
        }
    }

    /// Signed element count from `other` to `self`.
    pub fn distance(&self, other: &Self) -> isize {
        self.position.difference(other.position)
    }
}

impl<T: fmt::Debug, A: ChunkAllocator<T>, const NODE_SIZE: usize> fmt::Debug
    for Cursor<'_, T, A, NODE_SIZE>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Cursor")
            .field(&self.position)
            .field(&self.current())
            .finish()
    }
}

/// A random-access position that can edit the deque it points into.
///
/// The cursor remembers the logical index of its element, so it stays on the
/// same element after an insert or remove moves elements physically.
///
/// # Examples
///
/// ```rust
/// use blockdeque::ChunkedDeque;
///
/// let mut deque: ChunkedDeque<i32> = (1..=4).collect();
/// let mut cursor = deque.cursor_at_mut(2).unwrap();
/// cursor.insert_before(10).unwrap();
/// assert_eq!(cursor.current(), Some(&3));
/// if let Some(value) = cursor.current_mut() {
///     *value *= 100;
/// }
/// assert_eq!(cursor.remove_current(), Ok(300));
/// assert_eq!(deque.iter().copied().collect::<Vec<_>>(), vec![1, 2, 10, 4]);
/// ```
pub struct CursorMut<'a, T, A: ChunkAllocator<T>, const NODE_SIZE: usize> {
    deque: &'a mut ChunkedDeque<T, A, NODE_SIZE>,
    position: Position<NODE_SIZE>,
}

impl<'a, T, A: ChunkAllocator<T>, const NODE_SIZE: usize> CursorMut<'a, T, A, NODE_SIZE> {
    pub(crate) const fn new(
        deque: &'a mut ChunkedDeque<T, A, NODE_SIZE>,
        position: Position<NODE_SIZE>,
    ) -> Self {
        Self { deque, position }
    }

    /// The underlying position.
    pub const fn position(&self) -> Position<NODE_SIZE> {
        self.position
    }

    /// Logical index of the current element; `None` at the end.
    pub fn index(&self) -> Option<usize> {
        self.deque.index_of(self.position)
    }

    /// The current element; `None` at the end.
    pub fn current(&self) -> Option<&T> {
        self.deque.get_at(self.position)
    }

    /// The current element, mutably; `None` at the end.
    pub fn current_mut(&mut self) -> Option<&mut T> {
        let index = self.index()?;
        self.deque.get_mut(index)
    }

    /// Moves one element forward. Returns `false` if already at the end.
    pub fn move_next(&mut self) -> bool {
        self.advance(1)
    }

    /// Moves one element back. Returns `false` if already at the front.
    pub fn move_prev(&mut self) -> bool {
        self.advance(-1)
    }

    /// Moves `steps` elements in O(1). Returns `false`, leaving the cursor
    /// where it was, if the target lies outside the deque.
    pub fn advance(&mut self, steps: isize) -> bool {
        match seek(self.deque, self.position, steps) {
            Some(position) => {
                self.position = position;
                true
            }
            None => false,
        }
    }

    /// Borrows a read-only view at the same position.
    pub fn as_cursor(&self) -> Cursor<'_, T, A, NODE_SIZE> {
        Cursor::new(self.deque, self.position)
    }

    /// Inserts `value` before the current element (or at the back when at
    /// the end). The cursor stays on the element it was on.
    ///
    /// # Errors
    ///
    /// Propagates the insert failure; the deque and cursor are unchanged.
    pub fn insert_before(&mut self, value: T) -> Result<(), DequeError> {
        let index = self.logical_index();
        self.deque.insert(index, value)?;
        self.relocate_to(index + 1);
        Ok(())
    }

    /// Removes the current element. The cursor moves onto the element that
    /// followed it.
    ///
    /// # Errors
    ///
    /// Returns [`DequeError::OutOfRange`] at the end, or the remove failure;
    /// the deque and cursor are unchanged.
    pub fn remove_current(&mut self) -> Result<T, DequeError> {
        let index = self.logical_index();
        let removed = self.deque.remove(index)?;
        self.relocate_to(index);
        Ok(removed)
    }

    fn logical_index(&self) -> usize {
        self.index().unwrap_or(self.deque.len())
    }

    fn relocate_to(&mut self, index: usize) {
        self.position = self.deque.position(index).unwrap_or(self.deque.end());
    }
}

impl<'a, T, A: ChunkAllocator<T>, const NODE_SIZE: usize> From<CursorMut<'a, T, A, NODE_SIZE>>
    for Cursor<'a, T, A, NODE_SIZE>
{
    fn from(cursor: CursorMut<'a, T, A, NODE_SIZE>) -> Self {
        Cursor::new(cursor.deque, cursor.position)
    }
}

impl<T: fmt::Debug, A: ChunkAllocator<T>, const NODE_SIZE: usize> fmt::Debug
    for CursorMut<'_, T, A, NODE_SIZE>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CursorMut")
            .field(&self.position)
            .field(&self.current())
            .finish()
    }
}

/// Target of moving `steps` from `position`, if it stays within
/// `begin..=end`.
fn seek<T, A: ChunkAllocator<T>, const NODE_SIZE: usize>(
    deque: &ChunkedDeque<T, A, NODE_SIZE>,
    position: Position<NODE_SIZE>,
    steps: isize,
) -> Option<Position<NODE_SIZE>> {
    let target = position.checked_advance(steps)?;
    (deque.begin() <= target && target <= deque.end()).then_some(target)
}
