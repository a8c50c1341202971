//! Borrowing, mutable and owning iterators over a [`ChunkedDeque`].
//!
//! [`Iter`] holds a position at each end and can jump anywhere in O(1).
//! [`IterMut`] walks the populated chunks in directory order. [`IntoIter`]
//! pops from the deque it owns.

use std::fmt;
use std::iter::FusedIterator;

use super::ChunkedDeque;
use super::chunk::Chunk;
use super::directory::Directory;
use super::position::Position;
use crate::alloc::ChunkAllocator;

/// Borrowing iterator over a [`ChunkedDeque`].
///
/// `nth` and `nth_back` jump in O(1).
pub struct Iter<'a, T, const NODE_SIZE: usize> {
    directory: &'a Directory<T>,
    front: Position<NODE_SIZE>,
    back: Position<NODE_SIZE>,
}

impl<'a, T, const NODE_SIZE: usize> Iter<'a, T, NODE_SIZE> {
    pub(crate) const fn new(
        directory: &'a Directory<T>,
        front: Position<NODE_SIZE>,
        back: Position<NODE_SIZE>,
    ) -> Self {
        Self {
            directory,
            front,
            back,
        }
    }

    #[allow(clippy::cast_sign_loss)]
    fn remaining(&self) -> usize {
        self.back.difference(self.front) as usize
    }

    fn element(&self, position: Position<NODE_SIZE>) -> Option<&'a T> {
        self.directory
            .chunk(position.node())?
            .slot(position.offset())
    }
}

impl<T, const NODE_SIZE: usize> Clone for Iter<'_, T, NODE_SIZE> {
    fn clone(&self) -> Self {
        Self {
            directory: self.directory,
            front: self.front,
            back: self.back,
        }
    }
}

impl<'a, T, const NODE_SIZE: usize> Iterator for Iter<'a, T, NODE_SIZE> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let element = self.element(self.front);
        self.front.increment();
        element
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }

    #[allow(clippy::cast_possible_wrap)]
    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        if n >= self.remaining() {
            self.front = self.back;
            return None;
        }
        self.front = self.front.advance(n as isize);
        self.next()
    }

    fn count(self) -> usize {
        self.remaining()
    }

    fn last(mut self) -> Option<Self::Item> {
        self.next_back()
    }
}

impl<T, const NODE_SIZE: usize> DoubleEndedIterator for Iter<'_, T, NODE_SIZE> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back.decrement();
        self.element(self.back)
    }

    #[allow(clippy::cast_possible_wrap)]
    fn nth_back(&mut self, n: usize) -> Option<Self::Item> {
        if n >= self.remaining() {
            self.back = self.front;
            return None;
        }
        self.back = self.back.advance(-(n as isize));
        self.next_back()
    }
}

impl<T, const NODE_SIZE: usize> ExactSizeIterator for Iter<'_, T, NODE_SIZE> {}

impl<T, const NODE_SIZE: usize> FusedIterator for Iter<'_, T, NODE_SIZE> {}

impl<T: fmt::Debug, const NODE_SIZE: usize> fmt::Debug for Iter<'_, T, NODE_SIZE> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

/// Mutable iterator over a [`ChunkedDeque`].
///
/// Walks the populated chunks in directory order. Every slot outside the live
/// range is vacant, so occupied slots are exactly the elements, in order.
pub struct IterMut<'a, T> {
    chunks: std::slice::IterMut<'a, Option<Chunk<T>>>,
    front: std::slice::IterMut<'a, Option<T>>,
    back: std::slice::IterMut<'a, Option<T>>,
    remaining: usize,
}

impl<'a, T> IterMut<'a, T> {
    pub(crate) fn new(chunks: std::slice::IterMut<'a, Option<Chunk<T>>>, remaining: usize) -> Self {
        Self {
            chunks,
            front: Default::default(),
            back: Default::default(),
            remaining,
        }
    }
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        loop {
            if let Some(element) = self.front.by_ref().find_map(Option::as_mut) {
                self.remaining -= 1;
                return Some(element);
            }
            match self.chunks.next() {
                Some(Some(chunk)) => self.front = chunk.slots_mut(),
                Some(None) => {}
                None => break,
            }
        }
        let element = self.back.by_ref().find_map(Option::as_mut)?;
        self.remaining -= 1;
        Some(element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> DoubleEndedIterator for IterMut<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        loop {
            if let Some(element) = self.back.by_ref().rev().find_map(Option::as_mut) {
                self.remaining -= 1;
                return Some(element);
            }
            match self.chunks.next_back() {
                Some(Some(chunk)) => self.back = chunk.slots_mut(),
                Some(None) => {}
                None => break,
            }
        }
        let element = self.front.by_ref().rev().find_map(Option::as_mut)?;
        self.remaining -= 1;
        Some(element)
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}

impl<T> FusedIterator for IterMut<'_, T> {}

impl<T: fmt::Debug> fmt::Debug for IterMut<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IterMut")
            .field("remaining", &self.remaining)
            .finish_non_exhaustive()
    }
}

/// Owning iterator over a [`ChunkedDeque`].
pub struct IntoIter<T, A: ChunkAllocator<T>, const NODE_SIZE: usize> {
    deque: ChunkedDeque<T, A, NODE_SIZE>,
}

impl<T, A: ChunkAllocator<T>, const NODE_SIZE: usize> IntoIter<T, A, NODE_SIZE> {
    pub(crate) const fn new(deque: ChunkedDeque<T, A, NODE_SIZE>) -> Self {
        Self { deque }
    }
}

impl<T, A: ChunkAllocator<T>, const NODE_SIZE: usize> Iterator for IntoIter<T, A, NODE_SIZE> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.deque.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.deque.len(), Some(self.deque.len()))
    }
}

impl<T, A: ChunkAllocator<T>, const NODE_SIZE: usize> DoubleEndedIterator
    for IntoIter<T, A, NODE_SIZE>
{
    fn next_back(&mut self) -> Option<Self::Item> {
        self.deque.pop_back()
    }
}

impl<T, A: ChunkAllocator<T>, const NODE_SIZE: usize> ExactSizeIterator
    for IntoIter<T, A, NODE_SIZE>
{
}

impl<T, A: ChunkAllocator<T>, const NODE_SIZE: usize> FusedIterator for IntoIter<T, A, NODE_SIZE> {}

impl<T: fmt::Debug, A: ChunkAllocator<T>, const NODE_SIZE: usize> fmt::Debug
    for IntoIter<T, A, NODE_SIZE>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.deque).finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::{ChunkedDeque, Global};
    use rstest::rstest;

    fn mixed() -> ChunkedDeque<i32, Global, 4> {
        let mut deque = ChunkedDeque::with_allocator(Global);
        for value in 5..12 {
            deque.push_back(value).unwrap();
        }
        for value in (0..5).rev() {
            deque.push_front(value).unwrap();
        }
        deque
    }

    #[rstest]
    fn test_iter_forward_and_reverse() {
        let deque = mixed();
        assert_eq!(deque.iter().copied().collect::<Vec<_>>(), (0..12).collect::<Vec<_>>());
        assert_eq!(
            deque.iter().rev().copied().collect::<Vec<_>>(),
            (0..12).rev().collect::<Vec<_>>()
        );
    }

    #[rstest]
    fn test_iter_nth_jumps() {
        let deque = mixed();
        let mut iter = deque.iter();
        assert_eq!(iter.nth(6), Some(&6));
        assert_eq!(iter.len(), 5);
        assert_eq!(iter.nth_back(1), Some(&10));
        assert_eq!(iter.len(), 3);
        assert_eq!(iter.nth(3), None);
        assert_eq!(iter.next(), None);
    }

    #[rstest]
    fn test_iter_meets_in_the_middle() {
        let deque = mixed();
        let mut iter = deque.iter();
        let mut seen = Vec::new();
        while let (Some(front), Some(back)) = (iter.next(), iter.next_back()) {
            seen.push((*front, *back));
        }
        assert_eq!(seen.len(), 6);
        assert_eq!(seen[5], (5, 6));
    }

    #[rstest]
    fn test_iter_mut_both_ends() {
        let mut deque = mixed();
        let mut iter = deque.iter_mut();
        assert_eq!(iter.len(), 12);
        if let Some(first) = iter.next() {
            *first = 100;
        }
        if let Some(last) = iter.next_back() {
            *last = 200;
        }
        assert_eq!(iter.len(), 10);
        for value in iter {
            *value *= 2;
        }
        assert_eq!(deque.front(), Some(&100));
        assert_eq!(deque.back(), Some(&200));
        assert_eq!(deque[5], 10);
    }

    #[rstest]
    fn test_into_iter_drains_both_ends() {
        let mut iter = mixed().into_iter();
        assert_eq!(iter.next(), Some(0));
        assert_eq!(iter.next_back(), Some(11));
        assert_eq!(iter.len(), 10);
        assert_eq!(iter.collect::<Vec<_>>(), (1..11).collect::<Vec<_>>());
    }
}
