//! Two-level element addresses.
//!
//! A [`Position`] names one slot as a node index, relative to the directory
//! origin, plus an offset inside that node's chunk. Positions carry no
//! reference to the container: they stay meaningful across directory growth
//! because growth moves the origin together with the chunks, and every access
//! re-derives the physical slot from `(origin + node, offset)`.
//!
//! Arithmetic is O(1) and uses floored division, so offsets stay in
//! `0..NODE_SIZE` for negative steps as well.

use std::cmp::Ordering;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// A (node, offset) address inside a deque with `NODE_SIZE`-slot chunks.
///
/// Positions order first by node, then by offset.
///
/// # Examples
///
/// ```rust
/// use blockdeque::Position;
///
/// let start: Position<4> = Position::new(0, 3);
/// let later = start + 6;
/// assert_eq!((later.node(), later.offset()), (2, 1));
/// assert_eq!(later - start, 6);
/// assert_eq!(later + -6, start);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position<const NODE_SIZE: usize> {
    node: isize,
    offset: usize,
}

impl<const NODE_SIZE: usize> Position<NODE_SIZE> {
    const VALID_NODE_SIZE: () = assert!(
        NODE_SIZE > 0 && NODE_SIZE <= isize::MAX as usize,
        "NODE_SIZE must be positive and fit in isize"
    );

    #[allow(clippy::cast_possible_wrap)]
    const STRIDE: isize = NODE_SIZE as isize;

    /// Creates a position.
    ///
    /// # Panics
    ///
    /// Panics if `offset >= NODE_SIZE`.
    #[must_use]
    pub const fn new(node: isize, offset: usize) -> Self {
        let () = Self::VALID_NODE_SIZE;
        assert!(offset < NODE_SIZE, "offset must be below NODE_SIZE");
        Self { node, offset }
    }

    /// Node index relative to the directory origin; may be negative.
    #[inline]
    #[must_use]
    pub const fn node(&self) -> isize {
        self.node
    }

    /// Slot inside the node's chunk.
    #[inline]
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Steps to the next slot, crossing into the next node after the last one.
    #[inline]
    pub const fn increment(&mut self) {
        if self.offset + 1 == NODE_SIZE {
            self.node += 1;
            self.offset = 0;
        } else {
            self.offset += 1;
        }
    }

    /// Steps to the previous slot, crossing into the previous node before the
    /// first one.
    #[inline]
    pub const fn decrement(&mut self) {
        if self.offset == 0 {
            self.node -= 1;
            self.offset = NODE_SIZE - 1;
        } else {
            self.offset -= 1;
        }
    }

    /// Returns the position `steps` slots away (negative steps go backwards).
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    pub const fn advance(self, steps: isize) -> Self {
        let total = self.offset as isize + steps;
        Self {
            node: self.node + total.div_euclid(Self::STRIDE),
            offset: total.rem_euclid(Self::STRIDE) as usize,
        }
    }

    /// Like [`advance`](Self::advance), but returns `None` on overflow.
    #[must_use]
    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    pub const fn checked_advance(self, steps: isize) -> Option<Self> {
        let Some(total) = (self.offset as isize).checked_add(steps) else {
            return None;
        };
        let Some(node) = self.node.checked_add(total.div_euclid(Self::STRIDE)) else {
            return None;
        };
        Some(Self {
            node,
            offset: total.rem_euclid(Self::STRIDE) as usize,
        })
    }

    /// Signed number of slots from `origin` to `self`.
    ///
    /// Exact inverse of [`advance`](Self::advance):
    /// `p.advance(n).difference(p) == n`.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub const fn difference(self, origin: Self) -> isize {
        (self.node - origin.node) * Self::STRIDE + (self.offset as isize - origin.offset as isize)
    }
}

impl<const NODE_SIZE: usize> PartialOrd for Position<NODE_SIZE> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<const NODE_SIZE: usize> Ord for Position<NODE_SIZE> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.node
            .cmp(&other.node)
            .then(self.offset.cmp(&other.offset))
    }
}

impl<const NODE_SIZE: usize> Add<isize> for Position<NODE_SIZE> {
    type Output = Self;

    fn add(self, steps: isize) -> Self {
        self.advance(steps)
    }
}

impl<const NODE_SIZE: usize> AddAssign<isize> for Position<NODE_SIZE> {
    fn add_assign(&mut self, steps: isize) {
        *self = self.advance(steps);
    }
}

impl<const NODE_SIZE: usize> Sub<isize> for Position<NODE_SIZE> {
    type Output = Self;

    fn sub(self, steps: isize) -> Self {
        self.advance(-steps)
    }
}

impl<const NODE_SIZE: usize> SubAssign<isize> for Position<NODE_SIZE> {
    fn sub_assign(&mut self, steps: isize) {
        *self = self.advance(-steps);
    }
}

impl<const NODE_SIZE: usize> Sub for Position<NODE_SIZE> {
    type Output = isize;

    fn sub(self, origin: Self) -> isize {
        self.difference(origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    type Pos = Position<4>;

    #[rstest]
    fn test_increment_within_node() {
        let mut position = Pos::new(0, 1);
        position.increment();
        assert_eq!(position, Pos::new(0, 2));
    }

    #[rstest]
    fn test_increment_crosses_node() {
        let mut position = Pos::new(-1, 3);
        position.increment();
        assert_eq!(position, Pos::new(0, 0));
    }

    #[rstest]
    fn test_decrement_crosses_node() {
        let mut position = Pos::new(0, 0);
        position.decrement();
        assert_eq!(position, Pos::new(-1, 3));
    }

    #[rstest]
    #[case(Pos::new(0, 0), 5, Pos::new(1, 1))]
    #[case(Pos::new(0, 0), -1, Pos::new(-1, 3))]
    #[case(Pos::new(0, 2), -7, Pos::new(-2, 3))]
    #[case(Pos::new(2, 3), -11, Pos::new(0, 0))]
    #[case(Pos::new(-3, 1), 0, Pos::new(-3, 1))]
    fn test_advance_uses_floored_division(
        #[case] start: Pos,
        #[case] steps: isize,
        #[case] expected: Pos,
    ) {
        assert_eq!(start.advance(steps), expected);
        assert_eq!(expected.difference(start), steps);
    }

    #[rstest]
    fn test_ordering_is_node_then_offset() {
        assert!(Pos::new(0, 3) < Pos::new(1, 0));
        assert!(Pos::new(-1, 0) < Pos::new(-1, 1));
        assert!(Pos::new(2, 0) > Pos::new(1, 3));
    }

    #[rstest]
    fn test_operators_match_methods() {
        let mut position = Pos::new(0, 1);
        position += 6;
        assert_eq!(position, Pos::new(1, 3));
        position -= 6;
        assert_eq!(position, Pos::new(0, 1));
        assert_eq!(Pos::new(3, 0) - Pos::new(0, 1), 11);
        assert_eq!(Pos::new(0, 1) - 2, Pos::new(-1, 3));
    }

    #[rstest]
    fn test_checked_advance_reports_overflow() {
        assert_eq!(Pos::new(isize::MAX, 3).checked_advance(4), None);
        assert_eq!(Pos::new(0, 0).checked_advance(4), Some(Pos::new(1, 0)));
    }

    #[rstest]
    #[should_panic(expected = "offset must be below NODE_SIZE")]
    fn test_new_rejects_offset_past_node() {
        let _ = Pos::new(0, 4);
    }
}
