//! Scratch log for shift-based `insert` and `remove`.
//!
//! Each relocation performed while opening or closing a gap is recorded as a
//! move. If a later relocation is refused, the log is replayed newest first,
//! moving every element back to the slot it came from, so the container ends
//! up exactly as it was.

use smallvec::SmallVec;

use super::position::Position;

/// Moves recorded inline before the log spills to the heap.
const INLINE_MOVES: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Move<const NODE_SIZE: usize> {
    pub(crate) from: Position<NODE_SIZE>,
    pub(crate) to: Position<NODE_SIZE>,
}

#[derive(Debug)]
pub(crate) struct ShiftLog<const NODE_SIZE: usize> {
    moves: SmallVec<[Move<NODE_SIZE>; INLINE_MOVES]>,
}

impl<const NODE_SIZE: usize> ShiftLog<NODE_SIZE> {
    pub(crate) fn new() -> Self {
        Self {
            moves: SmallVec::new(),
        }
    }

    pub(crate) fn record(&mut self, from: Position<NODE_SIZE>, to: Position<NODE_SIZE>) {
        self.moves.push(Move { from, to });
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.moves.len()
    }

    /// The recorded moves, newest first.
    pub(crate) fn unwind(self) -> impl Iterator<Item = Move<NODE_SIZE>> {
        self.moves.into_iter().rev()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_unwind_is_newest_first() {
        let mut log: ShiftLog<4> = ShiftLog::new();
        let origin = Position::new(0, 0);
        for step in 0..20 {
            log.record(origin.advance(step), origin.advance(step + 1));
        }
        assert_eq!(log.len(), 20);

        let froms: Vec<isize> = log
            .unwind()
            .map(|entry| entry.from.difference(origin))
            .collect();
        assert_eq!(froms, (0..20).rev().collect::<Vec<_>>());
    }
}
