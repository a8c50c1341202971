//! Error types for the chunked deque.
//!
//! Every fallible operation on [`ChunkedDeque`](crate::ChunkedDeque) reports
//! a [`DequeError`]. A failed operation leaves the container exactly as it was
//! before the call.

/// The kind of storage an allocation was requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AllocationTarget {
    /// A fixed-capacity block of element slots.
    Chunk,
    /// The array of chunk handles.
    Directory,
}

impl std::fmt::Display for AllocationTarget {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Chunk => formatter.write_str("chunk"),
            Self::Directory => formatter.write_str("directory"),
        }
    }
}

/// Represents errors that can occur while operating on a deque.
///
/// # Examples
///
/// ```rust
/// use blockdeque::{ChunkedDeque, DequeError};
///
/// let deque: ChunkedDeque<i32> = ChunkedDeque::new();
/// assert_eq!(deque.at(3), Err(DequeError::OutOfRange { index: 3, len: 0 }));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DequeError {
    /// A checked access named an index at or past the end.
    OutOfRange {
        /// The requested index.
        index: usize,
        /// The number of elements at the time of the call.
        len: usize,
    },
    /// Storage for a chunk or the directory could not be obtained.
    AllocationFailed {
        /// What the storage was requested for.
        target: AllocationTarget,
        /// The number of slots requested.
        slots: usize,
    },
    /// The allocation strategy refused to construct an element.
    ConstructionFailed {
        /// A short description supplied by the strategy.
        reason: &'static str,
    },
}

impl std::fmt::Display for DequeError {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfRange { index, len } => write!(
                formatter,
                "index out of range: the len is {len} but the index is {index}"
            ),
            Self::AllocationFailed { target, slots } => {
                write!(formatter, "failed to allocate {target} of {slots} slots")
            }
            Self::ConstructionFailed { reason } => {
                write!(formatter, "element construction failed: {reason}")
            }
        }
    }
}

impl std::error::Error for DequeError {}

/// A value the allocation strategy declined to construct, handed back intact.
///
/// Returning the value lets the container put it back where it came from
/// when a shift has to be undone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejected<T> {
    /// The value that was not constructed.
    pub value: T,
    /// Why construction failed.
    pub error: DequeError,
}

impl<T> Rejected<T> {
    /// Creates a rejection carrying `value` back to the caller.
    pub const fn new(value: T, error: DequeError) -> Self {
        Self { value, error }
    }

    /// Discards the value and keeps the error.
    pub fn into_error(self) -> DequeError {
        self.error
    }
}

/// Represents an invalid [`GrowthPolicy`](crate::GrowthPolicy).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// The directory would not grow on reallocation.
    GrowthFactorTooSmall {
        /// The rejected factor.
        factor: usize,
    },
    /// An empty container must reserve at least one node.
    NoInitialNodes,
}

impl std::fmt::Display for PolicyError {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GrowthFactorTooSmall { factor } => {
                write!(formatter, "growth factor must be at least 2, got {factor}")
            }
            Self::NoInitialNodes => formatter.write_str("initial node count must be at least 1"),
        }
    }
}

impl std::error::Error for PolicyError {}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_out_of_range_display() {
        let error = DequeError::OutOfRange { index: 7, len: 3 };
        assert_eq!(
            format!("{error}"),
            "index out of range: the len is 3 but the index is 7"
        );
    }

    #[rstest]
    #[case(AllocationTarget::Chunk, "failed to allocate chunk of 32 slots")]
    #[case(AllocationTarget::Directory, "failed to allocate directory of 32 slots")]
    fn test_allocation_failed_display(#[case] target: AllocationTarget, #[case] expected: &str) {
        let error = DequeError::AllocationFailed { target, slots: 32 };
        assert_eq!(format!("{error}"), expected);
    }

    #[rstest]
    fn test_rejected_into_error() {
        let rejected = Rejected::new(5, DequeError::ConstructionFailed { reason: "full" });
        assert_eq!(rejected.value, 5);
        assert_eq!(
            rejected.into_error(),
            DequeError::ConstructionFailed { reason: "full" }
        );
    }

    #[rstest]
    fn test_policy_error_display() {
        assert_eq!(
            format!("{}", PolicyError::GrowthFactorTooSmall { factor: 1 }),
            "growth factor must be at least 2, got 1"
        );
    }
}
