//! # blockdeque
//!
//! A chunked double-ended queue: amortized O(1) insertion and removal at both
//! ends, O(1) indexed access and random-access positions, and a pluggable
//! allocation strategy.
//!
//! ## Overview
//!
//! - [`ChunkedDeque`]: the container, storing elements in fixed-size chunks
//!   reached through a re-centring directory
//! - [`Position`], [`Cursor`], [`CursorMut`]: O(1) random-access addressing
//! - [`ChunkAllocator`]: the allocation strategy seam, with [`Global`] and
//!   the tracking [`Counting`] strategy
//! - [`GrowthPolicy`]: per-instance directory tuning
//!
//! Every mutating operation either succeeds or leaves the container as it
//! was; see [`DequeError`].
//!
//! ## Feature Flags
//!
//! - `tracing`: emit directory growth and allocation failure events
//! - `full`: Enable all features
//!
//! ## Example
//!
//! ```rust
//! use blockdeque::prelude::*;
//!
//! let mut deque: ChunkedDeque<u32> = ChunkedDeque::new();
//! for value in 1..=1000 {
//!     deque.push_back(value).unwrap();
//! }
//! for _ in 0..500 {
//!     deque.pop_front();
//! }
//! assert_eq!(deque.len(), 500);
//! assert_eq!(deque.at(0), Ok(&501));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

macro_rules! log_debug {
    ($($argument:tt)*) => {{
        #[cfg(feature = "tracing")]
        {
            tracing::debug!($($argument)*);
        }
    }};
}

macro_rules! log_warn {
    ($($argument:tt)*) => {{
        #[cfg(feature = "tracing")]
        {
            tracing::warn!($($argument)*);
        }
    }};
}

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```rust
/// use blockdeque::prelude::*;
/// ```
pub mod prelude {
    pub use crate::alloc::{ChunkAllocator, Counting, Global};
    pub use crate::config::GrowthPolicy;
    pub use crate::deque::{ChunkedDeque, Cursor, CursorMut, Position};
    pub use crate::error::DequeError;
}

pub mod alloc;
pub mod config;
pub mod deque;
pub mod error;

pub use crate::alloc::{AllocationStats, ChunkAllocator, Counting, Global};
pub use crate::config::GrowthPolicy;
pub use crate::deque::{
    Chunk, ChunkedDeque, Cursor, CursorMut, DEFAULT_NODE_SIZE, IntoIter, Iter, IterMut, Position,
};
pub use crate::error::{AllocationTarget, DequeError, PolicyError, Rejected};
