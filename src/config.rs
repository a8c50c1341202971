//! Per-instance tuning for directory growth.

use crate::error::PolicyError;

/// Growth factor used when none is configured.
pub const DEFAULT_GROWTH_FACTOR: usize = 3;

/// Node count reserved when an empty deque receives its first element.
pub const DEFAULT_INITIAL_NODES: usize = 1;

/// Controls how the chunk directory is sized and reallocated.
///
/// A policy is a plain value carried by each deque, so differently tuned
/// containers can coexist.
///
/// # Examples
///
/// ```rust
/// use blockdeque::{ChunkedDeque, GrowthPolicy};
///
/// let policy = GrowthPolicy::default().with_growth_factor(4);
/// assert!(policy.validate().is_ok());
///
/// let mut deque: ChunkedDeque<u8> = ChunkedDeque::with_policy(policy).unwrap();
/// deque.push_back(1).unwrap();
/// assert_eq!(deque.policy().growth_factor(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GrowthPolicy {
    growth_factor: usize,
    initial_nodes: usize,
}

impl GrowthPolicy {
    /// Creates the default policy.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            growth_factor: DEFAULT_GROWTH_FACTOR,
            initial_nodes: DEFAULT_INITIAL_NODES,
        }
    }

    /// Sets the factor applied to the used node span on reallocation.
    #[must_use]
    pub const fn with_growth_factor(mut self, growth_factor: usize) -> Self {
        self.growth_factor = growth_factor;
        self
    }

    /// Sets the node count reserved for an empty container's first element.
    #[must_use]
    pub const fn with_initial_nodes(mut self, initial_nodes: usize) -> Self {
        self.initial_nodes = initial_nodes;
        self
    }

    /// Returns the growth factor.
    #[must_use]
    pub const fn growth_factor(&self) -> usize {
        self.growth_factor
    }

    /// Returns the initial node count.
    #[must_use]
    pub const fn initial_nodes(&self) -> usize {
        self.initial_nodes
    }

    /// Checks that the policy actually grows the directory.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`] when the growth factor is below 2 or no
    /// initial nodes are reserved.
    pub const fn validate(&self) -> Result<(), PolicyError> {
        if self.growth_factor < 2 {
            return Err(PolicyError::GrowthFactorTooSmall {
                factor: self.growth_factor,
            });
        }
        if self.initial_nodes == 0 {
            return Err(PolicyError::NoInitialNodes);
        }
        Ok(())
    }

    /// Directory length for a fresh container spanning `nodes` nodes.
    ///
    /// The used range sits in the middle third.
    pub(crate) const fn initial_directory_len(&self, nodes: usize) -> usize {
        let nodes = if nodes == 0 { self.initial_nodes } else { nodes };
        nodes.saturating_mul(3)
    }

    /// Directory length after growing a directory currently using `span` nodes.
    pub(crate) const fn grown_directory_len(&self, span: usize) -> usize {
        let scaled = span.saturating_mul(self.growth_factor);
        let minimum = span.saturating_add(2);
        if scaled < minimum { minimum } else { scaled }
    }
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        Self::new()
    }
}
