//! Recursion guards for the engine's recursive type walks.
//!
//! Bound collection, assignability and constraint checking all descend into
//! nested generic arguments; supertype closure in the catalog follows
//! interface graphs that user-supplied catalogs may make cyclic. Each of
//! these walks is bounded by one of two guards:
//!
//! 1. [`RecursionGuard`]: cycle detection over a visiting set plus depth and
//!    iteration limits.
//! 2. [`DepthCounter`]: depth limiting only, for walks that may revisit the
//!    same key legitimately.
//!
//! Limits are named by [`RecursionProfile`] so call sites state which walk
//! they guard instead of repeating magic numbers.
//!
//! In debug builds dropping a guard with unmatched `enter()` calls panics.

use rustc_hash::FxHashSet;
use std::hash::Hash;

// ---------------------------------------------------------------------------
// RecursionProfile
// ---------------------------------------------------------------------------

/// Named recursion limit presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionProfile {
    /// Bound collection descending through nested generic arguments.
    ///
    /// depth = 100, iterations = 100,000
    Collection,

    /// Assignability between (possibly substituted) types.
    ///
    /// depth = 100, iterations = 100,000
    Assignability,

    /// Constraint checking, where targets may reference sibling parameters
    /// and form mutually recursive graphs.
    ///
    /// depth = 100, iterations = 100,000
    ConstraintCheck,

    /// Supertype closure over the interface graph of a catalog.
    ///
    /// depth = 50, iterations = 1,000,000
    SupertypeClosure,

    /// Custom limits for one-off or test scenarios.
    Custom { max_depth: u32, max_iterations: u32 },
}

impl RecursionProfile {
    /// Maximum recursion depth for this profile.
    pub const fn max_depth(self) -> u32 {
        match self {
            Self::Collection => 100,
            Self::Assignability => 100,
            Self::ConstraintCheck => 100,
            Self::SupertypeClosure => genbind_common::limits::MAX_INSTANTIATION_DEPTH,
            Self::Custom { max_depth, .. } => max_depth,
        }
    }

    /// Maximum iteration count for this profile.
    pub const fn max_iterations(self) -> u32 {
        match self {
            Self::Collection => 100_000,
            Self::Assignability => 100_000,
            Self::ConstraintCheck => 100_000,
            Self::SupertypeClosure => 1_000_000,
            Self::Custom { max_iterations, .. } => max_iterations,
        }
    }
}

// ---------------------------------------------------------------------------
// RecursionResult
// ---------------------------------------------------------------------------

/// Result of attempting to enter a recursive computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionResult {
    Entered,
    /// The key is already being visited.
    Cycle,
    DepthExceeded,
    IterationExceeded,
}

impl RecursionResult {
    #[inline]
    pub fn is_entered(self) -> bool {
        matches!(self, Self::Entered)
    }

    #[inline]
    pub fn is_cycle(self) -> bool {
        matches!(self, Self::Cycle)
    }

    #[inline]
    pub fn is_exceeded(self) -> bool {
        matches!(self, Self::DepthExceeded | Self::IterationExceeded)
    }
}

// ---------------------------------------------------------------------------
// RecursionGuard
// ---------------------------------------------------------------------------

/// Cycle detection, depth limiting and iteration bounding for a recursive
/// walk keyed by `K`.
///
/// ```ignore
/// let mut guard = RecursionGuard::with_profile(RecursionProfile::ConstraintCheck);
/// match guard.enter((source, target)) {
///     RecursionResult::Entered => {
///         let result = relate(source, target);
///         guard.leave((source, target));
///         result
///     }
///     RecursionResult::Cycle => true,
///     _ => false,
/// }
/// ```
pub struct RecursionGuard<K: Hash + Eq + Copy> {
    visiting: FxHashSet<K>,
    depth: u32,
    iterations: u32,
    max_depth: u32,
    max_iterations: u32,
    exceeded: bool,
}

impl<K: Hash + Eq + Copy> RecursionGuard<K> {
    pub fn new(max_depth: u32, max_iterations: u32) -> Self {
        Self {
            visiting: FxHashSet::default(),
            depth: 0,
            iterations: 0,
            max_depth,
            max_iterations,
            exceeded: false,
        }
    }

    pub fn with_profile(profile: RecursionProfile) -> Self {
        Self::new(profile.max_depth(), profile.max_iterations())
    }

    /// Try to enter the computation for `key`.
    ///
    /// On [`RecursionResult::Entered`] the caller must call
    /// [`leave`](Self::leave) with the same key when done.
    pub fn enter(&mut self, key: K) -> RecursionResult {
        self.iterations = self.iterations.saturating_add(1);

        if self.iterations > self.max_iterations {
            self.exceeded = true;
            return RecursionResult::IterationExceeded;
        }
        if self.depth >= self.max_depth {
            self.exceeded = true;
            return RecursionResult::DepthExceeded;
        }
        if !self.visiting.insert(key) {
            return RecursionResult::Cycle;
        }
        self.depth += 1;
        RecursionResult::Entered
    }

    /// Leave the computation for `key`. Must follow every successful `enter`.
    pub fn leave(&mut self, key: K) {
        let was_present = self.visiting.remove(&key);
        debug_assert!(
            was_present,
            "RecursionGuard::leave() called with a key that is not being visited"
        );
        self.depth = self.depth.saturating_sub(1);
    }

    #[inline]
    pub fn is_visiting(&self, key: &K) -> bool {
        self.visiting.contains(key)
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    #[inline]
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Sticky: stays `true` once any limit was hit.
    #[inline]
    pub fn is_exceeded(&self) -> bool {
        self.exceeded
    }
}

#[cfg(debug_assertions)]
impl<K: Hash + Eq + Copy> Drop for RecursionGuard<K> {
    fn drop(&mut self) {
        if !std::thread::panicking() && !self.visiting.is_empty() {
            panic!(
                "RecursionGuard dropped with {} keys still being visited",
                self.visiting.len(),
            );
        }
    }
}

// ---------------------------------------------------------------------------
// DepthCounter
// ---------------------------------------------------------------------------

/// Depth-only guard.
///
/// ```ignore
/// if !self.depth.enter() {
///     return false;
/// }
/// let result = self.collect_inner(source, target, variance);
/// self.depth.leave();
/// result
/// ```
pub struct DepthCounter {
    depth: u32,
    max_depth: u32,
    exceeded: bool,
}

impl DepthCounter {
    pub fn new(max_depth: u32) -> Self {
        Self {
            depth: 0,
            max_depth,
            exceeded: false,
        }
    }

    /// Only the profile's depth limit applies.
    pub fn with_profile(profile: RecursionProfile) -> Self {
        Self::new(profile.max_depth())
    }

    /// Returns `false`, without incrementing, once the limit is reached.
    /// Do not call `leave()` in that case.
    #[inline]
    pub fn enter(&mut self) -> bool {
        if self.depth >= self.max_depth {
            self.exceeded = true;
            return false;
        }
        self.depth += 1;
        true
    }

    #[inline]
    pub fn leave(&mut self) {
        debug_assert!(self.depth > 0, "DepthCounter::leave() called at depth 0");
        self.depth = self.depth.saturating_sub(1);
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    #[inline]
    pub fn is_exceeded(&self) -> bool {
        self.exceeded
    }
}

#[cfg(debug_assertions)]
impl Drop for DepthCounter {
    fn drop(&mut self) {
        if !std::thread::panicking() && self.depth > 0 {
            panic!("DepthCounter dropped at depth {}", self.depth);
        }
    }
}

#[cfg(test)]
#[path = "../tests/recursion_tests.rs"]
mod tests;
