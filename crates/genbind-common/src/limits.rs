//! Centralized limits and thresholds for the inference engine.
//!
//! Shared constants for nesting depths and capacity hints used by the
//! catalog and the solver. Recursion limits for the solver's own recursive
//! algorithms (bound collection, assignability, constraint checking) live in
//! [`genbind_solver::recursion::RecursionProfile`] instead.

// =============================================================================
// Catalog Limits
// =============================================================================

/// Maximum nesting depth of a generic instantiation whose supertypes are
/// still expanded.
///
/// Computing the base type and interfaces of `List<string>` substitutes
/// `string` into the declared supertypes of `List<T>`, which may intern new
/// instantiations whose supertypes must be computed in turn. A declaration
/// such as
///
/// ```text
/// class Tower<T> : IStack<Tower<Tower<T>>>
/// ```
///
/// would keep producing deeper instantiations forever. Instantiations nested
/// deeper than this limit are kept as opaque leaves with no supertypes.
pub const MAX_INSTANTIATION_DEPTH: u32 = 50;

/// Maximum length of a base-type chain walked from any type.
///
/// Catalogs loaded from user input may contain inheritance cycles; walks
/// stop at the first repeated type or after this many steps.
pub const MAX_BASE_CHAIN_LENGTH: usize = 256;

// =============================================================================
// Capacity Hints
// =============================================================================

/// Inline capacity for small type lists (generic arguments, hierarchy
/// matches). Most generic declarations have one or two parameters.
pub const TYPE_LIST_INLINE: usize = 4;

/// Inline capacity for base-type chains.
pub const BASE_CHAIN_INLINE: usize = 8;
