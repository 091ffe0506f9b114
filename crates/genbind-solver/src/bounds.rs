//! Bound sets and the Bound Fixer.
//!
//! Every type parameter of the callable under inference owns one
//! [`BoundSet`] with three witness collections:
//!
//! - **Lower**: the parameter must be assignable *from* each witness
//! - **Upper**: the parameter must be assignable *to* each witness
//! - **Exact**: the parameter must equal each witness
//!
//! Fixing reduces a bound set to a single concrete type:
//!
//! 1. Exact non-empty: its only witness, provided every Lower witness is
//!    assignable to it and it is assignable to every Upper witness.
//! 2. Otherwise the first Upper witness assignable to every Upper witness;
//!    it must accept every Lower witness.
//! 3. Otherwise the first Lower witness every Lower witness is assignable to;
//!    it must be assignable to every Upper witness.
//!
//! "First" is insertion order. Anything else fails, including an empty set.

use crate::catalog::TypeCatalog;
use crate::types::{InferenceVariance, TypeId};
use std::fmt;
use tracing::trace;

// =============================================================================
// Witnesses
// =============================================================================

/// A small ordered collection of witness types.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Witnesses {
    #[default]
    Empty,
    Single(TypeId),
    /// Two or more witnesses in insertion order. Duplicates are kept.
    Many(Vec<TypeId>),
}

impl Witnesses {
    /// Append a witness. Re-adding the only witness is a no-op.
    pub fn add(&mut self, ty: TypeId) {
        match self {
            Witnesses::Empty => *self = Witnesses::Single(ty),
            Witnesses::Single(existing) if *existing == ty => {}
            Witnesses::Single(existing) => *self = Witnesses::Many(vec![*existing, ty]),
            Witnesses::Many(list) => list.push(ty),
        }
    }

    pub fn as_slice(&self) -> &[TypeId] {
        match self {
            Witnesses::Empty => &[],
            Witnesses::Single(ty) => std::slice::from_ref(ty),
            Witnesses::Many(list) => list,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.as_slice().iter().copied()
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Witnesses::Empty)
    }

    /// Every witness is assignable from `ty` (`ty` is a common subtype).
    pub fn all_assignable_from(&self, catalog: &dyn TypeCatalog, ty: TypeId) -> bool {
        self.iter().all(|witness| catalog.is_assignable(ty, witness))
    }

    /// Every witness is assignable to `ty` (`ty` is a common supertype).
    pub fn all_assignable_to(&self, catalog: &dyn TypeCatalog, ty: TypeId) -> bool {
        self.iter().all(|witness| catalog.is_assignable(witness, ty))
    }
}

// =============================================================================
// BoundSet
// =============================================================================

/// Bounds accumulated for one type parameter during one inference call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BoundSet {
    pub lower: Witnesses,
    pub upper: Witnesses,
    pub exact: Witnesses,
}

impl BoundSet {
    /// Record a witness under the bound selected by `variance`.
    pub fn add(&mut self, ty: TypeId, variance: InferenceVariance) {
        match variance {
            InferenceVariance::Contravariant => self.upper.add(ty),
            InferenceVariance::Covariant => self.lower.add(ty),
            InferenceVariance::Invariant => self.exact.add(ty),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lower.is_empty() && self.upper.is_empty() && self.exact.is_empty()
    }

    /// Reduce the bounds to a single type.
    pub fn fix(&self, catalog: &dyn TypeCatalog) -> Option<TypeId> {
        match self.exact {
            Witnesses::Empty => {}
            Witnesses::Single(exact) => {
                let ok = self.upper.all_assignable_from(catalog, exact)
                    && self.lower.all_assignable_to(catalog, exact);
                return ok.then_some(exact);
            }
            Witnesses::Many(_) => {
                trace!(exact = self.exact.len(), "conflicting exact bounds");
                return None;
            }
        }

        if let Some(upper) = self
            .upper
            .iter()
            .find(|&candidate| self.upper.all_assignable_from(catalog, candidate))
        {
            return self.lower.all_assignable_to(catalog, upper).then_some(upper);
        }

        self.lower
            .iter()
            .find(|&candidate| self.lower.all_assignable_to(catalog, candidate))
            .filter(|&lower| self.upper.all_assignable_from(catalog, lower))
    }

    /// Render with type names, e.g. `lower={string} upper={} exact={}`.
    pub fn display<'a>(&'a self, catalog: &'a dyn TypeCatalog) -> BoundSetDisplay<'a> {
        BoundSetDisplay {
            bounds: self,
            catalog,
        }
    }
}

/// [`BoundSet`] paired with a catalog for display.
pub struct BoundSetDisplay<'a> {
    bounds: &'a BoundSet,
    catalog: &'a dyn TypeCatalog,
}

impl fmt::Display for BoundSetDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sets = [
            ("lower", &self.bounds.lower),
            ("upper", &self.bounds.upper),
            ("exact", &self.bounds.exact),
        ];
        for (index, (label, witnesses)) in sets.into_iter().enumerate() {
            if index > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{label}={{")?;
            for (position, ty) in witnesses.iter().enumerate() {
                if position > 0 {
                    f.write_str(", ")?;
                }
                f.write_str(self.catalog.type_name(ty))?;
            }
            f.write_str("}")?;
        }
        Ok(())
    }
}

// =============================================================================
// InferredBounds
// =============================================================================

/// Bound sets of every type parameter of one callable, by position, plus the
/// types fixed so far.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InferredBounds {
    pub type_params: Vec<TypeId>,
    pub bounds: Vec<BoundSet>,
    pub fixed: Vec<Option<TypeId>>,
}

impl InferredBounds {
    pub fn new(type_params: &[TypeId]) -> Self {
        Self {
            type_params: type_params.to_vec(),
            bounds: vec![BoundSet::default(); type_params.len()],
            fixed: vec![None; type_params.len()],
        }
    }

    pub fn len(&self) -> usize {
        self.type_params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.type_params.is_empty()
    }

    /// Number of type parameters not fixed yet.
    pub fn unresolved(&self) -> usize {
        self.fixed.iter().filter(|f| f.is_none()).count()
    }

    /// Fixed types in declaration order, if every parameter is fixed.
    pub fn fixed_types(&self) -> Option<Vec<TypeId>> {
        self.fixed.iter().copied().collect()
    }
}

#[cfg(test)]
#[path = "../tests/bounds_tests.rs"]
mod tests;
