//! Nominal hierarchy walks.
//!
//! Responsibilities:
//! - Walk the base-type chain of a type (starting at the type itself)
//! - Search a type's hierarchy for an instantiation of a generic definition,
//!   reporting ambiguity when interfaces yield more than one distinct match
//!
//! Catalogs are not trusted to be acyclic: chain walks stop at the first
//! repeated type.

use crate::catalog::TypeCatalog;
use crate::types::{TypeId, TypeList};
use genbind_common::limits::{BASE_CHAIN_INLINE, MAX_BASE_CHAIN_LENGTH};
use smallvec::SmallVec;
use tracing::trace;

/// A base-type chain, most derived first.
pub type BaseChain = SmallVec<[TypeId; BASE_CHAIN_INLINE]>;

/// Outcome of searching a hierarchy for an instantiation of a definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Implementation {
    /// Exactly one matching instantiation.
    Found(TypeId),
    /// More than one distinct instantiation, e.g. a type implementing
    /// `IComparable<A>` and `IComparable<B>`.
    Ambiguous(TypeList),
    NotFound,
}

/// `ty` followed by its base types up to the root.
pub fn base_chain<C: TypeCatalog + ?Sized>(catalog: &C, ty: TypeId) -> BaseChain {
    let mut chain = BaseChain::new();
    let mut current = Some(ty);
    while let Some(t) = current {
        if chain.contains(&t) || chain.len() >= MAX_BASE_CHAIN_LENGTH {
            trace!(ty = catalog.type_name(ty), "base chain truncated");
            break;
        }
        chain.push(t);
        current = catalog.base_type(t);
    }
    chain
}

/// Every supertype of `ty` that may carry an instantiation: the base chain
/// first, then the interface set.
pub fn supertypes<C: TypeCatalog + ?Sized>(
    catalog: &C,
    ty: TypeId,
) -> impl Iterator<Item = TypeId> + '_ {
    base_chain(catalog, ty)
        .into_iter()
        .chain(catalog.interfaces(ty).iter().copied())
}

/// Search `ty`'s hierarchy for an instantiation of `definition`.
///
/// The base chain is unambiguous by construction, so its first match wins.
/// Interfaces are only searched when the chain has no match.
pub fn find_implementation<C: TypeCatalog + ?Sized>(
    catalog: &C,
    ty: TypeId,
    definition: TypeId,
) -> Implementation {
    if let Some(found) = base_chain(catalog, ty)
        .into_iter()
        .find(|&t| catalog.definition_or_self(t) == definition)
    {
        return Implementation::Found(found);
    }

    if definition == catalog.root_type() {
        return Implementation::Found(definition);
    }

    let mut matches = TypeList::new();
    for &iface in catalog.interfaces(ty) {
        if catalog.definition_or_self(iface) == definition && !matches.contains(&iface) {
            matches.push(iface);
        }
    }

    match matches.len() {
        0 => Implementation::NotFound,
        1 => Implementation::Found(matches[0]),
        _ => {
            trace!(
                ty = catalog.type_name(ty),
                definition = catalog.type_name(definition),
                count = matches.len(),
                "ambiguous implementation"
            );
            Implementation::Ambiguous(matches)
        }
    }
}

#[cfg(test)]
#[path = "../tests/class_hierarchy_tests.rs"]
mod tests;
