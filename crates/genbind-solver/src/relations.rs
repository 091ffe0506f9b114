//! Assignability over the nominal type system.
//!
//! `source` is assignable to `target` when one of these holds:
//!
//! - identity
//! - `target` is the universal root
//! - `target` is the optional wrapper `W<X>` and `source` is `X`
//! - both are arrays of equal rank with compatible elements, or `source` is a
//!   rank-1 array and `target` a sequence interface over a compatible element
//! - `source`'s hierarchy (base chain from `source` itself, then interfaces)
//!   contains an instantiation of `target`'s definition whose arguments are
//!   compatible under the definition's declared variance
//!
//! Element and variant-argument compatibility is identity, or assignability
//! between two reference types. Value types never convert covariantly.
//!
//! The same checker relates type *templates* when given a [`Substitution`]:
//! type parameters are replaced by their bound arguments as they are reached,
//! so constraint targets such as `IComparable<T>` can be checked without
//! interning `IComparable<int>` into the catalog.

use crate::catalog::TypeCatalog;
use crate::class_hierarchy::supertypes;
use crate::recursion::{RecursionGuard, RecursionProfile, RecursionResult};
use crate::types::{CallableId, ParamOwner, TypeId, TypeParamInfo, Variance};
use tracing::trace;

/// Bindings for the type parameters of up to two declarations: a generic
/// type and a generic callable declared inside it.
#[derive(Clone, Copy, Debug, Default)]
pub struct Substitution<'a> {
    /// Generic definition whose parameters `type_args` bind.
    pub type_owner: Option<TypeId>,
    pub type_args: &'a [TypeId],
    pub callable: Option<CallableId>,
    pub callable_args: &'a [TypeId],
}

impl Substitution<'_> {
    /// Argument bound to the parameter described by `info`.
    pub fn lookup(&self, info: &TypeParamInfo) -> Option<TypeId> {
        match info.owner {
            ParamOwner::Type(definition) if Some(definition) == self.type_owner => {
                self.type_args.get(info.position).copied()
            }
            ParamOwner::Callable(callable) if Some(callable) == self.callable => {
                self.callable_args.get(info.position).copied()
            }
            _ => None,
        }
    }
}

/// Relates two types, substituting bound type parameters on the fly.
pub struct AssignabilityChecker<'a, C: TypeCatalog + ?Sized> {
    catalog: &'a C,
    substitution: Substitution<'a>,
    guard: RecursionGuard<(TypeId, TypeId)>,
}

impl<'a, C: TypeCatalog + ?Sized> AssignabilityChecker<'a, C> {
    pub fn new(catalog: &'a C) -> Self {
        Self::with_substitution(catalog, Substitution::default())
    }

    pub fn with_substitution(catalog: &'a C, substitution: Substitution<'a>) -> Self {
        Self {
            catalog,
            substitution,
            guard: RecursionGuard::with_profile(RecursionProfile::Assignability),
        }
    }

    /// Replace a bound type parameter by its argument.
    fn resolve(&self, ty: TypeId) -> TypeId {
        self.catalog
            .type_param(ty)
            .and_then(|info| self.substitution.lookup(info))
            .unwrap_or(ty)
    }

    pub fn is_assignable(&mut self, source: TypeId, target: TypeId) -> bool {
        let source = self.resolve(source);
        let target = self.resolve(target);
        if source == target {
            return true;
        }

        match self.guard.enter((source, target)) {
            RecursionResult::Entered => {
                let result = self.check(source, target);
                self.guard.leave((source, target));
                result
            }
            denied => {
                trace!(
                    source = self.catalog.type_name(source),
                    target = self.catalog.type_name(target),
                    ?denied,
                    "assignability check denied"
                );
                false
            }
        }
    }

    fn check(&mut self, source: TypeId, target: TypeId) -> bool {
        let catalog = self.catalog;
        if target == catalog.root_type() {
            return true;
        }

        if catalog.is_optional_wrapper(target) {
            if let [inner] = catalog.generic_arguments(target) {
                if self.equal(source, *inner) {
                    return true;
                }
            }
        }

        if let Some((source_element, source_rank)) = catalog.array_shape(source) {
            if let Some((target_element, target_rank)) = catalog.array_shape(target) {
                return source_rank == target_rank
                    && self.element_assignable(source_element, target_element);
            }
            if source_rank == 1 && self.is_sequence_instance(target) {
                if let [target_element] = catalog.generic_arguments(target) {
                    if self.element_assignable(source_element, *target_element) {
                        return true;
                    }
                }
            }
        } else if catalog.array_shape(target).is_some() {
            return false;
        }

        let definition = catalog.definition_or_self(target);
        for candidate in supertypes(catalog, source) {
            if catalog.definition_or_self(candidate) == definition
                && self.arguments_assignable(candidate, target, definition)
            {
                return true;
            }
        }
        false
    }

    fn is_sequence_instance(&self, ty: TypeId) -> bool {
        self.catalog
            .generic_definition(ty)
            .is_some_and(|definition| definition != ty && self.catalog.is_sequence_interface(definition))
    }

    /// Identity, or assignability between two reference types.
    fn element_assignable(&mut self, source: TypeId, target: TypeId) -> bool {
        if self.equal(source, target) {
            return true;
        }
        let source = self.resolve(source);
        let target = self.resolve(target);
        self.catalog.is_reference_type(source)
            && self.catalog.is_reference_type(target)
            && self.is_assignable(source, target)
    }

    fn arguments_assignable(&mut self, candidate: TypeId, target: TypeId, definition: TypeId) -> bool {
        let catalog = self.catalog;
        let source_args = catalog.generic_arguments(candidate);
        let target_args = catalog.generic_arguments(target);
        if source_args.len() != target_args.len() {
            return false;
        }
        source_args
            .iter()
            .zip(target_args)
            .enumerate()
            .all(|(position, (&s, &t))| match catalog.declared_variance(definition, position) {
                Variance::Invariant => self.equal(s, t),
                Variance::Covariant => self.element_assignable(s, t),
                Variance::Contravariant => self.element_assignable(t, s),
            })
    }

    /// Structural identity after substitution.
    pub fn equal(&mut self, a: TypeId, b: TypeId) -> bool {
        let a = self.resolve(a);
        let b = self.resolve(b);
        if a == b {
            return true;
        }
        let catalog = self.catalog;
        if !catalog.contains_type_parameters(a) && !catalog.contains_type_parameters(b) {
            return false;
        }
        if let (Some((ae, ar)), Some((be, br))) = (catalog.array_shape(a), catalog.array_shape(b)) {
            return ar == br && self.equal(ae, be);
        }
        match (catalog.generic_definition(a), catalog.generic_definition(b)) {
            (Some(ad), Some(bd)) if ad == bd => {
                let a_args = catalog.generic_arguments(a);
                let b_args = catalog.generic_arguments(b);
                a_args.len() == b_args.len()
                    && a_args.iter().zip(b_args).all(|(&x, &y)| self.equal(x, y))
            }
            _ => false,
        }
    }
}

/// Whether a value of `source` may be stored in a location of `target`.
pub fn is_assignable<C: TypeCatalog + ?Sized>(catalog: &C, source: TypeId, target: TypeId) -> bool {
    AssignabilityChecker::new(catalog).is_assignable(source, target)
}

#[cfg(test)]
#[path = "../tests/relations_tests.rs"]
mod tests;
