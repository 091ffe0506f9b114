//! Bound Collector.
//!
//! Pairwise-compares a concrete `source` type against a `target` template of
//! the callable under inference and records witnesses into the bound sets of
//! the type parameters the template mentions.
//!
//! ## Dispatch
//!
//! | Target / source | Rule |
//! |-----------------|------|
//! | Target is one of the callable's type parameters | record `source` under the current variance |
//! | Either side is an array | element-wise, arrays being covariant single-parameter containers |
//! | Otherwise | find the instantiation of one side's definition in the other's hierarchy, then recurse over its arguments |
//!
//! Recording never fails; conflicts surface when bounds are fixed. A `false`
//! result means the shapes cannot match at all.

use crate::bounds::BoundSet;
use crate::catalog::TypeCatalog;
use crate::class_hierarchy::{Implementation, find_implementation};
use crate::recursion::{DepthCounter, RecursionProfile};
use crate::types::{CallableSignature, InferenceVariance, ParamOwner, TypeId, TypeList};
use tracing::trace;

/// Collects bounds for the type parameters of one callable.
pub struct BoundCollector<'a> {
    catalog: &'a dyn TypeCatalog,
    signature: &'a CallableSignature,
    bounds: &'a mut [BoundSet],
    depth: DepthCounter,
}

impl<'a> BoundCollector<'a> {
    pub fn new(
        catalog: &'a dyn TypeCatalog,
        signature: &'a CallableSignature,
        bounds: &'a mut [BoundSet],
    ) -> Self {
        Self {
            catalog,
            signature,
            bounds,
            depth: DepthCounter::with_profile(RecursionProfile::Collection),
        }
    }

    /// Relate `source` to `target` under `variance`, recording bounds.
    pub fn collect(&mut self, source: TypeId, target: TypeId, variance: InferenceVariance) -> bool {
        if !self.depth.enter() {
            trace!("collection depth exceeded");
            return false;
        }
        let result = self.collect_inner(source, target, variance);
        self.depth.leave();
        result
    }

    fn collect_inner(&mut self, source: TypeId, target: TypeId, variance: InferenceVariance) -> bool {
        if let Some(info) = self.catalog.type_param(target) {
            if info.owner == ParamOwner::Callable(self.signature.id) {
                return self.record(info.position, source, variance);
            }
            // A parameter of the enclosing type stands for its bound argument.
            let resolved = enclosing_argument(self.catalog, self.signature, target);
            return self.relate_concrete(source, resolved, variance);
        }

        if !self.catalog.contains_type_parameters(target) {
            return self.relate_concrete(source, target, variance);
        }

        if self.catalog.array_shape(source).is_some() || self.catalog.array_shape(target).is_some() {
            return self.collect_arrays(source, target, variance);
        }

        self.collect_implementation(source, target, variance)
    }

    fn record(&mut self, position: usize, source: TypeId, variance: InferenceVariance) -> bool {
        let Some(bounds) = self.bounds.get_mut(position) else {
            return false;
        };
        trace!(
            position,
            witness = self.catalog.type_name(source),
            %variance,
            "record bound"
        );
        bounds.add(source, variance);
        true
    }

    /// Relate two types that mention none of the callable's parameters.
    fn relate_concrete(&self, source: TypeId, target: TypeId, variance: InferenceVariance) -> bool {
        match variance {
            InferenceVariance::Covariant => self.catalog.is_assignable(source, target),
            InferenceVariance::Contravariant => self.catalog.is_assignable(target, source),
            InferenceVariance::Invariant => source == target,
        }
    }

    // -------------------------------------------------------------------------
    // Arrays
    // -------------------------------------------------------------------------

    /// Element type of `ty` viewed as a single-parameter covariant container
    /// of the given rank: an array of that rank, or a sequence interface
    /// instantiation when the rank is 1.
    fn container_element(&self, ty: TypeId, rank: u32) -> Option<TypeId> {
        if let Some((element, array_rank)) = self.catalog.array_shape(ty) {
            return (array_rank == rank).then_some(element);
        }
        if rank != 1 {
            return None;
        }
        let definition = self.catalog.generic_definition(ty)?;
        if definition == ty || !self.catalog.is_sequence_interface(definition) {
            return None;
        }
        match self.catalog.generic_arguments(ty) {
            [element] => Some(*element),
            _ => None,
        }
    }

    fn collect_arrays(&mut self, source: TypeId, target: TypeId, variance: InferenceVariance) -> bool {
        let catalog = self.catalog;

        if variance == InferenceVariance::Invariant {
            return match (catalog.array_shape(source), catalog.array_shape(target)) {
                (Some((source_element, source_rank)), Some((target_element, target_rank)))
                    if source_rank == target_rank =>
                {
                    self.collect(source_element, target_element, InferenceVariance::Invariant)
                }
                _ => false,
            };
        }

        // The side that must be the array: the more derived one.
        let array_side = if variance == InferenceVariance::Contravariant {
            target
        } else {
            source
        };
        let Some((_, rank)) = catalog.array_shape(array_side) else {
            trace!(
                source = catalog.type_name(source),
                target = catalog.type_name(target),
                "array shape mismatch"
            );
            return false;
        };

        let (Some(source_element), Some(target_element)) = (
            self.container_element(source, rank),
            self.container_element(target, rank),
        ) else {
            return false;
        };

        // Arrays of value types never convert covariantly.
        let element_variance = if catalog.is_value_type(source_element) {
            InferenceVariance::Invariant
        } else {
            variance
        };
        self.collect(source_element, target_element, element_variance)
    }

    // -------------------------------------------------------------------------
    // Implementation search
    // -------------------------------------------------------------------------

    fn collect_implementation(
        &mut self,
        source: TypeId,
        target: TypeId,
        variance: InferenceVariance,
    ) -> bool {
        let catalog = self.catalog;
        let source_definition = catalog.definition_or_self(source);
        let target_definition = catalog.definition_or_self(target);

        // `matched` is the instantiation found on the searched side; the pair
        // is (concrete arguments, template arguments).
        let (definition, source_args, target_args): (TypeId, TypeList, TypeList) = match variance {
            InferenceVariance::Invariant => {
                if source_definition != target_definition {
                    return false;
                }
                (
                    target_definition,
                    TypeList::from_slice(catalog.generic_arguments(source)),
                    TypeList::from_slice(catalog.generic_arguments(target)),
                )
            }
            InferenceVariance::Covariant => match find_implementation(catalog, source, target_definition) {
                Implementation::Found(matched) => (
                    target_definition,
                    TypeList::from_slice(catalog.generic_arguments(matched)),
                    TypeList::from_slice(catalog.generic_arguments(target)),
                ),
                Implementation::Ambiguous(_) => return true,
                Implementation::NotFound => return false,
            },
            InferenceVariance::Contravariant => {
                match find_implementation(catalog, target, source_definition) {
                    Implementation::Found(matched) => (
                        source_definition,
                        TypeList::from_slice(catalog.generic_arguments(source)),
                        TypeList::from_slice(catalog.generic_arguments(matched)),
                    ),
                    Implementation::Ambiguous(_) => return true,
                    Implementation::NotFound => return false,
                }
            }
        };

        self.check_implementation(definition, &source_args, &target_args, variance)
    }

    /// Relate the arguments of a matched instantiation pairwise.
    fn check_implementation(
        &mut self,
        definition: TypeId,
        source_args: &[TypeId],
        target_args: &[TypeId],
        variance: InferenceVariance,
    ) -> bool {
        if source_args.len() != target_args.len() {
            return false;
        }
        for (position, (&source_arg, &target_arg)) in source_args.iter().zip(target_args).enumerate() {
            let declared = self.catalog.declared_variance(definition, position);
            let argument_variance =
                variance.combine(declared, self.catalog.is_value_type(source_arg));
            let ok = if self.catalog.contains_type_parameters(target_arg) {
                self.collect(source_arg, target_arg, argument_variance)
            } else {
                self.relate_concrete(source_arg, target_arg, argument_variance)
            };
            if !ok {
                trace!(
                    definition = self.catalog.type_name(definition),
                    position,
                    "argument mismatch"
                );
                return false;
            }
        }
        true
    }
}

/// Argument of the callable's enclosing instantiation bound to `ty` when
/// `ty` is a parameter of the enclosing type, otherwise `ty` itself.
pub(crate) fn enclosing_argument(
    catalog: &dyn TypeCatalog,
    signature: &CallableSignature,
    ty: TypeId,
) -> TypeId {
    let (Some(info), Some(declaring)) = (catalog.type_param(ty), signature.declaring_type) else {
        return ty;
    };
    match info.owner {
        ParamOwner::Type(definition) if catalog.generic_definition(declaring) == Some(definition) => {
            catalog
                .generic_arguments(declaring)
                .get(info.position)
                .copied()
                .unwrap_or(ty)
        }
        _ => ty,
    }
}

#[cfg(test)]
#[path = "../tests/collect_tests.rs"]
mod tests;
