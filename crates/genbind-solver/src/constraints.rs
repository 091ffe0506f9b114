//! Constraint Checker.
//!
//! Validates a tuple of type arguments against the constraints of a generic
//! declaration. Constraint targets may mention the declaration's own type
//! parameters (including self-referential and mutually recursive graphs)
//! and, for a callable, the parameters of its enclosing generic type; both
//! are bound through a [`Substitution`] while relating, so the catalog is
//! never extended.
//!
//! | Constraint | Satisfied by |
//! |------------|--------------|
//! | `ValueTypeOnly` | value types other than optional-wrapper instantiations |
//! | `ReferenceTypeOnly` | reference types |
//! | `DefaultConstructible` | non-abstract value types, and non-abstract types declaring a parameterless constructor |
//! | `BaseTypeOrInterface(target)` | types assignable to the substituted target |
//!
//! The check stops at the first violated parameter.

use crate::catalog::TypeCatalog;
use crate::relations::{AssignabilityChecker, Substitution};
use crate::types::{CallableSignature, Constraint, TypeFlags, TypeId};
use tracing::debug;

/// A generic declaration whose constraints are checked.
#[derive(Clone, Copy, Debug)]
pub enum Declaration<'a> {
    /// A generic type definition (an instantiation stands for its definition).
    Type(TypeId),
    Callable(&'a CallableSignature),
}

/// Whether `type_args` satisfy every constraint of `declaration`.
///
/// Arguments are matched to the declaration's type parameters by position;
/// an arity mismatch fails.
pub fn satisfies_constraints(
    catalog: &dyn TypeCatalog,
    declaration: Declaration<'_>,
    type_args: &[TypeId],
) -> bool {
    let (params, substitution): (&[TypeId], Substitution<'_>) = match declaration {
        Declaration::Type(ty) => {
            let Some(definition) = catalog.generic_definition(ty) else {
                return type_args.is_empty();
            };
            (
                catalog.generic_arguments(definition),
                Substitution {
                    type_owner: Some(definition),
                    type_args,
                    ..Substitution::default()
                },
            )
        }
        Declaration::Callable(signature) => {
            let (type_owner, enclosing_args) = match signature.declaring_type {
                Some(declaring) => (
                    catalog.generic_definition(declaring),
                    catalog.generic_arguments(declaring),
                ),
                None => (None, &[][..]),
            };
            (
                signature.type_params.as_slice(),
                Substitution {
                    type_owner,
                    type_args: enclosing_args,
                    callable: Some(signature.id),
                    callable_args: type_args,
                },
            )
        }
    };

    if params.len() != type_args.len() {
        debug!(
            expected = params.len(),
            actual = type_args.len(),
            "constraint check arity mismatch"
        );
        return false;
    }

    let mut relation = AssignabilityChecker::with_substitution(catalog, substitution);
    for (position, (&param, &arg)) in params.iter().zip(type_args).enumerate() {
        let Some(info) = catalog.type_param(param) else {
            continue;
        };
        for constraint in &info.constraints {
            let satisfied = match *constraint {
                Constraint::ValueTypeOnly => {
                    catalog.is_value_type(arg) && !catalog.is_optional_wrapper(arg)
                }
                Constraint::ReferenceTypeOnly => catalog.is_reference_type(arg),
                Constraint::DefaultConstructible => is_default_constructible(catalog, arg),
                Constraint::BaseTypeOrInterface(target) => relation.is_assignable(arg, target),
            };
            if !satisfied {
                debug!(
                    position,
                    argument = catalog.type_name(arg),
                    ?constraint,
                    "constraint violated"
                );
                return false;
            }
        }
    }
    true
}

/// Abstract types (interfaces included) are never constructible; value types
/// always have a parameterless constructor.
fn is_default_constructible(catalog: &dyn TypeCatalog, ty: TypeId) -> bool {
    let flags = catalog.flags(ty);
    !flags.contains(TypeFlags::ABSTRACT)
        && flags.intersects(TypeFlags::VALUE_TYPE | TypeFlags::DEFAULT_CONSTRUCTOR)
}

#[cfg(test)]
#[path = "../tests/constraints_tests.rs"]
mod tests;
