//! Inference Driver.
//!
//! Infers the type arguments of a generic callable from the concrete types
//! supplied at a call site:
//!
//! 1. **Pre-check**: every parameter that is concrete once the enclosing
//!    type's parameters are bound must accept its argument (ordinary
//!    assignability or a value special cast). Such parameters are not
//!    collected. An extra trailing
//!    argument stands for the expected result type and must accept the
//!    return type when that is concrete.
//! 2. **Collection**: each parameter template is matched against its argument
//!    (Covariant; Invariant for by-reference/out parameters and for
//!    optional-wrapper parameters receiving an unwrapped argument), and the
//!    extra argument against the return type (Contravariant).
//! 3. **Fixing**: every type parameter is (re-)fixed from its bounds, either
//!    stopping at the first failure or, when the constraint bootstrap is
//!    enabled, attempting all of them.
//! 4. **Bootstrap** (optional): constraints of fixed parameters feed further
//!    bounds until no new parameter is fixed.
//! 5. **Constraint check** unless suppressed.
//!
//! Failures are typed internally ([`InferenceFailure`]) and collapse to
//! `None` at the public entry points.

use crate::bounds::InferredBounds;
use crate::catalog::TypeCatalog;
use crate::collect::{BoundCollector, enclosing_argument};
use crate::constraints::{Declaration, satisfies_constraints};
use crate::special_cast::{can_value_special_cast, is_special_cast_source};
use crate::types::{CallableSignature, InferenceVariance, TypeId};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, trace};

// =============================================================================
// Options and failures
// =============================================================================

/// Inference policy switches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceOptions {
    /// Accept inferred types without checking the callable's constraints.
    pub skip_constraint_check: bool,
    /// Use the callable's own constraints to fix parameters the arguments
    /// leave unbound.
    pub bootstrap_from_constraints: bool,
}

/// Why inference failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InferenceFailure {
    /// A fully concrete parameter does not accept its argument.
    IncompatibleArgument { index: usize },
    /// The expected result type does not accept the concrete return type.
    IncompatibleReturn,
    /// A parameter template cannot match its argument's shape.
    UnmatchedParameter { index: usize },
    /// The return template cannot match the expected result type.
    UnmatchedReturn,
    /// The bounds of a type parameter admit no single type.
    Unfixable { position: usize },
    /// Type parameters left without a type.
    Unresolved { remaining: usize },
    /// A fixed type does not satisfy a constraint target during bootstrap.
    BootstrapMismatch { position: usize },
    /// The inferred types violate the callable's constraints.
    ConstraintViolation,
}

impl fmt::Display for InferenceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InferenceFailure::IncompatibleArgument { index } => {
                write!(f, "argument {index} is not assignable to its parameter")
            }
            InferenceFailure::IncompatibleReturn => {
                write!(f, "return type is not assignable to the expected result type")
            }
            InferenceFailure::UnmatchedParameter { index } => {
                write!(f, "argument {index} does not match its parameter template")
            }
            InferenceFailure::UnmatchedReturn => {
                write!(f, "expected result type does not match the return template")
            }
            InferenceFailure::Unfixable { position } => {
                write!(f, "type parameter {position} has conflicting bounds")
            }
            InferenceFailure::Unresolved { remaining } => {
                write!(f, "{remaining} type parameter(s) could not be inferred")
            }
            InferenceFailure::BootstrapMismatch { position } => {
                write!(f, "type parameter {position} does not satisfy its constraint")
            }
            InferenceFailure::ConstraintViolation => {
                write!(f, "inferred types violate the declared constraints")
            }
        }
    }
}

impl std::error::Error for InferenceFailure {}

// =============================================================================
// InferenceContext
// =============================================================================

/// State of one inference call.
pub struct InferenceContext<'a> {
    catalog: &'a dyn TypeCatalog,
    signature: &'a CallableSignature,
    bounds: InferredBounds,
}

impl<'a> InferenceContext<'a> {
    pub fn new(catalog: &'a dyn TypeCatalog, signature: &'a CallableSignature) -> Self {
        Self {
            catalog,
            signature,
            bounds: InferredBounds::new(&signature.type_params),
        }
    }

    pub fn bounds(&self) -> &InferredBounds {
        &self.bounds
    }

    pub fn into_bounds(self) -> InferredBounds {
        self.bounds
    }

    fn collector(&mut self) -> BoundCollector<'_> {
        BoundCollector::new(self.catalog, self.signature, &mut self.bounds.bounds)
    }

    /// Concrete/concrete compatibility: assignable, or a value special cast.
    fn compatible(&self, source: TypeId, target: TypeId) -> bool {
        self.catalog.is_assignable(source, target)
            || (is_special_cast_source(self.catalog, source)
                && can_value_special_cast(self.catalog, source, target))
    }

    /// Pre-check and collect bounds from every argument.
    ///
    /// # Panics
    ///
    /// When fewer argument types than declared parameters are supplied.
    pub fn collect_bounds(&mut self, args: &[TypeId]) -> Result<(), InferenceFailure> {
        let signature = self.signature;
        assert!(
            args.len() >= signature.params.len(),
            "inference needs an argument type for each of the {} parameters, got {}",
            signature.params.len(),
            args.len()
        );
        let catalog = self.catalog;
        let extra = args.get(signature.params.len()).copied();

        for (index, (param, &arg)) in signature.params.iter().zip(args).enumerate() {
            let template = enclosing_argument(catalog, signature, param.ty);
            if !catalog.contains_type_parameters(template) && !self.compatible(arg, template) {
                return Err(InferenceFailure::IncompatibleArgument { index });
            }
        }
        if let Some(expected) = extra {
            let Some(return_type) = signature.return_type else {
                return Err(InferenceFailure::IncompatibleReturn);
            };
            let return_type = enclosing_argument(catalog, signature, return_type);
            if !catalog.contains_type_parameters(return_type) && !self.compatible(return_type, expected) {
                return Err(InferenceFailure::IncompatibleReturn);
            }
        }

        for (index, (param, &arg)) in signature.params.iter().zip(args).enumerate() {
            let mut target = enclosing_argument(catalog, signature, param.ty);
            if !catalog.contains_type_parameters(target) {
                continue;
            }
            let mut variance = InferenceVariance::Covariant;
            if catalog.is_optional_wrapper(target) && !catalog.is_optional_wrapper(arg) {
                if let [inner] = catalog.generic_arguments(target) {
                    target = *inner;
                    variance = InferenceVariance::Invariant;
                }
            }
            if param.mode.is_by_ref() {
                variance = InferenceVariance::Invariant;
            }
            trace!(
                index,
                argument = catalog.type_name(arg),
                template = catalog.type_name(target),
                %variance,
                "collect parameter"
            );
            if !self.collector().collect(arg, target, variance) {
                return Err(InferenceFailure::UnmatchedParameter { index });
            }
        }

        if let (Some(mut expected), Some(return_type)) = (extra, signature.return_type) {
            let mut variance = InferenceVariance::Contravariant;
            if catalog.is_optional_wrapper(expected) && !catalog.is_optional_wrapper(return_type) {
                if let [inner] = catalog.generic_arguments(expected) {
                    expected = *inner;
                    variance = InferenceVariance::Invariant;
                }
            }
            if !self.collector().collect(expected, return_type, variance) {
                return Err(InferenceFailure::UnmatchedReturn);
            }
        }
        Ok(())
    }

    /// Fix every type parameter from its current bounds, replacing any
    /// earlier result.
    ///
    /// With `break_early` the first parameter that cannot be fixed aborts the
    /// pass; otherwise every parameter is attempted.
    pub fn fix_all(&mut self, break_early: bool) -> Result<(), InferenceFailure> {
        for position in 0..self.bounds.len() {
            let fixed = self.bounds.bounds[position].fix(self.catalog);
            trace!(
                position,
                fixed = fixed.map(|ty| self.catalog.type_name(ty)),
                "fix"
            );
            self.bounds.fixed[position] = fixed;
            if fixed.is_none() && break_early {
                return Err(InferenceFailure::Unfixable { position });
            }
        }
        match self.bounds.unresolved() {
            0 => Ok(()),
            remaining => Err(InferenceFailure::Unresolved { remaining }),
        }
    }

    /// Constraint bootstrap.
    ///
    /// Each pass feeds the constraint targets of every fixed parameter as
    /// Covariant bounds against its fixed type, then re-fixes every
    /// parameter, so new bounds may also change a type fixed earlier.
    /// Passes repeat while they reduce the number of unfixed parameters.
    pub fn bootstrap(&mut self) -> Result<(), InferenceFailure> {
        let catalog = self.catalog;
        loop {
            let before = self.bounds.unresolved();
            for position in 0..self.bounds.len() {
                let Some(fixed) = self.bounds.fixed[position] else {
                    continue;
                };
                let param = self.bounds.type_params[position];
                let Some(info) = catalog.type_param(param) else {
                    continue;
                };
                for target in info.constraint_targets() {
                    if !self.collector().collect(fixed, target, InferenceVariance::Covariant) {
                        return Err(InferenceFailure::BootstrapMismatch { position });
                    }
                }
            }

            if self.fix_all(false).is_ok() {
                return Ok(());
            }
            let after = self.bounds.unresolved();
            debug!(before, after, "bootstrap pass");
            if after >= before {
                return Err(InferenceFailure::Unresolved { remaining: after });
            }
        }
    }

    /// Run the whole pipeline.
    pub fn infer(&mut self, args: &[TypeId], options: InferenceOptions) -> Result<Vec<TypeId>, InferenceFailure> {
        self.collect_bounds(args)?;

        let direct = self.fix_all(!options.bootstrap_from_constraints);
        if let Err(failure) = direct {
            if !options.bootstrap_from_constraints {
                return Err(failure);
            }
            self.bootstrap()?;
        }

        let types = self
            .bounds
            .fixed_types()
            .ok_or(InferenceFailure::Unresolved {
                remaining: self.bounds.unresolved(),
            })?;

        if !options.skip_constraint_check
            && !satisfies_constraints(self.catalog, Declaration::Callable(self.signature), &types)
        {
            return Err(InferenceFailure::ConstraintViolation);
        }
        Ok(types)
    }
}

// =============================================================================
// Entry points
// =============================================================================

/// Infer the type arguments of `signature` from the argument types of a call.
///
/// `args` holds one type per declared parameter, optionally followed by the
/// expected result type. Returns the inferred types in declaration order.
///
/// # Panics
///
/// When `args` is shorter than the parameter list.
pub fn infer_types(
    catalog: &dyn TypeCatalog,
    signature: &CallableSignature,
    args: &[TypeId],
    options: InferenceOptions,
) -> Option<Vec<TypeId>> {
    let mut context = InferenceContext::new(catalog, signature);
    match context.infer(args, options) {
        Ok(types) => {
            debug!(arity = types.len(), "inference succeeded");
            Some(types)
        }
        Err(failure) => {
            debug!(%failure, "inference failed");
            None
        }
    }
}

/// Collect the raw bounds of every type parameter without fixing them.
///
/// # Panics
///
/// When `args` is shorter than the parameter list.
pub fn try_infer_bounds(
    catalog: &dyn TypeCatalog,
    signature: &CallableSignature,
    args: &[TypeId],
) -> Option<InferredBounds> {
    let mut context = InferenceContext::new(catalog, signature);
    match context.collect_bounds(args) {
        Ok(()) => Some(context.into_bounds()),
        Err(failure) => {
            debug!(%failure, "bound collection failed");
            None
        }
    }
}

#[cfg(test)]
#[path = "../tests/infer_tests.rs"]
mod tests;
