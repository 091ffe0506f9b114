//! Variance-Aware Generic Type-Argument Inference
//!
//! This crate infers and validates generic type-argument bindings for a
//! nominal class/interface type system with declaration-site variance,
//! single class inheritance, multiple interface implementation, arrays and
//! parametric constraints.
//!
//! Pipeline of one inference call:
//!
//! - **Bound Collector** (`collect`): matches parameter templates against
//!   argument types, recording Lower/Upper/Exact bounds per type parameter
//! - **Bound Fixer** (`bounds`): reduces each bound set to one type
//! - **Inference Driver** (`infer`): pre-checks, collection order, fixing
//!   modes and the constraint bootstrap
//! - **Constraint Checker** (`constraints`): validates the final arguments
//!
//! All components read type metadata through the [`TypeCatalog`] trait and
//! never mutate it. [`TypeStore`] is an in-memory catalog.
//!
//! Key properties:
//! - O(1) type identity via interned `TypeId` handles
//! - Every bound table is owned by the call that created it, so inference
//!   over a shared catalog needs no locking
//! - Deterministic: identical inputs give identical outcomes

pub mod bounds;
pub mod catalog;
pub mod class_hierarchy;
pub mod collect;
pub mod constraints;
pub mod infer;
pub mod recursion;
pub mod relations;
pub mod special_cast;
pub mod store;
pub mod types;

pub use bounds::{BoundSet, InferredBounds, Witnesses};
pub use catalog::TypeCatalog;
pub use constraints::{Declaration, satisfies_constraints};
pub use infer::{InferenceContext, InferenceFailure, InferenceOptions, infer_types, try_infer_bounds};
pub use relations::is_assignable;
pub use special_cast::can_value_special_cast;
pub use store::{TypeKind, TypeStore, TypeStoreBuilder};
pub use types::{
    CallableId, CallableSignature, Constraint, InferenceVariance, ParamInfo, ParamMode, ParamOwner,
    PrimitiveKind, TypeFlags, TypeId, TypeParamInfo, Variance,
};

// Shared fixture catalog for unit tests.
#[cfg(test)]
mod test_catalog;

// Test modules: most are loaded by their source files via #[path = "../tests/..."].
#[cfg(test)]
#[path = "../tests/end_to_end_tests.rs"]
mod end_to_end_tests;
#[cfg(test)]
#[path = "../tests/concurrent_tests.rs"]
mod concurrent_tests;
