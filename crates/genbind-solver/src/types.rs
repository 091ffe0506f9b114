//! Core type handles and descriptors shared by the catalog and the engine.
//!
//! Types are referenced by `TypeId` handles issued by a [`TypeCatalog`].
//! A handle denotes one of:
//!
//! | Shape | Example | Notes |
//! |-------|---------|-------|
//! | Named type | `string`, `Cat` | Classes, interfaces, structs, primitives, enums |
//! | Generic definition | `List<>` | Its generic arguments are its own type parameters |
//! | Instantiation | `List<string>`, `List<T>` | May mention type parameters (a template) |
//! | Array | `string[]`, `int[,]` | Element type plus rank |
//! | Type parameter | `T` | Owned by a generic type or a generic callable |
//!
//! Two handles denote the same type iff they are equal.
//!
//! [`TypeCatalog`]: crate::catalog::TypeCatalog

use bitflags::bitflags;
use genbind_common::interner::Atom;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

// =============================================================================
// TypeId
// =============================================================================

/// Handle of a type in a catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeId(pub u32);

impl TypeId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle of a generic callable declared in a catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CallableId(pub u32);

/// Small inline list of types (generic arguments, hierarchy matches).
pub type TypeList = SmallVec<[TypeId; genbind_common::limits::TYPE_LIST_INLINE]>;

// =============================================================================
// Flags
// =============================================================================

bitflags! {
    /// Runtime category and construction facts about a type.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct TypeFlags: u16 {
        /// Instances are values (structs, primitives, enums, optional wrappers).
        const VALUE_TYPE = 1 << 0;
        const INTERFACE = 1 << 1;
        /// Cannot be instantiated directly. Interfaces are always abstract.
        const ABSTRACT = 1 << 2;
        const ENUM = 1 << 3;
        const POINTER = 1 << 4;
        /// Declares an accessible parameterless constructor.
        const DEFAULT_CONSTRUCTOR = 1 << 5;
    }
}

// =============================================================================
// Variance
// =============================================================================

/// Declaration-site variance of a generic type parameter (`in`/`out`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variance {
    #[default]
    Invariant,
    /// `out T`
    #[serde(alias = "out")]
    Covariant,
    /// `in T`
    #[serde(alias = "in")]
    Contravariant,
}

/// Directional flow assigned to a call-site position during inference.
///
/// Decides which bound a witness lands in when the position is a bare type
/// parameter: Covariant records a Lower bound, Contravariant an Upper bound,
/// Invariant an Exact bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InferenceVariance {
    Invariant,
    Covariant,
    Contravariant,
}

impl InferenceVariance {
    /// Variance of a nested generic argument position.
    ///
    /// `declared` is the matched definition's own variance for the argument
    /// and `value_type_argument` tells whether the concrete argument at that
    /// position is a value type. Covariance is preserved, contravariance
    /// flips the declared direction, and invariance on either side (or a
    /// value-type argument) forces Invariant.
    pub fn combine(self, declared: Variance, value_type_argument: bool) -> InferenceVariance {
        if value_type_argument {
            return InferenceVariance::Invariant;
        }
        match (self, declared) {
            (InferenceVariance::Invariant, _) | (_, Variance::Invariant) => {
                InferenceVariance::Invariant
            }
            (InferenceVariance::Covariant, Variance::Covariant)
            | (InferenceVariance::Contravariant, Variance::Contravariant) => {
                InferenceVariance::Covariant
            }
            (InferenceVariance::Covariant, Variance::Contravariant)
            | (InferenceVariance::Contravariant, Variance::Covariant) => {
                InferenceVariance::Contravariant
            }
        }
    }
}

impl fmt::Display for InferenceVariance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InferenceVariance::Invariant => "invariant",
            InferenceVariance::Covariant => "covariant",
            InferenceVariance::Contravariant => "contravariant",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Primitives
// =============================================================================

/// Numeric and character primitive kinds, used by the value special-cast rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Bool,
    Char,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    ISize,
    USize,
}

// =============================================================================
// Type parameters and constraints
// =============================================================================

/// Constraint attached to a type parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Constraint {
    /// `struct`: a non-optional value type.
    ValueTypeOnly,
    /// `class`: a reference type.
    ReferenceTypeOnly,
    /// `new()`: a concrete type with a parameterless constructor.
    DefaultConstructible,
    /// Must be assignable to the target expression, which may mention sibling
    /// or enclosing type parameters.
    BaseTypeOrInterface(TypeId),
}

/// Declaration that owns a type parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParamOwner {
    /// A generic type definition.
    Type(TypeId),
    /// A generic callable.
    Callable(CallableId),
}

/// Metadata of a type parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeParamInfo {
    pub name: Atom,
    pub owner: ParamOwner,
    /// Position in the owner's type parameter list.
    pub position: usize,
    pub variance: Variance,
    pub constraints: Vec<Constraint>,
}

impl TypeParamInfo {
    /// Targets of the `BaseTypeOrInterface` constraints, in declaration order.
    pub fn constraint_targets(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.constraints.iter().filter_map(|c| match c {
            Constraint::BaseTypeOrInterface(target) => Some(*target),
            _ => None,
        })
    }
}

// =============================================================================
// Callables
// =============================================================================

/// How an argument is passed to a callable parameter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamMode {
    #[default]
    ByValue,
    #[serde(alias = "ref")]
    ByRef,
    Out,
}

impl ParamMode {
    /// By-reference and out parameters require exact type identity.
    #[inline]
    pub fn is_by_ref(self) -> bool {
        matches!(self, ParamMode::ByRef | ParamMode::Out)
    }
}

/// One declared parameter of a callable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParamInfo {
    /// Declared type template (the element type for by-reference parameters).
    pub ty: TypeId,
    pub mode: ParamMode,
}

/// Signature template of a generic callable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallableSignature {
    pub id: CallableId,
    pub name: Atom,
    /// The callable's own type parameters, in declaration order.
    pub type_params: Vec<TypeId>,
    pub params: Vec<ParamInfo>,
    /// `None` for callables returning nothing.
    pub return_type: Option<TypeId>,
    /// Instantiation of the enclosing generic type, if any.
    pub declaring_type: Option<TypeId>,
}

impl CallableSignature {
    /// Position of `param` if it is one of this callable's own type parameters.
    pub fn type_param_position(&self, param: TypeId) -> Option<usize> {
        self.type_params.iter().position(|&p| p == param)
    }
}
