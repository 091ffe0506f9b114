//! The Type Catalog query interface.
//!
//! The engine never constructs or mutates types. Everything it knows about
//! the nominal type system comes through these read-only queries, so a
//! catalog shared between threads only needs to be `Sync`.

use crate::relations;
use crate::types::{PrimitiveKind, TypeFlags, TypeId, TypeParamInfo};

/// Read-only queries over nominal type metadata.
pub trait TypeCatalog {
    /// Display name of a type (`List<string>`, `int[]`, `T`).
    fn type_name(&self, ty: TypeId) -> &str;

    fn flags(&self, ty: TypeId) -> TypeFlags;

    /// Direct base class. `None` for the root type, interfaces and type
    /// parameters.
    fn base_type(&self, ty: TypeId) -> Option<TypeId>;

    /// Every interface the type implements, including those inherited from
    /// base types and other interfaces, without duplicates.
    fn interfaces(&self, ty: TypeId) -> &[TypeId];

    /// The generic definition of an instantiation, or the definition itself.
    /// `None` for non-generic types.
    fn generic_definition(&self, ty: TypeId) -> Option<TypeId>;

    /// Generic arguments of an instantiation. For a generic definition these
    /// are its own type parameters; empty for non-generic types.
    fn generic_arguments(&self, ty: TypeId) -> &[TypeId];

    /// Element type and rank of an array type.
    fn array_shape(&self, ty: TypeId) -> Option<(TypeId, u32)>;

    /// Metadata of a type parameter, `None` for every other type.
    fn type_param(&self, ty: TypeId) -> Option<&TypeParamInfo>;

    /// Underlying integral type of an enum.
    fn enum_underlying(&self, ty: TypeId) -> Option<TypeId>;

    fn primitive_kind(&self, ty: TypeId) -> Option<PrimitiveKind>;

    /// The universal root every type is assignable to.
    fn root_type(&self) -> TypeId;

    /// Generic definition of the single-parameter optional-value wrapper.
    fn optional_wrapper(&self) -> Option<TypeId>;

    /// Whether a rank-1 array is an implementation of instantiations of this
    /// single-parameter covariant sequence interface definition.
    fn is_sequence_interface(&self, definition: TypeId) -> bool;

    /// Whether the type mentions any type parameter.
    fn contains_type_parameters(&self, ty: TypeId) -> bool {
        if self.type_param(ty).is_some() {
            return true;
        }
        if let Some((element, _)) = self.array_shape(ty) {
            return self.contains_type_parameters(element);
        }
        self.generic_arguments(ty)
            .iter()
            .any(|&arg| self.contains_type_parameters(arg))
    }

    /// Whether a value of `source` may be stored in a location of `target`.
    fn is_assignable(&self, source: TypeId, target: TypeId) -> bool {
        relations::is_assignable(self, source, target)
    }

    // -------------------------------------------------------------------------
    // Derived predicates
    // -------------------------------------------------------------------------

    #[inline]
    fn is_value_type(&self, ty: TypeId) -> bool {
        self.flags(ty).contains(TypeFlags::VALUE_TYPE)
    }

    /// Reference types are everything that is not a value type, type
    /// parameters excepted.
    #[inline]
    fn is_reference_type(&self, ty: TypeId) -> bool {
        !self.is_value_type(ty) && self.type_param(ty).is_none()
    }

    /// Whether `ty` is an instantiation of the optional-value wrapper.
    fn is_optional_wrapper(&self, ty: TypeId) -> bool {
        match (self.optional_wrapper(), self.generic_definition(ty)) {
            (Some(wrapper), Some(definition)) => wrapper == definition && wrapper != ty,
            _ => false,
        }
    }

    /// The generic definition of `ty`, or `ty` itself when it is not generic.
    #[inline]
    fn definition_or_self(&self, ty: TypeId) -> TypeId {
        self.generic_definition(ty).unwrap_or(ty)
    }

    /// Declared variance of the argument at `position` of a generic definition.
    fn declared_variance(&self, definition: TypeId, position: usize) -> crate::types::Variance {
        self.generic_arguments(definition)
            .get(position)
            .and_then(|&param| self.type_param(param))
            .map(|info| info.variance)
            .unwrap_or_default()
    }
}
