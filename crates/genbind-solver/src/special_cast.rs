//! Value special-cast compatibility.
//!
//! Call sites may pass a narrower primitive (or an enum, through its
//! underlying type) where a wider primitive is declared, and pointer-sized
//! integers where a pointer is declared, even though neither is an ordinary
//! subtype relation. The widening table is fixed.

use crate::catalog::TypeCatalog;
use crate::types::{PrimitiveKind, TypeFlags, TypeId};

impl PrimitiveKind {
    /// Kinds this kind widens to, itself included.
    pub const fn widens_to(self) -> &'static [PrimitiveKind] {
        use crate::types::PrimitiveKind::*;
        match self {
            Bool => &[Bool],
            Char => &[Char, U16, U32, I32, U64, I64, F32, F64],
            I8 => &[I8, I16, I32, I64, F32, F64],
            U8 => &[U8, Char, U16, I16, U32, I32, U64, I64, F32, F64],
            I16 => &[I16, I32, I64, F32, F64],
            U16 => &[U16, U32, I32, U64, I64, F32, F64],
            I32 => &[I32, I64, F32, F64],
            U32 => &[U32, U64, I64, F32, F64],
            I64 => &[I64, F32, F64],
            U64 => &[U64, F32, F64],
            F32 => &[F32, F64],
            F64 => &[F64],
            ISize => &[ISize],
            USize => &[USize],
        }
    }

    #[inline]
    pub fn can_widen_to(self, target: PrimitiveKind) -> bool {
        self.widens_to().contains(&target)
    }

    #[inline]
    pub const fn is_pointer_sized(self) -> bool {
        matches!(self, PrimitiveKind::ISize | PrimitiveKind::USize)
    }
}

/// Primitive kind of `ty`, looking through an enum to its underlying type.
fn value_kind<C: TypeCatalog + ?Sized>(catalog: &C, ty: TypeId) -> Option<PrimitiveKind> {
    let ty = catalog.enum_underlying(ty).unwrap_or(ty);
    catalog.primitive_kind(ty)
}

/// Whether a value of `source` may be passed where `target` is declared
/// through a primitive widening or pointer conversion.
pub fn can_value_special_cast<C: TypeCatalog + ?Sized>(
    catalog: &C,
    source: TypeId,
    target: TypeId,
) -> bool {
    let source_pointer = catalog.flags(source).contains(TypeFlags::POINTER);
    let target_pointer = catalog.flags(target).contains(TypeFlags::POINTER);
    if source_pointer && target_pointer {
        return true;
    }

    let source_kind = value_kind(catalog, source);
    if target_pointer {
        return source_kind.is_some_and(PrimitiveKind::is_pointer_sized);
    }

    match (source_kind, value_kind(catalog, target)) {
        (Some(from), Some(to)) => from.can_widen_to(to),
        _ => false,
    }
}

/// Whether `source` counts as a value for the special-cast fallback.
pub fn is_special_cast_source<C: TypeCatalog + ?Sized>(catalog: &C, source: TypeId) -> bool {
    let flags = catalog.flags(source);
    flags.intersects(TypeFlags::POINTER | TypeFlags::ENUM) || catalog.primitive_kind(source).is_some()
}

#[cfg(test)]
#[path = "../tests/special_cast_tests.rs"]
mod tests;
