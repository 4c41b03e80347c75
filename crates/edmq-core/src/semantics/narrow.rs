use crate::edm::{
    BadType, BinaryTypeRef, CollectionTypeRef, ComplexTypeRef, DecimalTypeRef, EdmError,
    EdmErrorCode, EntityReferenceTypeRef, EntityTypeRef, EnumTypeRef, NarrowKind, PrimitiveTypeRef,
    SpatialTypeRef, StringTypeRef, StructuredType, StructuredTypeRef, TemporalTypeRef, TypeRef,
};
use edmq_primitives::PrimitiveKind;
use std::borrow::Cow;

///
/// Narrowing
///
/// `Cow::Borrowed` when the reference already has the requested shape,
/// a fresh reference when only the shape differs, and a bad reference
/// of the requested shape otherwise.
///

impl TypeRef {
    #[must_use]
    pub fn as_primitive(&self) -> Cow<'_, PrimitiveTypeRef> {
        match self {
            Self::Primitive(r) => Cow::Borrowed(r),
            _ if self.is_primitive() => Cow::Owned(PrimitiveTypeRef::new(
                self.primitive_kind(),
                self.is_nullable(),
            )),
            _ => Cow::Owned(PrimitiveTypeRef::from_bad(
                self.bad_for(NarrowKind::Primitive),
                self.is_nullable(),
            )),
        }
    }

    #[must_use]
    pub fn as_binary(&self) -> Cow<'_, BinaryTypeRef> {
        match self {
            Self::Binary(r) => Cow::Borrowed(r),
            Self::Primitive(_) if self.primitive_kind() == PrimitiveKind::Binary => {
                Cow::Owned(BinaryTypeRef::new(self.is_nullable()))
            }
            _ => Cow::Owned(BinaryTypeRef::from_bad(
                self.bad_for(NarrowKind::Binary),
                self.is_nullable(),
            )),
        }
    }

    #[must_use]
    pub fn as_decimal(&self) -> Cow<'_, DecimalTypeRef> {
        match self {
            Self::Decimal(r) => Cow::Borrowed(r),
            Self::Primitive(_) if self.primitive_kind() == PrimitiveKind::Decimal => {
                Cow::Owned(DecimalTypeRef::new(self.is_nullable()))
            }
            _ => Cow::Owned(DecimalTypeRef::from_bad(
                self.bad_for(NarrowKind::Decimal),
                self.is_nullable(),
            )),
        }
    }

    #[must_use]
    pub fn as_string(&self) -> Cow<'_, StringTypeRef> {
        match self {
            Self::String(r) => Cow::Borrowed(r),
            Self::Primitive(_) if self.primitive_kind() == PrimitiveKind::String => {
                Cow::Owned(StringTypeRef::new(self.is_nullable()))
            }
            _ => Cow::Owned(StringTypeRef::from_bad(
                self.bad_for(NarrowKind::String),
                self.is_nullable(),
            )),
        }
    }

    #[must_use]
    pub fn as_temporal(&self) -> Cow<'_, TemporalTypeRef> {
        match self {
            Self::Temporal(r) => Cow::Borrowed(r),
            Self::Primitive(_) if self.is_temporal() => Cow::Owned(TemporalTypeRef::new(
                self.primitive_kind(),
                self.is_nullable(),
            )),
            _ => Cow::Owned(TemporalTypeRef::from_bad(
                self.bad_for(NarrowKind::Temporal),
                self.is_nullable(),
            )),
        }
    }

    #[must_use]
    pub fn as_spatial(&self) -> Cow<'_, SpatialTypeRef> {
        match self {
            Self::Spatial(r) => Cow::Borrowed(r),
            Self::Primitive(_) if self.is_spatial() => Cow::Owned(SpatialTypeRef::new(
                self.primitive_kind(),
                self.is_nullable(),
            )),
            _ => Cow::Owned(SpatialTypeRef::from_bad(
                self.bad_for(NarrowKind::Spatial),
                self.is_nullable(),
            )),
        }
    }

    #[must_use]
    pub fn as_entity(&self) -> Cow<'_, EntityTypeRef> {
        match self {
            Self::Entity(r) => Cow::Borrowed(r),
            _ => Cow::Owned(EntityTypeRef::from_bad(
                self.bad_for(NarrowKind::Entity),
                self.is_nullable(),
            )),
        }
    }

    #[must_use]
    pub fn as_complex(&self) -> Cow<'_, ComplexTypeRef> {
        match self {
            Self::Complex(r) => Cow::Borrowed(r),
            _ => Cow::Owned(ComplexTypeRef::from_bad(
                self.bad_for(NarrowKind::Complex),
                self.is_nullable(),
            )),
        }
    }

    /// Entity-or-complex view. Always a fresh value since no variant has
    /// this shape.
    #[must_use]
    pub fn as_structured(&self) -> Cow<'_, StructuredTypeRef> {
        let structured = match self {
            Self::Entity(r) => r.definition().cloned().map(StructuredType::Entity),
            Self::Complex(r) => r.definition().cloned().map(StructuredType::Complex),
            _ => None,
        };

        match structured {
            Some(definition) => Cow::Owned(StructuredTypeRef::new(definition, self.is_nullable())),
            None => Cow::Owned(StructuredTypeRef::from_bad(
                self.bad_for(NarrowKind::Structured),
                self.is_nullable(),
            )),
        }
    }

    #[must_use]
    pub fn as_enum(&self) -> Cow<'_, EnumTypeRef> {
        match self {
            Self::Enum(r) => Cow::Borrowed(r),
            _ => Cow::Owned(EnumTypeRef::from_bad(
                self.bad_for(NarrowKind::Enum),
                self.is_nullable(),
            )),
        }
    }

    #[must_use]
    pub fn as_collection(&self) -> Cow<'_, CollectionTypeRef> {
        match self {
            Self::Collection(r) => Cow::Borrowed(r),
            _ => Cow::Owned(CollectionTypeRef::from_bad(
                self.bad_for(NarrowKind::Collection),
                self.is_nullable(),
            )),
        }
    }

    #[must_use]
    pub fn as_entity_reference(&self) -> Cow<'_, EntityReferenceTypeRef> {
        match self {
            Self::EntityReference(r) => Cow::Borrowed(r),
            _ => Cow::Owned(EntityReferenceTypeRef::from_bad(
                self.bad_for(NarrowKind::EntityReference),
                self.is_nullable(),
            )),
        }
    }

    fn bad_for(&self, requested: NarrowKind) -> BadType {
        let full_name = self.full_name();
        let message = format!("cannot convert type reference '{full_name}' to {requested}");

        BadType {
            requested,
            errors: vec![EdmError::new(
                EdmErrorCode::TypeSemanticsCouldNotConvertTypeReference,
                self.location(),
                message,
            )],
            full_name,
        }
    }
}
