use crate::edm::{ComplexType, EdmError, EdmLocation, EntityType, EnumType, StructuredType};
use derive_more::Display;
use edmq_primitives::PrimitiveKind;
use std::sync::Arc;

///
/// TypeKind
///
/// Coarse kind of a type definition.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum TypeKind {
    None,
    Primitive,
    Entity,
    Complex,
    Enum,
    Collection,
    EntityReference,
}

///
/// NarrowKind
///
/// Requested shape of an `as_*` narrowing; named in bad-type diagnostics.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum NarrowKind {
    Primitive,
    Binary,
    Decimal,
    String,
    Temporal,
    Spatial,
    Entity,
    Complex,
    Structured,
    Enum,
    Collection,
    EntityReference,
}

///
/// BadType
///
/// Placeholder definition produced when a narrowing does not apply.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BadType {
    pub requested: NarrowKind,
    pub full_name: String,
    pub errors: Vec<EdmError>,
}

macro_rules! narrowed_ref_common {
    ($($ty:ident),* $(,)?) => {
        $(
            impl $ty {
                #[must_use]
                pub const fn is_nullable(&self) -> bool {
                    self.nullable
                }

                #[must_use]
                pub const fn is_bad(&self) -> bool {
                    self.bad.is_some()
                }

                #[must_use]
                pub fn bad_type(&self) -> Option<&BadType> {
                    self.bad.as_deref()
                }

                /// Deferred diagnostics; empty for a good reference.
                #[must_use]
                pub fn errors(&self) -> &[EdmError] {
                    self.bad.as_deref().map_or(&[], |bad| bad.errors.as_slice())
                }

                #[must_use]
                pub(crate) fn from_bad(bad: BadType, nullable: bool) -> Self {
                    Self {
                        nullable,
                        bad: Some(Arc::new(bad)),
                        ..Self::placeholder()
                    }
                }
            }
        )*
    };
}

narrowed_ref_common!(
    PrimitiveTypeRef,
    BinaryTypeRef,
    DecimalTypeRef,
    StringTypeRef,
    TemporalTypeRef,
    SpatialTypeRef,
    EntityTypeRef,
    ComplexTypeRef,
    StructuredTypeRef,
    EnumTypeRef,
    CollectionTypeRef,
    EntityReferenceTypeRef,
);

///
/// PrimitiveTypeRef
///

#[derive(Clone, Debug, PartialEq)]
pub struct PrimitiveTypeRef {
    kind: PrimitiveKind,
    nullable: bool,
    bad: Option<Arc<BadType>>,
}

impl PrimitiveTypeRef {
    #[must_use]
    pub const fn new(kind: PrimitiveKind, nullable: bool) -> Self {
        Self {
            kind,
            nullable,
            bad: None,
        }
    }

    const fn placeholder() -> Self {
        Self::new(PrimitiveKind::None, true)
    }

    #[must_use]
    pub const fn kind(&self) -> PrimitiveKind {
        self.kind
    }
}

///
/// BinaryTypeRef
///

#[derive(Clone, Debug, PartialEq)]
pub struct BinaryTypeRef {
    max_length: Option<u32>,
    is_fixed_length: bool,
    nullable: bool,
    bad: Option<Arc<BadType>>,
}

impl BinaryTypeRef {
    #[must_use]
    pub const fn new(nullable: bool) -> Self {
        Self {
            max_length: None,
            is_fixed_length: false,
            nullable,
            bad: None,
        }
    }

    const fn placeholder() -> Self {
        Self::new(true)
    }

    #[must_use]
    pub const fn with_max_length(mut self, max_length: u32) -> Self {
        self.max_length = Some(max_length);
        self
    }

    #[must_use]
    pub const fn fixed_length(mut self) -> Self {
        self.is_fixed_length = true;
        self
    }

    #[must_use]
    pub const fn max_length(&self) -> Option<u32> {
        self.max_length
    }

    #[must_use]
    pub const fn is_fixed_length(&self) -> bool {
        self.is_fixed_length
    }
}

///
/// DecimalTypeRef
///

#[derive(Clone, Debug, PartialEq)]
pub struct DecimalTypeRef {
    precision: Option<u32>,
    scale: Option<u32>,
    nullable: bool,
    bad: Option<Arc<BadType>>,
}

impl DecimalTypeRef {
    #[must_use]
    pub const fn new(nullable: bool) -> Self {
        Self {
            precision: None,
            scale: None,
            nullable,
            bad: None,
        }
    }

    const fn placeholder() -> Self {
        Self::new(true)
    }

    #[must_use]
    pub const fn with_precision(mut self, precision: u32, scale: u32) -> Self {
        self.precision = Some(precision);
        self.scale = Some(scale);
        self
    }

    #[must_use]
    pub const fn precision(&self) -> Option<u32> {
        self.precision
    }

    #[must_use]
    pub const fn scale(&self) -> Option<u32> {
        self.scale
    }
}

///
/// StringTypeRef
///

#[derive(Clone, Debug, PartialEq)]
pub struct StringTypeRef {
    max_length: Option<u32>,
    is_unicode: bool,
    is_fixed_length: bool,
    nullable: bool,
    bad: Option<Arc<BadType>>,
}

impl StringTypeRef {
    #[must_use]
    pub const fn new(nullable: bool) -> Self {
        Self {
            max_length: None,
            is_unicode: true,
            is_fixed_length: false,
            nullable,
            bad: None,
        }
    }

    const fn placeholder() -> Self {
        Self::new(true)
    }

    #[must_use]
    pub const fn with_max_length(mut self, max_length: u32) -> Self {
        self.max_length = Some(max_length);
        self
    }

    #[must_use]
    pub const fn ascii(mut self) -> Self {
        self.is_unicode = false;
        self
    }

    #[must_use]
    pub const fn max_length(&self) -> Option<u32> {
        self.max_length
    }

    #[must_use]
    pub const fn is_unicode(&self) -> bool {
        self.is_unicode
    }

    #[must_use]
    pub const fn is_fixed_length(&self) -> bool {
        self.is_fixed_length
    }
}

///
/// TemporalTypeRef
///

#[derive(Clone, Debug, PartialEq)]
pub struct TemporalTypeRef {
    kind: PrimitiveKind,
    precision: Option<u32>,
    nullable: bool,
    bad: Option<Arc<BadType>>,
}

impl TemporalTypeRef {
    #[must_use]
    pub const fn new(kind: PrimitiveKind, nullable: bool) -> Self {
        Self {
            kind,
            precision: None,
            nullable,
            bad: None,
        }
    }

    const fn placeholder() -> Self {
        Self::new(PrimitiveKind::None, true)
    }

    #[must_use]
    pub const fn with_precision(mut self, precision: u32) -> Self {
        self.precision = Some(precision);
        self
    }

    #[must_use]
    pub const fn kind(&self) -> PrimitiveKind {
        self.kind
    }

    #[must_use]
    pub const fn precision(&self) -> Option<u32> {
        self.precision
    }
}

///
/// SpatialTypeRef
///

#[derive(Clone, Debug, PartialEq)]
pub struct SpatialTypeRef {
    kind: PrimitiveKind,
    srid: Option<u32>,
    nullable: bool,
    bad: Option<Arc<BadType>>,
}

impl SpatialTypeRef {
    #[must_use]
    pub const fn new(kind: PrimitiveKind, nullable: bool) -> Self {
        Self {
            kind,
            srid: None,
            nullable,
            bad: None,
        }
    }

    const fn placeholder() -> Self {
        Self::new(PrimitiveKind::None, true)
    }

    #[must_use]
    pub const fn with_srid(mut self, srid: u32) -> Self {
        self.srid = Some(srid);
        self
    }

    #[must_use]
    pub const fn kind(&self) -> PrimitiveKind {
        self.kind
    }

    #[must_use]
    pub const fn srid(&self) -> Option<u32> {
        self.srid
    }
}

///
/// EntityTypeRef
///

#[derive(Clone, Debug, PartialEq)]
pub struct EntityTypeRef {
    definition: Option<Arc<EntityType>>,
    nullable: bool,
    bad: Option<Arc<BadType>>,
}

impl EntityTypeRef {
    #[must_use]
    pub fn new(definition: &Arc<EntityType>, nullable: bool) -> Self {
        Self {
            definition: Some(Arc::clone(definition)),
            nullable,
            bad: None,
        }
    }

    const fn placeholder() -> Self {
        Self {
            definition: None,
            nullable: true,
            bad: None,
        }
    }

    /// Entity definition; `None` only on a bad reference.
    #[must_use]
    pub const fn definition(&self) -> Option<&Arc<EntityType>> {
        self.definition.as_ref()
    }
}

///
/// ComplexTypeRef
///

#[derive(Clone, Debug, PartialEq)]
pub struct ComplexTypeRef {
    definition: Option<Arc<ComplexType>>,
    nullable: bool,
    bad: Option<Arc<BadType>>,
}

impl ComplexTypeRef {
    #[must_use]
    pub fn new(definition: &Arc<ComplexType>, nullable: bool) -> Self {
        Self {
            definition: Some(Arc::clone(definition)),
            nullable,
            bad: None,
        }
    }

    const fn placeholder() -> Self {
        Self {
            definition: None,
            nullable: true,
            bad: None,
        }
    }

    #[must_use]
    pub const fn definition(&self) -> Option<&Arc<ComplexType>> {
        self.definition.as_ref()
    }
}

///
/// StructuredTypeRef
///
/// Entity-or-complex view returned by `as_structured`.
///

#[derive(Clone, Debug, PartialEq)]
pub struct StructuredTypeRef {
    definition: Option<StructuredType>,
    nullable: bool,
    bad: Option<Arc<BadType>>,
}

impl StructuredTypeRef {
    #[must_use]
    pub const fn new(definition: StructuredType, nullable: bool) -> Self {
        Self {
            definition: Some(definition),
            nullable,
            bad: None,
        }
    }

    const fn placeholder() -> Self {
        Self {
            definition: None,
            nullable: true,
            bad: None,
        }
    }

    #[must_use]
    pub const fn definition(&self) -> Option<&StructuredType> {
        self.definition.as_ref()
    }
}

///
/// EnumTypeRef
///

#[derive(Clone, Debug, PartialEq)]
pub struct EnumTypeRef {
    definition: Option<Arc<EnumType>>,
    nullable: bool,
    bad: Option<Arc<BadType>>,
}

impl EnumTypeRef {
    #[must_use]
    pub fn new(definition: &Arc<EnumType>, nullable: bool) -> Self {
        Self {
            definition: Some(Arc::clone(definition)),
            nullable,
            bad: None,
        }
    }

    const fn placeholder() -> Self {
        Self {
            definition: None,
            nullable: true,
            bad: None,
        }
    }

    #[must_use]
    pub const fn definition(&self) -> Option<&Arc<EnumType>> {
        self.definition.as_ref()
    }
}

///
/// CollectionTypeRef
///

#[derive(Clone, Debug, PartialEq)]
pub struct CollectionTypeRef {
    element: Option<Box<TypeRef>>,
    nullable: bool,
    bad: Option<Arc<BadType>>,
}

impl CollectionTypeRef {
    #[must_use]
    pub fn new(element: TypeRef, nullable: bool) -> Self {
        Self {
            element: Some(Box::new(element)),
            nullable,
            bad: None,
        }
    }

    const fn placeholder() -> Self {
        Self {
            element: None,
            nullable: true,
            bad: None,
        }
    }

    #[must_use]
    pub fn element_type(&self) -> Option<&TypeRef> {
        self.element.as_deref()
    }
}

///
/// EntityReferenceTypeRef
///

#[derive(Clone, Debug, PartialEq)]
pub struct EntityReferenceTypeRef {
    definition: Option<Arc<EntityType>>,
    nullable: bool,
    bad: Option<Arc<BadType>>,
}

impl EntityReferenceTypeRef {
    #[must_use]
    pub fn new(definition: &Arc<EntityType>, nullable: bool) -> Self {
        Self {
            definition: Some(Arc::clone(definition)),
            nullable,
            bad: None,
        }
    }

    const fn placeholder() -> Self {
        Self {
            definition: None,
            nullable: true,
            bad: None,
        }
    }

    #[must_use]
    pub const fn definition(&self) -> Option<&Arc<EntityType>> {
        self.definition.as_ref()
    }
}

///
/// TypeRef
///
/// A use of a type: definition plus nullability and facets.
/// Closed over every narrowed reference shape.
///

#[derive(Clone, Debug, PartialEq)]
pub enum TypeRef {
    Primitive(PrimitiveTypeRef),
    Binary(BinaryTypeRef),
    Decimal(DecimalTypeRef),
    String(StringTypeRef),
    Temporal(TemporalTypeRef),
    Spatial(SpatialTypeRef),
    Entity(EntityTypeRef),
    Complex(ComplexTypeRef),
    Enum(EnumTypeRef),
    Collection(CollectionTypeRef),
    EntityReference(EntityReferenceTypeRef),
}

impl TypeRef {
    /// Generic primitive reference without facets.
    #[must_use]
    pub const fn primitive(kind: PrimitiveKind, nullable: bool) -> Self {
        Self::Primitive(PrimitiveTypeRef::new(kind, nullable))
    }

    #[must_use]
    pub const fn string(nullable: bool) -> Self {
        Self::String(StringTypeRef::new(nullable))
    }

    #[must_use]
    pub const fn decimal(nullable: bool) -> Self {
        Self::Decimal(DecimalTypeRef::new(nullable))
    }

    #[must_use]
    pub const fn binary(nullable: bool) -> Self {
        Self::Binary(BinaryTypeRef::new(nullable))
    }

    #[must_use]
    pub const fn temporal(kind: PrimitiveKind, nullable: bool) -> Self {
        Self::Temporal(TemporalTypeRef::new(kind, nullable))
    }

    #[must_use]
    pub const fn spatial(kind: PrimitiveKind, nullable: bool) -> Self {
        Self::Spatial(SpatialTypeRef::new(kind, nullable))
    }

    #[must_use]
    pub fn entity(definition: &Arc<EntityType>, nullable: bool) -> Self {
        Self::Entity(EntityTypeRef::new(definition, nullable))
    }

    #[must_use]
    pub fn complex(definition: &Arc<ComplexType>, nullable: bool) -> Self {
        Self::Complex(ComplexTypeRef::new(definition, nullable))
    }

    #[must_use]
    pub fn enumeration(definition: &Arc<EnumType>, nullable: bool) -> Self {
        Self::Enum(EnumTypeRef::new(definition, nullable))
    }

    #[must_use]
    pub fn collection(element: Self) -> Self {
        Self::Collection(CollectionTypeRef::new(element, false))
    }

    #[must_use]
    pub fn entity_reference(definition: &Arc<EntityType>, nullable: bool) -> Self {
        Self::EntityReference(EntityReferenceTypeRef::new(definition, nullable))
    }

    #[must_use]
    pub const fn is_nullable(&self) -> bool {
        match self {
            Self::Primitive(r) => r.nullable,
            Self::Binary(r) => r.nullable,
            Self::Decimal(r) => r.nullable,
            Self::String(r) => r.nullable,
            Self::Temporal(r) => r.nullable,
            Self::Spatial(r) => r.nullable,
            Self::Entity(r) => r.nullable,
            Self::Complex(r) => r.nullable,
            Self::Enum(r) => r.nullable,
            Self::Collection(r) => r.nullable,
            Self::EntityReference(r) => r.nullable,
        }
    }

    const fn bad(&self) -> Option<&Arc<BadType>> {
        match self {
            Self::Primitive(r) => r.bad.as_ref(),
            Self::Binary(r) => r.bad.as_ref(),
            Self::Decimal(r) => r.bad.as_ref(),
            Self::String(r) => r.bad.as_ref(),
            Self::Temporal(r) => r.bad.as_ref(),
            Self::Spatial(r) => r.bad.as_ref(),
            Self::Entity(r) => r.bad.as_ref(),
            Self::Complex(r) => r.bad.as_ref(),
            Self::Enum(r) => r.bad.as_ref(),
            Self::Collection(r) => r.bad.as_ref(),
            Self::EntityReference(r) => r.bad.as_ref(),
        }
    }

    #[must_use]
    pub const fn is_bad(&self) -> bool {
        self.bad().is_some()
    }

    #[must_use]
    pub fn errors(&self) -> &[EdmError] {
        self.bad().map_or(&[], |bad| bad.errors.as_slice())
    }

    /// Copy of this reference with a different nullability.
    #[must_use]
    pub fn with_nullable(&self, nullable: bool) -> Self {
        let mut copy = self.clone();
        match &mut copy {
            Self::Primitive(r) => r.nullable = nullable,
            Self::Binary(r) => r.nullable = nullable,
            Self::Decimal(r) => r.nullable = nullable,
            Self::String(r) => r.nullable = nullable,
            Self::Temporal(r) => r.nullable = nullable,
            Self::Spatial(r) => r.nullable = nullable,
            Self::Entity(r) => r.nullable = nullable,
            Self::Complex(r) => r.nullable = nullable,
            Self::Enum(r) => r.nullable = nullable,
            Self::Collection(r) => r.nullable = nullable,
            Self::EntityReference(r) => r.nullable = nullable,
        }

        copy
    }

    /// Qualified name of the referenced definition.
    /// Collections render as `Collection(T)`, references as `Ref(T)`.
    #[must_use]
    pub fn full_name(&self) -> String {
        if let Some(bad) = self.bad() {
            return bad.full_name.clone();
        }

        match self {
            Self::Primitive(r) => r.kind.full_name().to_string(),
            Self::Binary(_) => PrimitiveKind::Binary.full_name().to_string(),
            Self::Decimal(_) => PrimitiveKind::Decimal.full_name().to_string(),
            Self::String(_) => PrimitiveKind::String.full_name().to_string(),
            Self::Temporal(r) => r.kind.full_name().to_string(),
            Self::Spatial(r) => r.kind.full_name().to_string(),
            Self::Entity(r) => r
                .definition
                .as_ref()
                .map_or_else(String::new, |ty| ty.full_name().to_string()),
            Self::Complex(r) => r
                .definition
                .as_ref()
                .map_or_else(String::new, |ty| ty.full_name().to_string()),
            Self::Enum(r) => r
                .definition
                .as_ref()
                .map_or_else(String::new, |ty| ty.full_name().to_string()),
            Self::Collection(r) => format!(
                "Collection({})",
                r.element
                    .as_deref()
                    .map_or_else(String::new, Self::full_name)
            ),
            Self::EntityReference(r) => format!(
                "Ref({})",
                r.definition
                    .as_ref()
                    .map_or_else(String::new, |ty| ty.full_name().to_string())
            ),
        }
    }

    /// Location used by deferred diagnostics about this reference.
    #[must_use]
    pub fn location(&self) -> EdmLocation {
        if let Some(bad) = self.bad() {
            return bad
                .errors
                .first()
                .map_or_else(EdmLocation::unnamed_type, |err| err.location.clone());
        }

        match self {
            Self::Collection(_) | Self::EntityReference(_) => EdmLocation::unnamed_type(),
            Self::Primitive(r) if r.kind == PrimitiveKind::None => EdmLocation::unnamed_type(),
            _ => EdmLocation::element(self.full_name()),
        }
    }
}
