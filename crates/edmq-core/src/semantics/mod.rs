//! Type semantics: classification, narrowing, inheritance and promotion.
//!
//! Every question here is total. Classification of primitive kinds is a
//! registry lookup; narrowing never fails and instead returns a bad
//! reference carrying deferred diagnostics.

mod narrow;

#[cfg(test)]
mod tests;

use crate::edm::{StructuredType, TypeKind, TypeRef};
use edmq_primitives::PrimitiveKind;

impl TypeRef {
    /// Coarse kind of the referenced definition.
    #[must_use]
    pub const fn type_kind(&self) -> TypeKind {
        match self {
            Self::Primitive(r) if matches!(r.kind(), PrimitiveKind::None) => TypeKind::None,
            Self::Primitive(_)
            | Self::Binary(_)
            | Self::Decimal(_)
            | Self::String(_)
            | Self::Temporal(_)
            | Self::Spatial(_) => TypeKind::Primitive,
            Self::Entity(_) => TypeKind::Entity,
            Self::Complex(_) => TypeKind::Complex,
            Self::Enum(_) => TypeKind::Enum,
            Self::Collection(_) => TypeKind::Collection,
            Self::EntityReference(_) => TypeKind::EntityReference,
        }
    }

    /// Primitive kind of a primitive reference; `None` for everything else.
    #[must_use]
    pub const fn primitive_kind(&self) -> PrimitiveKind {
        if self.is_bad() {
            return PrimitiveKind::None;
        }

        match self {
            Self::Primitive(r) => r.kind(),
            Self::Binary(_) => PrimitiveKind::Binary,
            Self::Decimal(_) => PrimitiveKind::Decimal,
            Self::String(_) => PrimitiveKind::String,
            Self::Temporal(r) => r.kind(),
            Self::Spatial(r) => r.kind(),
            _ => PrimitiveKind::None,
        }
    }

    #[must_use]
    pub const fn is_primitive(&self) -> bool {
        !matches!(self.primitive_kind(), PrimitiveKind::None)
    }

    #[must_use]
    pub const fn is_spatial(&self) -> bool {
        self.primitive_kind().is_spatial()
    }

    #[must_use]
    pub const fn is_temporal(&self) -> bool {
        self.primitive_kind().is_temporal()
    }

    #[must_use]
    pub const fn is_integral(&self) -> bool {
        self.primitive_kind().is_integral()
    }

    #[must_use]
    pub const fn is_floating(&self) -> bool {
        self.primitive_kind().is_floating()
    }

    #[must_use]
    pub const fn is_signed(&self) -> bool {
        self.primitive_kind().is_signed_integral() || self.is_floating()
    }

    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        self.primitive_kind().is_numeric()
    }

    #[must_use]
    pub const fn is_boolean(&self) -> bool {
        matches!(self.primitive_kind(), PrimitiveKind::Boolean)
    }

    #[must_use]
    pub const fn is_enum(&self) -> bool {
        matches!(self, Self::Enum(_)) && !self.is_bad()
    }

    #[must_use]
    pub const fn is_collection(&self) -> bool {
        matches!(self, Self::Collection(_)) && !self.is_bad()
    }

    /// Structured definition behind an entity or complex reference.
    #[must_use]
    pub fn structured_definition(&self) -> Option<StructuredType> {
        self.as_structured().definition().cloned()
    }

    /// Open entity or complex type.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.structured_definition()
            .is_some_and(|ty| ty.is_open())
    }

    /// Same definition, ignoring nullability and facets.
    #[must_use]
    pub fn is_definition_equivalent(&self, other: &Self) -> bool {
        if self.is_bad() || other.is_bad() {
            return false;
        }

        match (self, other) {
            (Self::Collection(a), Self::Collection(b)) => match (a.element_type(), b.element_type()) {
                (Some(a), Some(b)) => a.is_definition_equivalent(b),
                _ => false,
            },
            _ => {
                self.type_kind() == other.type_kind()
                    && self.primitive_kind() == other.primitive_kind()
                    && self.full_name() == other.full_name()
            }
        }
    }

    /// Same definition and same nullability.
    #[must_use]
    pub fn is_equivalent_to(&self, other: &Self) -> bool {
        self.is_nullable() == other.is_nullable() && self.is_definition_equivalent(other)
    }
}

/// Whether `derived` has `base` strictly above it in its base chain.
/// `inherits_from(a, a)` is false.
#[must_use]
pub fn inherits_from(derived: &StructuredType, base: &StructuredType) -> bool {
    let mut current = derived.base_type();
    while let Some(ty) = current {
        if is_same_type(&ty, base) {
            return true;
        }
        current = ty.base_type();
    }

    false
}

#[must_use]
pub fn is_or_inherits_from(derived: &StructuredType, base: &StructuredType) -> bool {
    is_same_type(derived, base) || inherits_from(derived, base)
}

/// Related by inheritance in either direction, or the same type.
#[must_use]
pub fn are_related(a: &StructuredType, b: &StructuredType) -> bool {
    is_or_inherits_from(a, b) || inherits_from(b, a)
}

fn is_same_type(a: &StructuredType, b: &StructuredType) -> bool {
    match (a, b) {
        (StructuredType::Entity(_), StructuredType::Entity(_))
        | (StructuredType::Complex(_), StructuredType::Complex(_)) => a.full_name() == b.full_name(),
        _ => false,
    }
}

/// Whether a value of `from` may be implicitly widened to `to`.
/// Identity is not a promotion.
#[must_use]
pub fn can_promote(from: &TypeRef, to: &TypeRef) -> bool {
    from.primitive_kind().promotes_to(to.primitive_kind())
}

/// Smallest primitive both operands widen to, if any.
#[must_use]
pub fn common_primitive_kind(left: PrimitiveKind, right: PrimitiveKind) -> Option<PrimitiveKind> {
    if left == right {
        return Some(left);
    }
    if left.promotes_to(right) {
        return Some(right);
    }
    if right.promotes_to(left) {
        return Some(left);
    }

    NUMERIC_LADDER
        .iter()
        .copied()
        .find(|candidate| left.promotes_to(*candidate) && right.promotes_to(*candidate))
}

/// Numeric kinds from narrowest to widest; promotion searches this order.
pub(crate) const NUMERIC_LADDER: [PrimitiveKind; 6] = [
    PrimitiveKind::Int16,
    PrimitiveKind::Int32,
    PrimitiveKind::Int64,
    PrimitiveKind::Single,
    PrimitiveKind::Double,
    PrimitiveKind::Decimal,
];

/// Ladder distance of one promotion; 0 for identity.
pub(crate) fn promotion_cost(from: PrimitiveKind, to: PrimitiveKind) -> usize {
    if from == to {
        return 0;
    }

    let rank = |kind: PrimitiveKind| {
        NUMERIC_LADDER
            .iter()
            .position(|candidate| *candidate == kind)
            .map_or(0, |pos| pos + 1)
    };

    rank(to).saturating_sub(rank(from)).max(1)
}
