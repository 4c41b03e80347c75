#[macro_use]
mod macros;

///
/// PrimitiveKind
///
/// Closed set of EDM primitive kinds.
/// `None` stands for "not a primitive" and is never an error by itself.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum PrimitiveKind {
    None,
    Binary,
    Boolean,
    Byte,
    DateTime,
    DateTimeOffset,
    Decimal,
    Double,
    Guid,
    Int16,
    Int32,
    Int64,
    SByte,
    Single,
    String,
    Stream,
    Time,
    Geography,
    GeographyPoint,
    GeographyLineString,
    GeographyPolygon,
    GeographyCollection,
    GeographyMultiPolygon,
    GeographyMultiLineString,
    GeographyMultiPoint,
    Geometry,
    GeometryPoint,
    GeometryLineString,
    GeometryPolygon,
    GeometryCollection,
    GeometryMultiPolygon,
    GeometryMultiLineString,
    GeometryMultiPoint,
}

impl PrimitiveKind {
    /// Return the full metadata descriptor for one primitive kind.
    #[must_use]
    pub const fn metadata(self) -> PrimitiveMetadata {
        primitive_kind_registry!(metadata_from_registry, self)
    }

    /// Qualified EDM name, e.g. `Edm.Int32`.
    #[must_use]
    pub const fn full_name(self) -> &'static str {
        self.metadata().full_name
    }

    /// Name without the `Edm.` namespace.
    #[must_use]
    pub fn short_name(self) -> &'static str {
        let full = self.full_name();
        full.strip_prefix("Edm.").unwrap_or(full)
    }

    #[must_use]
    pub const fn family(self) -> PrimitiveFamily {
        self.metadata().family
    }

    /// Keyword used for the type-prefixed quoted literal form, if any.
    #[must_use]
    pub const fn literal_prefix(self) -> Option<&'static str> {
        self.metadata().literal_prefix
    }

    #[must_use]
    pub const fn is_integral(self) -> bool {
        self.metadata().is_integral
    }

    #[must_use]
    pub const fn is_floating(self) -> bool {
        self.metadata().is_floating
    }

    #[must_use]
    pub const fn is_temporal(self) -> bool {
        self.metadata().is_temporal
    }

    #[must_use]
    pub const fn is_spatial(self) -> bool {
        self.metadata().is_spatial
    }

    /// Integral, floating or decimal.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(
            self.family(),
            PrimitiveFamily::Integral | PrimitiveFamily::Floating | PrimitiveFamily::Decimal
        )
    }

    /// Integral kinds that can carry a sign.
    #[must_use]
    pub const fn is_signed_integral(self) -> bool {
        matches!(self, Self::SByte | Self::Int16 | Self::Int32 | Self::Int64)
    }

    /// Root spatial kind (`Geography` or `Geometry`) for a spatial kind.
    #[must_use]
    pub const fn spatial_root(self) -> Option<Self> {
        match self.family() {
            PrimitiveFamily::Geography => Some(Self::Geography),
            PrimitiveFamily::Geometry => Some(Self::Geometry),
            _ => None,
        }
    }

    /// Resolve a kind from its qualified (`Edm.Int32`) name.
    #[must_use]
    pub fn from_full_name(name: &str) -> Option<Self> {
        ALL_PRIMITIVE_KINDS
            .iter()
            .copied()
            .find(|kind| *kind != Self::None && kind.full_name() == name)
    }

    /// Whether a value of `self` may be implicitly widened to `target`.
    ///
    /// Identity is not a promotion; callers check equivalence first.
    #[must_use]
    pub const fn promotes_to(self, target: Self) -> bool {
        use PrimitiveKind as K;

        match (self, target) {
            (K::Byte, K::Int16 | K::Int32 | K::Int64 | K::Single | K::Double | K::Decimal)
            | (K::SByte, K::Int16 | K::Int32 | K::Int64 | K::Single | K::Double | K::Decimal)
            | (K::Int16, K::Int32 | K::Int64 | K::Single | K::Double | K::Decimal)
            | (K::Int32, K::Int64 | K::Single | K::Double | K::Decimal)
            | (K::Int64, K::Single | K::Double | K::Decimal)
            | (K::Single, K::Double) => true,
            _ => {
                // Spatial sub-kinds widen to their root only.
                matches!(
                    (self.family(), target),
                    (PrimitiveFamily::Geography, K::Geography)
                        | (PrimitiveFamily::Geometry, K::Geometry)
                ) && !matches!(self, K::Geography | K::Geometry)
            }
        }
    }
}

impl std::fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.full_name())
    }
}

///
/// PrimitiveMetadata
///
/// Classification metadata shared by the type-semantics and literal layers.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[allow(clippy::struct_excessive_bools)]
pub struct PrimitiveMetadata {
    pub full_name: &'static str,
    pub family: PrimitiveFamily,
    pub literal_prefix: Option<&'static str>,
    pub is_integral: bool,
    pub is_floating: bool,
    pub is_temporal: bool,
    pub is_spatial: bool,
}

///
/// PrimitiveFamily
///
/// Coarse routing family used by promotion and literal encoding.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PrimitiveFamily {
    None,
    Binary,
    Boolean,
    Integral,
    Floating,
    Decimal,
    Textual,
    Identifier,
    Temporal,
    Stream,
    Geography,
    Geometry,
}

/// Ordered list of all primitive kinds in registry order.
pub const ALL_PRIMITIVE_KINDS: [PrimitiveKind; 33] =
    primitive_kind_registry!(all_kinds_from_registry);

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_covers_every_kind_once() {
        let mut seen = std::collections::BTreeSet::new();
        for kind in ALL_PRIMITIVE_KINDS {
            assert!(seen.insert(kind), "duplicate registry entry for {kind:?}");
        }
        assert_eq!(seen.len(), ALL_PRIMITIVE_KINDS.len());
    }

    #[test]
    fn full_names_round_trip() {
        for kind in ALL_PRIMITIVE_KINDS {
            if kind == PrimitiveKind::None {
                assert_eq!(PrimitiveKind::from_full_name(kind.full_name()), None);
                continue;
            }
            assert_eq!(PrimitiveKind::from_full_name(kind.full_name()), Some(kind));
        }
    }

    #[test]
    fn classification_is_table_driven() {
        assert!(PrimitiveKind::Int64.is_integral());
        assert!(PrimitiveKind::Byte.is_integral());
        assert!(!PrimitiveKind::Decimal.is_integral());
        assert!(PrimitiveKind::Time.is_temporal());
        assert!(PrimitiveKind::DateTimeOffset.is_temporal());
        assert!(PrimitiveKind::GeometryMultiPoint.is_spatial());
        assert!(!PrimitiveKind::String.is_spatial());
        assert_eq!(
            PrimitiveKind::GeographyPoint.spatial_root(),
            Some(PrimitiveKind::Geography)
        );
    }

    #[test]
    fn promotion_table_widens_only() {
        assert!(PrimitiveKind::Int32.promotes_to(PrimitiveKind::Int64));
        assert!(PrimitiveKind::Int32.promotes_to(PrimitiveKind::Double));
        assert!(PrimitiveKind::Single.promotes_to(PrimitiveKind::Double));
        assert!(!PrimitiveKind::Int64.promotes_to(PrimitiveKind::Int32));
        assert!(!PrimitiveKind::Double.promotes_to(PrimitiveKind::Decimal));
        assert!(!PrimitiveKind::Int32.promotes_to(PrimitiveKind::Int32));
        assert!(PrimitiveKind::GeographyPoint.promotes_to(PrimitiveKind::Geography));
        assert!(!PrimitiveKind::GeographyPoint.promotes_to(PrimitiveKind::Geometry));
        assert!(!PrimitiveKind::Geography.promotes_to(PrimitiveKind::Geography));
    }

    #[test]
    fn literal_prefixes_match_quoted_forms() {
        assert_eq!(PrimitiveKind::Guid.literal_prefix(), Some("guid"));
        assert_eq!(PrimitiveKind::GeometryPolygon.literal_prefix(), Some("geometry"));
        assert_eq!(PrimitiveKind::Int32.literal_prefix(), None);
    }
}
