//! Runtime literal values carried by lexical and bound trees.

pub mod text;

#[cfg(test)]
mod tests;

use crate::edm::TypeRef;
use edmq_primitives::{PrimitiveFamily, PrimitiveKind};
use rust_decimal::Decimal;
use thiserror::Error as ThisError;
use time::{Duration, OffsetDateTime, PrimitiveDateTime};
use uuid::Uuid;

///
/// LiteralValue
///
/// One primitive value as written in a query option.
/// `Null` is untyped until a binder gives it a target.
///

#[derive(Clone, Debug, PartialEq)]
pub enum LiteralValue {
    Null,
    Boolean(bool),
    Byte(u8),
    SByte(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Single(f32),
    Double(f64),
    Decimal(Decimal),
    String(String),
    Binary(Vec<u8>),
    Guid(Uuid),
    DateTime(PrimitiveDateTime),
    DateTimeOffset(OffsetDateTime),
    Time(Duration),
    Geography(SpatialValue),
    Geometry(SpatialValue),
    Enum(EnumValue),
}

impl LiteralValue {
    /// Primitive kind of the value; `None` for null and enum values.
    #[must_use]
    pub const fn kind(&self) -> PrimitiveKind {
        match self {
            Self::Null | Self::Enum(_) => PrimitiveKind::None,
            Self::Boolean(_) => PrimitiveKind::Boolean,
            Self::Byte(_) => PrimitiveKind::Byte,
            Self::SByte(_) => PrimitiveKind::SByte,
            Self::Int16(_) => PrimitiveKind::Int16,
            Self::Int32(_) => PrimitiveKind::Int32,
            Self::Int64(_) => PrimitiveKind::Int64,
            Self::Single(_) => PrimitiveKind::Single,
            Self::Double(_) => PrimitiveKind::Double,
            Self::Decimal(_) => PrimitiveKind::Decimal,
            Self::String(_) => PrimitiveKind::String,
            Self::Binary(_) => PrimitiveKind::Binary,
            Self::Guid(_) => PrimitiveKind::Guid,
            Self::DateTime(_) => PrimitiveKind::DateTime,
            Self::DateTimeOffset(_) => PrimitiveKind::DateTimeOffset,
            Self::Time(_) => PrimitiveKind::Time,
            Self::Geography(value) | Self::Geometry(value) => value.kind,
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Widen an integral value to `i64`.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Byte(v) => Some(i64::from(*v)),
            Self::SByte(v) => Some(i64::from(*v)),
            Self::Int16(v) => Some(i64::from(*v)),
            Self::Int32(v) => Some(i64::from(*v)),
            Self::Int64(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Non-nullable type reference for a typed value.
    /// Null and enum values have no standalone primitive type.
    #[must_use]
    pub fn type_ref(&self) -> Option<TypeRef> {
        match self.kind() {
            PrimitiveKind::None => None,
            kind => Some(TypeRef::primitive(kind, false)),
        }
    }
}

///
/// SpatialValue
///
/// Well-known-text payload with an optional SRID.
/// `kind` is the concrete sub-kind (e.g. `GeographyPoint`).
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SpatialValue {
    pub kind: PrimitiveKind,
    pub srid: Option<u32>,
    pub wkt: String,
}

impl SpatialValue {
    /// Parse `[SRID=n;]WKT` under a `Geography` or `Geometry` root.
    pub fn parse(root: PrimitiveKind, text: &str) -> Result<Self, LiteralError> {
        let invalid = || LiteralError::InvalidSpatial {
            text: text.to_string(),
        };

        let (srid, wkt) = match text.split_once(';') {
            Some((prefix, rest)) => {
                let digits = prefix
                    .trim()
                    .strip_prefix("SRID=")
                    .or_else(|| prefix.trim().strip_prefix("srid="))
                    .ok_or_else(invalid)?;
                let srid = digits.parse::<u32>().map_err(|_| invalid())?;
                (Some(srid), rest.trim())
            }
            None => (None, text.trim()),
        };

        let tag_end = wkt
            .find(|c: char| c == '(' || c.is_whitespace())
            .ok_or_else(invalid)?;
        let tag = wkt[..tag_end].to_ascii_uppercase();
        let shape = match tag.as_str() {
            "POINT" => SpatialShape::Point,
            "LINESTRING" => SpatialShape::LineString,
            "POLYGON" => SpatialShape::Polygon,
            "MULTIPOINT" => SpatialShape::MultiPoint,
            "MULTILINESTRING" => SpatialShape::MultiLineString,
            "MULTIPOLYGON" => SpatialShape::MultiPolygon,
            "GEOMETRYCOLLECTION" | "COLLECTION" => SpatialShape::Collection,
            _ => return Err(invalid()),
        };

        let body = wkt[tag_end..].trim();
        if !(body.eq_ignore_ascii_case("EMPTY") || balanced_parens(body)) {
            return Err(invalid());
        }

        Ok(Self {
            kind: shape.kind_under(root).ok_or_else(invalid)?,
            srid,
            wkt: wkt.to_string(),
        })
    }

    /// Root kind (`Geography` or `Geometry`) of this value.
    #[must_use]
    pub const fn root(&self) -> PrimitiveKind {
        match self.kind.family() {
            PrimitiveFamily::Geometry => PrimitiveKind::Geometry,
            _ => PrimitiveKind::Geography,
        }
    }

    /// Text between the quotes of the prefixed literal form.
    #[must_use]
    pub fn to_literal_body(&self) -> String {
        match self.srid {
            Some(srid) => format!("SRID={srid};{}", self.wkt),
            None => self.wkt.clone(),
        }
    }
}

#[derive(Clone, Copy)]
enum SpatialShape {
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
    Collection,
}

impl SpatialShape {
    const fn kind_under(self, root: PrimitiveKind) -> Option<PrimitiveKind> {
        use PrimitiveKind as K;

        let kind = match (root, self) {
            (K::Geography, Self::Point) => K::GeographyPoint,
            (K::Geography, Self::LineString) => K::GeographyLineString,
            (K::Geography, Self::Polygon) => K::GeographyPolygon,
            (K::Geography, Self::MultiPoint) => K::GeographyMultiPoint,
            (K::Geography, Self::MultiLineString) => K::GeographyMultiLineString,
            (K::Geography, Self::MultiPolygon) => K::GeographyMultiPolygon,
            (K::Geography, Self::Collection) => K::GeographyCollection,
            (K::Geometry, Self::Point) => K::GeometryPoint,
            (K::Geometry, Self::LineString) => K::GeometryLineString,
            (K::Geometry, Self::Polygon) => K::GeometryPolygon,
            (K::Geometry, Self::MultiPoint) => K::GeometryMultiPoint,
            (K::Geometry, Self::MultiLineString) => K::GeometryMultiLineString,
            (K::Geometry, Self::MultiPolygon) => K::GeometryMultiPolygon,
            (K::Geometry, Self::Collection) => K::GeometryCollection,
            _ => return None,
        };

        Some(kind)
    }
}

fn balanced_parens(body: &str) -> bool {
    if !body.starts_with('(') || !body.ends_with(')') {
        return false;
    }

    let mut depth = 0usize;
    for c in body.chars() {
        match c {
            '(' => depth += 1,
            ')' => match depth.checked_sub(1) {
                Some(next) => depth = next,
                None => return false,
            },
            _ => {}
        }
    }

    depth == 0
}

///
/// EnumValue
///
/// Enum literal as written: optional qualified type name plus member text.
/// The text is a member name, a comma-separated flags list, or an integer.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EnumValue {
    pub type_name: Option<String>,
    pub text: String,
}

impl EnumValue {
    #[must_use]
    pub fn new(type_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            type_name: Some(type_name.into()),
            text: text.into(),
        }
    }

    #[must_use]
    pub fn unqualified(text: impl Into<String>) -> Self {
        Self {
            type_name: None,
            text: text.into(),
        }
    }
}

///
/// LiteralError
///
/// Failure to read or write the payload of one literal form.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum LiteralError {
    #[error("invalid {kind} literal '{text}'")]
    Invalid { kind: PrimitiveKind, text: String },

    #[error("{kind} literal '{text}' is out of range")]
    OutOfRange { kind: PrimitiveKind, text: String },

    #[error("invalid spatial literal '{text}'")]
    InvalidSpatial { text: String },

    #[error("cannot format {kind} value: {reason}")]
    Unformattable { kind: PrimitiveKind, reason: String },
}
