///
/// Primitive kind registry
///
/// Single source of truth for per-kind metadata. Every classification
/// question (integral, temporal, spatial, literal prefix) is answered by
/// expanding this table, never by looking at type names.
///

#[macro_export]
macro_rules! primitive_kind_registry_entries {
    ($macro:ident $(, @args $($args:tt)+ )?) => {
        $macro! {
            $(
                @args $($args)+;
            )?
            @entries
            (
                None,
                "Edm.None",
                None,
                literal_prefix = None,
                is_integral = false,
                is_floating = false,
                is_temporal = false,
                is_spatial = false
            ),
            (
                Binary,
                "Edm.Binary",
                Binary,
                literal_prefix = Some("binary"),
                is_integral = false,
                is_floating = false,
                is_temporal = false,
                is_spatial = false
            ),
            (
                Boolean,
                "Edm.Boolean",
                Boolean,
                literal_prefix = None,
                is_integral = false,
                is_floating = false,
                is_temporal = false,
                is_spatial = false
            ),
            (
                Byte,
                "Edm.Byte",
                Integral,
                literal_prefix = None,
                is_integral = true,
                is_floating = false,
                is_temporal = false,
                is_spatial = false
            ),
            (
                DateTime,
                "Edm.DateTime",
                Temporal,
                literal_prefix = Some("datetime"),
                is_integral = false,
                is_floating = false,
                is_temporal = true,
                is_spatial = false
            ),
            (
                DateTimeOffset,
                "Edm.DateTimeOffset",
                Temporal,
                literal_prefix = Some("datetimeoffset"),
                is_integral = false,
                is_floating = false,
                is_temporal = true,
                is_spatial = false
            ),
            (
                Decimal,
                "Edm.Decimal",
                Decimal,
                literal_prefix = None,
                is_integral = false,
                is_floating = false,
                is_temporal = false,
                is_spatial = false
            ),
            (
                Double,
                "Edm.Double",
                Floating,
                literal_prefix = None,
                is_integral = false,
                is_floating = true,
                is_temporal = false,
                is_spatial = false
            ),
            (
                Guid,
                "Edm.Guid",
                Identifier,
                literal_prefix = Some("guid"),
                is_integral = false,
                is_floating = false,
                is_temporal = false,
                is_spatial = false
            ),
            (
                Int16,
                "Edm.Int16",
                Integral,
                literal_prefix = None,
                is_integral = true,
                is_floating = false,
                is_temporal = false,
                is_spatial = false
            ),
            (
                Int32,
                "Edm.Int32",
                Integral,
                literal_prefix = None,
                is_integral = true,
                is_floating = false,
                is_temporal = false,
                is_spatial = false
            ),
            (
                Int64,
                "Edm.Int64",
                Integral,
                literal_prefix = None,
                is_integral = true,
                is_floating = false,
                is_temporal = false,
                is_spatial = false
            ),
            (
                SByte,
                "Edm.SByte",
                Integral,
                literal_prefix = None,
                is_integral = true,
                is_floating = false,
                is_temporal = false,
                is_spatial = false
            ),
            (
                Single,
                "Edm.Single",
                Floating,
                literal_prefix = None,
                is_integral = false,
                is_floating = true,
                is_temporal = false,
                is_spatial = false
            ),
            (
                String,
                "Edm.String",
                Textual,
                literal_prefix = None,
                is_integral = false,
                is_floating = false,
                is_temporal = false,
                is_spatial = false
            ),
            (
                Stream,
                "Edm.Stream",
                Stream,
                literal_prefix = None,
                is_integral = false,
                is_floating = false,
                is_temporal = false,
                is_spatial = false
            ),
            (
                Time,
                "Edm.Time",
                Temporal,
                literal_prefix = Some("time"),
                is_integral = false,
                is_floating = false,
                is_temporal = true,
                is_spatial = false
            ),
            (
                Geography,
                "Edm.Geography",
                Geography,
                literal_prefix = Some("geography"),
                is_integral = false,
                is_floating = false,
                is_temporal = false,
                is_spatial = true
            ),
            (
                GeographyPoint,
                "Edm.GeographyPoint",
                Geography,
                literal_prefix = Some("geography"),
                is_integral = false,
                is_floating = false,
                is_temporal = false,
                is_spatial = true
            ),
            (
                GeographyLineString,
                "Edm.GeographyLineString",
                Geography,
                literal_prefix = Some("geography"),
                is_integral = false,
                is_floating = false,
                is_temporal = false,
                is_spatial = true
            ),
            (
                GeographyPolygon,
                "Edm.GeographyPolygon",
                Geography,
                literal_prefix = Some("geography"),
                is_integral = false,
                is_floating = false,
                is_temporal = false,
                is_spatial = true
            ),
            (
                GeographyCollection,
                "Edm.GeographyCollection",
                Geography,
                literal_prefix = Some("geography"),
                is_integral = false,
                is_floating = false,
                is_temporal = false,
                is_spatial = true
            ),
            (
                GeographyMultiPolygon,
                "Edm.GeographyMultiPolygon",
                Geography,
                literal_prefix = Some("geography"),
                is_integral = false,
                is_floating = false,
                is_temporal = false,
                is_spatial = true
            ),
            (
                GeographyMultiLineString,
                "Edm.GeographyMultiLineString",
                Geography,
                literal_prefix = Some("geography"),
                is_integral = false,
                is_floating = false,
                is_temporal = false,
                is_spatial = true
            ),
            (
                GeographyMultiPoint,
                "Edm.GeographyMultiPoint",
                Geography,
                literal_prefix = Some("geography"),
                is_integral = false,
                is_floating = false,
                is_temporal = false,
                is_spatial = true
            ),
            (
                Geometry,
                "Edm.Geometry",
                Geometry,
                literal_prefix = Some("geometry"),
                is_integral = false,
                is_floating = false,
                is_temporal = false,
                is_spatial = true
            ),
            (
                GeometryPoint,
                "Edm.GeometryPoint",
                Geometry,
                literal_prefix = Some("geometry"),
                is_integral = false,
                is_floating = false,
                is_temporal = false,
                is_spatial = true
            ),
            (
                GeometryLineString,
                "Edm.GeometryLineString",
                Geometry,
                literal_prefix = Some("geometry"),
                is_integral = false,
                is_floating = false,
                is_temporal = false,
                is_spatial = true
            ),
            (
                GeometryPolygon,
                "Edm.GeometryPolygon",
                Geometry,
                literal_prefix = Some("geometry"),
                is_integral = false,
                is_floating = false,
                is_temporal = false,
                is_spatial = true
            ),
            (
                GeometryCollection,
                "Edm.GeometryCollection",
                Geometry,
                literal_prefix = Some("geometry"),
                is_integral = false,
                is_floating = false,
                is_temporal = false,
                is_spatial = true
            ),
            (
                GeometryMultiPolygon,
                "Edm.GeometryMultiPolygon",
                Geometry,
                literal_prefix = Some("geometry"),
                is_integral = false,
                is_floating = false,
                is_temporal = false,
                is_spatial = true
            ),
            (
                GeometryMultiLineString,
                "Edm.GeometryMultiLineString",
                Geometry,
                literal_prefix = Some("geometry"),
                is_integral = false,
                is_floating = false,
                is_temporal = false,
                is_spatial = true
            ),
            (
                GeometryMultiPoint,
                "Edm.GeometryMultiPoint",
                Geometry,
                literal_prefix = Some("geometry"),
                is_integral = false,
                is_floating = false,
                is_temporal = false,
                is_spatial = true
            ),
        }
    };
}

#[macro_export]
macro_rules! primitive_kind_registry {
    ($macro:ident) => {
        $crate::primitive_kind_registry_entries!($macro)
    };
    ($macro:ident, $($args:tt)+) => {
        $crate::primitive_kind_registry_entries!($macro, @args $($args)+)
    };
}

macro_rules! metadata_from_registry {
    ( @args $kind:expr; @entries $( ($variant:ident, $full_name:literal, $family:ident, literal_prefix = $literal_prefix:expr, is_integral = $is_integral:expr, is_floating = $is_floating:expr, is_temporal = $is_temporal:expr, is_spatial = $is_spatial:expr) ),* $(,)? ) => {
        match $kind {
            $(
                $crate::PrimitiveKind::$variant => $crate::PrimitiveMetadata {
                    full_name: $full_name,
                    family: $crate::PrimitiveFamily::$family,
                    literal_prefix: $literal_prefix,
                    is_integral: $is_integral,
                    is_floating: $is_floating,
                    is_temporal: $is_temporal,
                    is_spatial: $is_spatial,
                },
            )*
        }
    };
}

macro_rules! all_kinds_from_registry {
    ( @entries $( ($variant:ident, $full_name:literal, $family:ident, literal_prefix = $literal_prefix:expr, is_integral = $is_integral:expr, is_floating = $is_floating:expr, is_temporal = $is_temporal:expr, is_spatial = $is_spatial:expr) ),* $(,)? ) => {
        [ $( $crate::PrimitiveKind::$variant ),* ]
    };
}
