use super::{text::*, *};
use time::macros::datetime;

#[test]
fn duration_text_reads_back() {
    for text in ["PT0S", "P1DT2H", "PT12H30M15.5S", "-PT1M", "P3D", "PT0.000000001S"] {
        let value = parse_duration(text).expect("duration should parse");
        assert_eq!(parse_duration(&format_duration(value)), Ok(value), "{text}");
    }

    assert_eq!(
        parse_duration("PT12H30M15.5S"),
        Ok(Duration::hours(12) + Duration::minutes(30) + Duration::milliseconds(15_500))
    );
    assert_eq!(format_duration(Duration::hours(26)), "P1DT2H");
}

#[test]
fn duration_rejects_malformed_designators() {
    for text in ["", "P", "PT", "T1H", "PT1S1M", "PT1H1H", "PT1X", "P1Y"] {
        assert!(parse_duration(text).is_err(), "{text} should not parse");
    }
}

#[test]
fn datetime_accepts_optional_seconds() {
    assert_eq!(
        parse_datetime("2012-05-01T10:20"),
        Ok(datetime!(2012-05-01 10:20))
    );
    assert_eq!(
        parse_datetime("2012-05-01T10:20:30.25"),
        Ok(datetime!(2012-05-01 10:20:30.25))
    );
    assert_eq!(
        format_datetime(datetime!(2012-05-01 10:20)).as_deref(),
        Ok("2012-05-01T10:20:00")
    );
}

#[test]
fn double_text_always_has_fraction() {
    assert_eq!(format_double(100.0), "100.0");
    assert_eq!(format_double(-2.5), "-2.5");
    assert_eq!(format_double(f64::NAN), "NaN");
    assert_eq!(format_double(f64::NEG_INFINITY), "-INF");
    assert_eq!(format_decimal(Decimal::from(100)), "100.0");
}

#[test]
fn spatial_body_keeps_srid_and_shape() {
    let value = SpatialValue::parse(PrimitiveKind::Geography, "SRID=4326;POINT(1 2)")
        .expect("point should parse");

    assert_eq!(value.kind, PrimitiveKind::GeographyPoint);
    assert_eq!(value.srid, Some(4326));
    assert_eq!(value.to_literal_body(), "SRID=4326;POINT(1 2)");
    assert_eq!(value.root(), PrimitiveKind::Geography);

    let empty = SpatialValue::parse(PrimitiveKind::Geometry, "LINESTRING EMPTY")
        .expect("empty linestring should parse");
    assert_eq!(empty.kind, PrimitiveKind::GeometryLineString);

    assert!(SpatialValue::parse(PrimitiveKind::Geometry, "CIRCLE(1 2)").is_err());
    assert!(SpatialValue::parse(PrimitiveKind::Geometry, "POINT(1 2").is_err());
}

#[test]
fn literal_kinds_follow_values() {
    assert_eq!(LiteralValue::Int64(1).kind(), PrimitiveKind::Int64);
    assert_eq!(LiteralValue::Null.kind(), PrimitiveKind::None);
    assert_eq!(
        LiteralValue::Enum(EnumValue::unqualified("Monday")).kind(),
        PrimitiveKind::None
    );
    assert_eq!(LiteralValue::Byte(7).as_i64(), Some(7));
    assert!(LiteralValue::Null.type_ref().is_none());
}
