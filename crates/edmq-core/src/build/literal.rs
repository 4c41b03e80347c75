use crate::{
    build::BuildError,
    value::{LiteralError, LiteralValue, text},
};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

/// Characters escaped inside quoted literal bodies.
///
/// `'` stays literal; embedded quotes are doubled instead.
const LITERAL_BODY: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Encode one literal in its URI form.
///
/// Whole doubles and decimals keep a fractional digit (`100.0`,
/// `100.0M`); Int64 takes `L` and Single takes `f`.
pub fn encode_literal(value: &LiteralValue) -> Result<String, BuildError> {
    let encoded = match value {
        LiteralValue::Null => "null".to_string(),
        LiteralValue::Boolean(b) => b.to_string(),
        LiteralValue::Byte(n) => n.to_string(),
        LiteralValue::SByte(n) => n.to_string(),
        LiteralValue::Int16(n) => n.to_string(),
        LiteralValue::Int32(n) => n.to_string(),
        LiteralValue::Int64(n) => format!("{n}L"),
        // non-finite singles read back through the Double keywords
        LiteralValue::Single(n) if !n.is_finite() => text::format_single(*n),
        LiteralValue::Single(n) => format!("{}f", text::format_single(*n)),
        LiteralValue::Double(n) => text::format_double(*n),
        LiteralValue::Decimal(n) => format!("{}M", text::format_decimal(*n)),
        LiteralValue::String(s) => quoted(s),
        LiteralValue::Binary(bytes) => prefixed("binary", &text::format_binary(bytes)),
        LiteralValue::Guid(guid) => prefixed("guid", &guid.to_string()),
        LiteralValue::DateTime(dt) => {
            prefixed("datetime", &text::format_datetime(*dt).map_err(unsupported)?)
        }
        LiteralValue::DateTimeOffset(dto) => prefixed(
            "datetimeoffset",
            &text::format_datetime_offset(*dto).map_err(unsupported)?,
        ),
        LiteralValue::Time(duration) => prefixed("time", &text::format_duration(*duration)),
        LiteralValue::Geography(spatial) => prefixed("geography", &spatial.to_literal_body()),
        LiteralValue::Geometry(spatial) => prefixed("geometry", &spatial.to_literal_body()),
        LiteralValue::Enum(value) => match &value.type_name {
            Some(type_name) => prefixed(type_name, &value.text),
            None => quoted(&value.text),
        },
    };

    Ok(encoded)
}

fn quoted(body: &str) -> String {
    format!("'{}'", escape_body(body))
}

fn prefixed(prefix: &str, body: &str) -> String {
    format!("{prefix}'{}'", escape_body(body))
}

fn escape_body(body: &str) -> String {
    utf8_percent_encode(&body.replace('\'', "''"), LITERAL_BODY).to_string()
}

fn unsupported(err: LiteralError) -> BuildError {
    let kind = match &err {
        LiteralError::Invalid { kind, .. }
        | LiteralError::OutOfRange { kind, .. }
        | LiteralError::Unformattable { kind, .. } => kind.to_string(),
        LiteralError::InvalidSpatial { .. } => "spatial".to_string(),
    };

    BuildError::UnsupportedLiteral {
        kind,
        reason: err.to_string(),
    }
}

/// Escape free text (custom option values, `$search`) for a query string.
pub(crate) fn escape_query_value(value: &str) -> String {
    utf8_percent_encode(value, LITERAL_BODY).to_string()
}
