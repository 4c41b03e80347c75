//! Text forms of the payloads inside prefixed literals.
//!
//! The lexer reads with these and the URI builder writes with them, so a
//! value written here reads back to an equal value.

use crate::value::LiteralError;
use edmq_primitives::PrimitiveKind;
use rust_decimal::Decimal;
use std::{fmt::Write as _, str::FromStr};
use time::{
    Duration, OffsetDateTime, PrimitiveDateTime, format_description::well_known::Rfc3339,
    macros::format_description,
};
use uuid::Uuid;

const NANOS_PER_SECOND: i64 = 1_000_000_000;

fn invalid(kind: PrimitiveKind, text: &str) -> LiteralError {
    LiteralError::Invalid {
        kind,
        text: text.to_string(),
    }
}

//
// DateTime
//

pub fn parse_datetime(text: &str) -> Result<PrimitiveDateTime, LiteralError> {
    let format = format_description!(
        "[year]-[month]-[day]T[hour]:[minute][optional [:[second][optional [.[subsecond]]]]]"
    );

    PrimitiveDateTime::parse(text, format).map_err(|_| invalid(PrimitiveKind::DateTime, text))
}

pub fn format_datetime(value: PrimitiveDateTime) -> Result<String, LiteralError> {
    let formatted = if value.nanosecond() == 0 {
        value.format(format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second]"
        ))
    } else {
        value.format(format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"
        ))
    };

    formatted.map_err(|err| LiteralError::Unformattable {
        kind: PrimitiveKind::DateTime,
        reason: err.to_string(),
    })
}

//
// DateTimeOffset
//

pub fn parse_datetime_offset(text: &str) -> Result<OffsetDateTime, LiteralError> {
    OffsetDateTime::parse(text, &Rfc3339).map_err(|_| invalid(PrimitiveKind::DateTimeOffset, text))
}

pub fn format_datetime_offset(value: OffsetDateTime) -> Result<String, LiteralError> {
    value
        .format(&Rfc3339)
        .map_err(|err| LiteralError::Unformattable {
            kind: PrimitiveKind::DateTimeOffset,
            reason: err.to_string(),
        })
}

//
// Time (ISO-8601 duration)
//

/// Parse `[-]P[nD][T[nH][nM][n[.f]S]]`.
pub fn parse_duration(text: &str) -> Result<Duration, LiteralError> {
    let fail = || invalid(PrimitiveKind::Time, text);

    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let body = body.strip_prefix('P').ok_or_else(fail)?;
    let (date_part, time_part) = match body.split_once('T') {
        Some((date, time)) if !time.is_empty() => (date, Some(time)),
        Some(_) => return Err(fail()),
        None => (body, None),
    };
    if date_part.is_empty() && time_part.is_none() {
        return Err(fail());
    }

    let mut total = Duration::ZERO;

    if !date_part.is_empty() {
        let days = date_part.strip_suffix('D').ok_or_else(fail)?;
        let days = days.parse::<i64>().map_err(|_| fail())?;
        let days = scaled(days, 86_400).ok_or_else(fail)?;
        total = total.checked_add(days).ok_or_else(fail)?;
    }

    if let Some(mut rest) = time_part {
        let mut last_designator = None;
        while !rest.is_empty() {
            let split = rest
                .find(|c: char| !(c.is_ascii_digit() || c == '.'))
                .ok_or_else(fail)?;
            let (number, tail) = rest.split_at(split);
            let designator = tail.chars().next().ok_or_else(fail)?;
            rest = &tail[designator.len_utf8()..];

            // Designators must appear in H, M, S order at most once each.
            let rank = match designator {
                'H' => 0,
                'M' => 1,
                'S' => 2,
                _ => return Err(fail()),
            };
            if number.is_empty() || last_designator.is_some_and(|last| last >= rank) {
                return Err(fail());
            }
            last_designator = Some(rank);

            let component = match designator {
                'S' => parse_seconds(number).ok_or_else(fail)?,
                _ => {
                    let count = number.parse::<i64>().map_err(|_| fail())?;
                    let per = if designator == 'H' { 3_600 } else { 60 };
                    scaled(count, per).ok_or_else(fail)?
                }
            };
            total = total.checked_add(component).ok_or_else(fail)?;
        }
    }

    if negative {
        total = total.checked_neg().ok_or_else(fail)?;
    }

    Ok(total)
}

fn parse_seconds(number: &str) -> Option<Duration> {
    let (whole, fraction) = match number.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (number, ""),
    };
    if whole.is_empty() || fraction.contains('.') {
        return None;
    }

    let seconds = whole.parse::<i64>().ok()?;
    let mut nanos: i64 = 0;
    let mut scale = NANOS_PER_SECOND / 10;
    for digit in fraction.chars().take(9) {
        nanos += i64::from(digit.to_digit(10)?) * scale;
        scale /= 10;
    }

    Duration::seconds(seconds).checked_add(Duration::nanoseconds(nanos))
}

fn scaled(count: i64, seconds_per_unit: i64) -> Option<Duration> {
    count.checked_mul(seconds_per_unit).map(Duration::seconds)
}

#[must_use]
pub fn format_duration(value: Duration) -> String {
    if value.is_zero() {
        return "PT0S".to_string();
    }

    let mut out = String::new();
    if value.is_negative() {
        out.push('-');
    }
    out.push('P');

    let value = value.abs();
    let days = value.whole_days();
    let hours = value.whole_hours() % 24;
    let minutes = value.whole_minutes() % 60;
    let seconds = value.whole_seconds() % 60;
    let nanos = value.subsec_nanoseconds();

    if days != 0 {
        let _ = write!(out, "{days}D");
    }
    if hours != 0 || minutes != 0 || seconds != 0 || nanos != 0 {
        out.push('T');
        if hours != 0 {
            let _ = write!(out, "{hours}H");
        }
        if minutes != 0 {
            let _ = write!(out, "{minutes}M");
        }
        if seconds != 0 || nanos != 0 {
            let _ = write!(out, "{seconds}");
            if nanos != 0 {
                let fraction = format!("{nanos:09}");
                let _ = write!(out, ".{}", fraction.trim_end_matches('0'));
            }
            out.push('S');
        }
    }

    out
}

//
// Guid / Binary
//

pub fn parse_guid(text: &str) -> Result<Uuid, LiteralError> {
    Uuid::parse_str(text).map_err(|_| invalid(PrimitiveKind::Guid, text))
}

pub fn parse_binary(text: &str) -> Result<Vec<u8>, LiteralError> {
    hex::decode(text).map_err(|_| invalid(PrimitiveKind::Binary, text))
}

#[must_use]
pub fn format_binary(bytes: &[u8]) -> String {
    hex::encode_upper(bytes)
}

//
// Numbers
//

pub fn parse_decimal(text: &str) -> Result<Decimal, LiteralError> {
    let parsed = if text.contains(['e', 'E']) {
        Decimal::from_scientific(text)
    } else {
        Decimal::from_str(text)
    };

    parsed.map_err(|_| LiteralError::OutOfRange {
        kind: PrimitiveKind::Decimal,
        text: text.to_string(),
    })
}

/// Decimal text that always carries a fractional part.
#[must_use]
pub fn format_decimal(value: Decimal) -> String {
    let text = value.to_string();
    if text.contains('.') {
        text
    } else {
        format!("{text}.0")
    }
}

/// Double text that always carries a fractional part or exponent.
/// Non-finite values use the `NaN`/`INF`/`-INF` keywords.
#[must_use]
pub fn format_double(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "INF" } else { "-INF" }.to_string();
    }

    // Debug output is the shortest text that reads back to the same bits.
    let text = format!("{value:?}");
    if text.contains(['.', 'e', 'E']) {
        text
    } else {
        format!("{text}.0")
    }
}

#[must_use]
pub fn format_single(value: f32) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "INF" } else { "-INF" }.to_string();
    }

    format!("{value:?}")
}
