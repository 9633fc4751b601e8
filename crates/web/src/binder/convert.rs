//! Conversion of request text to the JSON value of a declared [`Shape`].

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat};
use serde_json::{Number, Value};
use uuid::Uuid;

use crate::error::BindingError;
use crate::shape::{PrimitiveKind, Shape};

const NAIVE_DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Converts path or query text to a value of `shape`.
///
/// Arrays, maps and objects are expected as JSON text. An empty value for a nullable shape
/// is `null`.
pub fn convert_text(parameter: &str, raw: &str, shape: &Shape) -> Result<Value, BindingError> {
    let converted = match shape {
        Shape::Nullable(_) if raw.is_empty() => Some(Value::Null),
        Shape::Nullable(inner) => return convert_text(parameter, raw, inner),
        Shape::Primitive(kind) => convert_primitive(*kind, raw),
        Shape::Enum(shape) => {
            let raw = raw.trim();
            shape.variants.iter().find(|variant| variant.eq_ignore_ascii_case(raw)).map(|variant| Value::String((*variant).to_string()))
        }
        Shape::Array(_) | Shape::Map(_) | Shape::Object(_) => serde_json::from_str::<Value>(raw).ok(),
    };

    converted.ok_or_else(|| BindingError::new(parameter, raw, shape))
}

fn convert_primitive(kind: PrimitiveKind, raw: &str) -> Option<Value> {
    // strings are taken verbatim, every other kind ignores surrounding whitespace
    let trimmed = raw.trim();
    match kind {
        PrimitiveKind::String => Some(Value::String(raw.to_string())),
        PrimitiveKind::Boolean => {
            if trimmed.eq_ignore_ascii_case("true") {
                Some(Value::Bool(true))
            } else if trimmed.eq_ignore_ascii_case("false") {
                Some(Value::Bool(false))
            } else {
                None
            }
        }
        PrimitiveKind::Int32 => trimmed.parse::<i32>().ok().map(Value::from),
        PrimitiveKind::Int64 => trimmed.parse::<i64>().map(Value::from).or_else(|_| trimmed.parse::<u64>().map(Value::from)).ok(),
        PrimitiveKind::Float | PrimitiveKind::Double => trimmed.parse::<f64>().ok().and_then(Number::from_f64).map(Value::Number),
        PrimitiveKind::Uuid => Uuid::parse_str(trimmed).ok().map(|uuid| Value::String(uuid.to_string())),
        PrimitiveKind::Timestamp => {
            parse_timestamp(trimmed).map(|timestamp| Value::String(timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true)))
        }
    }
}

/// Parses RFC 3339, falling back to a naive date-time or a bare date, both taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp);
    }

    NAIVE_DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().and_then(|date| date.and_hms_opt(0, 0, 0)))
        .map(|naive| naive.and_utc().fixed_offset())
}
