//! Operand coercion to a field's declared type.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{FilterError, FilterResult};
use crate::types::{Collation, DataType, Field, Value};

/// Convert `operand` into a value of `field`'s declared type.
///
/// Identical types pass through, integers widen to floats and convert to/from option set
/// codes when in range. Text operands are parsed into the field type when `coerce_text` is
/// set. Anything else, including a `Null` operand, is a [`FilterError::TypeMismatch`].
pub(crate) fn coerce_operand(
    field: &Field,
    operand: &Value,
    coerce_text: bool,
) -> FilterResult<Value> {
    let coerced = match (field.data_type, operand) {
        (_, Value::Null) => None,
        (DataType::Int64, Value::Int64(v)) => Some(Value::Int64(*v)),
        (DataType::Int64, Value::OptionSet(v)) => Some(Value::Int64(i64::from(*v))),
        (DataType::Float64, Value::Float64(v)) => Some(Value::Float64(*v)),
        (DataType::Float64, Value::Int64(v)) => Some(Value::Float64(*v as f64)),
        (DataType::Bool, Value::Bool(v)) => Some(Value::Bool(*v)),
        (DataType::Utf8, Value::Utf8(v)) => Some(Value::Utf8(v.clone())),
        (DataType::DateTime, Value::DateTime(v)) => Some(Value::DateTime(*v)),
        (DataType::Guid, Value::Guid(v)) => Some(Value::Guid(*v)),
        (DataType::OptionSet, Value::OptionSet(v)) => Some(Value::OptionSet(*v)),
        (DataType::OptionSet, Value::Int64(v)) => i32::try_from(*v).ok().map(Value::OptionSet),
        (data_type, Value::Utf8(text)) if coerce_text => parse_text(data_type, text),
        _ => None,
    };

    coerced.ok_or_else(|| FilterError::TypeMismatch {
        field: field.name.clone(),
        expected: field.data_type.to_string(),
        actual: format!("{} {operand}", operand.type_name()),
    })
}

/// Fold a text operand for comparison under `collation`.
pub(crate) fn fold_operand(value: Value, collation: Collation) -> Value {
    match (value, collation) {
        (Value::Utf8(s), Collation::CaseInsensitive) => Value::Utf8(fold_text(&s)),
        (value, _) => value,
    }
}

/// Lower-case `text` one character at a time.
///
/// Folding is context free, so a folded substring is always a substring of the folded text.
/// `str::to_lowercase` is not (Greek final sigma).
pub(crate) fn fold_text(text: &str) -> String {
    text.chars().flat_map(char::to_lowercase).collect()
}

fn parse_text(data_type: DataType, text: &str) -> Option<Value> {
    let text = text.trim();
    match data_type {
        DataType::Int64 => text.parse().ok().map(Value::Int64),
        DataType::Float64 => text.parse().ok().map(Value::Float64),
        DataType::Bool => match text.to_ascii_lowercase().as_str() {
            "true" | "1" => Some(Value::Bool(true)),
            "false" | "0" => Some(Value::Bool(false)),
            _ => None,
        },
        DataType::DateTime => DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|dt| Value::DateTime(dt.with_timezone(&Utc))),
        DataType::Guid => Uuid::parse_str(text).ok().map(Value::Guid),
        DataType::OptionSet => text.parse().ok().map(Value::OptionSet),
        // Text operands for text fields never reach parsing.
        DataType::Utf8 => None,
    }
}
