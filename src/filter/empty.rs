//! Semantic emptiness of filter values.
//!
//! `null`, blank strings and empty arrays are empty. `0` and `false` are not:
//! they are deliberate choices. `NaN` serializes to `null` and so counts as
//! empty too.

use serde::Serialize;
use serde_json::Value;

/// Whether a single filter value carries nothing.
#[must_use]
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.values().all(is_empty_value),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Whether any field of `filter` holds a non-empty value.
///
/// A filter that cannot be serialized is treated as empty.
#[must_use]
pub fn is_filtered<F: Serialize>(filter: &F) -> bool {
    serde_json::to_value(filter).is_ok_and(|value| !is_empty_value(&value))
}
