//! Query parameter maps and their serialization into a URL query string.

use indexmap::IndexMap;
use serde_json::Value;

/// Outgoing query parameters, keyed by parameter name.
///
/// Equality ignores insertion order, so two maps holding the same pairs
/// describe the same request.
pub type Query = IndexMap<String, Value>;

/// Renders a single query value, or `None` when the parameter should be left
/// out of the URL entirely.
///
/// `null`, blank strings and empty arrays are omitted. Arrays are joined with
/// commas, which is how the GO API reads multi-select filters such as
/// `region=1,2`.
#[must_use]
pub fn encode_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(encode_value).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(","))
            }
        }
        Value::Object(_) => Some(value.to_string()),
    }
}

/// Serializes a query map to `key=value&...` with percent-encoding.
///
/// Returns an empty string when every parameter is omitted.
#[must_use]
pub fn to_query_string(query: &Query) -> String {
    query
        .iter()
        .filter_map(|(key, value)| {
            encode_value(value).map(|encoded| {
                format!(
                    "{}={}",
                    urlencoding::encode(key),
                    urlencoding::encode(&encoded)
                )
            })
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Appends the serialized query to `url`, respecting an existing `?`.
#[must_use]
pub fn append_query(url: &str, query: &Query) -> String {
    let query_string = to_query_string(query);
    if query_string.is_empty() {
        return url.to_string();
    }
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{query_string}")
}
