//! Rendering of response data and CLI listings.
//!
//! Everything here returns strings; the command handlers decide where they go.

use super::OutputFormat;
use crate::api::EndpointInfo;
use crate::config::settings::SettingInfo;
use crate::error::Error;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;
use tabled::builder::Builder;
use tabled::{Table, Tabled};

/// Maximum rows shown in table format before asking for JSON instead
const MAX_TABLE_ROWS: usize = 1000;

/// Longest cell text before it is cut with an ellipsis
const MAX_CELL_CHARS: usize = 60;

#[derive(Tabled)]
struct KeyValue {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Value")]
    value: String,
}

#[derive(Tabled)]
struct EndpointRow {
    #[tabled(rename = "Name")]
    name: &'static str,
    #[tabled(rename = "Method")]
    method: String,
    #[tabled(rename = "API")]
    api: String,
    #[tabled(rename = "Path")]
    path: &'static str,
    #[tabled(rename = "Description")]
    description: &'static str,
}

#[derive(Tabled)]
struct SettingRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Type")]
    type_name: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Default")]
    default: String,
    #[tabled(rename = "Description")]
    description: String,
}

/// Renders any serializable value in the requested format.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String, Error> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
        OutputFormat::Table => Ok(render_table(&serde_json::to_value(value)?)),
    }
}

/// Renders JSON as a table.
///
/// Paginated envelopes (`{count, results}`) and arrays of objects become one
/// row per item with a column per scalar field; other objects become a
/// key/value table.
#[must_use]
pub fn render_table(value: &Value) -> String {
    match value {
        Value::Object(obj) => match obj.get("results") {
            Some(Value::Array(items)) => {
                let mut out = rows_table(items);
                if let Some(count) = obj.get("count").and_then(Value::as_u64) {
                    out.push_str(&format!("\n{} of {count} shown", items.len()));
                }
                out
            }
            _ => key_value_table(obj),
        },
        Value::Array(items) => rows_table(items),
        other => format_cell(other),
    }
}

fn key_value_table(obj: &serde_json::Map<String, Value>) -> String {
    if obj.len() > MAX_TABLE_ROWS {
        return too_large("Object", obj.len());
    }
    let rows: Vec<KeyValue> = obj
        .iter()
        .map(|(key, value)| KeyValue {
            key: key.clone(),
            value: format_cell(value),
        })
        .collect();
    Table::new(rows).to_string()
}

fn rows_table(items: &[Value]) -> String {
    if items.is_empty() {
        return "(no results)".to_string();
    }
    if items.len() > MAX_TABLE_ROWS {
        return too_large("Array", items.len());
    }
    if !items.iter().all(Value::is_object) {
        return items
            .iter()
            .enumerate()
            .map(|(i, item)| format!("{i}: {}", format_cell(item)))
            .collect::<Vec<_>>()
            .join("\n");
    }

    // Scalar columns in first-seen order; nested values are left to JSON output.
    let mut columns: Vec<&str> = Vec::new();
    let mut seen = BTreeSet::new();
    for item in items.iter().filter_map(Value::as_object) {
        for (key, value) in item {
            if !value.is_object() && !value.is_array() && seen.insert(key.as_str()) {
                columns.push(key);
            }
        }
    }

    let mut builder = Builder::default();
    builder.push_record(columns.iter().map(|column| (*column).to_string()));
    for item in items.iter().filter_map(Value::as_object) {
        builder.push_record(
            columns
                .iter()
                .map(|column| item.get(*column).map(format_cell).unwrap_or_default()),
        );
    }
    builder.build().to_string()
}

fn too_large(kind: &str, len: usize) -> String {
    format!(
        "{kind} too large: {len} items (max {MAX_TABLE_ROWS} for table display)\n\
         Use --format json to see the full data"
    )
}

fn format_cell(value: &Value) -> String {
    let text = match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    if text.chars().count() > MAX_CELL_CHARS {
        let cut: String = text.chars().take(MAX_CELL_CHARS - 1).collect();
        format!("{cut}…")
    } else {
        text
    }
}

/// Renders the endpoint registry.
///
/// # Errors
///
/// Returns an error if JSON or YAML serialization fails.
pub fn render_endpoints(endpoints: &[EndpointInfo], format: OutputFormat) -> Result<String, Error> {
    if format == OutputFormat::Table {
        let rows: Vec<EndpointRow> = endpoints
            .iter()
            .map(|info| EndpointRow {
                name: info.name,
                method: info.method.to_string(),
                api: info.api.to_string(),
                path: info.path,
                description: info.description,
            })
            .collect();
        return Ok(Table::new(rows).to_string());
    }
    let listing: Vec<Value> = endpoints
        .iter()
        .map(|info| {
            serde_json::json!({
                "name": info.name,
                "method": info.method.as_str(),
                "api": info.api.as_str(),
                "path": info.path,
                "description": info.description,
                "paginated": info.paginated,
                "pathVariables": info.placeholders(),
            })
        })
        .collect();
    render(&listing, format)
}

/// Renders the settings listing.
///
/// # Errors
///
/// Returns an error if JSON or YAML serialization fails.
pub fn render_settings(settings: &[SettingInfo], format: OutputFormat) -> Result<String, Error> {
    if format != OutputFormat::Table {
        return render(&settings, format);
    }
    let rows: Vec<SettingRow> = settings
        .iter()
        .map(|info| SettingRow {
            key: info.key.clone(),
            type_name: info.type_name.clone(),
            value: info.value.clone(),
            default: info.default.clone(),
            description: info.description.clone(),
        })
        .collect();
    Ok(Table::new(rows).to_string())
}
