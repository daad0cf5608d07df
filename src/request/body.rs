//! Request body encoding: JSON or `multipart/form-data`.

use super::{Method, RequestOptions};
use crate::error::Error;
use bytes::Bytes;
use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Opaque binary attachment (an uploaded document, an image)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub file_name: Option<String>,
    pub mime: Option<String>,
    pub bytes: Bytes,
}

impl Blob {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: None,
            mime: None,
            bytes: bytes.into(),
        }
    }

    #[must_use]
    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }
}

/// One field of a [`Body::Fields`] body
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Value(Value),
    Blob(Blob),
    List(Vec<FieldValue>),
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<Blob> for FieldValue {
    fn from(blob: Blob) -> Self {
        Self::Blob(blob)
    }
}

/// Request payload.
///
/// `Json` covers ordinary bodies. `Fields` is an object whose values may be
/// binary attachments, which only the multipart encoding can carry.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Json(Value),
    Fields(IndexMap<String, FieldValue>),
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<IndexMap<String, FieldValue>> for Body {
    fn from(fields: IndexMap<String, FieldValue>) -> Self {
        Self::Fields(fields)
    }
}

/// A single multipart entry
#[derive(Debug, Clone, PartialEq)]
pub enum FormEntry {
    Text(String),
    Blob(Blob),
}

/// Ordered multipart entries. A key appears once per value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormFields {
    entries: Vec<(String, FormEntry)>,
}

impl FormFields {
    #[must_use]
    pub fn entries(&self) -> &[(String, FormEntry)] {
        &self.entries
    }

    /// Every entry stored under `key`, in order.
    #[must_use]
    pub fn get_all(&self, key: &str) -> Vec<&FormEntry> {
        self.entries
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, entry)| entry)
            .collect()
    }

    /// Text values stored under `key`, in order.
    #[must_use]
    pub fn texts(&self, key: &str) -> Vec<&str> {
        self.get_all(key)
            .into_iter()
            .filter_map(|entry| match entry {
                FormEntry::Text(text) => Some(text.as_str()),
                FormEntry::Blob(_) => None,
            })
            .collect()
    }

    fn push_text(&mut self, key: &str, text: String) {
        self.entries.push((key.to_string(), FormEntry::Text(text)));
    }

    fn push_field(&mut self, key: &str, value: &FieldValue) {
        match value {
            FieldValue::Value(Value::Array(items)) => {
                for item in items {
                    self.push_text(key, stringify(item));
                }
            }
            FieldValue::Value(other) => self.push_text(key, stringify(other)),
            FieldValue::Blob(blob) => self
                .entries
                .push((key.to_string(), FormEntry::Blob(blob.clone()))),
            FieldValue::List(items) => {
                for item in items {
                    self.push_field(key, item);
                }
            }
        }
    }

    /// Converts the entries into a `reqwest` multipart form.
    ///
    /// # Errors
    ///
    /// Returns an error if a blob carries an unparseable MIME type.
    pub fn into_multipart(self) -> Result<reqwest::multipart::Form, Error> {
        let mut form = reqwest::multipart::Form::new();
        for (key, entry) in self.entries {
            form = match entry {
                FormEntry::Text(text) => form.text(key, text),
                FormEntry::Blob(blob) => {
                    let mut part = reqwest::multipart::Part::bytes(blob.bytes.to_vec());
                    if let Some(name) = blob.file_name {
                        part = part.file_name(name);
                    }
                    if let Some(mime) = blob.mime {
                        part = part.mime_str(&mime).map_err(|e| {
                            Error::InvalidBody(format!("invalid MIME type '{mime}' for '{key}': {e}"))
                        })?;
                    }
                    form.part(key, part)
                }
            };
        }
        Ok(form)
    }
}

/// Scalar form text: strings verbatim, `null` as an empty string, everything
/// else as its JSON text.
fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Flattens a body into multipart entries.
///
/// Array fields become one entry per element under the same key. `null`
/// fields are still sent, as empty strings, so the key reaches the server.
///
/// # Errors
///
/// Returns an error if a JSON body is not an object.
pub fn to_form_fields(body: &Body) -> Result<FormFields, Error> {
    let mut fields = FormFields::default();
    match body {
        Body::Json(Value::Object(map)) => {
            for (key, value) in map {
                fields.push_field(key, &FieldValue::Value(value.clone()));
            }
        }
        Body::Json(other) => {
            return Err(Error::InvalidBody(format!(
                "form encoding needs an object body, got {}",
                json_kind(other)
            )));
        }
        Body::Fields(map) => {
            for (key, value) in map {
                fields.push_field(key, value);
            }
        }
    }
    Ok(fields)
}

/// Converts a body into JSON.
///
/// # Errors
///
/// Returns an error if the body holds a binary attachment.
pub fn to_json(body: &Body) -> Result<Value, Error> {
    fn field_to_json(key: &str, value: &FieldValue) -> Result<Value, Error> {
        match value {
            FieldValue::Value(v) => Ok(v.clone()),
            FieldValue::Blob(_) => Err(Error::InvalidBody(format!(
                "field '{key}' holds a file attachment and cannot be sent as JSON"
            ))),
            FieldValue::List(items) => items
                .iter()
                .map(|item| field_to_json(key, item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
        }
    }

    match body {
        Body::Json(value) => Ok(value.clone()),
        Body::Fields(map) => {
            let mut object = Map::new();
            for (key, value) in map {
                object.insert(key.clone(), field_to_json(key, value)?);
            }
            Ok(Value::Object(object))
        }
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// A body ready to attach to a request
#[derive(Debug)]
pub enum EncodedBody {
    Json(String),
    Multipart(FormFields),
}

/// Applies the encoding rules for one request.
///
/// Bodyless methods drop the body; `form_data` selects multipart; everything
/// else is JSON text.
///
/// # Errors
///
/// Returns an error if the body cannot be represented in the chosen encoding.
pub fn encode_body(
    body: Option<&Body>,
    method: Method,
    options: &RequestOptions,
) -> Result<Option<EncodedBody>, Error> {
    let Some(body) = body else {
        return Ok(None);
    };
    if !method.has_body() {
        return Ok(None);
    }
    if options.form_data {
        return to_form_fields(body).map(|fields| Some(EncodedBody::Multipart(fields)));
    }
    let json = to_json(body)?;
    Ok(Some(EncodedBody::Json(serde_json::to_string(&json)?)))
}
