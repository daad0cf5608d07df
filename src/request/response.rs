//! Response interpretation and typed decoding.

use crate::constants;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A successfully interpreted response body
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// `application/json` bodies, parsed
    Json(Value),
    /// Spreadsheet downloads, kept opaque
    Blob(Bytes),
    /// Anything else, as text
    Text(String),
}

/// How a successful body is to be read, decided from its content type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Json,
    Blob,
    Text,
}

impl PayloadKind {
    #[must_use]
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        match content_type {
            Some(ct) if constants::is_spreadsheet_content_type(ct) => Self::Blob,
            Some(ct) if constants::is_json_content_type(ct) => Self::Json,
            _ => Self::Text,
        }
    }
}

/// A non-2xx response, captured for the error transform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseFailure {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

/// True when a followed redirect landed on a login page.
#[must_use]
pub fn is_login_redirect(requested: &reqwest::Url, final_url: &reqwest::Url) -> bool {
    requested != final_url && final_url.path().contains("login")
}

/// Conversion from a [`Payload`] into the type a binding exposes.
pub trait ResponseBody: Sized + Clone + Send + Sync + 'static {
    /// # Errors
    ///
    /// Returns a description of the mismatch when the payload cannot be read
    /// as `Self`; the binding reports it as a parse failure.
    fn from_payload(payload: Payload) -> Result<Self, String>;
}

impl ResponseBody for Payload {
    fn from_payload(payload: Payload) -> Result<Self, String> {
        Ok(payload)
    }
}

impl ResponseBody for Value {
    fn from_payload(payload: Payload) -> Result<Self, String> {
        match payload {
            Payload::Json(value) => Ok(value),
            Payload::Text(text) => Ok(Self::String(text)),
            Payload::Blob(_) => Err("expected JSON, got a binary body".to_string()),
        }
    }
}

impl ResponseBody for String {
    fn from_payload(payload: Payload) -> Result<Self, String> {
        match payload {
            Payload::Text(text) => Ok(text),
            Payload::Json(value) => Ok(value.to_string()),
            Payload::Blob(bytes) => {
                Self::from_utf8(bytes.to_vec()).map_err(|e| format!("binary body is not UTF-8: {e}"))
            }
        }
    }
}

impl ResponseBody for Bytes {
    fn from_payload(payload: Payload) -> Result<Self, String> {
        match payload {
            Payload::Blob(bytes) => Ok(bytes),
            Payload::Text(text) => Ok(Self::from(text)),
            Payload::Json(value) => Ok(Self::from(value.to_string())),
        }
    }
}

/// Typed JSON response wrapper.
#[derive(Debug, Clone, PartialEq)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> std::ops::Deref for Json<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> ResponseBody for Json<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    fn from_payload(payload: Payload) -> Result<Self, String> {
        match payload {
            Payload::Json(value) => serde_json::from_value(value)
                .map(Json)
                .map_err(|e| e.to_string()),
            Payload::Text(text) => serde_json::from_str(&text)
                .map(Json)
                .map_err(|e| e.to_string()),
            Payload::Blob(_) => Err("expected JSON, got a binary body".to_string()),
        }
    }
}
