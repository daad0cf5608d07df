//! Declarative request descriptions and the transforms that turn them into
//! HTTP calls.
//!
//! A [`RequestDescriptor`] is plain data: two descriptors that compare equal
//! describe the same call, which is what lets the binding layer decide when a
//! new request has to be issued.

pub mod body;
pub mod headers;
pub mod query;
pub mod response;
pub mod transport;
pub mod url;

use crate::constants;
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

pub use body::{Blob, Body, FieldValue, FormFields};
pub use query::Query;
pub use response::{Json, Payload, ResponseBody};
pub use transport::{ApiBases, Transport};

/// HTTP methods the GO API accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Anything other than `GET` changes server state.
    #[must_use]
    pub const fn is_mutating(self) -> bool {
        !matches!(self, Self::Get)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    #[must_use]
    pub const fn has_body(self) -> bool {
        !matches!(self, Self::Get)
    }

    pub(crate) fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Patch => reqwest::Method::PATCH,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            other => Err(crate::error::Error::config(format!(
                "Unsupported HTTP method '{other}'"
            ))),
        }
    }
}

/// Which backend a call targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ApiType {
    #[default]
    Go,
    Risk,
}

impl ApiType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Go => constants::API_TYPE_GO,
            Self::Risk => constants::API_TYPE_RISK,
        }
    }
}

impl fmt::Display for ApiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiType {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            constants::API_TYPE_GO => Ok(Self::Go),
            constants::API_TYPE_RISK => Ok(Self::Risk),
            other => Err(crate::error::Error::config(format!(
                "Unknown API type '{other}', expected 'go' or 'risk'"
            ))),
        }
    }
}

/// Content negotiation for both `Accept` and `Content-Type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentKind {
    #[default]
    Json,
    Csv,
    Spreadsheet,
}

impl ContentKind {
    #[must_use]
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Json => constants::CONTENT_TYPE_JSON,
            Self::Csv => constants::CONTENT_TYPE_CSV,
            Self::Spreadsheet => constants::CONTENT_TYPE_SPREADSHEET,
        }
    }
}

/// Per-request switches with fixed, documented effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RequestOptions {
    /// Encode the body as `multipart/form-data` instead of JSON.
    pub form_data: bool,
    /// `Accept`/`Content-Type` negotiation.
    pub content: ContentKind,
    /// Send `Accept-Language: en` on a `GET` even when the UI language differs.
    pub enforce_english_for_query: bool,
    /// Send the UI language on a mutating request instead of English.
    pub use_current_language_for_mutation: bool,
}

/// Everything needed to issue one call. Compared structurally.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RequestDescriptor {
    pub endpoint: String,
    pub method: Method,
    pub api_type: ApiType,
    pub query: Query,
    pub path_variables: IndexMap<String, String>,
    pub body: Option<Body>,
    pub options: RequestOptions,
    /// Hold the request idle; nothing is sent while set.
    pub skip: bool,
    /// Keep the last successful response visible while a new request runs.
    pub preserve_response: bool,
}

impl RequestDescriptor {
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            method,
            ..Self::default()
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::Get, endpoint)
    }

    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(Method::Post, endpoint)
    }

    #[must_use]
    pub fn with_api(mut self, api_type: ApiType) -> Self {
        self.api_type = api_type;
        self
    }

    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_query_map(mut self, query: Query) -> Self {
        self.query.extend(query);
        self
    }

    #[must_use]
    pub fn with_path_variable(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.path_variables.insert(key.into(), value.to_string());
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn skip(mut self, skip: bool) -> Self {
        self.skip = skip;
        self
    }

    #[must_use]
    pub fn preserve_response(mut self, preserve: bool) -> Self {
        self.preserve_response = preserve;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_descriptor_equality_ignores_query_insertion_order() {
        let a = RequestDescriptor::get("/api/v2/appeal/")
            .with_query("atype", 1)
            .with_query("limit", 10);
        let b = RequestDescriptor::get("/api/v2/appeal/")
            .with_query("limit", 10)
            .with_query("atype", 1);
        assert_eq!(a, b);
    }

    #[test]
    fn test_descriptor_differs_on_query_value() {
        let a = RequestDescriptor::get("/api/v2/appeal/").with_query("offset", 0);
        let b = RequestDescriptor::get("/api/v2/appeal/").with_query("offset", 10);
        assert_ne!(a, b);
    }

    #[test]
    fn test_method_classification() {
        assert!(!Method::Get.is_mutating());
        for method in [Method::Post, Method::Put, Method::Patch, Method::Delete] {
            assert!(method.is_mutating());
        }
        assert_eq!("patch".parse::<Method>().unwrap(), Method::Patch);
        assert!("TRACE".parse::<Method>().is_err());
    }

    #[test]
    fn test_api_type_parse() {
        assert_eq!("risk".parse::<ApiType>().unwrap(), ApiType::Risk);
        assert_eq!("GO".parse::<ApiType>().unwrap(), ApiType::Go);
        assert!("other".parse::<ApiType>().is_err());
    }

    #[test]
    fn test_body_is_part_of_identity() {
        let a = RequestDescriptor::post("/api/v2/field-report/").with_body(json!({"summary": "a"}));
        let b = RequestDescriptor::post("/api/v2/field-report/").with_body(json!({"summary": "b"}));
        assert_ne!(a, b);
    }
}
