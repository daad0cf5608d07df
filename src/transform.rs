//! Error normalization.
//!
//! Every failed request, whatever went wrong, is turned into one
//! [`TransformedError`] so callers render errors without knowing about
//! transports or payload shapes. Per-field messages go to forms; the
//! notification message goes to a toast.

use crate::constants;
use crate::request::response::ResponseFailure;
use crate::request::Method;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Field name to the messages reported for that field
pub type FormErrors = BTreeMap<String, Vec<String>>;

/// What kind of failure produced the error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorReason {
    Network,
    Parse,
    Server,
}

impl fmt::Display for ErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Network => "network",
            Self::Parse => "parse",
            Self::Server => "server",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorValue {
    pub form_errors: FormErrors,
    pub message_for_notification: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformedError {
    pub reason: ErrorReason,
    pub value: ErrorValue,
    pub status: Option<u16>,
    pub debug_message: String,
}

impl fmt::Display for TransformedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value.message_for_notification)
    }
}

impl TransformedError {
    fn with_message(reason: ErrorReason, status: Option<u16>, message: &str, debug_message: String) -> Self {
        let mut form_errors = FormErrors::new();
        form_errors.insert(
            constants::FORM_ERRORS_INTERNAL.to_string(),
            vec![message.to_string()],
        );
        Self {
            reason,
            value: ErrorValue {
                form_errors,
                message_for_notification: message.to_string(),
            },
            status,
            debug_message,
        }
    }

    /// Transport-level failure: the request never got an HTTP response.
    #[must_use]
    pub fn network(method: Method, url: &str, detail: &str) -> Self {
        Self::with_message(
            ErrorReason::Network,
            None,
            constants::MSG_NETWORK_ERROR,
            format!("{method} {url}: network error: {detail}"),
        )
    }

    /// The response arrived but its body could not be decoded.
    #[must_use]
    pub fn parse(method: Method, url: &str, status: Option<u16>, detail: &str) -> Self {
        Self::with_message(
            ErrorReason::Parse,
            status,
            constants::MSG_PARSE_ERROR,
            format!("{method} {url}: could not parse response: {detail}"),
        )
    }

    /// Messages reported for `field`, empty if none.
    #[must_use]
    pub fn field_errors(&self, field: &str) -> &[String] {
        self.value
            .form_errors
            .get(field)
            .map_or(&[][..], Vec::as_slice)
    }
}

/// Raw failure handed to [`process_go_error`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseError {
    Network(String),
    Parse(String),
    Server(ResponseFailure),
}

/// What the body of a failed response told us
enum BodyError {
    Message(String),
    Fields(FormErrors),
    Unrecognized,
}

/// Fallback notification when the body carries nothing usable.
#[must_use]
pub const fn fallback_message(method: Method, status: u16) -> &'static str {
    if status >= 500 {
        return constants::MSG_INTERNAL_SERVER_ERROR;
    }
    match (method, status) {
        (Method::Get, _) => constants::MSG_LOAD_FAILED,
        (_, 401) => constants::MSG_PERMISSION_DENIED,
        (_, 413) => constants::MSG_PAYLOAD_TOO_LARGE,
        _ => constants::MSG_ACTION_FAILED,
    }
}

fn flatten_errors(prefix: &str, value: &Value, out: &mut FormErrors) {
    match value {
        Value::Null => {}
        Value::String(s) => out.entry(prefix.to_string()).or_default().push(s.clone()),
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                match item {
                    Value::Object(_) | Value::Array(_) => {
                        flatten_errors(&format!("{prefix}.{index}"), item, out);
                    }
                    other => flatten_errors(prefix, other, out),
                }
            }
        }
        Value::Object(map) => {
            for (key, nested) in map {
                flatten_errors(&format!("{prefix}.{key}"), nested, out);
            }
        }
        other => out.entry(prefix.to_string()).or_default().push(other.to_string()),
    }
}

fn normalize_form_errors(errors: &Map<String, Value>) -> FormErrors {
    let mut out = FormErrors::new();
    for (field, value) in errors {
        flatten_errors(field, value, &mut out);
    }
    out
}

fn inspect_json_body(body: &str) -> BodyError {
    let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) else {
        return BodyError::Unrecognized;
    };

    if let (Some(Value::Number(_)), Some(Value::String(message))) =
        (map.get("statusCode"), map.get("error_message"))
    {
        return BodyError::Message(message.clone());
    }

    if let Some(Value::Object(errors)) = map.get("errors") {
        return BodyError::Fields(normalize_form_errors(errors));
    }

    BodyError::Unrecognized
}

fn inspect_body(failure: &ResponseFailure) -> BodyError {
    let is_json = failure
        .content_type
        .as_deref()
        .is_some_and(constants::is_json_content_type);

    if is_json {
        inspect_json_body(&failure.body)
    } else if failure.body.trim().is_empty() {
        BodyError::Unrecognized
    } else {
        BodyError::Message(failure.body.clone())
    }
}

/// Normalizes any request failure into a [`TransformedError`].
///
/// Recognized error bodies, in priority order: the legacy
/// `{statusCode, error_message}` shape, the `{errors: {field: [...]}}` shape,
/// and plain non-JSON text. Anything else falls back to a message chosen by
/// method and status. The notification message is never empty.
#[must_use]
pub fn process_go_error(error: ResponseError, url: &str, method: Method) -> TransformedError {
    let failure = match error {
        ResponseError::Network(detail) => return TransformedError::network(method, url, &detail),
        ResponseError::Parse(detail) => return TransformedError::parse(method, url, None, &detail),
        ResponseError::Server(failure) => failure,
    };

    let status = failure.status;
    let fallback = fallback_message(method, status);
    let debug_message = format!(
        "{method} {url}: HTTP {status}: {}",
        if failure.body.is_empty() {
            "(empty response)"
        } else {
            failure.body.as_str()
        }
    );

    let (form_errors, message) = match inspect_body(&failure) {
        BodyError::Message(message) if !message.trim().is_empty() => {
            let mut form_errors = FormErrors::new();
            form_errors.insert(
                constants::FORM_ERRORS_INTERNAL.to_string(),
                vec![message.clone()],
            );
            (form_errors, message)
        }
        BodyError::Fields(form_errors) => {
            let message = form_errors
                .get(constants::FORM_ERRORS_NON_FIELD)
                .filter(|messages| !messages.is_empty())
                .map_or_else(|| fallback.to_string(), |messages| messages.join(" "));
            (form_errors, message)
        }
        BodyError::Message(_) | BodyError::Unrecognized => {
            let mut form_errors = FormErrors::new();
            form_errors.insert(
                constants::FORM_ERRORS_INTERNAL.to_string(),
                vec![fallback.to_string()],
            );
            (form_errors, fallback.to_string())
        }
    };

    TransformedError {
        reason: ErrorReason::Server,
        value: ErrorValue {
            form_errors,
            message_for_notification: message,
        },
        status: Some(status),
        debug_message,
    }
}
