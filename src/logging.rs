//! Request and response tracing with credential redaction.
//!
//! Method and URL go out at info, headers at debug, bodies at trace. Headers
//! that carry credentials are never logged verbatim.

use crate::constants;
use reqwest::header::HeaderMap;
use tracing::{debug, info, trace};

const TARGET: &str = "godesk::transport";

/// Redacts sensitive values from strings
#[must_use]
pub fn redact_sensitive_value(value: &str) -> String {
    if value.is_empty() {
        value.to_string()
    } else {
        "[REDACTED]".to_string()
    }
}

fn log_headers(label: &str, headers: &HeaderMap) {
    debug!(target: TARGET, "{label} headers:");
    for (name, value) in headers {
        let raw = String::from_utf8_lossy(value.as_bytes());
        let display_value = if constants::is_auth_header(name.as_str()) {
            redact_sensitive_value(&raw)
        } else {
            raw.into_owned()
        };
        debug!(target: TARGET, "  {}: {}", name.as_str(), display_value);
    }
}

fn truncate(body: &str, max_body_len: usize) -> (&str, bool) {
    if body.len() <= max_body_len {
        return (body, false);
    }
    let mut end = max_body_len;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    (&body[..end], true)
}

fn body_line(label: &str, body: &str, max_body_len: usize) -> String {
    match truncate(body, max_body_len) {
        (shown, true) => format!("{label} body: {shown} (truncated at {max_body_len} chars)"),
        (shown, false) => format!("{label} body: {shown}"),
    }
}

/// Logs an outgoing request
pub fn log_request(
    method: &str,
    url: &str,
    headers: &HeaderMap,
    body: Option<&str>,
    max_body_len: usize,
) {
    info!(target: TARGET, "→ {} {}", method.to_uppercase(), url);
    log_headers("Request", headers);
    if let Some(body_content) = body {
        trace!(target: TARGET, "{}", body_line("Request", body_content, max_body_len));
    }
}

/// Logs a received response
pub fn log_response(
    status: u16,
    duration_ms: u128,
    headers: &HeaderMap,
    body: Option<&str>,
    max_body_len: usize,
) {
    info!(target: TARGET, "← {} ({}ms)", status, duration_ms);
    log_headers("Response", headers);

    if let Some(body_content) = body {
        trace!(target: TARGET, "{}", body_line("Response", body_content, max_body_len));
    }
}

/// Gets the maximum logged body length from `GODESK_LOG_MAX_BODY`
#[must_use]
pub fn get_max_body_len() -> usize {
    std::env::var(constants::ENV_GODESK_LOG_MAX_BODY)
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(constants::DEFAULT_LOG_MAX_BODY)
}
