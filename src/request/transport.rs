//! One-shot HTTP execution of a [`RequestDescriptor`].
//!
//! The transport applies the cross-cutting transforms (URL resolution,
//! headers, body encoding, response interpretation, error normalization) and
//! knows nothing about request lifecycles; that is the binding layer's job.

use super::body::{encode_body, EncodedBody};
use super::headers::build_headers;
use super::query::append_query;
use super::response::{is_login_redirect, Payload, PayloadKind, ResponseFailure};
use super::url::resolve_url;
use super::{ApiType, RequestDescriptor};
use crate::constants;
use crate::context::RequestContext;
use crate::error::Error;
use crate::logging;
use crate::transform::{process_go_error, ResponseError};
use std::time::{Duration, Instant};
use tracing::debug;

/// Base URL per API type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiBases {
    pub go: String,
    pub risk: String,
}

impl ApiBases {
    pub fn new(go: impl Into<String>, risk: impl Into<String>) -> Self {
        Self {
            go: go.into(),
            risk: risk.into(),
        }
    }

    #[must_use]
    pub fn for_api(&self, api_type: ApiType) -> &str {
        match api_type {
            ApiType::Go => &self.go,
            ApiType::Risk => &self.risk,
        }
    }
}

impl Default for ApiBases {
    fn default() -> Self {
        Self::new(constants::DEFAULT_GO_API_URL, constants::DEFAULT_RISK_API_URL)
    }
}

/// Configuration for timeout behavior
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 10_000,
            request_timeout_ms: constants::DEFAULT_TIMEOUT_SECS * 1000,
        }
    }
}

impl TimeoutConfig {
    #[must_use]
    pub const fn from_secs(request_timeout_secs: u64) -> Self {
        Self {
            connect_timeout_ms: 10_000,
            request_timeout_ms: request_timeout_secs * 1000,
        }
    }
}

/// Creates an HTTP client with timeout configuration
///
/// # Errors
/// Returns an error if the HTTP client cannot be created with the specified configuration
pub fn create_client(timeout_config: &TimeoutConfig) -> Result<reqwest::Client, Error> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_millis(timeout_config.connect_timeout_ms))
        .timeout(Duration::from_millis(timeout_config.request_timeout_ms))
        .build()
        .map_err(|e| Error::config(format!("Failed to create HTTP client: {e}")))
}

/// Issues requests against the configured backends
#[derive(Debug, Clone)]
pub struct Transport {
    client: reqwest::Client,
    bases: ApiBases,
    context: RequestContext,
}

impl Transport {
    #[must_use]
    pub const fn new(client: reqwest::Client, bases: ApiBases, context: RequestContext) -> Self {
        Self {
            client,
            bases,
            context,
        }
    }

    /// Same client and bases, different session snapshot.
    #[must_use]
    pub fn with_context(&self, context: RequestContext) -> Self {
        Self {
            client: self.client.clone(),
            bases: self.bases.clone(),
            context,
        }
    }

    #[must_use]
    pub const fn context(&self) -> &RequestContext {
        &self.context
    }

    #[must_use]
    pub const fn bases(&self) -> &ApiBases {
        &self.bases
    }

    /// Full URL for a descriptor, query string included.
    #[must_use]
    pub fn build_url(&self, descriptor: &RequestDescriptor) -> String {
        let base = self.bases.for_api(descriptor.api_type);
        let url = resolve_url(base, &descriptor.endpoint, &descriptor.path_variables);
        append_query(&url, &descriptor.query)
    }

    /// Sends the request and interprets the response.
    ///
    /// # Errors
    ///
    /// - [`Error::Request`] for every ordinary failure (transport, parse, non-2xx),
    ///   already normalized
    /// - [`Error::LoginRedirect`] when the server bounced the call to a login page
    /// - [`Error::InvalidHeaderValue`] / [`Error::InvalidBody`] when the request
    ///   cannot be built
    #[allow(clippy::too_many_lines)]
    pub async fn execute(&self, descriptor: &RequestDescriptor) -> Result<Payload, Error> {
        let method = descriptor.method;
        let url = self.build_url(descriptor);
        let fail = |error: ResponseError| -> Error {
            let transformed = process_go_error(error, &url, method);
            debug!(target: "godesk::transport", "{}", transformed.debug_message);
            transformed.into()
        };

        let requested = reqwest::Url::parse(&url)
            .map_err(|e| fail(ResponseError::Network(format!("invalid URL: {e}"))))?;
        let headers = build_headers(&self.context, method, &descriptor.options)?;
        let encoded = encode_body(descriptor.body.as_ref(), method, &descriptor.options)?;

        let mut request = self
            .client
            .request(method.to_reqwest(), requested.clone())
            .headers(headers.clone());
        let logged_body = match encoded {
            Some(EncodedBody::Json(text)) => {
                request = request.body(text.clone());
                Some(text)
            }
            Some(EncodedBody::Multipart(fields)) => {
                let summary = format!("<multipart: {} entries>", fields.entries().len());
                request = request.multipart(fields.into_multipart()?);
                Some(summary)
            }
            None => None,
        };

        let max_body_len = logging::get_max_body_len();
        logging::log_request(
            method.as_str(),
            &url,
            &headers,
            logged_body.as_deref(),
            max_body_len,
        );
        let start = Instant::now();

        let response = request
            .send()
            .await
            .map_err(|e| fail(ResponseError::Network(e.to_string())))?;

        if is_login_redirect(&requested, response.url()) {
            return Err(Error::LoginRedirect {
                url: response.url().to_string(),
            });
        }

        let status = response.status();
        let response_headers = response.headers().clone();
        let content_type = response_headers
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            logging::log_response(
                status.as_u16(),
                start.elapsed().as_millis(),
                &response_headers,
                Some(&body),
                max_body_len,
            );
            return Err(fail(ResponseError::Server(ResponseFailure {
                status: status.as_u16(),
                content_type,
                body,
            })));
        }

        match PayloadKind::from_content_type(content_type.as_deref()) {
            PayloadKind::Blob => {
                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| fail(ResponseError::Network(e.to_string())))?;
                logging::log_response(
                    status.as_u16(),
                    start.elapsed().as_millis(),
                    &response_headers,
                    Some(&format!("<binary: {} bytes>", bytes.len())),
                    max_body_len,
                );
                Ok(Payload::Blob(bytes))
            }
            kind => {
                let text = response
                    .text()
                    .await
                    .map_err(|e| fail(ResponseError::Network(e.to_string())))?;
                logging::log_response(
                    status.as_u16(),
                    start.elapsed().as_millis(),
                    &response_headers,
                    Some(&text),
                    max_body_len,
                );
                if kind == PayloadKind::Text {
                    return Ok(Payload::Text(text));
                }
                if text.trim().is_empty() {
                    return Ok(Payload::Json(serde_json::Value::Null));
                }
                serde_json::from_str(&text)
                    .map(Payload::Json)
                    .map_err(|e| fail(ResponseError::Parse(e.to_string())))
            }
        }
    }
}
