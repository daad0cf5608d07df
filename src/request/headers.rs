//! Header construction: authorization, language selection and content
//! negotiation.

use super::{Method, RequestOptions};
use crate::constants;
use crate::context::{Language, RequestContext};
use crate::error::Error;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

/// Picks the `Accept-Language` for a request.
///
/// Reads follow the UI language unless English is enforced for the query;
/// writes go out in English unless the caller opts into the UI language.
#[must_use]
pub fn select_language(context: &RequestContext, method: Method, options: &RequestOptions) -> Language {
    let use_current = if method.is_mutating() {
        options.use_current_language_for_mutation
    } else {
        !options.enforce_english_for_query
    };

    if use_current {
        context.language.clone()
    } else {
        Language::english()
    }
}

/// Validates that a header value doesn't contain control characters
fn validate_header_value(name: &str, value: &str) -> Result<(), Error> {
    if value.chars().any(|c| c == '\r' || c == '\n' || c == '\0') {
        return Err(Error::InvalidHeaderValue {
            name: name.to_string(),
            reason: "Header value contains invalid control characters (newline, carriage return, or null)".to_string(),
        });
    }
    Ok(())
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, Error> {
    validate_header_value(name, value)?;
    HeaderValue::from_str(value).map_err(|e| Error::InvalidHeaderValue {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

/// Builds the headers for one request.
///
/// `Content-Type` is left unset for multipart bodies so the boundary chosen by
/// the encoder is the one that goes on the wire.
///
/// # Errors
///
/// Returns an error if the token cannot be used as a header value.
pub fn build_headers(
    context: &RequestContext,
    method: Method,
    options: &RequestOptions,
) -> Result<HeaderMap, Error> {
    let mut headers = HeaderMap::new();

    if let Some(token) = context.token.as_deref() {
        let auth = format!("{} {token}", constants::AUTH_SCHEME_TOKEN);
        headers.insert(
            HeaderName::from_static("authorization"),
            header_value(constants::HEADER_AUTHORIZATION, &auth)?,
        );
    }

    let language = select_language(context, method, options);
    headers.insert(
        HeaderName::from_static("accept-language"),
        header_value(constants::HEADER_ACCEPT_LANGUAGE, language.as_str())?,
    );

    let mime = HeaderValue::from_static(options.content.mime());
    headers.insert(HeaderName::from_static("accept"), mime.clone());
    if !options.form_data {
        headers.insert(HeaderName::from_static("content-type"), mime);
    }

    Ok(headers)
}
