//! URL resolution: base selection per API type and `{placeholder}`
//! substitution from path variables.

use indexmap::IndexMap;
use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

// The pattern is a literal; it cannot fail to compile.
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^{}]+)\}").expect("placeholder pattern"));

/// Determines if the input string is an absolute URL (starts with http:// or https://)
#[must_use]
pub fn is_absolute_url(input: &str) -> bool {
    let lower = input.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Names of the `{name}` tokens in `template`, in order.
pub fn placeholder_names(template: &str) -> impl Iterator<Item = &str> {
    PLACEHOLDER
        .captures_iter(template)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
}

/// Replaces every `{name}` token in `template` with its value from
/// `variables`.
///
/// A token with no value is logged and left in place, so the request still
/// goes out with the literal placeholder in its path.
#[must_use]
pub fn substitute_path_variables(template: &str, variables: &IndexMap<String, String>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &regex::Captures<'_>| {
            let key = &caps[1];
            variables.get(key).map_or_else(
                || {
                    warn!(
                        target: "godesk::transport",
                        "value for key \"{key}\" not provided in {template}"
                    );
                    caps[0].to_string()
                },
                |value| urlencoding::encode(value).into_owned(),
            )
        })
        .into_owned()
}

/// Resolves `endpoint` into a full URL.
///
/// Absolute URLs pass through untouched; anything else is joined onto
/// `base_url` with exactly one `/` between them. Placeholders are substituted
/// in both cases.
#[must_use]
pub fn resolve_url(base_url: &str, endpoint: &str, variables: &IndexMap<String, String>) -> String {
    let joined = if is_absolute_url(endpoint) {
        endpoint.to_string()
    } else {
        format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    };
    substitute_path_variables(&joined, variables)
}
