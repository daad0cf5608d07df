//! Centralized string constants for godesk
//!
//! Header names, MIME types, environment variables and the fixed
//! user-facing messages produced by error normalization live here so the
//! transport, the error transform and the CLI agree on them.

// HTTP Headers
pub const HEADER_ACCEPT_LANGUAGE: &str = "Accept-Language";
pub const HEADER_AUTHORIZATION: &str = "Authorization";

// Authorization scheme used by the GO API
pub const AUTH_SCHEME_TOKEN: &str = "Token";

// Content Types
pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_CSV: &str = "text/csv";
pub const CONTENT_TYPE_SPREADSHEET: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const CONTENT_TYPE_IDENTIFIER_JSON: &str = "json";

// API discriminators
pub const API_TYPE_GO: &str = "go";
pub const API_TYPE_RISK: &str = "risk";

// Default base URLs
pub const DEFAULT_GO_API_URL: &str = "https://goadmin.ifrc.org";
pub const DEFAULT_RISK_API_URL: &str = "https://go-risk.northeurope.cloudapp.azure.com";

// Environment Variables
pub const ENV_GODESK_CONFIG_DIR: &str = "GODESK_CONFIG_DIR";
pub const ENV_GODESK_GO_URL: &str = "GODESK_GO_URL";
pub const ENV_GODESK_RISK_URL: &str = "GODESK_RISK_URL";
pub const ENV_GODESK_TOKEN: &str = "GODESK_TOKEN";
pub const ENV_GODESK_LOG: &str = "GODESK_LOG";
pub const ENV_GODESK_LOG_FORMAT: &str = "GODESK_LOG_FORMAT";
pub const ENV_GODESK_LOG_FILE: &str = "GODESK_LOG_FILE";
pub const ENV_GODESK_LOG_MAX_BODY: &str = "GODESK_LOG_MAX_BODY";

// Languages
pub const LANGUAGE_ENGLISH: &str = "en";

// Query keys produced by the filter controller
pub const QUERY_LIMIT: &str = "limit";
pub const QUERY_OFFSET: &str = "offset";
pub const QUERY_ORDERING: &str = "ordering";

// Error normalization messages
pub const MSG_NETWORK_ERROR: &str = "No internet connection. Please check your connection and try again.";
pub const MSG_PARSE_ERROR: &str = "Could not parse the response from the server.";
pub const MSG_LOAD_FAILED: &str = "Failed to load data";
pub const MSG_INTERNAL_SERVER_ERROR: &str = "Internal server error!";
pub const MSG_PERMISSION_DENIED: &str = "You do not have permission to perform this action.";
pub const MSG_PAYLOAD_TOO_LARGE: &str = "The submitted data is too large.";
pub const MSG_ACTION_FAILED: &str = "Failed to perform the action";

// Keys inside `formErrors`
pub const FORM_ERRORS_NON_FIELD: &str = "non_field_errors";
pub const FORM_ERRORS_INTERNAL: &str = "$internal";

// Default Values
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const DEFAULT_LOG_MAX_BODY: usize = 1000;

// File names
pub const CONFIG_FILENAME: &str = "config.toml";

/// Check if a header name carries credentials and must never be logged verbatim
#[must_use]
pub fn is_auth_header(name: &str) -> bool {
    matches!(
        name.to_lowercase().as_str(),
        "authorization" | "proxy-authorization" | "cookie" | "set-cookie" | "x-csrftoken"
    )
}

/// Check if a content type is JSON
#[must_use]
pub fn is_json_content_type(content_type: &str) -> bool {
    content_type
        .to_lowercase()
        .contains(CONTENT_TYPE_IDENTIFIER_JSON)
}

/// Check if a content type is the spreadsheet MIME type
#[must_use]
pub fn is_spreadsheet_content_type(content_type: &str) -> bool {
    content_type
        .to_lowercase()
        .starts_with(CONTENT_TYPE_SPREADSHEET)
}
