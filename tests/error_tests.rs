use godesk_cli::error::Error;
use godesk_cli::request::Method;
use godesk_cli::transform::{process_go_error, ResponseError};

#[test]
fn test_request_error_json_uses_notification_message() {
    let transformed = process_go_error(
        ResponseError::Network("connection refused".to_string()),
        "https://goadmin.ifrc.org/api/v2/appeal/",
        Method::Get,
    );
    let error = Error::from(transformed);
    let json = error.to_json();

    assert_eq!(json.error_type, "Request");
    assert_eq!(
        json.message,
        "No internet connection. Please check your connection and try again."
    );
    assert!(json.context.unwrap().contains("connection refused"));
    assert_eq!(error.to_string(), json.message);
}

#[test]
fn test_login_redirect_json_points_at_token() {
    let error = Error::LoginRedirect {
        url: "https://goadmin.ifrc.org/login/".to_string(),
    };
    assert!(error.is_login_redirect());

    let json = error.to_json();
    assert_eq!(json.error_type, "Authentication");
    assert!(json.message.contains("/login/"));
    assert!(json.context.unwrap().contains("GODESK_TOKEN"));
}

#[test]
fn test_invalid_setting_json() {
    let error = Error::invalid_setting("page_size", "0", "page size must be between 1 and 1000");
    let json = error.to_json();
    assert_eq!(json.error_type, "Configuration");
    assert_eq!(
        json.message,
        "Invalid value '0' for setting 'page_size': page size must be between 1 and 1000"
    );
    assert!(json.context.is_some());
}

#[test]
fn test_unknown_endpoint_json() {
    let json = Error::UnknownEndpoint {
        name: "apeal".to_string(),
    }
    .to_json();
    assert_eq!(json.error_type, "Request");
    assert!(json.context.unwrap().contains("godesk endpoints"));
}

#[test]
fn test_json_error_serializes() {
    let json = Error::config("bad").to_json();
    let value = serde_json::to_value(&json).unwrap();
    assert_eq!(value["error_type"], "Configuration");
    assert_eq!(value["message"], "bad");
    assert!(value["context"].is_null());
}
