use crate::transform::TransformedError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Invalid value '{value}' for setting '{key}': {reason}")]
    InvalidSetting {
        key: String,
        value: String,
        reason: String,
    },
    #[error("Invalid header value for '{name}': {reason}")]
    InvalidHeaderValue { name: String, reason: String },
    #[error("Invalid request body: {0}")]
    InvalidBody(String),
    #[error("Unknown endpoint '{name}'")]
    UnknownEndpoint { name: String },
    #[error("{}", .0.value.message_for_notification)]
    Request(Box<TransformedError>),
    #[error("Authentication required: request was redirected to {url}")]
    LoginRedirect { url: String },
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl From<TransformedError> for Error {
    fn from(error: TransformedError) -> Self {
        Self::Request(Box::new(error))
    }
}

/// JSON representation of an error for structured output
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonError {
    pub error_type: String,
    pub message: String,
    pub context: Option<String>,
}

impl Error {
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config(reason.into())
    }

    pub fn invalid_setting(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidSetting {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Returns true for the one failure the binding layer treats as fatal.
    #[must_use]
    pub const fn is_login_redirect(&self) -> bool {
        matches!(self, Self::LoginRedirect { .. })
    }

    /// Convert error to JSON representation for structured output
    #[must_use]
    pub fn to_json(&self) -> JsonError {
        let (error_type, message, context) = match self {
            Self::Config(msg) => ("Configuration", msg.clone(), None),
            Self::InvalidSetting { .. } => (
                "Configuration",
                self.to_string(),
                Some("Run 'godesk config settings' to list valid keys and types.".to_string()),
            ),
            Self::Io(io_err) => {
                let context = match io_err.kind() {
                    std::io::ErrorKind::NotFound => {
                        Some("Check that the file path is correct and the file exists.")
                    }
                    std::io::ErrorKind::PermissionDenied => {
                        Some("Check file permissions or run with appropriate privileges.")
                    }
                    _ => None,
                };
                ("FileSystem", io_err.to_string(), context.map(str::to_string))
            }
            Self::Request(transformed) => (
                "Request",
                transformed.value.message_for_notification.clone(),
                Some(transformed.debug_message.clone()),
            ),
            Self::LoginRedirect { .. } => (
                "Authentication",
                self.to_string(),
                Some(format!(
                    "Set a valid API token in the environment variable named by 'token_env' (default {}).",
                    crate::constants::ENV_GODESK_TOKEN
                )),
            ),
            Self::InvalidHeaderValue { .. } => ("Request", self.to_string(), None),
            Self::InvalidBody(msg) => (
                "Request",
                msg.clone(),
                Some("Bodies with file attachments must be sent with --form.".to_string()),
            ),
            Self::UnknownEndpoint { .. } => (
                "Request",
                self.to_string(),
                Some("Run 'godesk endpoints' to list the available endpoints.".to_string()),
            ),
            Self::Yaml(yaml_err) => ("YAMLSerialization", yaml_err.to_string(), None),
            Self::Json(json_err) => (
                "JSONParsing",
                json_err.to_string(),
                Some("Check that your request body or response contains valid JSON.".to_string()),
            ),
            Self::Toml(toml_err) => (
                "TOMLParsing",
                toml_err.to_string(),
                Some("Check that your configuration file is valid TOML syntax.".to_string()),
            ),
            Self::Anyhow(err) => ("Unexpected", format!("{err:#}"), None),
        };

        JsonError {
            error_type: error_type.to_string(),
            message,
            context,
        }
    }
}
