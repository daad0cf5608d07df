//! Configuration settings management
//!
//! This module provides type-safe access to global configuration settings,
//! supporting dot-notation keys for nested values and appropriate type validation.

use super::models::GlobalConfig;
use crate::context::Language;
use crate::error::Error;
use crate::request::url::is_absolute_url;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Represents a valid configuration setting key.
///
/// Each variant maps to a specific path in the configuration file,
/// with dot-notation used for nested values (e.g., `api_urls.go`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    /// Default timeout for API requests in seconds (`default_timeout_secs`)
    DefaultTimeoutSecs,
    /// Rows per page for list commands (`page_size`)
    PageSize,
    /// UI language code (`language`)
    Language,
    /// Environment variable holding the API token (`token_env`)
    TokenEnv,
    /// GO API base URL override (`api_urls.go`)
    ApiUrlsGo,
    /// Risk API base URL override (`api_urls.risk`)
    ApiUrlsRisk,
    /// Whether to output errors as JSON by default (`agent_defaults.json_errors`)
    AgentDefaultsJsonErrors,
}

impl SettingKey {
    /// All available setting keys for enumeration.
    pub const ALL: &'static [Self] = &[
        Self::DefaultTimeoutSecs,
        Self::PageSize,
        Self::Language,
        Self::TokenEnv,
        Self::ApiUrlsGo,
        Self::ApiUrlsRisk,
        Self::AgentDefaultsJsonErrors,
    ];

    /// Returns the dot-notation key string for this setting.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DefaultTimeoutSecs => "default_timeout_secs",
            Self::PageSize => "page_size",
            Self::Language => "language",
            Self::TokenEnv => "token_env",
            Self::ApiUrlsGo => "api_urls.go",
            Self::ApiUrlsRisk => "api_urls.risk",
            Self::AgentDefaultsJsonErrors => "agent_defaults.json_errors",
        }
    }

    /// Returns the expected type name for this setting.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::DefaultTimeoutSecs | Self::PageSize => "integer",
            Self::Language | Self::TokenEnv => "string",
            Self::ApiUrlsGo | Self::ApiUrlsRisk => "url",
            Self::AgentDefaultsJsonErrors => "boolean",
        }
    }

    /// Returns a human-readable description of this setting.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::DefaultTimeoutSecs => "Default timeout for API requests in seconds",
            Self::PageSize => "Rows per page for list commands",
            Self::Language => "UI language (ISO 639-1) sent on read requests",
            Self::TokenEnv => "Environment variable that holds the API token",
            Self::ApiUrlsGo => "Base URL of the GO API (empty for the default)",
            Self::ApiUrlsRisk => "Base URL of the risk API (empty for the default)",
            Self::AgentDefaultsJsonErrors => "Output errors as JSON by default",
        }
    }

    /// Returns the default value for this setting as a string.
    #[must_use]
    pub const fn default_value_str(&self) -> &'static str {
        match self {
            Self::DefaultTimeoutSecs => "30",
            Self::PageSize => "20",
            Self::Language => "en",
            Self::TokenEnv => "GODESK_TOKEN",
            Self::ApiUrlsGo | Self::ApiUrlsRisk => "",
            Self::AgentDefaultsJsonErrors => "false",
        }
    }

    /// Extracts the current value for this setting from a `GlobalConfig`.
    #[must_use]
    pub fn value_from_config(&self, config: &GlobalConfig) -> SettingValue {
        match self {
            Self::DefaultTimeoutSecs => SettingValue::U64(config.default_timeout_secs),
            Self::PageSize => SettingValue::U64(config.page_size),
            Self::Language => SettingValue::Text(config.language.clone()),
            Self::TokenEnv => SettingValue::Text(config.token_env.clone()),
            Self::ApiUrlsGo => SettingValue::Text(config.api_urls.go.clone().unwrap_or_default()),
            Self::ApiUrlsRisk => {
                SettingValue::Text(config.api_urls.risk.clone().unwrap_or_default())
            }
            Self::AgentDefaultsJsonErrors => SettingValue::Bool(config.agent_defaults.json_errors),
        }
    }

    /// Writes `value` into `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is not of this key's type.
    pub fn apply_to_config(&self, config: &mut GlobalConfig, value: SettingValue) -> Result<(), Error> {
        match (self, value) {
            (Self::DefaultTimeoutSecs, SettingValue::U64(v)) => config.default_timeout_secs = v,
            (Self::PageSize, SettingValue::U64(v)) => config.page_size = v,
            (Self::Language, SettingValue::Text(v)) => config.language = v,
            (Self::TokenEnv, SettingValue::Text(v)) => config.token_env = v,
            (Self::ApiUrlsGo, SettingValue::Text(v)) => config.api_urls.go = non_empty(v),
            (Self::ApiUrlsRisk, SettingValue::Text(v)) => config.api_urls.risk = non_empty(v),
            (Self::AgentDefaultsJsonErrors, SettingValue::Bool(v)) => {
                config.agent_defaults.json_errors = v;
            }
            (key, value) => {
                return Err(Error::invalid_setting(
                    key.as_str(),
                    value.to_string(),
                    format!("expected {}", key.type_name()),
                ));
            }
        }
        Ok(())
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| Error::config(format!("Unknown setting key '{s}'")))
    }
}

/// Type-safe representation of a configuration setting value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingValue {
    /// Unsigned 64-bit integer value
    U64(u64),
    /// Boolean value
    Bool(bool),
    /// String value; empty means unset for optional keys
    Text(String),
}

/// Maximum allowed timeout value (1 year in seconds).
const MAX_TIMEOUT_SECS: u64 = 365 * 24 * 60 * 60;

/// Largest page the GO API serves in one response.
const MAX_PAGE_SIZE: u64 = 1000;

impl SettingValue {
    /// Parse a string value into the appropriate type for the given key.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be parsed as the expected type,
    /// or if the value is outside the allowed range for the setting.
    pub fn parse_for_key(key: SettingKey, value: &str) -> Result<Self, Error> {
        let invalid = |reason: &str| Error::invalid_setting(key.as_str(), value, reason);
        match key {
            SettingKey::DefaultTimeoutSecs => {
                let parsed = value
                    .parse::<u64>()
                    .map_err(|_| invalid("expected a whole number of seconds"))?;
                if parsed == 0 {
                    return Err(invalid("timeout must be greater than 0"));
                }
                if parsed > MAX_TIMEOUT_SECS {
                    return Err(invalid(&format!(
                        "timeout cannot exceed {MAX_TIMEOUT_SECS} seconds (1 year)"
                    )));
                }
                Ok(Self::U64(parsed))
            }
            SettingKey::PageSize => {
                let parsed = value
                    .parse::<u64>()
                    .map_err(|_| invalid("expected a whole number"))?;
                if parsed == 0 || parsed > MAX_PAGE_SIZE {
                    return Err(invalid(&format!(
                        "page size must be between 1 and {MAX_PAGE_SIZE}"
                    )));
                }
                Ok(Self::U64(parsed))
            }
            SettingKey::Language => {
                let language: Language = value.parse()?;
                Ok(Self::Text(language.as_str().to_string()))
            }
            SettingKey::TokenEnv => {
                let valid = !value.is_empty()
                    && value
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '_');
                if !valid {
                    return Err(invalid("expected an environment variable name"));
                }
                Ok(Self::Text(value.to_string()))
            }
            SettingKey::ApiUrlsGo | SettingKey::ApiUrlsRisk => {
                let trimmed = value.trim();
                if !trimmed.is_empty() && !is_absolute_url(trimmed) {
                    return Err(invalid("expected an http:// or https:// URL"));
                }
                Ok(Self::Text(trimmed.trim_end_matches('/').to_string()))
            }
            SettingKey::AgentDefaultsJsonErrors => {
                let parsed = match value.to_lowercase().as_str() {
                    "true" | "1" | "yes" | "on" => true,
                    "false" | "0" | "no" | "off" => false,
                    _ => return Err(invalid("expected true or false")),
                };
                Ok(Self::Bool(parsed))
            }
        }
    }

    /// Returns the value as a u64, if it is one.
    #[must_use]
    pub const fn as_u64(&self) -> Option<u64> {
        match self {
            Self::U64(v) => Some(*v),
            Self::Bool(_) | Self::Text(_) => None,
        }
    }

    /// Returns the value as a bool, if it is one.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            Self::U64(_) | Self::Text(_) => None,
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::U64(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

/// Information about a configuration setting for display purposes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingInfo {
    /// The setting key in dot-notation
    pub key: String,
    /// Current value as a string
    pub value: String,
    /// Expected type name
    #[serde(rename = "type")]
    pub type_name: String,
    /// Human-readable description
    pub description: String,
    /// Default value as a string
    pub default: String,
}

impl SettingInfo {
    /// Create a new `SettingInfo` from a key and current value.
    #[must_use]
    pub fn new(key: SettingKey, current_value: &SettingValue) -> Self {
        Self {
            key: key.as_str().to_string(),
            value: current_value.to_string(),
            type_name: key.type_name().to_string(),
            description: key.description().to_string(),
            default: key.default_value_str().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setting_key_round_trips_through_str() {
        for key in SettingKey::ALL {
            assert_eq!(key.as_str().parse::<SettingKey>().unwrap(), *key);
        }
        assert!("unknown_key".parse::<SettingKey>().is_err());
    }

    #[test]
    fn test_defaults_match_default_config() {
        let config = GlobalConfig::default();
        for key in SettingKey::ALL {
            assert_eq!(
                key.value_from_config(&config).to_string(),
                key.default_value_str(),
                "default mismatch for {key}"
            );
        }
    }

    #[test]
    fn test_parse_timeout_bounds() {
        let key = SettingKey::DefaultTimeoutSecs;
        assert_eq!(SettingValue::parse_for_key(key, "60").unwrap(), SettingValue::U64(60));
        assert!(SettingValue::parse_for_key(key, "abc").is_err());
        assert!(SettingValue::parse_for_key(key, "0").is_err());
        assert!(SettingValue::parse_for_key(key, &MAX_TIMEOUT_SECS.to_string()).is_ok());
        assert!(SettingValue::parse_for_key(key, &(MAX_TIMEOUT_SECS + 1).to_string()).is_err());
    }

    #[test]
    fn test_parse_page_size_bounds() {
        let key = SettingKey::PageSize;
        assert_eq!(SettingValue::parse_for_key(key, "50").unwrap(), SettingValue::U64(50));
        assert!(SettingValue::parse_for_key(key, "0").is_err());
        assert!(SettingValue::parse_for_key(key, "1001").is_err());
    }

    #[test]
    fn test_parse_bool() {
        let key = SettingKey::AgentDefaultsJsonErrors;
        for (raw, expected) in [("true", true), ("1", true), ("yes", true), ("off", false), ("no", false)] {
            assert_eq!(SettingValue::parse_for_key(key, raw).unwrap(), SettingValue::Bool(expected));
        }
        assert!(SettingValue::parse_for_key(key, "maybe").is_err());
    }

    #[test]
    fn test_parse_language() {
        let key = SettingKey::Language;
        assert_eq!(
            SettingValue::parse_for_key(key, "FR").unwrap(),
            SettingValue::Text("fr".to_string())
        );
        assert!(SettingValue::parse_for_key(key, "french").is_err());
    }

    #[test]
    fn test_parse_url_trims_trailing_slash_and_allows_clearing() {
        let key = SettingKey::ApiUrlsGo;
        assert_eq!(
            SettingValue::parse_for_key(key, "https://go.example/").unwrap(),
            SettingValue::Text("https://go.example".to_string())
        );
        assert_eq!(
            SettingValue::parse_for_key(key, "").unwrap(),
            SettingValue::Text(String::new())
        );
        assert!(SettingValue::parse_for_key(key, "go.example").is_err());
    }

    #[test]
    fn test_apply_to_config() {
        let mut config = GlobalConfig::default();
        SettingKey::ApiUrlsRisk
            .apply_to_config(&mut config, SettingValue::Text("https://risk.example".into()))
            .unwrap();
        assert_eq!(config.api_urls.risk.as_deref(), Some("https://risk.example"));

        SettingKey::ApiUrlsRisk
            .apply_to_config(&mut config, SettingValue::Text(String::new()))
            .unwrap();
        assert_eq!(config.api_urls.risk, None);

        assert!(SettingKey::PageSize
            .apply_to_config(&mut config, SettingValue::Bool(true))
            .is_err());
    }

    #[test]
    fn test_setting_info_new() {
        let info = SettingInfo::new(SettingKey::DefaultTimeoutSecs, &SettingValue::U64(60));
        assert_eq!(info.key, "default_timeout_secs");
        assert_eq!(info.value, "60");
        assert_eq!(info.type_name, "integer");
        assert_eq!(info.default, "30");
    }
}
