use crate::constants;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GlobalConfig {
    #[serde(default = "default_timeout_secs_value")]
    pub default_timeout_secs: u64,
    /// Rows per page for list commands
    #[serde(default = "default_page_size_value")]
    pub page_size: u64,
    /// UI language sent on reads, as an ISO 639-1 code
    #[serde(default = "default_language_value")]
    pub language: String,
    /// Name of the environment variable holding the API token
    #[serde(default = "default_token_env_value")]
    pub token_env: String,
    #[serde(default)]
    pub api_urls: ApiUrls,
    #[serde(default)]
    pub agent_defaults: AgentDefaults,
}

const fn default_timeout_secs_value() -> u64 {
    constants::DEFAULT_TIMEOUT_SECS
}

const fn default_page_size_value() -> u64 {
    constants::DEFAULT_PAGE_SIZE
}

fn default_language_value() -> String {
    constants::LANGUAGE_ENGLISH.to_string()
}

fn default_token_env_value() -> String {
    constants::ENV_GODESK_TOKEN.to_string()
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            default_timeout_secs: default_timeout_secs_value(),
            page_size: default_page_size_value(),
            language: default_language_value(),
            token_env: default_token_env_value(),
            api_urls: ApiUrls::default(),
            agent_defaults: AgentDefaults::default(),
        }
    }
}

/// Base URL overrides per backend. Unset means the built-in default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
pub struct ApiUrls {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub go: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
pub struct AgentDefaults {
    #[serde(default)]
    pub json_errors: bool,
}
