use crate::config::models::GlobalConfig;
use crate::constants;
use crate::request::{ApiBases, ApiType};

/// Resolves the base URL for each backend based on a priority hierarchy
#[derive(Debug, Default)]
pub struct BaseUrlResolver<'a> {
    global_config: Option<&'a GlobalConfig>,
}

impl<'a> BaseUrlResolver<'a> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            global_config: None,
        }
    }

    /// Sets the global configuration for base URL overrides
    #[must_use]
    pub const fn with_global_config(mut self, config: &'a GlobalConfig) -> Self {
        self.global_config = Some(config);
        self
    }

    /// Resolves the base URL according to the priority hierarchy:
    /// 1. Explicit parameter (command-line flag, tests)
    /// 2. Environment variable: `GODESK_GO_URL` / `GODESK_RISK_URL`
    /// 3. `api_urls.go` / `api_urls.risk` in the config file
    /// 4. Built-in default for the backend
    #[must_use]
    pub fn resolve(&self, api_type: ApiType, explicit_url: Option<&str>) -> String {
        if let Some(url) = explicit_url {
            return url.to_string();
        }

        let (env_var, default_url) = match api_type {
            ApiType::Go => (constants::ENV_GODESK_GO_URL, constants::DEFAULT_GO_API_URL),
            ApiType::Risk => (constants::ENV_GODESK_RISK_URL, constants::DEFAULT_RISK_API_URL),
        };
        if let Ok(url) = std::env::var(env_var) {
            if !url.trim().is_empty() {
                return url;
            }
        }

        let configured = self.global_config.and_then(|config| match api_type {
            ApiType::Go => config.api_urls.go.as_ref(),
            ApiType::Risk => config.api_urls.risk.as_ref(),
        });
        if let Some(url) = configured {
            return url.clone();
        }

        default_url.to_string()
    }

    /// Resolves both backends at once.
    #[must_use]
    pub fn resolve_all(&self, explicit_go: Option<&str>, explicit_risk: Option<&str>) -> ApiBases {
        ApiBases::new(
            self.resolve(ApiType::Go, explicit_go),
            self.resolve(ApiType::Risk, explicit_risk),
        )
    }
}
