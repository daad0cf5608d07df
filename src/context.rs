//! Session and language snapshot threaded into every request.
//!
//! Both values are read once, when the context is built, and never mutated by
//! the transport. A language switch means building a new context.

use crate::config::models::GlobalConfig;
use crate::constants;
use crate::error::Error;
use std::fmt;
use std::str::FromStr;

/// ISO 639-1 language code used for `Accept-Language`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Language(String);

impl Language {
    #[must_use]
    pub fn english() -> Self {
        Self(constants::LANGUAGE_ENGLISH.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_english(&self) -> bool {
        self.0 == constants::LANGUAGE_ENGLISH
    }
}

impl Default for Language {
    fn default() -> Self {
        Self::english()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_lowercase();
        if code.len() == 2 && code.chars().all(|c| c.is_ascii_lowercase()) {
            Ok(Self(code))
        } else {
            Err(Error::invalid_setting(
                "language",
                s,
                "expected a two-letter ISO 639-1 code such as 'en' or 'fr'",
            ))
        }
    }
}

/// Token and UI language, captured at request-construction time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub token: Option<String>,
    pub language: Language,
}

impl RequestContext {
    #[must_use]
    pub const fn new(token: Option<String>, language: Language) -> Self {
        Self { token, language }
    }

    /// Builds a context from the global config.
    ///
    /// The token is read from the environment variable named by `token_env`;
    /// an unset or blank variable means an anonymous session.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured language is not a valid code.
    pub fn from_config(config: &GlobalConfig) -> Result<Self, Error> {
        let language = config.language.parse()?;
        let token = std::env::var(&config.token_env)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        Ok(Self { token, language })
    }

    #[must_use]
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }
}
