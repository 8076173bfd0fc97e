//! Client configuration loaded from environment variables.
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SCREENER_API_BASE` | [`DEFAULT_API_BASE`] | API origin |
//! | `SCREENER_SESSION_COOKIE` | unset | Session cookie attached to favorites calls |
//! | `SCREENER_TIMEOUT_MS` | `10000` | Per-request transport timeout |
//! | `SCREENER_MAX_RETRIES` | `2` | Retries for the GET feeds |
//!
//! Empty values are treated as unset.

use crate::http_client::HttpAuth;
use crate::retry::RetryPolicy;
use crate::ConfigError;

pub const DEFAULT_API_BASE: &str = "https://investmenthelper-ai-backend.up.railway.app";

const DEFAULT_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_MAX_RETRIES: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenerConfig {
    /// Origin without a trailing slash.
    pub api_base: String,
    pub session_cookie: Option<String>,
    pub timeout_ms: u64,
    pub max_retries: u32,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            api_base: String::from(DEFAULT_API_BASE),
            session_cookie: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl ScreenerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let mut config = Self::default();
        if let Some(api_base) = var("SCREENER_API_BASE") {
            config = config.with_api_base(api_base)?;
        }
        config.session_cookie = var("SCREENER_SESSION_COOKIE");
        if let Some(raw) = var("SCREENER_TIMEOUT_MS") {
            config.timeout_ms = parse_number("SCREENER_TIMEOUT_MS", &raw)?;
        }
        if let Some(raw) = var("SCREENER_MAX_RETRIES") {
            config.max_retries = parse_number("SCREENER_MAX_RETRIES", &raw)?;
        }

        Ok(config)
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Result<Self, ConfigError> {
        let api_base = api_base.into();
        let trimmed = api_base.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl {
                name: "SCREENER_API_BASE",
                value: api_base,
            });
        }

        self.api_base = trimmed.to_owned();
        Ok(self)
    }

    pub fn auth(&self) -> HttpAuth {
        match &self.session_cookie {
            Some(cookie) => HttpAuth::Cookie(cookie.clone()),
            None => HttpAuth::None,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries)
    }
}

fn parse_number<T: std::str::FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        name,
        value: raw.to_owned(),
    })
}
