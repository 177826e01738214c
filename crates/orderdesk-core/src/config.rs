//! Client configuration.
//!
//! Values come from the environment first and may then be overridden by the
//! caller (the CLI applies its flags on top).
//!
//! | Variable | Default |
//! |----------|---------|
//! | `ORDERDESK_BASE_URL` | `http://127.0.0.1:8000` |
//! | `ORDERDESK_API_PATH` | `/api/v1/kiwoom` |
//! | `ORDERDESK_TIMEOUT_MS` | `3000` |
//! | `ORDERDESK_API_TOKEN` | unset |

use crate::error::ConfigError;
use crate::http_client::HttpAuth;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_API_PATH: &str = "/api/v1/kiwoom";
pub const DEFAULT_TIMEOUT_MS: u64 = 3_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeskConfig {
    pub base_url: String,
    pub api_path: String,
    pub timeout_ms: u64,
    /// Never logged.
    pub api_token: Option<String>,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            base_url: String::from(DEFAULT_BASE_URL),
            api_path: String::from(DEFAULT_API_PATH),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            api_token: None,
        }
    }
}

impl DeskConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(base_url) = non_blank(lookup("ORDERDESK_BASE_URL")) {
            config = config.with_base_url(base_url)?;
        }
        if let Some(api_path) = non_blank(lookup("ORDERDESK_API_PATH")) {
            config.api_path = normalize_path(&api_path);
        }
        if let Some(raw) = non_blank(lookup("ORDERDESK_TIMEOUT_MS")) {
            config.timeout_ms = parse_timeout(&raw)?;
        }
        config.api_token = non_blank(lookup("ORDERDESK_API_TOKEN"));

        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> Result<Self, ConfigError> {
        let trimmed = base_url.as_ref().trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl {
                value: base_url.as_ref().to_owned(),
            });
        }
        self.base_url = trimmed.to_owned();
        Ok(self)
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Result<Self, ConfigError> {
        if timeout_ms == 0 {
            return Err(ConfigError::InvalidNumber {
                name: "timeout_ms",
                value: timeout_ms.to_string(),
            });
        }
        self.timeout_ms = timeout_ms;
        Ok(self)
    }

    pub fn auth(&self) -> HttpAuth {
        match &self.api_token {
            Some(token) => HttpAuth::BearerToken(token.clone()),
            None => HttpAuth::None,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.starts_with('/') {
        trimmed.to_owned()
    } else {
        format!("/{trimmed}")
    }
}

fn parse_timeout(raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ConfigError::InvalidNumber {
            name: "ORDERDESK_TIMEOUT_MS",
            value: raw.to_owned(),
        }),
    }
}
