use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// What the gateway answers when there is no key or the vendor call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Always answer 200 with a displayable assistant message.
    #[default]
    Graceful,
    /// Answer with a status code and `{"error": ...}` body.
    Structured,
}

#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub openai_base_url: String,
    pub anthropic_base_url: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub upstream: UpstreamConfig,
    pub failure_policy: FailurePolicy,
    pub cors_enabled: bool,
    pub request_log: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind_addr: ([0, 0, 0, 0], 3000).into(),
            upstream: UpstreamConfig {
                openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
                anthropic_base_url: DEFAULT_ANTHROPIC_BASE_URL.to_string(),
                timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            },
            failure_policy: FailurePolicy::Graceful,
            cors_enabled: true,
            request_log: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup, so it can be exercised
    /// without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let bind_addr = {
            let raw = get("GATEWAY_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
            raw.parse::<SocketAddr>()
                .map_err(|e| invalid("GATEWAY_ADDR", &raw, e.to_string()))?
        };

        let timeout = match get("UPSTREAM_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(0) => return Err(invalid("UPSTREAM_TIMEOUT_SECS", &raw, "must be greater than zero")),
                Ok(secs) => Duration::from_secs(secs),
                Err(e) => return Err(invalid("UPSTREAM_TIMEOUT_SECS", &raw, e.to_string())),
            },
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let failure_policy = match get("FAILURE_POLICY") {
            Some(raw) => match raw.trim().to_lowercase().as_str() {
                "graceful" => FailurePolicy::Graceful,
                "structured" => FailurePolicy::Structured,
                _ => return Err(invalid("FAILURE_POLICY", &raw, "expected 'graceful' or 'structured'")),
            },
            None => FailurePolicy::default(),
        };

        let cors_enabled = match get("CORS_ENABLED") {
            Some(raw) => raw
                .trim()
                .parse::<bool>()
                .map_err(|_| invalid("CORS_ENABLED", &raw, "expected 'true' or 'false'"))?,
            None => true,
        };

        Ok(Config {
            bind_addr,
            upstream: UpstreamConfig {
                openai_base_url: base_url(get("OPENAI_BASE_URL"), DEFAULT_OPENAI_BASE_URL),
                anthropic_base_url: base_url(get("ANTHROPIC_BASE_URL"), DEFAULT_ANTHROPIC_BASE_URL),
                timeout,
            },
            failure_policy,
            cors_enabled,
            request_log: get("REQUEST_LOG_PATH").map(PathBuf::from),
        })
    }
}

fn base_url(value: Option<String>, default: &str) -> String {
    value
        .as_deref()
        .unwrap_or(default)
        .trim()
        .trim_end_matches('/')
        .to_string()
}

fn invalid(key: &'static str, value: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value: value.to_string(),
        reason: reason.into(),
    }
}
