//! Webhook client configuration.
//!
//! The endpoint is optional: a deployment without one still serves the
//! directory, and every lead submission reports a configuration failure
//! instead of sending anything.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// How a delivery attempt is judged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Dispatching the request is success. The response is not inspected,
    /// matching an opaque cross-origin POST.
    #[default]
    FireAndForget,
    /// A non-2xx response is reported as a rejection.
    Confirmed,
}

impl DeliveryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FireAndForget => "fire_and_forget",
            Self::Confirmed => "confirmed",
        }
    }
}

impl fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "fire_and_forget" => Ok(Self::FireAndForget),
            "confirmed" => Ok(Self::Confirmed),
            other => Err(ConfigError::InvalidMode(other.to_string())),
        }
    }
}

/// Configuration for the lead webhook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookConfig {
    /// Endpoint receiving lead envelopes. `None` disables delivery.
    pub url: Option<Url>,
    pub timeout: Duration,
    pub mode: DeliveryMode,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            mode: DeliveryMode::default(),
        }
    }
}

impl WebhookConfig {
    /// Configuration posting to `url` with default timeout and mode.
    pub fn with_url(url: Url) -> Self {
        Self {
            url: Some(url),
            ..Self::default()
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `DXM_WEBHOOK_URL` (unset or blank: delivery disabled)
    /// - `DXM_WEBHOOK_TIMEOUT_SECS` (default: 10)
    /// - `DXM_WEBHOOK_MODE` (`fire_and_forget` | `confirmed`, default: `fire_and_forget`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = match lookup("DXM_WEBHOOK_URL") {
            Some(raw) if !raw.trim().is_empty() => Some(
                Url::parse(raw.trim())
                    .map_err(|e| ConfigError::InvalidUrl(raw.clone(), e.to_string()))?,
            ),
            _ => None,
        };

        let timeout_secs = match lookup("DXM_WEBHOOK_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidTimeout(raw))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let mode = match lookup("DXM_WEBHOOK_MODE") {
            Some(raw) if !raw.trim().is_empty() => raw.parse()?,
            _ => DeliveryMode::default(),
        };

        Ok(Self {
            url,
            timeout: Duration::from_secs(timeout_secs),
            mode,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid DXM_WEBHOOK_URL {0:?}: {1}")]
    InvalidUrl(String, String),
    #[error("DXM_WEBHOOK_TIMEOUT_SECS must be a positive integer, got {0:?}")]
    InvalidTimeout(String),
    #[error("DXM_WEBHOOK_MODE must be fire_and_forget or confirmed, got {0:?}")]
    InvalidMode(String),
}
