//! Client configuration.
//!
//! A [`ClientConfig`] holds everything needed to open a session against an
//! RMON installation: the base URL, the login/password pair presented at
//! configuration time, the caller-identifying user agent, and the timeout
//! and retry policy applied to every request.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// The user agent reported when the orchestrating tool does not supply one.
pub const DEFAULT_USER_AGENT_VERSION: &str = "1.0+compatible";

/// Configuration for the RMON API client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the RMON installation, e.g. `https://rmon.example.com`.
    pub base_url: String,

    /// Username presented at login.
    pub login: String,

    /// Password presented at login.
    pub password: String,

    /// Caller-identifying string sent as the `User-Agent` header.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout.
    #[serde(default = "default_timeout")]
    pub timeout: Duration,

    /// Connection timeout.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: Duration,

    /// Retry policy for transport failures on safe verbs.
    #[serde(default)]
    pub retry: RetryConfig,
}

impl ClientConfig {
    /// Create a configuration with default timeouts and retry policy.
    pub fn new(
        base_url: impl Into<String>,
        login: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            login: login.into(),
            password: password.into(),
            user_agent: default_user_agent(),
            timeout: default_timeout(),
            connect_timeout: default_connect_timeout(),
            retry: RetryConfig::default(),
        }
    }

    /// Set the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the user agent from the orchestrating tool's version,
    /// e.g. `terraform/1.7.0`.
    pub fn with_tool_version(mut self, version: &str) -> Self {
        let version = if version.is_empty() {
            DEFAULT_USER_AGENT_VERSION
        } else {
            version
        };
        self.user_agent = format!("terraform/{}", version);
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry policy.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Validate the configuration, returning the parsed base URL.
    ///
    /// The URL must carry an `http`/`https` scheme and a host; login and
    /// password must be non-empty. Failures are configuration errors and
    /// surface before any resource operation runs.
    pub fn validate(&self) -> Result<url::Url, ProviderError> {
        let parsed = url::Url::parse(&self.base_url).map_err(|e| {
            ProviderError::Configuration(format!("invalid base_url '{}': {}", self.base_url, e))
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ProviderError::Configuration(format!(
                "base_url '{}' must use http or https",
                self.base_url
            )));
        }
        if !parsed.has_host() {
            return Err(ProviderError::Configuration(format!(
                "base_url '{}' is missing a host",
                self.base_url
            )));
        }
        if self.login.is_empty() {
            return Err(ProviderError::Configuration(
                "login must not be empty".to_string(),
            ));
        }
        if self.password.is_empty() {
            return Err(ProviderError::Configuration(
                "password must not be empty".to_string(),
            ));
        }

        Ok(parsed)
    }
}

/// Retry policy for transport-level failures.
///
/// Retries apply only to verbs that are safe to reissue (GET, DELETE, PUT).
/// The total number of underlying attempts never exceeds
/// `max_attempts + 1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum retry attempts after the initial one.
    pub max_attempts: u32,
    /// Initial delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound on the backoff delay.
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryConfig {
    /// Disable retries entirely.
    pub fn none() -> Self {
        Self {
            max_attempts: 0,
            ..Default::default()
        }
    }

    /// The delay before retrying after the given zero-based attempt,
    /// doubling each time and capped at `max_delay`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = attempt.min(16);
        let delay = self.initial_delay.saturating_mul(1u32 << exp);
        delay.min(self.max_delay)
    }
}

fn default_user_agent() -> String {
    format!("terraform/{}", DEFAULT_USER_AGENT_VERSION)
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(10)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        let config = ClientConfig::new("https://rmon.example.com", "admin", "secret");
        let url = config.validate().unwrap();
        assert_eq!(url.host_str(), Some("rmon.example.com"));
    }

    #[test]
    fn test_rejects_malformed_url() {
        let config = ClientConfig::new("not a url", "admin", "secret");
        assert!(matches!(
            config.validate(),
            Err(ProviderError::Configuration(_))
        ));
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let config = ClientConfig::new("ftp://rmon.example.com", "admin", "secret");
        let err = config.validate().unwrap_err();
        assert!(format!("{}", err).contains("http or https"));
    }

    #[test]
    fn test_rejects_missing_credentials() {
        let config = ClientConfig::new("https://rmon.example.com", "", "secret");
        assert!(config.validate().is_err());

        let config = ClientConfig::new("https://rmon.example.com", "admin", "");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_tool_version_user_agent() {
        let config =
            ClientConfig::new("https://rmon.example.com", "a", "b").with_tool_version("1.7.0");
        assert_eq!(config.user_agent, "terraform/1.7.0");

        let config = ClientConfig::new("https://rmon.example.com", "a", "b").with_tool_version("");
        assert_eq!(config.user_agent, "terraform/1.0+compatible");
    }

    #[test]
    fn test_retry_backoff_doubles_and_caps() {
        let retry = RetryConfig::default();
        assert_eq!(retry.delay_for(0), Duration::from_millis(500));
        assert_eq!(retry.delay_for(1), Duration::from_millis(1000));
        assert_eq!(retry.delay_for(2), Duration::from_millis(2000));
        assert!(retry.delay_for(12) <= retry.max_delay);
    }

    #[test]
    fn test_retry_none() {
        assert_eq!(RetryConfig::none().max_attempts, 0);
    }
}
