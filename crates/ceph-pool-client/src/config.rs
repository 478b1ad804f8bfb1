//! Client configuration.
//!
//! Settings come from the environment (`CEPH_ENDPOINT`, `CEPH_USERNAME`,
//! `CEPH_PASSWORD`) and can be overridden by explicitly configured values.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Environment variable holding the dashboard API endpoint.
pub const ENDPOINT_ENV: &str = "CEPH_ENDPOINT";
/// Environment variable holding the API username.
pub const USERNAME_ENV: &str = "CEPH_USERNAME";
/// Environment variable holding the API password.
pub const PASSWORD_ENV: &str = "CEPH_PASSWORD";

/// Configuration for [`HttpPoolClient`](crate::HttpPoolClient).
#[derive(Clone, Deserialize)]
pub struct ClientConfig {
    /// Dashboard API endpoint (e.g., `https://ceph-mgr:8443`).
    #[serde(default)]
    pub endpoint: String,

    /// API username.
    #[serde(default)]
    pub username: String,

    /// API password.
    #[serde(default)]
    pub password: String,

    /// Per-request timeout in seconds.
    #[serde(default = "ClientConfig::default_timeout")]
    pub timeout_seconds: u64,

    /// Connect timeout in seconds.
    #[serde(default = "ClientConfig::default_connect_timeout")]
    pub connect_timeout_seconds: u64,

    /// Skip TLS certificate validation.
    ///
    /// On by default: cluster dashboards usually serve self-signed
    /// certificates. Turn it off when the endpoint has a trusted chain.
    #[serde(default = "ClientConfig::default_accept_invalid_certs")]
    pub accept_invalid_certs: bool,
}

/// Explicitly configured values that take precedence over the environment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigOverrides {
    /// Endpoint override.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Username override.
    #[serde(default)]
    pub username: Option<String>,
    /// Password override.
    #[serde(default)]
    pub password: Option<String>,
}

impl ClientConfig {
    const fn default_timeout() -> u64 {
        30
    }

    const fn default_connect_timeout() -> u64 {
        5
    }

    const fn default_accept_invalid_certs() -> bool {
        true
    }

    /// Create a configuration with default timeouts.
    #[must_use]
    pub fn new(
        endpoint: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            username: username.into(),
            password: password.into(),
            ..Self::default()
        }
    }

    /// Load credentials from the process environment.
    ///
    /// Unset variables leave the field empty; call [`validate`](Self::validate)
    /// before use.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load credentials through an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self::new(
            lookup(ENDPOINT_ENV).unwrap_or_default(),
            lookup(USERNAME_ENV).unwrap_or_default(),
            lookup(PASSWORD_ENV).unwrap_or_default(),
        )
    }

    /// Replace settings with any explicitly configured value.
    #[must_use]
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(endpoint) = overrides.endpoint {
            self.endpoint = endpoint;
        }
        if let Some(username) = overrides.username {
            self.username = username;
        }
        if let Some(password) = overrides.password {
            self.password = password;
        }
        self
    }

    /// Check that every required setting is present and the endpoint parses.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` listing every empty setting,
    /// `ConfigError::InvalidEndpoint` if the endpoint is not an http(s) URL, or
    /// `ConfigError::ZeroTimeout` if either timeout is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let missing: Vec<&'static str> = [
            ("endpoint", &self.endpoint),
            ("username", &self.username),
            ("password", &self.password),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect();

        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let url = reqwest::Url::parse(self.base_url()).map_err(|e| ConfigError::InvalidEndpoint {
            endpoint: self.endpoint.clone(),
            reason: e.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEndpoint {
                endpoint: self.endpoint.clone(),
                reason: format!("unsupported scheme {:?}", url.scheme()),
            });
        }

        if self.timeout_seconds == 0 {
            return Err(ConfigError::ZeroTimeout {
                setting: "timeout_seconds",
            });
        }
        if self.connect_timeout_seconds == 0 {
            return Err(ConfigError::ZeroTimeout {
                setting: "connect_timeout_seconds",
            });
        }

        Ok(())
    }

    /// Endpoint without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.endpoint.trim_end_matches('/')
    }

    /// Get the request timeout as a `Duration`.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Get the connect timeout as a `Duration`.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            username: String::new(),
            password: String::new(),
            timeout_seconds: Self::default_timeout(),
            connect_timeout_seconds: Self::default_connect_timeout(),
            accept_invalid_certs: Self::default_accept_invalid_certs(),
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("timeout_seconds", &self.timeout_seconds)
            .field("connect_timeout_seconds", &self.connect_timeout_seconds)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .finish()
    }
}
