//! Client configuration.
//!
//! # Design
//! Everything a client needs is gathered into one immutable `ClientConfig`
//! that the client owns. Defaults live here instead of in process-wide
//! state. `ClientConfigBuilder` mirrors the options object accepted by the
//! ERP tooling (`baseUrl`, `accessToken`, `timeout` in milliseconds, ...)
//! and can be deserialized straight from JSON.

use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_ENCODING: &str = "utf8";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(60_000);

/// Overrides applied after the client has computed a request.
///
/// Headers replace a computed header with the exact same name or are
/// appended. There is no validation: this is an escape hatch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TransportOptions {
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    #[serde(default, with = "millis_opt")]
    pub timeout: Option<Duration>,
}

impl TransportOptions {
    pub fn apply_headers(&self, headers: &mut Vec<(String, String)>) {
        for (name, value) in &self.headers {
            match headers.iter_mut().find(|(k, _)| k == name) {
                Some(existing) => existing.1 = value.clone(),
                None => headers.push((name.clone(), value.clone())),
            }
        }
    }
}

/// Validated configuration for an `AaroClient`.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: String,
    access_token: String,
    username: Option<String>,
    password: Option<String>,
    encoding: String,
    timeout: Duration,
    transport_options: TransportOptions,
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Shorthand for a config with only the required fields set.
    pub fn new(base_url: &str, access_token: &str) -> Result<Self, ConfigError> {
        Self::builder().base_url(base_url).access_token(access_token).build()
    }

    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `AARO_BASE_URL`: ERP base URL (required)
    /// - `AARO_ACCESS_TOKEN`: bearer token (required)
    /// - `AARO_USERNAME`, `AARO_PASSWORD`: password-grant credentials
    /// - `AARO_ENCODING`: response encoding, `utf8` by default
    /// - `AARO_TIMEOUT_MS`: request timeout in milliseconds
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut builder = Self::builder();

        if let Ok(url) = std::env::var("AARO_BASE_URL") {
            builder = builder.base_url(url);
        }
        if let Ok(token) = std::env::var("AARO_ACCESS_TOKEN") {
            builder = builder.access_token(token);
        }
        if let Ok(username) = std::env::var("AARO_USERNAME") {
            builder = builder.username(username);
        }
        if let Ok(password) = std::env::var("AARO_PASSWORD") {
            builder = builder.password(password);
        }
        if let Ok(encoding) = std::env::var("AARO_ENCODING") {
            builder = builder.encoding(encoding);
        }
        if let Ok(ms) = std::env::var("AARO_TIMEOUT_MS") {
            let ms: u64 = ms.trim().parse().map_err(|_| ConfigError::InvalidTimeout(ms.clone()))?;
            builder = builder.timeout(Duration::from_millis(ms));
        }

        builder.build()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    /// Configured timeout, or the override from `TransportOptions`.
    pub fn timeout(&self) -> Duration {
        self.transport_options.timeout.unwrap_or(self.timeout)
    }

    pub fn transport_options(&self) -> &TransportOptions {
        &self.transport_options
    }
}

/// Collects construction options; `build` validates them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfigBuilder {
    base_url: Option<String>,
    access_token: Option<String>,
    username: Option<String>,
    password: Option<String>,
    encoding: Option<String>,
    #[serde(with = "millis_opt")]
    timeout: Option<Duration>,
    #[serde(rename = "transport")]
    transport_options: TransportOptions,
}

impl ClientConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = Some(encoding.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn transport_options(mut self, options: TransportOptions) -> Self {
        self.transport_options = options;
        self
    }

    pub fn build(self) -> Result<ClientConfig, ConfigError> {
        let base_url = self
            .base_url
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::MissingBaseUrl)?;
        let access_token = self
            .access_token
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::MissingAccessToken)?;

        let encoding = self.encoding.unwrap_or_else(|| DEFAULT_ENCODING.to_string());
        if !matches!(encoding.to_ascii_lowercase().as_str(), "utf8" | "utf-8") {
            return Err(ConfigError::UnsupportedEncoding(encoding));
        }

        Ok(ClientConfig {
            base_url,
            access_token,
            username: self.username,
            password: self.password,
            encoding,
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            transport_options: self.transport_options,
        })
    }
}

/// `Option<Duration>` as an optional integer number of milliseconds.
mod millis_opt {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(d)?.map(Duration::from_millis))
    }
}
