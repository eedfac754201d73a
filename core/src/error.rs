//! Error types for the Aaro client.
//!
//! # Design
//! Configuration problems are reported before any network activity through
//! `ConfigError`. Everything that happens on the wire lands in `ApiError`
//! exactly as the transport saw it: a transport failure, or a non-2xx status
//! with the raw headers and body kept for the caller.

use thiserror::Error;

/// Problems found while assembling a `ClientConfig`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("baseUrl is required")]
    MissingBaseUrl,

    #[error("accessToken is required")]
    MissingAccessToken,

    #[error("unsupported response encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
}

/// Errors returned by client calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network failure, timeout, or anything else the transport could not
    /// turn into a response.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The server answered with a non-2xx status. Headers and body are
    /// kept exactly as received.
    #[error("HTTP {status}: {body}")]
    HttpError {
        status: u16,
        headers: Vec<(String, String)>,
        body: String,
    },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// A response body could not be decoded into the requested type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(ConfigError::MissingBaseUrl.to_string(), "baseUrl is required");
        let err = ApiError::HttpError {
            status: 401,
            headers: Vec::new(),
            body: "denied".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 401: denied");
    }
}
