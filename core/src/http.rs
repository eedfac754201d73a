//! HTTP envelopes exchanged between the client and a `Transport`.
//!
//! # Design
//! Requests and responses are plain data. The client builds an `HttpRequest`
//! for every call and hands it to a transport; whatever comes back is
//! returned to the caller as an `HttpResponse` without touching the payload.
//! Headers are kept as an ordered list of exact-string pairs.

use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// An HTTP request described as plain data.
///
/// Built fresh for every call and never mutated once dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// First header whose name matches `name` exactly.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// A raw HTTP response as returned by the transport.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-2xx response into `ApiError::HttpError`, keeping headers
    /// and body untouched.
    pub fn error_for_status(self) -> Result<Self, ApiError> {
        if self.is_success() {
            return Ok(self);
        }
        tracing::warn!(status = self.status, "request failed");
        Err(ApiError::HttpError {
            status: self.status,
            headers: self.headers,
            body: self.body,
        })
    }

    /// Decode the body as JSON. The client never does this on its own.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_str(&self.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
    }
}
