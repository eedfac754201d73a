//! Executes `HttpRequest` values over the network.
//!
//! # Design
//! The client only ever builds envelopes; a `Transport` turns one into one
//! round-trip. Exactly one attempt is made: no retries, no redirects beyond
//! what the underlying agent does by itself. Non-2xx statuses come back as
//! data; callers turn them into errors with `HttpResponse::error_for_status`.

use std::fmt;
use std::time::Duration;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Something that can execute a single HTTP request.
pub trait Transport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// Blocking transport backed by a `ureq` agent.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_TIMEOUT)
    }
}

fn with_headers<B>(mut builder: ureq::RequestBuilder<B>, headers: &[(String, String)]) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn transport_error(e: ureq::Error) -> ApiError {
    ApiError::Transport(Box::new(e))
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let result = match (method, body) {
            (HttpMethod::Get, _) => with_headers(self.agent.get(&url), &headers).call(),
            (HttpMethod::Delete, _) => with_headers(self.agent.delete(&url), &headers).call(),
            (HttpMethod::Post, Some(body)) => with_headers(self.agent.post(&url), &headers).send(body.as_bytes()),
            (HttpMethod::Post, None) => with_headers(self.agent.post(&url), &headers).send_empty(),
            (HttpMethod::Put, Some(body)) => with_headers(self.agent.put(&url), &headers).send(body.as_bytes()),
            (HttpMethod::Put, None) => with_headers(self.agent.put(&url), &headers).send_empty(),
        };
        let mut response = result.map_err(transport_error)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.body_mut().read_to_string().map_err(transport_error)?;

        Ok(HttpResponse { status, headers, body })
    }
}
