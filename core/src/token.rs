//! OAuth2 password-grant token request.
//!
//! The ERP issues bearer tokens from `POST {base}/Token`. This module builds
//! that single request and, on demand, decodes the standard OAuth2 fields
//! from the answer. Nothing here is retried or cached.

use serde::Deserialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::query::encode_form_value;
use crate::transport::Transport;

/// Token payload returned by a successful password grant.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

impl TokenResponse {
    pub fn from_response(response: &HttpResponse) -> Result<Self, ApiError> {
        response.json()
    }
}

pub fn build_token_request(base_url: &str, username: &str, password: &str) -> HttpRequest {
    let body = [
        ("grant_type", "password"),
        ("username", username),
        ("password", password),
    ]
    .iter()
    .map(|(k, v)| format!("{k}={}", encode_form_value(v)))
    .collect::<Vec<_>>()
    .join("&");

    HttpRequest {
        method: HttpMethod::Post,
        url: format!("{}/Token", base_url.trim_end_matches('/')),
        headers: vec![(
            "Content-Type".to_string(),
            "application/x-www-form-urlencoded".to_string(),
        )],
        body: Some(body),
    }
}

/// Issue one token request. A non-2xx answer is an `ApiError::HttpError`.
pub fn request_token<T: Transport>(
    transport: &T,
    base_url: &str,
    username: &str,
    password: &str,
) -> Result<HttpResponse, ApiError> {
    tracing::debug!(base_url, username, "requesting access token");
    transport
        .execute(build_token_request(base_url, username, password))?
        .error_for_status()
}
