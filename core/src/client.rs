//! Aaro ERP API client.
//!
//! # Design
//! `AaroClient` owns an immutable `ClientConfig` and a `Transport`. Every
//! call is split the same way: a `build_*` method produces an `HttpRequest`
//! without any I/O, then the envelope is dispatched exactly once. Responses
//! are handed back raw; only the status is inspected.
//!
//! The ERP has no native PUT or DELETE. Updates and deletes are both `POST`
//! to `{endpoint}/post` with a `KayitTipi` record-type flag (`2` update,
//! `-1` delete), and that mapping must be kept as-is.

use serde::Serialize;

use crate::config::{ClientConfig, ClientConfigBuilder};
use crate::error::{ApiError, ConfigError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::query::{build_url, QueryParams};
use crate::transport::{Transport, UreqTransport};

pub const RECORD_TYPE_PARAM: &str = "KayitTipi";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_CONTENT_TYPE: &str = "application/json;charset=utf-8";

/// Record operation flag understood by the ERP's `/post` endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    Update,
    Delete,
}

impl RecordType {
    pub fn code(self) -> i32 {
        match self {
            RecordType::Update => 2,
            RecordType::Delete => -1,
        }
    }
}

/// Client for the Aaro REST API.
#[derive(Debug, Clone)]
pub struct AaroClient<T = UreqTransport> {
    config: ClientConfig,
    transport: T,
}

impl AaroClient<UreqTransport> {
    pub fn new(config: ClientConfig) -> Self {
        let transport = UreqTransport::new(config.timeout());
        Self { config, transport }
    }

    /// Validate `options` and build a client. Nothing touches the network.
    pub fn from_options(options: ClientConfigBuilder) -> Result<Self, ConfigError> {
        Ok(Self::new(options.build()?))
    }
}

impl<T: Transport> AaroClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Full URL for `endpoint` with `params` in canonical form.
    pub fn get_url(&self, endpoint: &str, params: &QueryParams) -> String {
        let base = self.config.base_url().trim_end_matches('/');
        build_url(&format!("{base}/api/{endpoint}"), params)
    }

    fn envelope(&self, method: HttpMethod, url: String, body: Option<String>) -> HttpRequest {
        let content_type = if body.is_some() {
            JSON_CONTENT_TYPE
        } else {
            FORM_CONTENT_TYPE
        };
        let mut headers = vec![
            (
                "Authorization".to_string(),
                format!("Bearer {}", self.config.access_token()),
            ),
            ("Accept".to_string(), "application/json".to_string()),
            ("Content-Type".to_string(), content_type.to_string()),
        ];
        self.config.transport_options().apply_headers(&mut headers);
        HttpRequest {
            method,
            url,
            headers,
            body,
        }
    }

    pub fn build_request<D: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        endpoint: &str,
        data: Option<&D>,
        params: &QueryParams,
    ) -> Result<HttpRequest, ApiError> {
        let body = data
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(self.envelope(method, self.get_url(endpoint, params), body))
    }

    pub fn build_get(&self, endpoint: &str, params: &QueryParams) -> HttpRequest {
        self.envelope(HttpMethod::Get, self.get_url(endpoint, params), None)
    }

    pub fn build_post<D: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        data: &D,
        params: &QueryParams,
    ) -> Result<HttpRequest, ApiError> {
        self.build_request(HttpMethod::Post, endpoint, Some(data), params)
    }

    pub fn build_put<D: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        data: &D,
        params: &QueryParams,
    ) -> Result<HttpRequest, ApiError> {
        let params = with_record_type(params, RecordType::Update);
        self.build_request(HttpMethod::Post, &format!("{endpoint}/post"), Some(data), &params)
    }

    pub fn build_delete(&self, endpoint: &str, params: &QueryParams) -> HttpRequest {
        let params = with_record_type(params, RecordType::Delete);
        let url = self.get_url(&format!("{endpoint}/post"), &params);
        self.envelope(HttpMethod::Post, url, None)
    }

    /// Send `request` once. Non-2xx statuses become `ApiError::HttpError`.
    pub fn dispatch(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        tracing::debug!(method = request.method.as_str(), url = %request.url, "dispatching request");
        self.transport.execute(request)?.error_for_status()
    }

    pub fn request<D: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        endpoint: &str,
        data: Option<&D>,
        params: &QueryParams,
    ) -> Result<HttpResponse, ApiError> {
        self.dispatch(self.build_request(method, endpoint, data, params)?)
    }

    pub fn get(&self, endpoint: &str, params: &QueryParams) -> Result<HttpResponse, ApiError> {
        self.dispatch(self.build_get(endpoint, params))
    }

    pub fn post<D: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        data: &D,
        params: &QueryParams,
    ) -> Result<HttpResponse, ApiError> {
        self.dispatch(self.build_post(endpoint, data, params)?)
    }

    pub fn put<D: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        data: &D,
        params: &QueryParams,
    ) -> Result<HttpResponse, ApiError> {
        self.dispatch(self.build_put(endpoint, data, params)?)
    }

    pub fn delete(&self, endpoint: &str, params: &QueryParams) -> Result<HttpResponse, ApiError> {
        self.dispatch(self.build_delete(endpoint, params))
    }
}

/// Copy of `params` with the record-type flag forced to `record_type`.
fn with_record_type(params: &QueryParams, record_type: RecordType) -> QueryParams {
    params.clone().with(RECORD_TYPE_PARAM, record_type.code())
}
