//! Client library for the Aaro ERP REST API.
//!
//! # Overview
//! Obtain a bearer token with [`token::request_token`], build an
//! [`AaroClient`] from a [`ClientConfig`], then issue `get`/`post`/`put`/
//! `delete` calls. Every call returns the raw [`HttpResponse`]; business
//! payloads are never interpreted.
//!
//! # Design
//! - Request construction is pure: `AaroClient::build_*` and
//!   [`query::build_url`] produce envelopes and canonical URLs without I/O.
//! - Query strings are canonical: flattened to bracket notation, sorted by
//!   key, percent-encoded.
//! - A [`Transport`] executes each envelope exactly once. [`UreqTransport`]
//!   is the default.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod product;
pub mod query;
pub mod token;
pub mod transport;

pub use client::{AaroClient, RecordType};
pub use config::{ClientConfig, ClientConfigBuilder, TransportOptions};
pub use error::{ApiError, ConfigError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use query::{QueryParams, QueryValue};
pub use token::TokenResponse;
pub use transport::{Transport, UreqTransport};
