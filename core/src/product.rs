//! Legacy product (`Stok`) lookups.
//!
//! These calls predate `AaroClient` and use their own convention: a plain
//! `GET {base}/Stok` with the parameters in a fixed order and only an
//! `Authorization` header. They do not go through query canonicalization.
//! Non-2xx answers fail the same way as client calls.

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::query::encode_component;
use crate::transport::Transport;

fn stok_request(token: &str, base_url: &str, query: String) -> HttpRequest {
    HttpRequest {
        method: HttpMethod::Get,
        url: format!("{}/Stok?{query}", base_url.trim_end_matches('/')),
        headers: vec![("Authorization".to_string(), format!("Bearer {token}"))],
        body: None,
    }
}

/// Page through products whose fields match `flex_query`.
pub fn build_products_flex(
    token: &str,
    base_url: &str,
    flex_query: &str,
    page: u32,
    page_size: u32,
) -> HttpRequest {
    stok_request(
        token,
        base_url,
        format!(
            "Sayfa={page}&SayfaSatirSayisi={page_size}&EsnekAramaKisiti={}",
            encode_component(flex_query)
        ),
    )
}

pub fn build_product_by_stok_id(token: &str, base_url: &str, stok_id: u64) -> HttpRequest {
    stok_request(token, base_url, format!("StokID={stok_id}"))
}

pub fn get_products_flex<T: Transport>(
    transport: &T,
    token: &str,
    base_url: &str,
    flex_query: &str,
    page: u32,
    page_size: u32,
) -> Result<HttpResponse, ApiError> {
    transport
        .execute(build_products_flex(token, base_url, flex_query, page, page_size))?
        .error_for_status()
}

pub fn get_product_by_stok_id<T: Transport>(
    transport: &T,
    token: &str,
    base_url: &str,
    stok_id: u64,
) -> Result<HttpResponse, ApiError> {
    transport
        .execute(build_product_by_stok_id(token, base_url, stok_id))?
        .error_for_status()
}
