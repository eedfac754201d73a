//! In-memory stand-in for the Aaro ERP used by integration tests.
//!
//! Implements the wire contract the client relies on: the password-grant
//! `/Token` endpoint, the `/api/Stok` resource with its `/post` record-type
//! endpoint, and the legacy `/Stok` lookup. Every resource route requires a
//! bearer token previously issued by `/Token`.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::Arc,
};

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const DEMO_USERNAME: &str = "demo";
pub const DEMO_PASSWORD: &str = "demo123";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Stok {
    #[serde(rename = "StokID")]
    pub stok_id: u64,
    pub stok_kodu: String,
    pub stok_adi: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NewStok {
    pub stok_kodu: String,
    pub stok_adi: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StokUpdate {
    pub stok_kodu: Option<String>,
    pub stok_adi: Option<String>,
}

#[derive(Deserialize)]
pub struct TokenForm {
    pub grant_type: String,
    pub username: String,
    pub password: String,
}

#[derive(Default)]
pub struct Erp {
    tokens: RwLock<HashSet<String>>,
    stoklar: RwLock<BTreeMap<u64, Stok>>,
}

pub type Db = Arc<Erp>;

type Params = Query<HashMap<String, String>>;

pub fn app() -> Router {
    let db: Db = Arc::new(Erp::default());
    Router::new()
        .route("/Token", post(issue_token))
        .route("/api/Stok", get(list_stok).post(create_stok))
        .route("/api/Stok/post", post(record_stok))
        .route("/Stok", get(legacy_stok))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn error(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "Sonuc": false, "Mesaj": message })))
}

async fn authorize(db: &Erp, headers: &HeaderMap) -> Result<(), (StatusCode, Json<Value>)> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    let known = match token {
        Some(t) => db.tokens.read().await.contains(t),
        None => false,
    };
    if known {
        Ok(())
    } else {
        Err(error(StatusCode::UNAUTHORIZED, "Authorization has been denied"))
    }
}

fn stok_id(params: &HashMap<String, String>) -> Result<Option<u64>, (StatusCode, Json<Value>)> {
    params
        .get("StokID")
        .map(|v| v.parse().map_err(|_| error(StatusCode::BAD_REQUEST, "invalid StokID")))
        .transpose()
}

async fn issue_token(
    State(db): State<Db>,
    Form(form): Form<TokenForm>,
) -> (StatusCode, Json<Value>) {
    if form.grant_type != "password" || form.username != DEMO_USERNAME || form.password != DEMO_PASSWORD {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_grant" })),
        );
    }
    let token = Uuid::new_v4().simple().to_string();
    db.tokens.write().await.insert(token.clone());
    (
        StatusCode::OK,
        Json(json!({
            "access_token": token,
            "token_type": "bearer",
            "expires_in": 86399,
        })),
    )
}

async fn list_stok(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(params): Params,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    authorize(&db, &headers).await?;
    let id = stok_id(&params)?;
    let stoklar = db.stoklar.read().await;
    let model: Vec<&Stok> = stoklar.values().filter(|s| id.map_or(true, |id| s.stok_id == id)).collect();
    Ok(Json(json!({ "Sonuc": true, "Model": model })))
}

async fn create_stok(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<NewStok>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    authorize(&db, &headers).await?;
    let mut stoklar = db.stoklar.write().await;
    let stok = Stok {
        stok_id: stoklar.keys().next_back().map_or(1, |id| id + 1),
        stok_kodu: input.stok_kodu,
        stok_adi: input.stok_adi,
    };
    stoklar.insert(stok.stok_id, stok.clone());
    Ok(Json(json!({ "Sonuc": true, "Model": stok })))
}

/// `KayitTipi=2` updates the record named by `StokID`, `KayitTipi=-1`
/// deletes it.
async fn record_stok(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(params): Params,
    body: Bytes,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    authorize(&db, &headers).await?;
    let id = stok_id(&params)?.ok_or_else(|| error(StatusCode::BAD_REQUEST, "StokID is required"))?;
    let mut stoklar = db.stoklar.write().await;

    match params.get("KayitTipi").map(String::as_str) {
        Some("2") => {
            let update: StokUpdate = serde_json::from_slice(&body)
                .map_err(|_| error(StatusCode::BAD_REQUEST, "invalid body"))?;
            let stok = stoklar
                .get_mut(&id)
                .ok_or_else(|| error(StatusCode::NOT_FOUND, "record not found"))?;
            if let Some(kodu) = update.stok_kodu {
                stok.stok_kodu = kodu;
            }
            if let Some(adi) = update.stok_adi {
                stok.stok_adi = adi;
            }
            Ok(Json(json!({ "Sonuc": true, "Model": stok.clone() })))
        }
        Some("-1") => {
            stoklar
                .remove(&id)
                .ok_or_else(|| error(StatusCode::NOT_FOUND, "record not found"))?;
            Ok(Json(json!({ "Sonuc": true })))
        }
        _ => Err(error(StatusCode::BAD_REQUEST, "unknown KayitTipi")),
    }
}

/// Paged, free-text product search used by the legacy helpers.
async fn legacy_stok(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(params): Params,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    authorize(&db, &headers).await?;
    let stoklar = db.stoklar.read().await;

    if let Some(id) = stok_id(&params)? {
        let model: Vec<&Stok> = stoklar.get(&id).into_iter().collect();
        return Ok(Json(json!({ "Sonuc": true, "Model": model })));
    }

    let number = |key: &str, default: usize| {
        params
            .get(key)
            .map(|v| v.parse::<usize>().map_err(|_| error(StatusCode::BAD_REQUEST, "invalid paging")))
            .transpose()
            .map(|v| v.unwrap_or(default))
    };
    let page = number("Sayfa", 1)?.max(1);
    let page_size = number("SayfaSatirSayisi", 20)?;
    let needle = params
        .get("EsnekAramaKisiti")
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    let model: Vec<&Stok> = stoklar
        .values()
        .filter(|s| {
            needle.is_empty()
                || s.stok_adi.to_lowercase().contains(&needle)
                || s.stok_kodu.to_lowercase().contains(&needle)
        })
        .skip((page - 1) * page_size)
        .take(page_size)
        .collect();
    Ok(Json(json!({ "Sonuc": true, "Model": model })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stok_serializes_with_erp_field_names() {
        let stok = Stok {
            stok_id: 7,
            stok_kodu: "A1".to_string(),
            stok_adi: "Kalem".to_string(),
        };
        let json = serde_json::to_value(&stok).unwrap();
        assert_eq!(json["StokID"], 7);
        assert_eq!(json["StokKodu"], "A1");
        assert_eq!(json["StokAdi"], "Kalem");
    }

    #[test]
    fn update_fields_optional() {
        let input: StokUpdate = serde_json::from_str("{}").unwrap();
        assert!(input.stok_kodu.is_none());
        assert!(input.stok_adi.is_none());
    }

    #[test]
    fn new_stok_requires_name() {
        let result: Result<NewStok, _> = serde_json::from_str(r#"{"StokKodu":"A1"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn stok_id_parsing() {
        let mut params = HashMap::new();
        assert_eq!(stok_id(&params).unwrap(), None);
        params.insert("StokID".to_string(), "12".to_string());
        assert_eq!(stok_id(&params).unwrap(), Some(12));
        params.insert("StokID".to_string(), "x".to_string());
        assert!(stok_id(&params).is_err());
    }
}
