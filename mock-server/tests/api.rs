use axum::http::{self, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use mock_server::{app, Stok, DEMO_PASSWORD, DEMO_USERNAME};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn token_request(username: &str, password: &str) -> Request<String> {
    Request::builder()
        .method("POST")
        .uri("/Token")
        .header(http::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(format!("grant_type=password&username={username}&password={password}"))
        .unwrap()
}

fn authed(method: &str, uri: &str, token: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::AUTHORIZATION, format!("Bearer {token}"))
        .header(http::header::CONTENT_TYPE, "application/json;charset=utf-8")
        .body(body.to_string())
        .unwrap()
}

async fn login(app: &Router) -> String {
    let resp = app
        .clone()
        .oneshot(token_request(DEMO_USERNAME, DEMO_PASSWORD))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    body_json(resp).await["access_token"].as_str().unwrap().to_string()
}

async fn create(app: &Router, token: &str, kodu: &str, adi: &str) -> Stok {
    let body = format!(r#"{{"StokKodu":"{kodu}","StokAdi":"{adi}"}}"#);
    let resp = app
        .clone()
        .oneshot(authed("POST", "/api/Stok", token, &body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    serde_json::from_value(body_json(resp).await["Model"].clone()).unwrap()
}

// --- token ---

#[tokio::test]
async fn token_issued_for_demo_user() {
    let app = app();
    let resp = app.oneshot(token_request(DEMO_USERNAME, DEMO_PASSWORD)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["token_type"], "bearer");
    assert!(json["access_token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn token_rejects_wrong_password() {
    let app = app();
    let resp = app.oneshot(token_request(DEMO_USERNAME, "nope")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "invalid_grant");
}

// --- auth ---

#[tokio::test]
async fn api_requires_bearer_token() {
    let app = app();
    let resp = app
        .oneshot(Request::builder().uri("/api/Stok").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn api_rejects_unknown_token() {
    let app = app();
    let resp = app
        .oneshot(authed("GET", "/api/Stok", "forged", ""))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- list / create ---

#[tokio::test]
async fn list_starts_empty() {
    let app = app();
    let token = login(&app).await;
    let resp = app.oneshot(authed("GET", "/api/Stok", &token, "")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["Sonuc"], true);
    assert!(json["Model"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn create_then_filter_by_id() {
    let app = app();
    let token = login(&app).await;
    let first = create(&app, &token, "A1", "Kalem").await;
    let second = create(&app, &token, "B2", "Silgi").await;
    assert_eq!(first.stok_id, 1);
    assert_eq!(second.stok_id, 2);

    let resp = app
        .oneshot(authed("GET", "/api/Stok?StokID=2", &token, ""))
        .await
        .unwrap();
    let model = body_json(resp).await["Model"].clone();
    let stoklar: Vec<Stok> = serde_json::from_value(model).unwrap();
    assert_eq!(stoklar, vec![second]);
}

#[tokio::test]
async fn create_malformed_json_returns_422() {
    let app = app();
    let token = login(&app).await;
    let resp = app
        .oneshot(authed("POST", "/api/Stok", &token, r#"{"StokKodu":"A1"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// --- record type ---

#[tokio::test]
async fn update_via_record_type_two() {
    let app = app();
    let token = login(&app).await;
    let stok = create(&app, &token, "A1", "Kalem").await;

    let uri = format!("/api/Stok/post?KayitTipi=2&StokID={}", stok.stok_id);
    let resp = app
        .oneshot(authed("POST", &uri, &token, r#"{"StokAdi":"Tükenmez Kalem"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["Model"]["StokAdi"], "Tükenmez Kalem");
    assert_eq!(json["Model"]["StokKodu"], "A1");
}

#[tokio::test]
async fn delete_via_record_type_minus_one() {
    let app = app();
    let token = login(&app).await;
    let stok = create(&app, &token, "A1", "Kalem").await;

    let uri = format!("/api/Stok/post?KayitTipi=-1&StokID={}", stok.stok_id);
    let resp = app.clone().oneshot(authed("POST", &uri, &token, "")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app.oneshot(authed("POST", &uri, &token, "")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_record_type_returns_400() {
    let app = app();
    let token = login(&app).await;
    let resp = app
        .oneshot(authed("POST", "/api/Stok/post?KayitTipi=9&StokID=1", &token, ""))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn record_type_requires_stok_id() {
    let app = app();
    let token = login(&app).await;
    let resp = app
        .oneshot(authed("POST", "/api/Stok/post?KayitTipi=-1", &token, ""))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let bytes = body_bytes(resp).await;
    assert!(std::str::from_utf8(&bytes).unwrap().contains("StokID"));
}

// --- legacy /Stok ---

#[tokio::test]
async fn legacy_search_pages_and_filters() {
    let app = app();
    let token = login(&app).await;
    create(&app, &token, "K1", "Mavi Kalem").await;
    create(&app, &token, "S1", "Silgi").await;
    create(&app, &token, "K2", "Kırmızı Kalem").await;

    let resp = app
        .clone()
        .oneshot(authed(
            "GET",
            "/Stok?Sayfa=1&SayfaSatirSayisi=1&EsnekAramaKisiti=kalem",
            &token,
            "",
        ))
        .await
        .unwrap();
    let json = body_json(resp).await;
    assert_eq!(json["Model"].as_array().unwrap().len(), 1);
    assert_eq!(json["Model"][0]["StokKodu"], "K1");

    let resp = app
        .oneshot(authed(
            "GET",
            "/Stok?Sayfa=2&SayfaSatirSayisi=1&EsnekAramaKisiti=kalem",
            &token,
            "",
        ))
        .await
        .unwrap();
    let json = body_json(resp).await;
    assert_eq!(json["Model"][0]["StokKodu"], "K2");
}

#[tokio::test]
async fn legacy_lookup_by_id() {
    let app = app();
    let token = login(&app).await;
    let stok = create(&app, &token, "A1", "Kalem").await;

    let uri = format!("/Stok?StokID={}", stok.stok_id);
    let resp = app.oneshot(authed("GET", &uri, &token, "")).await.unwrap();
    let json = body_json(resp).await;
    assert_eq!(json["Model"][0]["StokID"], stok.stok_id);
}
