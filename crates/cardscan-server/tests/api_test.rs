//! Integration tests for the card API, driven through the router without a socket.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use cardscan_core::{CardStore, InMemoryCardStore, SqliteCardStore, StorageProvider};
use cardscan_server::{create_server, create_server_with_static, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

fn memory_app() -> Router {
    create_server(AppState::new(
        Arc::new(InMemoryCardStore::new()),
        StorageProvider::Memory,
    ))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn post_json(body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/cards")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_create_then_list() {
    let app = memory_app();

    let (status, created) = send(
        &app,
        post_json(json!({
            "surname": " DUPONT ",
            "givenName": "JEAN",
            "policyNumber": "1234567890123",
            "insurer": "CPAM"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["surname"], "DUPONT");
    assert_eq!(created["givenName"], "JEAN");
    assert_eq!(created["id"].as_str().unwrap().len(), 36);
    assert!(created["registeredAt"].is_string());
    assert!(created.get("imageData").is_none());

    let (status, listed) = send(&app, get("/cards")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed, json!([created]));
}

#[tokio::test]
async fn test_missing_fields_rejected() {
    let app = memory_app();

    let (status, body) = send(
        &app,
        post_json(json!({
            "surname": "DUPONT",
            "givenName": "   ",
            "policyNumber": "1234567890123"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VAL_002");
    assert_eq!(body["error"]["details"]["missing"], json!(["givenName", "insurer"]));

    let (_, listed) = send(&app, get("/cards")).await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn test_malformed_json_rejected() {
    let app = memory_app();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/cards")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"surname\": "))
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VAL_001");
}

#[tokio::test]
async fn test_storage_failure_is_500() {
    let store = Arc::new(SqliteCardStore::in_memory().unwrap());
    let app = create_server(AppState::new(store.clone(), StorageProvider::Sqlite));
    store.close().await.unwrap();

    let (status, body) = send(&app, get("/cards")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "STO_001");
}

#[tokio::test]
async fn test_image_data_round_trips() {
    let app = memory_app();
    let image = format!("data:image/jpeg;base64,{}", "A".repeat(2 * 1024 * 1024));

    let (status, created) = send(
        &app,
        post_json(json!({
            "surname": "MARTIN",
            "givenName": "LÉA",
            "policyNumber": "2850775123456",
            "insurer": "MGEN",
            "imageData": image
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["imageData"].as_str().unwrap().len(), image.len());
}

#[tokio::test]
async fn test_health() {
    let app = memory_app();

    let (status, body) = send(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "memory");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_static_fallback() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>cardscan</h1>").unwrap();
    let app = create_server_with_static(
        AppState::new(Arc::new(InMemoryCardStore::new()), StorageProvider::Memory),
        dir.path(),
    );

    let response = app.clone().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"<h1>cardscan</h1>");

    let (status, _) = send(&app, get("/cards")).await;
    assert_eq!(status, StatusCode::OK);
}
