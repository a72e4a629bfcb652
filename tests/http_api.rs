//! Router-level tests for the HTTP boundary, using the in-memory store.
#![cfg(feature = "server")]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use id_reconcile::api::{create_router, AppState};
use id_reconcile::catalog::FieldCatalog;
use id_reconcile::persistence::MemoryStore;
use id_reconcile::FieldKey;

fn app(store: Arc<MemoryStore>) -> axum::Router {
    create_router(AppState::new(FieldCatalog::identity_card(), store))
}

async fn post_json(router: axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap();
    (status, value)
}

#[tokio::test]
async fn upload_reports_conflicts_as_candidate_objects() {
    let store = Arc::new(MemoryStore::new());
    let (status, body) = post_json(
        app(store),
        "/upload",
        json!({
            "document_1": {"full_name": "Ann", "id_number": "123", "age": 34},
            "document_2": {"full_name": "Anne", "id_number": "123", "age": 34},
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    // the renderer dispatches on object-vs-scalar, so the shape matters
    assert_eq!(
        body["consolidated_details"]["full_name"],
        json!({"document_1": "Ann", "document_2": "Anne"})
    );
    assert_eq!(body["consolidated_details"]["id_number"], json!("123"));
    assert_eq!(body["consolidated_details"]["age"], json!("34"));
    assert_eq!(body["consolidated_details"]["authority"], Value::Null);
    // 1 conflict, 2 matches -> 67
    assert_eq!(body["similarity_percentage"], json!(67));
    assert_eq!(body["document_1_details"]["full_name"], json!("Ann"));
}

#[tokio::test]
async fn upload_with_empty_second_document_is_not_applicable() {
    let store = Arc::new(MemoryStore::new());
    let (status, body) = post_json(
        app(store),
        "/upload",
        json!({
            "document_1": {"full_name": "Ann"},
            "document_2": {},
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["similarity_percentage"], Value::Null);
    assert_eq!(body["consolidated_details"]["full_name"], json!("Ann"));
}

#[tokio::test]
async fn upload_ignores_out_of_catalog_fields_and_null_values() {
    let store = Arc::new(MemoryStore::new());
    let (status, body) = post_json(
        app(store),
        "/upload",
        json!({
            "document_1": {"full_name": "Ann", "shoe_size": "42", "sex": null},
            "document_2": {"full_name": "Ann", "sex": "F"},
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["consolidated_details"]
        .as_object()
        .unwrap()
        .get("shoe_size")
        .is_none());
    // null on one side means only document 2 supplied the field
    assert_eq!(body["consolidated_details"]["sex"], json!("F"));
}

#[tokio::test]
async fn save_persists_catalog_fields_only() {
    let store = Arc::new(MemoryStore::new());
    let (status, body) = post_json(
        app(store.clone()),
        "/save",
        json!({
            "full_name": "Anne",
            "id_number": "123",
            "authority": null,
            "shoe_size": "42",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "success"}));

    let saved = store.saved().await;
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].get(&FieldKey::from("full_name")), Some("Anne"));
    assert_eq!(saved[0].get(&FieldKey::from("shoe_size")), None);
    assert_eq!(saved[0].get(&FieldKey::from("authority")), None);
}

#[tokio::test]
async fn health_reports_ok() {
    let store = Arc::new(MemoryStore::new());
    let response = app(store)
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
