mod helpers;

use axum::http::StatusCode;
use folio_core::ContentCatalog;
use helpers::{TestClient, client, router};

#[tokio::test]
async fn health_check_returns_200() {
    client().get("/health").await.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn health_check_returns_json() {
    client()
        .get("/health")
        .await
        .assert_content_type_contains("application/json");
}

#[tokio::test]
async fn health_check_reports_catalog_size() {
    let health: serde_json::Value = client().get("/health").await.json();

    assert_eq!(health["status"], "UP");
    assert_eq!(health["components"], 1);
    assert_eq!(health["versions"], 2);
    assert_eq!(health["warnings"], 0);
}

#[tokio::test]
async fn health_check_with_empty_catalog() {
    let client = TestClient::new(router(ContentCatalog::default()));
    let health: serde_json::Value = client.get("/health").await.json();

    assert_eq!(health["status"], "UP");
    assert_eq!(health["files"], 0);
}

#[tokio::test]
async fn metrics_endpoint_is_prometheus_text() {
    client()
        .get("/metrics")
        .await
        .assert_status(StatusCode::OK)
        .assert_content_type_contains("text/plain");
}
