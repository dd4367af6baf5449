//! In-process HTTP client for router tests.

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, Bytes},
    http::{HeaderMap, Request, StatusCode, header::CONTENT_TYPE},
};
use folio_core::ContentCatalog;
use folio_server::AppState;
use http_body_util::BodyExt;
use metrics_exporter_prometheus::PrometheusBuilder;
use tower::ServiceExt;

use super::catalog::sample_catalog;

const REQUEST_ID: &str = "x-request-id";

/// Sends GET requests straight into a router.
pub struct TestClient {
    app: Router,
}

impl TestClient {
    pub fn new(app: Router) -> Self {
        Self { app }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.get_with_headers(uri, &[]).await
    }

    pub async fn get_with_headers(&self, uri: &str, headers: &[(&str, &str)]) -> TestResponse {
        let request = headers
            .iter()
            .fold(Request::get(uri), |builder, (name, value)| builder.header(*name, *value))
            .body(Body::empty())
            .unwrap();

        let (parts, body) = self.app.clone().oneshot(request).await.unwrap().into_parts();
        TestResponse {
            status: parts.status,
            headers: parts.headers,
            body: body.collect().await.unwrap().to_bytes(),
        }
    }
}

/// A fully read response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body)
            .unwrap_or_else(|e| panic!("invalid JSON ({}): {}", e, self.text()))
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The correlation ID the middleware put on the response.
    pub fn request_id(&self) -> Option<&str> {
        self.header(REQUEST_ID)
    }

    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(self.status, expected, "body: {}", self.text());
        self
    }

    pub fn assert_content_type_contains(&self, expected: &str) -> &Self {
        let content_type = self.header(CONTENT_TYPE.as_str()).unwrap_or_default();
        assert!(content_type.contains(expected), "content-type: {:?}", content_type);
        self
    }
}

/// A client serving the sample catalog.
pub fn client() -> TestClient {
    TestClient::new(router(sample_catalog()))
}

/// The full router around `catalog`, with a recorder that is not installed globally.
pub fn router(catalog: ContentCatalog) -> Router {
    let handle = PrometheusBuilder::new().build_recorder().handle();
    folio_server::create_router(AppState::new(Arc::new(catalog)), handle)
}
