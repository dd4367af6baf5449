//! Structured request logging.

use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use tracing::{Instrument, info, info_span, warn};

use super::request_id::REQUEST_ID_HEADER;

/// Logs each request inside a span carrying its ID, method and path.
///
/// Must run inside [`super::request_id`] so the ID is already set.
pub async fn log_requests(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let request_id = request
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let span = info_span!(
        "http_request",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
    );

    async move {
        let response = next.run(request).await;
        let status = response.status();
        let duration_ms = start.elapsed().as_millis() as u64;

        if status.is_server_error() {
            warn!(status = status.as_u16(), duration_ms, "Request failed");
        } else {
            info!(status = status.as_u16(), duration_ms, "Request completed");
        }
        response
    }
    .instrument(span)
    .await
}
