use std::net::SocketAddr;

use axum::{Router, middleware, routing::get};
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceBuilder;
use tracing::{error, info};

use crate::handlers::{
    components::{get_component, get_component_version, list_components},
    health::health_check,
    metrics::metrics_handler,
    resolve::{raw_file, resolve_file},
};
use crate::metrics::http::http_metrics_middleware;
use crate::middleware::{log_requests, request_id};
use crate::state::AppState;

/// Creates the router serving `state`'s catalog and the metrics in `prometheus_handle`.
pub fn create_router(state: AppState, prometheus_handle: PrometheusHandle) -> Router {
    let middleware_stack = ServiceBuilder::new()
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(log_requests));

    // Router for metrics endpoint (different state)
    let metrics_router = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(prometheus_handle);

    let catalog_router = Router::new()
        .route("/health", get(health_check))
        .route("/components", get(list_components))
        .route("/components/{name}", get(get_component))
        .route("/components/{name}/{version}", get(get_component_version))
        .route("/resolve", get(resolve_file))
        .route("/raw", get(raw_file))
        .with_state(state);

    Router::new()
        .merge(catalog_router)
        .merge(metrics_router)
        .layer(middleware::from_fn(http_metrics_middleware))
        .layer(middleware_stack)
}

/// Serves `state` on `addr` until a shutdown signal arrives.
pub async fn run_server(
    addr: SocketAddr,
    state: AppState,
    prometheus_handle: PrometheusHandle,
) -> Result<(), std::io::Error> {
    let app = create_router(state, prometheus_handle);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
