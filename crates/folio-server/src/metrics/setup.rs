//! Metrics setup and initialization.

use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};
use tracing::info;

use super::aggregation::{AGGREGATION_SECONDS, register_aggregation_metrics};
use super::http::{HTTP_REQUEST_DURATION_SECONDS, register_http_metrics};

/// Request latency buckets, in seconds.
const HTTP_BUCKETS: &[f64] = &[
    0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
];

/// Aggregation buckets, in seconds. Cold clones take minutes.
const AGGREGATION_BUCKETS: &[f64] = &[0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0];

/// Installs the global Prometheus recorder and returns the handle for `/metrics`.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(HTTP_REQUEST_DURATION_SECONDS.to_string()),
            HTTP_BUCKETS,
        )?
        .set_buckets_for_metric(
            Matcher::Full(AGGREGATION_SECONDS.to_string()),
            AGGREGATION_BUCKETS,
        )?
        .install_recorder()?;

    register_http_metrics();
    register_aggregation_metrics();
    info!("Metrics system initialized");
    Ok(handle)
}
