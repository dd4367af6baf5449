//! Aggregation run metrics.

use std::time::Duration;

use folio_git::Aggregation;
use metrics::{counter, gauge, histogram};

pub const AGGREGATION_SECONDS: &str = "folio_aggregation_seconds";
pub const CATALOG_FILES: &str = "folio_catalog_files";
pub const AGGREGATION_WARNINGS_TOTAL: &str = "folio_aggregation_warnings_total";

pub fn register_aggregation_metrics() {
    metrics::describe_histogram!(
        AGGREGATION_SECONDS,
        metrics::Unit::Seconds,
        "Time spent aggregating all content sources"
    );
    metrics::describe_gauge!(CATALOG_FILES, "Files in the content catalog");
    metrics::describe_counter!(
        AGGREGATION_WARNINGS_TOTAL,
        "Problems that skipped a ref, a source, a file or an alias"
    );
}

/// Records one finished aggregation run.
pub fn record_aggregation(aggregation: &Aggregation, elapsed: Duration) {
    histogram!(AGGREGATION_SECONDS).record(elapsed.as_secs_f64());
    gauge!(CATALOG_FILES).set(aggregation.catalog.len() as f64);

    for warning in &aggregation.warnings {
        let kind = if warning.is_network() {
            "network"
        } else if warning.is_descriptor_problem() {
            "descriptor"
        } else {
            "other"
        };
        counter!(AGGREGATION_WARNINGS_TOTAL, "kind" => kind).increment(1);
    }
}
