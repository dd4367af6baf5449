//! Metrics module for Folio Server.

pub mod aggregation;
pub mod http;
pub mod setup;

pub use aggregation::record_aggregation;
pub use setup::init_metrics;
