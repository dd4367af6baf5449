//! Folio Server - HTTP server for Folio
//!
//! Aggregates the configured content sources once at startup and serves
//! read-only lookups into the resulting content catalog.

pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod server;
pub mod settings;
pub mod state;

pub use error::AppError;
pub use handlers::health::HealthResponse;
pub use server::{create_router, run_server};
pub use settings::{ServerSettings, Settings};
pub use state::AppState;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
