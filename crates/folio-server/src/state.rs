//! Application state.

use std::sync::Arc;

use folio_core::ContentCatalog;
use folio_git::Aggregation;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    catalog: Arc<ContentCatalog>,
    /// Warnings collected while the catalog was aggregated.
    warnings: Arc<Vec<String>>,
}

impl AppState {
    /// Creates a new AppState serving `catalog`.
    pub fn new(catalog: Arc<ContentCatalog>) -> Self {
        Self {
            catalog,
            warnings: Arc::new(Vec::new()),
        }
    }

    /// Creates an AppState from the result of an aggregation run.
    pub fn from_aggregation(aggregation: Aggregation) -> Self {
        Self {
            catalog: aggregation.catalog,
            warnings: Arc::new(aggregation.warnings.iter().map(ToString::to_string).collect()),
        }
    }

    pub fn catalog(&self) -> &ContentCatalog {
        &self.catalog
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}
