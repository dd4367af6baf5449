use axum::{Json, extract::State};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub components: usize,
    pub versions: usize,
    pub files: usize,
    pub warnings: usize,
}

impl HealthResponse {
    fn from_state(state: &AppState) -> Self {
        let catalog = state.catalog();
        Self {
            status: "UP".to_string(),
            components: catalog.components().count(),
            versions: catalog.version_count(),
            files: catalog.len(),
            warnings: state.warnings().len(),
        }
    }
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::from_state(&state))
}
