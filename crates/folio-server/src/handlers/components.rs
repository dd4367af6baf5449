//! Component and component version lookups.

use axum::{
    Json,
    extract::{Path, State},
};
use folio_core::{Component, ComponentVersion};
use serde::Serialize;
use tracing::instrument;

use crate::error::AppError;
use crate::state::AppState;

/// A component version with the start page it resolves to.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentVersionResponse {
    #[serde(flatten)]
    pub version: ComponentVersion,
    /// Catalog ID of the resolved start page, if it exists.
    pub resolved_start_page: Option<String>,
}

/// Handler for GET /components.
pub async fn list_components(State(state): State<AppState>) -> Json<Vec<Component>> {
    Json(state.catalog().components().cloned().collect())
}

/// Handler for GET /components/{name}.
#[instrument(skip_all, fields(name = %name))]
pub async fn get_component(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Component>, AppError> {
    state
        .catalog()
        .get_component(&name)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("Component '{}' not found", name)))
}

/// Handler for GET /components/{name}/{version}.
///
/// The version `latest` stands for the component's latest version.
#[instrument(skip_all, fields(name = %name, version = %version))]
pub async fn get_component_version(
    State(state): State<AppState>,
    Path((name, version)): Path<(String, String)>,
) -> Result<Json<ComponentVersionResponse>, AppError> {
    let catalog = state.catalog();
    let found = if version == "latest" {
        catalog.latest(&name)
    } else {
        catalog.get_component_version(&name, &version)
    };
    let found = found.ok_or_else(|| {
        AppError::not_found(format!("Version '{}' of component '{}' not found", version, name))
    })?;

    let resolved_start_page = catalog
        .resolve_start_page(&found.name, &found.version)
        .ok()
        .flatten()
        .map(|file| file.key().to_string());

    Ok(Json(ComponentVersionResponse {
        version: found.clone(),
        resolved_start_page,
    }))
}
