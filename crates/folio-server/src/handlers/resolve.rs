//! Resource ID resolution endpoints.

use axum::{
    Json,
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use folio_core::{ContentCatalog, Family, Origin, ResourceContext, VirtualFile, resolve_resource};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::AppError;
use crate::state::AppState;

/// Query parameters shared by /resolve and /raw.
///
/// `component`, `version` and `module` give the context that relative IDs are
/// resolved against. `family` applies to IDs that name none.
#[derive(Debug, Deserialize)]
pub struct ResolveQuery {
    pub id: String,
    pub component: Option<String>,
    pub version: Option<String>,
    pub module: Option<String>,
    pub family: Option<String>,
}

impl ResolveQuery {
    fn context(&self) -> ResourceContext {
        ResourceContext {
            component: self.component.clone(),
            version: self.version.clone(),
            module: self.module.clone(),
            ..ResourceContext::default()
        }
    }

    fn default_family(&self) -> Result<Option<Family>, AppError> {
        self.family
            .as_deref()
            .map(|family| family.parse::<Family>().map_err(AppError::BadRequest))
            .transpose()
    }

    fn resolve<'a>(&self, catalog: &'a ContentCatalog) -> Result<&'a VirtualFile, AppError> {
        let family = self.default_family()?;
        resolve_resource(&self.id, catalog, &self.context(), family, None)?
            .ok_or_else(|| AppError::not_found(format!("Resource '{}' not found", self.id)))
    }
}

/// Metadata of a resolved catalog file.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResponse {
    pub id: String,
    pub component: String,
    pub version: String,
    pub module: String,
    pub family: Family,
    pub relative: String,
    pub path: String,
    pub media_type: &'static str,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mtime: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit_url: Option<String>,
    /// For an alias, the ID of the page it points to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    pub origin: Origin,
}

impl FileResponse {
    fn from_file(file: &VirtualFile) -> Self {
        let src = file.src();
        let key = file.key();
        let stat = file.stat();
        Self {
            id: key.to_string(),
            component: key.component.clone(),
            version: key.version.clone(),
            module: key.module.clone(),
            family: key.family,
            relative: key.relative.clone(),
            path: src.path.clone(),
            media_type: media_type(&src.extname),
            size: stat.size,
            mtime: stat.mtime,
            edit_url: src.edit_url.clone(),
            target: file.rel().map(ToString::to_string),
            origin: src.origin.as_ref().clone(),
        }
    }
}

/// Handler for GET /resolve.
#[instrument(skip_all, fields(id = %query.id))]
pub async fn resolve_file(
    State(state): State<AppState>,
    Query(query): Query<ResolveQuery>,
) -> Result<Json<FileResponse>, AppError> {
    let file = query.resolve(state.catalog())?;
    debug!(resolved = %file.key(), "Resolved resource ID");
    Ok(Json(FileResponse::from_file(file)))
}

/// Handler for GET /raw: the contents of the resolved file.
///
/// Aliases are followed to the page they point to.
#[instrument(skip_all, fields(id = %query.id))]
pub async fn raw_file(
    State(state): State<AppState>,
    Query(query): Query<ResolveQuery>,
) -> Result<Response, AppError> {
    let catalog = state.catalog();
    let mut file = query.resolve(catalog)?;
    if let Some(target) = file.rel() {
        file = catalog
            .get_by_id(target)
            .ok_or_else(|| AppError::Internal(format!("Alias target '{}' is missing", target)))?;
    }

    let content_type = media_type(&file.src().extname);
    Ok(([(header::CONTENT_TYPE, content_type)], file.contents().to_vec()).into_response())
}

/// Media type for a file extension (including the dot).
pub fn media_type(extname: &str) -> &'static str {
    match extname.to_ascii_lowercase().as_str() {
        ".adoc" | ".asciidoc" => "text/asciidoc; charset=utf-8",
        ".txt" => "text/plain; charset=utf-8",
        ".html" => "text/html; charset=utf-8",
        ".css" => "text/css; charset=utf-8",
        ".js" => "text/javascript; charset=utf-8",
        ".json" => "application/json",
        ".yml" | ".yaml" => "application/yaml",
        ".xml" => "application/xml",
        ".svg" => "image/svg+xml",
        ".png" => "image/png",
        ".jpg" | ".jpeg" => "image/jpeg",
        ".gif" => "image/gif",
        ".webp" => "image/webp",
        ".pdf" => "application/pdf",
        ".zip" => "application/zip",
        _ => "application/octet-stream",
    }
}
