//! HTTP handlers under `/asset-manager`.
//!
//! Every response is JSON with a `status` field. Validation and remote
//! failures are reported in the body with HTTP 200.

use assetmgr_file_ops::{FileOpsError, delete_output_file, list_output_files, resolve_output_path};
use assetmgr_upload::{BatchCoordinator, BatchItem, UploadTarget};
use axum::Json;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};

use crate::app::AppState;

/// Body of `POST /upload_assets`.
#[derive(Debug, Deserialize)]
pub struct UploadAssetsRequest {
    /// Paths relative to the output folder, `/`-separated.
    #[serde(default)]
    pub assets: Vec<String>,
    pub project_id: Option<String>,
    pub folder_id: Option<String>,
    pub organization_id: Option<String>,
    /// Sent as `{}` when absent.
    pub metadata: Option<serde_json::Value>,
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteImageRequest {
    #[serde(default)]
    pub image_path: String,
}

/// Query of the remote metadata routes.
#[derive(Debug, Deserialize)]
pub struct RemoteQuery {
    pub api_key: Option<String>,
    pub organization_id: Option<String>,
}

fn error_body(message: impl Into<String>) -> Response {
    Json(json!({"status": "error", "message": message.into()})).into_response()
}

/// Message shown for a failed remote read.
fn remote_error_message(err: &assetmgr_api::Error) -> String {
    match err.status() {
        Some(status) if !err.is_application() => format!("HTTP error! status: {status}"),
        _ => err.to_string(),
    }
}

pub async fn get_output_images(State(state): State<AppState>) -> Response {
    let root = state.config().output_dir.clone();
    let file_types = state.settings().file_types.clone();

    let listed = tokio::task::spawn_blocking(move || list_output_files(&root, &file_types))
        .await
        .map_err(|e| e.to_string())
        .and_then(|r| r.map_err(|e| e.to_string()));

    match listed {
        Ok(images) => Json(json!({
            "status": "success",
            "count": images.len(),
            "images": images,
        }))
        .into_response(),
        Err(message) => {
            warn!(error = %message, "listing output folder failed");
            Json(json!({"status": "error", "message": message, "images": []})).into_response()
        }
    }
}

pub async fn upload_assets(
    State(state): State<AppState>,
    Json(req): Json<UploadAssetsRequest>,
) -> Response {
    let Some(api_key) = state.config().resolve_api_key(req.api_key.as_deref()) else {
        return error_body("API key is required");
    };
    if req.assets.is_empty() {
        return error_body("No assets selected for upload");
    }
    let target = match UploadTarget::new(req.project_id.unwrap_or_default()) {
        Ok(target) => target
            .with_folder(req.folder_id)
            .with_organization(req.organization_id)
            .with_metadata(Some(req.metadata.unwrap_or_else(|| json!({})))),
        Err(e) => return error_body(e.to_string()),
    };

    let root = &state.config().output_dir;
    let mut items = Vec::with_capacity(req.assets.len());
    for asset in req.assets {
        match resolve_output_path(root, &asset) {
            Ok(path) => items.push(BatchItem::new(asset, path)),
            Err(e) => {
                warn!(asset = %asset, error = ?e, "rejected asset path");
                return error_body(e.to_string());
            }
        }
    }

    let client = match state.client(&api_key) {
        Ok(client) => client,
        Err(e) => return error_body(e.to_string()),
    };

    let result = BatchCoordinator::new(&client, state.settings())
        .run(items, &target)
        .await;
    Json(result).into_response()
}

pub async fn delete_image(
    State(state): State<AppState>,
    Json(req): Json<DeleteImageRequest>,
) -> Response {
    let root = state.config().output_dir.clone();
    let relative = req.image_path.clone();
    let deleted = tokio::task::spawn_blocking(move || delete_output_file(&root, &relative)).await;

    match deleted {
        Ok(Ok(_)) => Json(json!({
            "status": "success",
            "message": format!("Successfully deleted {}", req.image_path),
        }))
        .into_response(),
        Ok(Err(e)) => {
            if let FileOpsError::InvalidPath(reason) = &e {
                warn!(path = %req.image_path, reason = %reason, "refused delete");
            }
            error_body(e.to_string())
        }
        Err(e) => {
            error!(error = %e, "delete task failed");
            error_body(e.to_string())
        }
    }
}

pub async fn get_organizations(
    State(state): State<AppState>,
    Query(query): Query<RemoteQuery>,
) -> Response {
    let Some(api_key) = state.config().resolve_api_key(query.api_key.as_deref()) else {
        return Json(json!({
            "status": "error",
            "message": "API key is required",
            "organizations": [],
        }))
        .into_response();
    };

    let result = match state.client(&api_key) {
        Ok(client) => client.get_organizations().await,
        Err(e) => Err(e),
    };
    match result {
        Ok(organizations) => {
            info!(count = organizations.len(), "loaded organizations");
            Json(json!({"status": "success", "organizations": organizations})).into_response()
        }
        Err(e) => {
            error!(error = %e, "loading organizations failed");
            Json(json!({
                "status": "error",
                "message": remote_error_message(&e),
                "organizations": [],
            }))
            .into_response()
        }
    }
}

pub async fn get_projects(
    State(state): State<AppState>,
    Query(query): Query<RemoteQuery>,
) -> Response {
    let Some(api_key) = state.config().resolve_api_key(query.api_key.as_deref()) else {
        return Json(json!({
            "status": "error",
            "message": "API key is required",
            "projects": [],
        }))
        .into_response();
    };

    let result = match state.client(&api_key) {
        Ok(client) => client.get_projects(query.organization_id.as_deref()).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(projects) => {
            info!(count = projects.len(), "loaded projects");
            Json(json!({"status": "success", "projects": projects})).into_response()
        }
        Err(e) => {
            error!(error = %e, "loading projects failed");
            Json(json!({
                "status": "error",
                "message": remote_error_message(&e),
                "projects": [],
            }))
            .into_response()
        }
    }
}

pub async fn test_connection(
    State(state): State<AppState>,
    Query(query): Query<RemoteQuery>,
) -> Response {
    let Some(api_key) = state.config().resolve_api_key(query.api_key.as_deref()) else {
        return error_body("API key is required");
    };

    let result = match state.client(&api_key) {
        Ok(client) => client.test_connection().await,
        Err(e) => Err(e),
    };
    match result {
        Ok(()) => Json(json!({"status": "success", "message": "API connection successful"}))
            .into_response(),
        Err(e) => match e.status() {
            Some(status) => error_body(format!("API returned status code {status}")),
            None => error_body(format!("Connection failed: {e}")),
        },
    }
}
