//! Admin image management: list, upload, replace, delete, rename

use axum::{
    extract::{rejection::JsonRejection, Multipart, Path, Query, State},
    response::Json as ResponseJson,
    routing::{delete, get, post},
    Json, Router,
};
use icevan_assets::{AssetFolder, DeleteOutcome, Replacement, StoredAsset};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Failure};
use crate::multipart::UploadForm;
use crate::state::AppState;

/// Folder listed when the request names none
pub const DEFAULT_LIST_FOLDER: &str = "images/fotos-servicos";

#[derive(Debug, Deserialize)]
pub struct FolderQuery {
    pub folder: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ImageEntry {
    pub filename: String,
    pub url: String,
    pub folder: AssetFolder,
    pub position: usize,
    pub timestamp: i64,
}

#[derive(Debug, Serialize)]
pub struct ImageListResponse {
    pub images: Vec<ImageEntry>,
    pub folders: Vec<AssetFolder>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub ok: bool,
    pub url: String,
    pub filename: String,
    pub timestamp: i64,
}

impl From<StoredAsset> for UploadResponse {
    fn from(stored: StoredAsset) -> Self {
        Self {
            ok: true,
            url: stored.url,
            filename: stored.filename,
            timestamp: stored.timestamp,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReplaceResponse {
    #[serde(flatten)]
    pub upload: UploadResponse,
    pub replaced: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameRequest {
    #[serde(default)]
    pub folder: String,
    #[serde(default)]
    pub old_filename: String,
    #[serde(default)]
    pub new_filename: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameResponse {
    pub ok: bool,
    pub old_filename: String,
    pub new_filename: String,
}

/// GET /api/admin/images?folder=images/hero
/// Ordered images of a folder plus the folder allow-list
pub async fn list_images(
    State(state): State<AppState>,
    Query(query): Query<FolderQuery>,
) -> Result<ResponseJson<ImageListResponse>, Failure> {
    let folder = query.folder.as_deref().unwrap_or(DEFAULT_LIST_FOLDER);
    let assets = state.store.list(folder).await.map_err(|e| state.fail(e))?;

    let timestamp = chrono::Utc::now().timestamp_millis();
    let images = assets
        .into_iter()
        .map(|asset| ImageEntry {
            url: asset.url(),
            filename: asset.filename,
            folder: asset.folder,
            position: asset.position,
            timestamp,
        })
        .collect();

    Ok(ResponseJson(ImageListResponse {
        images,
        folders: state.store.registry().folders().to_vec(),
    }))
}

/// POST /api/admin/images
/// Multipart `file`, `folder`, optional `saveas` for exact naming
pub async fn upload_image(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<ResponseJson<UploadResponse>, Failure> {
    let stored = upload(&state, multipart).await.map_err(|e| state.fail(e))?;
    Ok(ResponseJson(stored.into()))
}

async fn upload(state: &AppState, multipart: Multipart) -> Result<StoredAsset, ApiError> {
    let mut form = UploadForm::read(multipart).await?;
    let file = form.take_file()?;
    let folder = form.require("folder")?;

    let stored = match form.text("saveas") {
        Some(exact) => state.store.save_as(folder, &file.bytes, exact).await?,
        None => state.store.append(folder, &file.bytes, &file.name).await?,
    };
    Ok(stored)
}

/// POST /api/admin/images/replace
/// Multipart `file`, `folder`, `target`, optional zero-based `position`
pub async fn replace_image(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<ResponseJson<ReplaceResponse>, Failure> {
    let replacement = replace(&state, multipart).await.map_err(|e| state.fail(e))?;
    Ok(ResponseJson(ReplaceResponse {
        upload: replacement.stored.into(),
        replaced: replacement.replaced,
    }))
}

async fn replace(
    state: &AppState,
    multipart: Multipart,
) -> Result<Replacement, ApiError> {
    let mut form = UploadForm::read(multipart).await?;
    let file = form.take_file()?;
    let folder = form.require("folder")?;
    let target = form.require("target")?;

    let replacement = match form.text("position") {
        Some(raw) => {
            let position = raw
                .parse::<usize>()
                .map_err(|_| ApiError::InvalidParameters(format!("position '{raw}'")))?;
            state
                .store
                .replace_at(folder, target, position, &file.bytes, &file.name)
                .await?
        }
        None => {
            state
                .store
                .replace(folder, target, &file.bytes, &file.name)
                .await?
        }
    };
    Ok(replacement)
}

/// DELETE /api/admin/images/:filename?folder=images/hero
/// Idempotent; a missing file still answers `ok`
pub async fn delete_image(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    Query(query): Query<FolderQuery>,
) -> Result<ResponseJson<DeleteResponse>, Failure> {
    let folder = query.folder.unwrap_or_default();
    let outcome = state
        .store
        .delete(&folder, &filename)
        .await
        .map_err(|e| state.fail(e))?;

    Ok(ResponseJson(DeleteResponse {
        ok: true,
        message: match outcome {
            DeleteOutcome::Removed => None,
            DeleteOutcome::AlreadyAbsent => Some("Arquivo já não existe"),
        },
    }))
}

/// POST /api/admin/images/rename
/// JSON `{ folder, oldFilename, newFilename }`
pub async fn rename_image(
    State(state): State<AppState>,
    payload: Result<Json<RenameRequest>, JsonRejection>,
) -> Result<ResponseJson<RenameResponse>, Failure> {
    let Json(request) =
        payload.map_err(|e| state.fail(ApiError::InvalidParameters(e.body_text())))?;
    if request.folder.is_empty() || request.old_filename.is_empty() || request.new_filename.is_empty() {
        return Err(state.fail(ApiError::InvalidParameters(
            "folder, oldFilename and newFilename are required".to_string(),
        )));
    }

    state
        .store
        .rename(&request.folder, &request.old_filename, &request.new_filename)
        .await
        .map_err(|e| state.fail(e))?;

    Ok(ResponseJson(RenameResponse {
        ok: true,
        old_filename: request.old_filename,
        new_filename: request.new_filename,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/images", get(list_images).post(upload_image))
        .route("/api/admin/images/replace", post(replace_image))
        .route("/api/admin/images/rename", post(rename_image))
        .route("/api/admin/images/:filename", delete(delete_image))
}
