//! Admin video uploads

use axum::{
    extract::{Multipart, State},
    response::Json as ResponseJson,
    routing::post,
    Router,
};
use icevan_assets::{AssetError, StoredAsset};

use crate::error::{ApiError, Failure};
use crate::multipart::UploadForm;
use crate::routes::images::UploadResponse;
use crate::state::AppState;

/// POST /api/admin/videos/upload
/// Multipart `file`, stored under a slugified name in `videos`
pub async fn upload_video(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<ResponseJson<UploadResponse>, Failure> {
    let stored = upload(&state, multipart).await.map_err(|e| state.fail(e))?;
    Ok(ResponseJson(stored.into()))
}

async fn upload(state: &AppState, multipart: Multipart) -> Result<StoredAsset, ApiError> {
    let mut form = UploadForm::read(multipart).await?;
    let file = form.take_file()?;
    state
        .videos
        .upload(&file.bytes, &file.name)
        .await
        .map_err(|e| match e {
            AssetError::UnsupportedFormat(name) => ApiError::UnsupportedVideo(name),
            other => ApiError::Asset(other),
        })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/admin/videos/upload", post(upload_video))
}
