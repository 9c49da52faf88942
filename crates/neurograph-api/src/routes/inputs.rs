//! Source text and uploaded files.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use neurograph_core::UploadedFile;
use neurograph_session::{FileInfo, SessionError};
use tracing::info;

use crate::error::ApiError;
use crate::types::{ApiResponse, ApiState, CodeBody, UploadQuery};

/// GET /api/code
pub async fn get_code_handler(State(state): State<Arc<ApiState>>) -> Json<ApiResponse<String>> {
    Json(ApiResponse::new(state.session.code().await))
}

/// PUT /api/code
pub async fn set_code_handler(
    State(state): State<Arc<ApiState>>,
    Json(body): Json<CodeBody>,
) -> Json<ApiResponse<String>> {
    state.session.set_code(body.code).await;
    Json(ApiResponse::new(state.session.code().await))
}

/// GET /api/files
pub async fn list_files_handler(
    State(state): State<Arc<ApiState>>,
) -> Json<ApiResponse<Vec<FileInfo>>> {
    Json(ApiResponse::new(state.session.snapshot().await.files))
}

/// POST /api/files?name=... with the raw file content as body.
pub async fn upload_file_handler(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let file = UploadedFile::from_bytes(query.name, body.to_vec()).map_err(SessionError::from)?;
    let info = FileInfo {
        name: file.name.clone(),
        size: file.size(),
    };
    state.session.add_file(file).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(info))))
}

/// DELETE /api/files/{name}
pub async fn remove_file_handler(
    State(state): State<Arc<ApiState>>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<FileInfo>>, ApiError> {
    let removed = state.session.remove_file(&name).await?;
    Ok(Json(ApiResponse::new(FileInfo {
        name: removed.name.clone(),
        size: removed.size(),
    })))
}

/// DELETE /api/files
pub async fn clear_files_handler(
    State(state): State<Arc<ApiState>>,
) -> Json<ApiResponse<Vec<FileInfo>>> {
    state.session.clear_files().await;
    info!("uploaded files cleared");
    Json(ApiResponse::new(Vec::new()))
}
