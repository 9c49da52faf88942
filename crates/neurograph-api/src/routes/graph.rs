//! Graph data endpoints.

use std::sync::Arc;

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use neurograph_core::Graph;

use crate::error::ApiError;
use crate::types::{ApiResponse, ApiState};

const EXPORT_FILE_NAME: &str = "neurograph.json";

/// Handler for GET /api/graph - the current graph, null when absent.
pub async fn graph_handler(State(state): State<Arc<ApiState>>) -> Json<ApiResponse<Option<Graph>>> {
    Json(ApiResponse::new(state.session.graph().await))
}

/// Handler for GET /api/graph/export - the bare graph document as a download.
pub async fn export_handler(State(state): State<Arc<ApiState>>) -> Result<Response, ApiError> {
    let graph = state.session.graph().await.ok_or_else(ApiError::no_graph)?;
    let disposition = format!("attachment; filename=\"{EXPORT_FILE_NAME}\"");
    Ok(([(header::CONTENT_DISPOSITION, disposition)], Json(graph)).into_response())
}
