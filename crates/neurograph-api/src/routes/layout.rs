//! Layout toggles, error slot and session snapshot.

use std::sync::Arc;

use axum::{extract::State, Json};
use neurograph_session::{LayoutState, SessionSnapshot};

use crate::types::{ApiResponse, ApiState};

/// Handler for GET /api/session
pub async fn snapshot_handler(
    State(state): State<Arc<ApiState>>,
) -> Json<ApiResponse<SessionSnapshot>> {
    Json(ApiResponse::new(state.session.snapshot().await))
}

/// Handler for GET /api/layout
pub async fn layout_handler(State(state): State<Arc<ApiState>>) -> Json<ApiResponse<LayoutState>> {
    Json(ApiResponse::new(state.session.layout().await))
}

/// Handler for POST /api/layout/code/toggle
pub async fn toggle_code_handler(
    State(state): State<Arc<ApiState>>,
) -> Json<ApiResponse<LayoutState>> {
    Json(ApiResponse::new(state.session.toggle_code_panel().await))
}

/// Handler for POST /api/layout/chat/toggle
pub async fn toggle_chat_handler(
    State(state): State<Arc<ApiState>>,
) -> Json<ApiResponse<LayoutState>> {
    Json(ApiResponse::new(state.session.toggle_chat_panel().await))
}

/// Handler for DELETE /api/error
pub async fn dismiss_error_handler(
    State(state): State<Arc<ApiState>>,
) -> Json<ApiResponse<Option<String>>> {
    state.session.dismiss_error().await;
    Json(ApiResponse::new(None))
}
