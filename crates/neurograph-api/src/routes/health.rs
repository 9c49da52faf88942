//! Health check endpoint.

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::types::{ApiResponse, ApiState, HealthResponse};

/// Handler for GET /api/health
pub async fn health_handler(
    State(state): State<Arc<ApiState>>,
) -> Json<ApiResponse<HealthResponse>> {
    let session = &state.session;
    let response = HealthResponse {
        status: "ok".to_string(),
        session_id: session.id(),
        graph: session.graph().await.map(|g| g.summary()),
        generating: session.is_generating(),
        chatting: session.is_chatting(),
    };
    Json(ApiResponse::new(response))
}
