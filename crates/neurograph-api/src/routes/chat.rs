//! Conversation endpoints.

use std::sync::Arc;

use axum::{extract::State, Json};
use neurograph_core::ChatMessage;
use neurograph_session::{ChatOutcome, SkipReason};
use tracing::error;

use crate::error::ApiError;
use crate::types::{ApiResponse, ApiState, ChatBody};

/// Handler for GET /api/conversation
pub async fn conversation_handler(
    State(state): State<Arc<ApiState>>,
) -> Json<ApiResponse<Vec<ChatMessage>>> {
    Json(ApiResponse::new(state.session.conversation().await))
}

/// Handler for POST /api/chat
pub async fn chat_handler(
    State(state): State<Arc<ApiState>>,
    Json(body): Json<ChatBody>,
) -> Result<Json<ApiResponse<ChatOutcome>>, ApiError> {
    match state.session.send_chat(&body.message).await {
        Ok(ChatOutcome::Skipped {
            reason: SkipReason::Busy,
        }) => Err(ApiError::busy("a chat turn")),
        Ok(outcome) => Ok(Json(ApiResponse::new(outcome))),
        Err(e) => {
            error!("Chat turn failed: {}", e);
            Err(e.into())
        }
    }
}
