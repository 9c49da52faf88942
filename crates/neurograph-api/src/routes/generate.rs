//! Analysis endpoint.

use std::sync::Arc;

use axum::{extract::State, Json};
use neurograph_session::{GenerateOutcome, SkipReason};
use tracing::error;

use crate::error::ApiError;
use crate::types::{ApiResponse, ApiState};

/// Handler for POST /api/generate
///
/// Blank input answers `skipped`; an outstanding analysis answers 409.
pub async fn generate_handler(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<ApiResponse<GenerateOutcome>>, ApiError> {
    match state.session.generate().await {
        Ok(GenerateOutcome::Skipped {
            reason: SkipReason::Busy,
        }) => Err(ApiError::busy("an analysis")),
        Ok(outcome) => Ok(Json(ApiResponse::new(outcome))),
        Err(e) => {
            error!("Analysis failed: {}", e);
            Err(e.into())
        }
    }
}
