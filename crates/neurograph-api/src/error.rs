//! Mapping of session failures onto HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use neurograph_session::SessionError;

use crate::types::{ApiErrorResponse, ApiResponse};

/// An error ready to be sent to the client.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    /// A request of the same kind is still running.
    pub fn busy(what: &str) -> Self {
        Self::new(
            StatusCode::CONFLICT,
            "BUSY",
            format!("{what} is already in progress"),
        )
    }

    pub fn no_graph() -> Self {
        Self::new(StatusCode::NOT_FOUND, "NO_GRAPH", "no graph has been generated yet")
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        let (status, code) = if err.is_malformed_response() {
            (StatusCode::UNPROCESSABLE_ENTITY, "MALFORMED_RESPONSE")
        } else {
            match &err {
                SessionError::Service(_) | SessionError::InvalidGraph(_) => {
                    (StatusCode::BAD_GATEWAY, "SERVICE_ERROR")
                }
                SessionError::Upload(_) => (StatusCode::BAD_REQUEST, "INVALID_UPLOAD"),
                SessionError::FileNotFound(_) => (StatusCode::NOT_FOUND, "FILE_NOT_FOUND"),
            }
        };
        Self::new(status, code, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ApiResponse::new(ApiErrorResponse {
                code: self.code.to_string(),
                message: self.message,
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neurograph_core::GraphValidationError;
    use neurograph_llm::ServiceError;

    #[test]
    fn session_errors_map_to_status_codes() {
        let cases = [
            (SessionError::Service(ServiceError::RateLimited), StatusCode::BAD_GATEWAY),
            (
                SessionError::Service(ServiceError::Malformed("eof".into())),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                SessionError::InvalidGraph(GraphValidationError::EmptyNodeId { index: 0 }),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (SessionError::FileNotFound("a.py".into()), StatusCode::NOT_FOUND),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status, status);
        }
    }
}
