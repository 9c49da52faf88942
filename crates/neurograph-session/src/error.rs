//! Error types for session operations.

use neurograph_core::{CoreError, GraphValidationError};
use neurograph_llm::ServiceError;
use thiserror::Error;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors surfaced by session operations.
///
/// `Display` is the single user-visible message for the failure.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The model service call failed (network, auth, timeout, bad payload).
    #[error("{0}")]
    Service(#[from] ServiceError),

    /// The service returned a graph that fails structural validation.
    #[error("the model service returned an invalid graph: {0}")]
    InvalidGraph(#[from] GraphValidationError),

    /// An uploaded file was rejected.
    #[error("{0}")]
    Upload(#[from] CoreError),

    /// No uploaded file with this name.
    #[error("no uploaded file named `{0}`")]
    FileNotFound(String),
}

impl SessionError {
    /// Whether this failure came from the model service boundary, including
    /// structurally invalid responses.
    pub fn is_service_failure(&self) -> bool {
        matches!(self, SessionError::Service(_) | SessionError::InvalidGraph(_))
    }

    /// Whether the service returned something unusable.
    pub fn is_malformed_response(&self) -> bool {
        matches!(
            self,
            SessionError::InvalidGraph(_) | SessionError::Service(ServiceError::Malformed(_))
        )
    }
}
