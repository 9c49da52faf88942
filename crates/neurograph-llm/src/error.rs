//! Error types for the model service boundary.

use std::time::Duration;

use thiserror::Error;

/// Result type alias for model service calls.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failures surfaced by the external model service.
///
/// Every variant renders as a single human readable message.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request never reached the service or the connection dropped.
    #[error("could not reach the model service: {0}")]
    Transport(String),

    /// The service did not answer in time.
    #[error("the model service did not respond within {}s", .after.as_secs())]
    Timeout { after: Duration },

    /// The service rejected the call because of rate limits.
    #[error("the model service is rate limiting requests, please retry shortly")]
    RateLimited,

    /// The service answered with a non-success status.
    #[error("the model service returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The service answered with something that is not the expected shape.
    #[error("the model service returned a malformed response: {0}")]
    Malformed(String),

    /// The completion carried no content.
    #[error("the model service returned an empty response")]
    EmptyCompletion,

    /// Resolver or client configuration is unusable.
    #[error("model service configuration error: {0}")]
    Config(String),
}

impl ServiceError {
    /// Whether retrying the same request later might succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ServiceError::Transport(_) | ServiceError::Timeout { .. } | ServiceError::RateLimited
        ) || matches!(self, ServiceError::Http { status, .. } if *status >= 500)
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ServiceError::Malformed(err.to_string())
        } else {
            ServiceError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::Malformed(err.to_string())
    }
}
