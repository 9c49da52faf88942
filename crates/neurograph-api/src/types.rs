//! API types and DTOs.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use neurograph_core::GraphSummary;
use neurograph_session::{Session, SessionEvent};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Shared application state for the API.
pub struct ApiState {
    /// The session every handler operates on.
    pub session: Arc<Session>,
}

/// Response wrapper with timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Response data.
    pub data: T,
    /// Unix timestamp in milliseconds.
    pub timestamp: u64,
}

impl<T> ApiResponse<T> {
    /// Create a new API response with current timestamp.
    pub fn new(data: T) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self { data, timestamp }
    }
}

/// Error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable code, e.g. `SERVICE_ERROR`.
    pub code: String,
    /// The user-visible message.
    pub message: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub session_id: Uuid,
    /// Summary of the current graph, null before the first analysis.
    pub graph: Option<GraphSummary>,
    pub generating: bool,
    pub chatting: bool,
}

/// Body of `PUT /api/code`.
#[derive(Debug, Clone, Deserialize)]
pub struct CodeBody {
    pub code: String,
}

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatBody {
    pub message: String,
}

/// Query of `POST /api/files`.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadQuery {
    pub name: String,
}

/// WebSocket message sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsServerMessage {
    /// A session change.
    Event {
        /// The change itself.
        event: SessionEvent,
    },
    /// Error occurred.
    Error {
        /// Error code.
        code: String,
        /// Error message.
        message: String,
    },
    /// Pong response to client ping.
    Pong,
}

/// WebSocket message sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsClientMessage {
    /// Ping to keep connection alive.
    Ping,
}

#[cfg(test)]
mod tests {
    use super::*;
    use neurograph_session::LayoutState;
    use serde_json::json;

    #[test]
    fn server_event_nests_session_event() {
        let message = WsServerMessage::Event {
            event: SessionEvent::LayoutChanged {
                layout: LayoutState::default(),
            },
        };
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["type"], "event");
        assert_eq!(value["event"]["type"], "layout_changed");
    }

    #[test]
    fn client_ping_parses() {
        let msg: WsClientMessage = serde_json::from_value(json!({"type": "ping"})).unwrap();
        assert!(matches!(msg, WsClientMessage::Ping));
    }
}
