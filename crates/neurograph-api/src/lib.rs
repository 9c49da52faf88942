//! REST + WebSocket API over a NeuroGraph [`Session`].
//!
//! Front ends drive the session through this layer and receive change
//! notifications over the WebSocket. All responses are wrapped in
//! [`ApiResponse`].
//!
//! ## Endpoints
//!
//! - `GET /api/health` - Status, session id and graph summary
//! - `GET /api/session` - Full session snapshot
//! - `GET /api/graph` - Current graph (null before the first analysis)
//! - `GET /api/graph/export` - Current graph as a JSON attachment
//! - `PUT /api/code` - Replace the source text
//! - `GET|POST|DELETE /api/files` - Uploaded file management
//! - `DELETE /api/files/{name}` - Remove one uploaded file
//! - `POST /api/generate` - Analyze the code into a graph
//! - `GET /api/conversation` - Chat log
//! - `POST /api/chat` - One chat turn
//! - `GET /api/layout`, `POST /api/layout/{code,chat}/toggle` - Panel layout
//! - `DELETE /api/error` - Dismiss the current error
//! - `GET /api/ws` - WebSocket event stream
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use neurograph_api::{create_api_router, create_api_state};
//! use neurograph_llm::OpenAiService;
//! use neurograph_session::Session;
//!
//! let service = OpenAiService::from_env().unwrap();
//! let session = Arc::new(Session::new(Arc::new(service)));
//! let router = create_api_router(create_api_state(session));
//! ```

mod error;
mod routes;
mod types;
mod ws;

pub use error::ApiError;
pub use routes::create_api_router;
pub use types::{ApiErrorResponse, ApiResponse, ApiState, HealthResponse, WsClientMessage, WsServerMessage};

use std::sync::Arc;

use neurograph_session::Session;

/// Create the API state around an existing session.
pub fn create_api_state(session: Arc<Session>) -> Arc<ApiState> {
    Arc::new(ApiState { session })
}
