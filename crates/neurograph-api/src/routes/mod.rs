//! API route handlers.

mod chat;
mod generate;
mod graph;
mod health;
mod inputs;
mod layout;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::types::ApiState;
use crate::ws::ws_handler;

/// Create the API router with all endpoints.
pub fn create_api_router(state: Arc<ApiState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/session", get(layout::snapshot_handler))
        // Graph
        .route("/graph", get(graph::graph_handler))
        .route("/graph/export", get(graph::export_handler))
        // Inputs
        .route("/code", get(inputs::get_code_handler).put(inputs::set_code_handler))
        .route(
            "/files",
            get(inputs::list_files_handler)
                .post(inputs::upload_file_handler)
                .delete(inputs::clear_files_handler),
        )
        .route("/files/{name}", delete(inputs::remove_file_handler))
        // Operations
        .route("/generate", post(generate::generate_handler))
        .route("/conversation", get(chat::conversation_handler))
        .route("/chat", post(chat::chat_handler))
        // Layout and error slot
        .route("/layout", get(layout::layout_handler))
        .route("/layout/code/toggle", post(layout::toggle_code_handler))
        .route("/layout/chat/toggle", post(layout::toggle_chat_handler))
        .route("/error", delete(layout::dismiss_error_handler))
        // WebSocket
        .route("/ws", get(ws_handler))
        // Request tracing (enable with RUST_LOG=tower_http=info or higher)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}
