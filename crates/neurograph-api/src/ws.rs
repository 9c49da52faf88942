//! WebSocket stream of session events.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use tokio::sync::broadcast;
use tracing::{debug, error, warn};

use crate::types::{ApiState, WsClientMessage, WsServerMessage};

/// Handler for WebSocket upgrade at GET /api/ws
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<ApiState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: Arc<ApiState>) {
    debug!(session = %state.session.id(), "ws_client_connected");
    let mut rx = state.session.subscribe();

    loop {
        tokio::select! {
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = match serde_json::from_str::<WsClientMessage>(text.as_str()) {
                            Ok(WsClientMessage::Ping) => WsServerMessage::Pong,
                            Err(e) => {
                                warn!("Unrecognized client message: {}", e);
                                WsServerMessage::Error {
                                    code: "BAD_MESSAGE".to_string(),
                                    message: e.to_string(),
                                }
                            }
                        };
                        if let Err(e) = send_server_message(&mut socket, &reply).await {
                            error!("Failed to send WebSocket message: {}", e);
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("ws_client_disconnected");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        error!("WebSocket error: {}", e);
                        break;
                    }
                }
            }

            event = rx.recv() => {
                match event {
                    Ok(event) => {
                        let msg = WsServerMessage::Event { event };
                        if let Err(e) = send_server_message(&mut socket, &msg).await {
                            error!("Failed to send WebSocket message: {}", e);
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("WebSocket client lagged, missed {} events", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }
}

async fn send_server_message(
    socket: &mut WebSocket,
    msg: &WsServerMessage,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let json = serde_json::to_string(msg)?;
    socket.send(Message::Text(json.into())).await?;
    Ok(())
}
