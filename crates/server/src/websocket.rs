//! WebSocket relay endpoint
//!
//! Every frame is a JSON text message `{"event": ..., "data": ...}`.
//! Messages from one connection are handled strictly in order.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use uuid::Uuid;

use jinny_core::{ClientMessage, ServerMessage};

use crate::metrics;
use crate::state::AppState;
use crate::ServerError;

/// `GET /ws`
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Parse a text frame into a client message
pub fn parse_frame(text: &str) -> Result<ClientMessage, ServerMessage> {
    serde_json::from_str(text).map_err(|e| ServerMessage::error("Invalid message", e.to_string()))
}

async fn send(
    sender: &mut SplitSink<WebSocket, Message>,
    message: &ServerMessage,
) -> Result<(), ServerError> {
    let text = serde_json::to_string(message).map_err(|e| ServerError::Internal(e.to_string()))?;
    sender
        .send(Message::Text(text))
        .await
        .map_err(|e| ServerError::WebSocket(e.to_string()))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let session_id = Uuid::new_v4().to_string();
    let (mut sender, mut receiver) = socket.split();

    metrics::connection_opened();
    tracing::info!(session_id = %session_id, "Client connected");

    let info = ServerMessage::SessionInfo {
        session_id: session_id.clone(),
    };
    if let Err(e) = send(&mut sender, &info).await {
        tracing::warn!(session_id = %session_id, error = %e, "Failed to send session info");
    }

    while let Some(frame) = receiver.next().await {
        let text = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(Message::Binary(_)) => {
                tracing::debug!(session_id = %session_id, "Ignoring binary frame");
                continue;
            },
            Ok(_) => continue,
            Err(e) => {
                tracing::debug!(session_id = %session_id, error = %e, "WebSocket receive error");
                break;
            },
        };

        let reply = match parse_frame(&text) {
            Ok(message) => state.relay.handle(&session_id, message).await,
            Err(error) => {
                tracing::warn!(session_id = %session_id, "Malformed frame");
                Some(error)
            },
        };

        if let Some(reply) = reply {
            if let Err(e) = send(&mut sender, &reply).await {
                tracing::warn!(session_id = %session_id, error = %e, "Failed to send reply");
                break;
            }
        }
    }

    state.relay.disconnected(&session_id);
    metrics::connection_closed();
    tracing::info!(session_id = %session_id, "Client disconnected");
}
