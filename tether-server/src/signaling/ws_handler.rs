use crate::app::AppState;
use crate::room::RoomCommand;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tether_core::ConnectionId;
use tokio::sync::{OwnedSemaphorePermit, mpsc};
use tracing::{error, info, warn};

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    let Some(slot) = state.try_reserve_slot() else {
        warn!(
            "Refusing connection: all {} slots in use",
            state.config.max_connections
        );
        return (StatusCode::SERVICE_UNAVAILABLE, "connection limit reached").into_response();
    };

    ws.on_upgrade(move |socket| handle_socket(socket, state, slot))
}

/// `_slot` is released when the session ends.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>, _slot: OwnedSemaphorePermit) {
    let connection_id = ConnectionId::new();
    info!("New WebSocket connection: {}", connection_id);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel(state.config.message_queue_size.max(1));

    state.signaling.add_connection(connection_id, tx);

    if state
        .commands
        .send(RoomCommand::Connect { connection_id })
        .await
        .is_err()
    {
        error!("Room manager is gone, dropping {}", connection_id);
        state.signaling.remove_connection(&connection_id);
        return;
    }

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let commands = state.commands.clone();

        async move {
            while let Some(msg) = receiver.next().await {
                let payload = match msg {
                    Ok(Message::Text(text)) => Bytes::copy_from_slice(text.as_str().as_bytes()),
                    Ok(Message::Binary(data)) => data,
                    Ok(Message::Close(_)) => break,
                    Ok(_) => continue,
                    Err(e) => {
                        let _ = commands
                            .send(RoomCommand::TransportError {
                                connection_id,
                                reason: e.to_string(),
                            })
                            .await;
                        break;
                    }
                };

                let cmd = RoomCommand::Message {
                    connection_id,
                    payload,
                };
                if let Err(e) = commands.send(cmd).await {
                    error!("Room manager died: {}", e);
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    state.signaling.remove_connection(&connection_id);
    let _ = state
        .commands
        .send(RoomCommand::Disconnect { connection_id })
        .await;

    info!("WebSocket disconnected: {}", connection_id);
}
