use crate::signaling::SignalingOutput;
use async_trait::async_trait;
use axum::extract::ws::Message;
use dashmap::DashMap;
use std::sync::Arc;
use tether_core::{ConnectionId, Envelope};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, error, warn};

struct SignalingInner {
    connections: DashMap<ConnectionId, mpsc::Sender<Message>>,
}

/// Outbound queues of all live WebSocket sessions.
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
}

impl SignalingService {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SignalingInner {
                connections: DashMap::new(),
            }),
        }
    }

    pub fn add_connection(&self, connection_id: ConnectionId, tx: mpsc::Sender<Message>) {
        self.inner.connections.insert(connection_id, tx);
    }

    pub fn remove_connection(&self, connection_id: &ConnectionId) {
        self.inner.connections.remove(connection_id);
    }

    pub fn connection_count(&self) -> usize {
        self.inner.connections.len()
    }

    fn send_signal(&self, connection_id: &ConnectionId, envelope: &Envelope) {
        let Some(peer) = self.inner.connections.get(connection_id) else {
            warn!(
                "Attempted to send signal to disconnected connection {}",
                connection_id
            );
            return;
        };

        let json = match envelope.to_json() {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize signal message: {}", e);
                return;
            }
        };

        match peer.try_send(Message::Text(json.into())) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => warn!(
                "Outbound queue full for {}, dropping {}",
                connection_id,
                envelope.message.kind()
            ),
            Err(TrySendError::Closed(_)) => debug!(
                "Connection {} closed before {} could be sent",
                connection_id,
                envelope.message.kind()
            ),
        }
    }
}

impl Default for SignalingService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SignalingOutput for SignalingService {
    fn is_ready(&self, connection_id: &ConnectionId) -> bool {
        self.inner
            .connections
            .get(connection_id)
            .is_some_and(|tx| !tx.is_closed())
    }

    async fn send(&self, connection_id: &ConnectionId, envelope: &Envelope) {
        self.send_signal(connection_id, envelope);
    }
}
