use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, RwLock};
use tether_core::{ConnectionId, Envelope, ErrorCode, ErrorReport, RoleAssignment, SignalMessage};
use tether_server::SignalingOutput;
use tokio::sync::Mutex;

/// Mock SignalingOutput that captures every envelope handed to the transport.
#[derive(Clone, Default)]
pub struct MockSignalingOutput {
    /// Captured `(recipient, envelope)` pairs, in send order.
    sent: Arc<Mutex<Vec<(ConnectionId, Envelope)>>>,
    /// Connections whose transport reports not ready.
    unready: Arc<RwLock<HashSet<ConnectionId>>>,
}

impl MockSignalingOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `is_ready` answer `ready` for this connection from now on.
    pub fn set_ready(&self, connection_id: ConnectionId, ready: bool) {
        if let Ok(mut unready) = self.unready.write() {
            if ready {
                unready.remove(&connection_id);
            } else {
                unready.insert(connection_id);
            }
        }
    }

    pub async fn all(&self) -> Vec<(ConnectionId, Envelope)> {
        self.sent.lock().await.clone()
    }

    /// Every envelope sent to `connection_id` so far.
    pub async fn messages_for(&self, connection_id: &ConnectionId) -> Vec<Envelope> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|(to, _)| to == connection_id)
            .map(|(_, envelope)| envelope.clone())
            .collect()
    }

    /// Drain and return the envelopes sent to `connection_id`.
    pub async fn take_for(&self, connection_id: &ConnectionId) -> Vec<Envelope> {
        let mut sent = self.sent.lock().await;
        let (taken, kept): (Vec<_>, Vec<_>) =
            sent.drain(..).partition(|(to, _)| to == connection_id);
        *sent = kept;
        taken.into_iter().map(|(_, envelope)| envelope).collect()
    }

    pub async fn roles_for(&self, connection_id: &ConnectionId) -> Vec<RoleAssignment> {
        self.messages_for(connection_id)
            .await
            .into_iter()
            .filter_map(|envelope| match envelope.message {
                SignalMessage::Role(role) => Some(role),
                _ => None,
            })
            .collect()
    }

    pub async fn errors_for(&self, connection_id: &ConnectionId) -> Vec<ErrorReport> {
        self.messages_for(connection_id)
            .await
            .into_iter()
            .filter_map(|envelope| match envelope.message {
                SignalMessage::Error(report) => Some(report),
                _ => None,
            })
            .collect()
    }

    pub async fn error_codes_for(&self, connection_id: &ConnectionId) -> Vec<ErrorCode> {
        self.errors_for(connection_id)
            .await
            .into_iter()
            .map(|report| report.error_code)
            .collect()
    }

    pub async fn clear(&self) {
        self.sent.lock().await.clear();
    }
}

#[async_trait]
impl SignalingOutput for MockSignalingOutput {
    fn is_ready(&self, connection_id: &ConnectionId) -> bool {
        self.unready
            .read()
            .map(|unready| !unready.contains(connection_id))
            .unwrap_or(true)
    }

    async fn send(&self, connection_id: &ConnectionId, envelope: &Envelope) {
        tracing::debug!(
            "[MockSignaling] {} to {}",
            envelope.message.kind(),
            connection_id
        );
        self.sent
            .lock()
            .await
            .push((*connection_id, envelope.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_core::DeviceId;

    #[tokio::test]
    async fn test_mock_signaling_captures_per_connection() {
        let signaling = MockSignalingOutput::new();
        let a = ConnectionId::new();
        let b = ConnectionId::new();
        let to = DeviceId::from("cam-1");

        signaling
            .send(&a, &Envelope::error(ErrorCode::RoomFull, "room is full", &to))
            .await;
        signaling
            .send(&b, &Envelope::new(SignalMessage::Join, "hub-1"))
            .await;

        assert_eq!(signaling.error_codes_for(&a).await, vec![ErrorCode::RoomFull]);
        assert_eq!(signaling.take_for(&b).await.len(), 1);
        assert!(signaling.messages_for(&b).await.is_empty());
        assert_eq!(signaling.all().await.len(), 1);
    }

    #[test]
    fn test_mock_signaling_ready_toggle() {
        let signaling = MockSignalingOutput::new();
        let id = ConnectionId::new();

        assert!(signaling.is_ready(&id));
        signaling.set_ready(id, false);
        assert!(!signaling.is_ready(&id));
        signaling.set_ready(id, true);
        assert!(signaling.is_ready(&id));
    }
}
