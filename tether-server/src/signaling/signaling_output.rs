use async_trait::async_trait;
use tether_core::{ConnectionId, Envelope};

/// Outbound half of the transport, as seen by the pairing engine.
///
/// Implemented by [`crate::signaling::SignalingService`] for WebSocket
/// sessions and by test doubles.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    /// Whether `connection_id` can currently accept a message.
    fn is_ready(&self, connection_id: &ConnectionId) -> bool;

    /// Hand an envelope to the transport. Fire-and-forget: failures are the
    /// transport's to log, never the caller's to handle.
    async fn send(&self, connection_id: &ConnectionId, envelope: &Envelope);
}
