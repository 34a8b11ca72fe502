use crate::clock::Clock;
use crate::registry::Connection;
use crate::signaling::SignalingOutput;
use std::sync::Arc;
use tether_core::{ConnectionId, DeviceId, Envelope, Role};
use tracing::debug;

/// Stamps and delivers envelopes through a [`SignalingOutput`].
#[derive(Clone)]
pub struct Signaler {
    output: Arc<dyn SignalingOutput>,
    clock: Arc<Clock>,
}

impl Signaler {
    pub fn new(output: Arc<dyn SignalingOutput>) -> Self {
        Self {
            output,
            clock: Arc::new(Clock::new()),
        }
    }

    /// Best-effort delivery. The envelope gets a fresh `time`; if the
    /// connection is not ready it is dropped without a trace to the sender.
    pub async fn deliver(&self, to: &ConnectionId, envelope: Envelope) {
        let envelope = envelope.with_time(self.clock.now_micros());

        if !self.output.is_ready(to) {
            debug!(
                "Dropping {} for {}: transport not ready",
                envelope.message.kind(),
                to
            );
            return;
        }

        self.output.send(to, &envelope).await;
    }

    /// Tell `connection` which side of the negotiation it plays.
    pub async fn send_role(&self, connection: &Connection, peer_device_id: &DeviceId, role: Role) {
        let envelope = Envelope::role(peer_device_id, role, &connection.device_label());
        self.deliver(connection.id(), envelope).await;
    }
}
