use crate::room::pairing::PairingEngine;
use crate::room::room::RoomStatus;
use tether_core::{ConnectionId, Envelope, ErrorCode};
use tracing::debug;

impl PairingEngine {
    /// Relay an offer, answer or ICE envelope to the sender's paired peer.
    ///
    /// The envelope goes out as received apart from a new `time`.
    pub async fn route(&self, from: &ConnectionId, envelope: Envelope) {
        let Some(sender) = self.registry.get(from) else {
            return;
        };

        let Some(room_id) = sender.room_id() else {
            self.signaler
                .send_error(sender, ErrorCode::RoomNotExists, "not in a room")
                .await;
            return;
        };

        let room = match self.rooms.get(room_id) {
            Some(room) if room.status() == RoomStatus::Paired && room.contains(from) => room,
            _ => {
                self.signaler
                    .send_error(sender, ErrorCode::PeerOffline, "peer is not connected")
                    .await;
                return;
            }
        };

        let Some(peer) = room.peer_of(from).and_then(|id| self.registry.get(id)) else {
            self.signaler
                .send_error(sender, ErrorCode::PeerOffline, "peer went offline")
                .await;
            return;
        };

        debug!(
            "Forwarding {} from {} to {}",
            envelope.message.kind(),
            sender.device_label(),
            peer.device_label()
        );
        self.signaler.deliver(peer.id(), envelope).await;
    }
}
