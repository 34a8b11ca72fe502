use crate::room::stats::RoomStats;
use bytes::Bytes;
use tether_core::ConnectionId;
use tokio::sync::oneshot;

/// Events delivered to the room manager by the transport layer.
#[derive(Debug)]
pub enum RoomCommand {
    /// A new session was accepted.
    Connect { connection_id: ConnectionId },

    /// A raw frame arrived on a session.
    Message {
        connection_id: ConnectionId,
        payload: Bytes,
    },

    /// The session is gone; leave its room and forget it.
    Disconnect { connection_id: ConnectionId },

    /// The transport reported an error on a session. Informational; a
    /// `Disconnect` follows if the session does not survive it.
    TransportError {
        connection_id: ConnectionId,
        reason: String,
    },

    /// Snapshot request from monitoring.
    Stats { reply: oneshot::Sender<RoomStats> },
}
