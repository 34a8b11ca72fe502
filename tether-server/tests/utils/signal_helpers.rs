use anyhow::{Context, Result};
use bytes::Bytes;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tether_core::{ConnectionId, Envelope, SignalMessage};
use tether_server::{RoomCommand, RoomManager, RoomStats, ServerConfig, request_stats};
use tokio::sync::mpsc;

use super::mock_signaling::MockSignalingOutput;

/// Room timeout used by tests that do not care about expiry.
pub const TEST_ROOM_TIMEOUT: Duration = Duration::from_secs(30);

/// A room manager driven directly through its command channel, with every
/// outbound envelope captured by a [`MockSignalingOutput`].
pub struct TestServer {
    pub commands: mpsc::Sender<RoomCommand>,
    pub signaling: MockSignalingOutput,
    pub config: ServerConfig,
}

impl TestServer {
    pub fn start(config: ServerConfig) -> Self {
        let signaling = MockSignalingOutput::new();
        let commands = RoomManager::spawn(&config, Arc::new(signaling.clone()));

        Self {
            commands,
            signaling,
            config,
        }
    }

    /// Open a new transport session.
    pub async fn connect(&self) -> Result<ConnectionId> {
        let connection_id = ConnectionId::new();
        self.commands
            .send(RoomCommand::Connect { connection_id })
            .await
            .context("Failed to send Connect")?;
        Ok(connection_id)
    }

    pub async fn disconnect(&self, connection_id: ConnectionId) -> Result<()> {
        self.commands
            .send(RoomCommand::Disconnect { connection_id })
            .await
            .context("Failed to send Disconnect")
    }

    /// Deliver a raw inbound frame, exactly as the socket would.
    pub async fn send_raw(&self, connection_id: ConnectionId, raw: impl Into<Bytes>) -> Result<()> {
        self.commands
            .send(RoomCommand::Message {
                connection_id,
                payload: raw.into(),
            })
            .await
            .context("Failed to send Message")
    }

    pub async fn send(&self, connection_id: ConnectionId, envelope: &Envelope) -> Result<()> {
        let json = envelope.to_json().context("Failed to encode envelope")?;
        self.send_raw(connection_id, json).await
    }

    pub async fn join(&self, connection_id: ConnectionId, device_id: &str) -> Result<()> {
        self.send(connection_id, &Envelope::new(SignalMessage::Join, device_id))
            .await
    }

    pub async fn leave(&self, connection_id: ConnectionId, device_id: &str) -> Result<()> {
        self.send(connection_id, &Envelope::new(SignalMessage::Leave, device_id))
            .await
    }

    /// Send an offer from `device_id` addressed to `to`.
    pub async fn offer(
        &self,
        connection_id: ConnectionId,
        device_id: &str,
        to: &str,
        data: Value,
    ) -> Result<()> {
        let mut envelope = Envelope::new(SignalMessage::Offer(data), device_id);
        envelope.to = to.to_owned();
        self.send(connection_id, &envelope).await
    }

    /// Connect and join in one step.
    pub async fn connect_and_join(&self, device_id: &str) -> Result<ConnectionId> {
        let connection_id = self.connect().await?;
        self.join(connection_id, device_id).await?;
        Ok(connection_id)
    }

    /// Wait until every command sent so far has been applied.
    ///
    /// The stats request travels the same channel as everything else, so its
    /// reply cannot overtake earlier commands.
    pub async fn sync(&self) -> Result<RoomStats> {
        request_stats(&self.commands)
            .await
            .context("Room manager stopped")
    }
}

pub fn test_config(room_timeout: Duration) -> ServerConfig {
    ServerConfig {
        room_timeout,
        stats_interval: Duration::ZERO,
        ..ServerConfig::default()
    }
}

pub fn sdp(tag: &str) -> Value {
    json!({ "sdp": format!("v=0 {tag}"), "type": "offer" })
}
