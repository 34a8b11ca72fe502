use crate::config::ServerConfig;
use crate::room::pairing::PairingEngine;
use crate::room::room_command::RoomCommand;
use crate::room::timeout::{RoomTimeout, TimeoutScheduler};
use crate::signaling::{Signaler, SignalingOutput};
use bytes::Bytes;
use std::sync::Arc;
use tether_core::{ConnectionId, DecodeError, Envelope, SignalMessage};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Capacity of the transport -> manager command channel.
pub const COMMAND_CHANNEL_SIZE: usize = 1024;

/// The relay's event loop.
///
/// Transport commands and room timer firings are consumed one at a time by
/// a single task, so no two state changes ever overlap.
pub struct RoomManager {
    engine: PairingEngine,
    command_rx: mpsc::Receiver<RoomCommand>,
    timeout_rx: mpsc::UnboundedReceiver<RoomTimeout>,
}

impl RoomManager {
    pub fn new(
        config: &ServerConfig,
        signaling: Arc<dyn SignalingOutput>,
        command_rx: mpsc::Receiver<RoomCommand>,
    ) -> Self {
        let (scheduler, timeout_rx) = TimeoutScheduler::new();
        let engine = PairingEngine::new(Signaler::new(signaling), scheduler, config.room_timeout);

        Self {
            engine,
            command_rx,
            timeout_rx,
        }
    }

    /// Start the event loop on its own task and return its command sender.
    pub fn spawn(
        config: &ServerConfig,
        signaling: Arc<dyn SignalingOutput>,
    ) -> mpsc::Sender<RoomCommand> {
        let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
        let manager = Self::new(config, signaling, rx);
        tokio::spawn(manager.run());
        tx
    }

    pub fn engine(&self) -> &PairingEngine {
        &self.engine
    }

    /// Runs until every command sender is dropped.
    pub async fn run(mut self) {
        info!("Room manager started");

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(c) => self.handle_command(c).await,
                        None => {
                            info!("Command channel closed. Shutting down room manager.");
                            break;
                        }
                    }
                }

                Some(fired) = self.timeout_rx.recv() => {
                    self.engine.expire(fired).await;
                }
            }
        }

        info!("Room manager finished");
    }

    async fn handle_command(&mut self, cmd: RoomCommand) {
        match cmd {
            RoomCommand::Connect { connection_id } => self.engine.connect(connection_id),

            RoomCommand::Message {
                connection_id,
                payload,
            } => self.handle_message(connection_id, payload).await,

            RoomCommand::Disconnect { connection_id } => {
                self.engine.disconnect(&connection_id).await;
            }

            RoomCommand::TransportError {
                connection_id,
                reason,
            } => warn!("Transport error on {}: {}", connection_id, reason),

            RoomCommand::Stats { reply } => {
                let _ = reply.send(self.engine.stats());
            }
        }
    }

    async fn handle_message(&mut self, connection_id: ConnectionId, payload: Bytes) {
        if self.engine.registry().get(&connection_id).is_none() {
            warn!("Message from unregistered connection {}", connection_id);
            return;
        }

        let envelope = match Envelope::decode_inbound(&payload) {
            Ok(envelope) => envelope,
            Err(e) => {
                if let DecodeError::UnknownType { device_id, .. } = &e {
                    self.engine.bind_device(&connection_id, device_id);
                }
                warn!("Rejected message from {}: {}", connection_id, e);
                self.engine.reject(&connection_id, e.to_string()).await;
                return;
            }
        };

        self.engine.bind_device(&connection_id, &envelope.device_id);
        info!(
            "Received {} from {}",
            envelope.message.kind(),
            envelope.from
        );

        if envelope.message.is_forwardable() {
            self.engine.route(&connection_id, envelope).await;
            return;
        }

        match &envelope.message {
            SignalMessage::Join => self.engine.join(&connection_id, &envelope.device_id).await,
            SignalMessage::Leave => self.engine.leave(&connection_id).await,
            message => {
                debug!("Client sent server-only {}", message.kind());
                let reason = DecodeError::UnknownType {
                    kind: message.kind().to_owned(),
                    device_id: envelope.device_id.clone(),
                };
                self.engine.reject(&connection_id, reason.to_string()).await;
            }
        }
    }
}
