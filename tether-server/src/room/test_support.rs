use crate::room::pairing::PairingEngine;
use crate::room::timeout::TimeoutScheduler;
use crate::signaling::{Signaler, SignalingOutput};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tether_core::{ConnectionId, DeviceId, Envelope, ErrorCode, SignalMessage};

pub(crate) const ENGINE_ROOM_TIMEOUT: Duration = Duration::from_secs(30);

/// Captures every envelope the engine hands to the transport.
#[derive(Default)]
pub(crate) struct Recorder {
    sent: Mutex<Vec<(ConnectionId, Envelope)>>,
}

impl Recorder {
    pub(crate) fn take(&self) -> Vec<(ConnectionId, Envelope)> {
        std::mem::take(&mut *self.sent.lock().unwrap())
    }

    pub(crate) fn errors_for(&self, id: &ConnectionId) -> Vec<ErrorCode> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(to, _)| to == id)
            .filter_map(|(_, envelope)| error_code(envelope))
            .collect()
    }
}

#[async_trait]
impl SignalingOutput for Recorder {
    fn is_ready(&self, _connection_id: &ConnectionId) -> bool {
        true
    }

    async fn send(&self, connection_id: &ConnectionId, envelope: &Envelope) {
        self.sent
            .lock()
            .unwrap()
            .push((*connection_id, envelope.clone()));
    }
}

pub(crate) fn engine() -> (PairingEngine, Arc<Recorder>) {
    let recorder = Arc::new(Recorder::default());
    let (scheduler, _fired_rx) = TimeoutScheduler::new();
    let engine = PairingEngine::new(
        Signaler::new(recorder.clone()),
        scheduler,
        ENGINE_ROOM_TIMEOUT,
    );
    (engine, recorder)
}

/// Connect a new session, bind `device` and join its room.
pub(crate) async fn joined(engine: &mut PairingEngine, device: &str) -> ConnectionId {
    let id = ConnectionId::new();
    let device = DeviceId::from(device);
    engine.connect(id);
    engine.bind_device(&id, &device);
    engine.join(&id, &device).await;
    id
}

pub(crate) fn error_code(envelope: &Envelope) -> Option<ErrorCode> {
    match &envelope.message {
        SignalMessage::Error(report) => Some(report.error_code),
        _ => None,
    }
}
