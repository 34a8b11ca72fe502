use std::time::Duration;
use tether_core::RoomId;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Fired when a room's pairing window elapses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomTimeout {
    pub room_id: RoomId,
    /// Id of the handle that produced this firing.
    pub timer_id: u64,
}

/// A pending single-shot timer. Dropping the handle does not cancel it.
#[derive(Debug)]
pub struct TimeoutHandle {
    timer_id: u64,
    task: JoinHandle<()>,
}

impl TimeoutHandle {
    pub fn id(&self) -> u64 {
        self.timer_id
    }

    /// Stops the timer if it has not fired yet. A firing already queued
    /// before this call is rejected by the receiver through [`TimeoutHandle::id`].
    pub fn cancel(self) {
        self.task.abort();
    }
}

/// Spawns room timers that report back on one channel, so a firing is
/// handled in the same event loop as transport commands.
#[derive(Debug)]
pub struct TimeoutScheduler {
    fired_tx: mpsc::UnboundedSender<RoomTimeout>,
    next_id: u64,
}

impl TimeoutScheduler {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<RoomTimeout>) {
        let (fired_tx, fired_rx) = mpsc::unbounded_channel();
        (
            Self {
                fired_tx,
                next_id: 0,
            },
            fired_rx,
        )
    }

    pub fn schedule(&mut self, room_id: RoomId, after: Duration) -> TimeoutHandle {
        self.next_id += 1;
        let timer_id = self.next_id;
        let tx = self.fired_tx.clone();

        let task = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            debug!("Room {} timer {} fired", room_id, timer_id);
            let _ = tx.send(RoomTimeout { room_id, timer_id });
        });

        TimeoutHandle { timer_id, task }
    }
}
