use crate::room::RoomCommand;
use crate::room::room::RoomStatus;
use serde::Serialize;
use std::time::Duration;
use tether_core::RoomId;
use tokio::sync::{mpsc, oneshot};
use tracing::info;

#[derive(Debug, Clone, Serialize)]
pub struct RoomSnapshot {
    pub id: RoomId,
    pub status: RoomStatus,
    pub connection_count: usize,
    pub age_ms: u64,
}

/// Point-in-time view of the relay, for monitoring.
#[derive(Debug, Clone, Serialize)]
pub struct RoomStats {
    pub total_rooms: usize,
    pub total_connections: usize,
    pub paired_rooms: usize,
    pub rooms: Vec<RoomSnapshot>,
}

/// Ask the room manager for a snapshot. `None` once it has stopped.
pub async fn request_stats(commands: &mpsc::Sender<RoomCommand>) -> Option<RoomStats> {
    let (reply, rx) = oneshot::channel();
    commands.send(RoomCommand::Stats { reply }).await.ok()?;
    rx.await.ok()
}

/// Log room and connection counts every `interval` until the manager stops.
pub fn spawn_stats_logger(
    commands: mpsc::Sender<RoomCommand>,
    interval: Duration,
) -> Option<tokio::task::JoinHandle<()>> {
    if interval.is_zero() {
        return None;
    }

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let Some(stats) = request_stats(&commands).await else {
                break;
            };
            info!(
                "[STATS] rooms: {} ({} paired), connections: {}",
                stats.total_rooms, stats.paired_rooms, stats.total_connections
            );
        }
    }))
}
