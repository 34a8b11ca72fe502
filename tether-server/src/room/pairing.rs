use crate::registry::ConnectionRegistry;
use crate::room::room::{Room, RoomStatus};
use crate::room::stats::{RoomSnapshot, RoomStats};
use crate::room::timeout::{RoomTimeout, TimeoutScheduler};
use crate::signaling::Signaler;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::time::Duration;
use tether_core::{ConnectionId, DeviceId, ErrorCode, Role, RoomId};
use tracing::{debug, info, warn};

/// Owns every room and connection and applies the pairing state machine.
///
/// All methods take `&mut self`; the engine is driven by exactly one task
/// (see [`crate::RoomManager`]), which is what keeps transitions serialized.
pub struct PairingEngine {
    pub(crate) registry: ConnectionRegistry,
    pub(crate) rooms: HashMap<RoomId, Room>,
    scheduler: TimeoutScheduler,
    pub(crate) signaler: Signaler,
    room_timeout: Duration,
}

impl PairingEngine {
    pub fn new(signaler: Signaler, scheduler: TimeoutScheduler, room_timeout: Duration) -> Self {
        Self {
            registry: ConnectionRegistry::new(),
            rooms: HashMap::new(),
            scheduler,
            signaler,
            room_timeout,
        }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn room(&self, room_id: &RoomId) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn connect(&mut self, connection_id: ConnectionId) {
        if !self.registry.insert(connection_id) {
            warn!("Connection {} registered twice", connection_id);
            return;
        }
        info!(
            "New connection: {}, total connections: {}",
            connection_id,
            self.registry.len()
        );
    }

    /// Leave any room, then forget the connection.
    pub async fn disconnect(&mut self, connection_id: &ConnectionId) {
        self.leave(connection_id).await;

        match self.registry.remove(connection_id) {
            Some(connection) => info!(
                "Connection {} ({}) closed after {:?}, total connections: {}",
                connection_id,
                connection.device_label(),
                connection.connected_at().elapsed(),
                self.registry.len()
            ),
            None => debug!("Disconnect for unknown connection {}", connection_id),
        }
    }

    /// Remember the device id a connection first identified itself with.
    pub fn bind_device(&mut self, connection_id: &ConnectionId, device_id: &DeviceId) {
        if let Some(connection) = self.registry.get_mut(connection_id) {
            if connection.bind_device(device_id) {
                debug!("Connection {} is device {}", connection_id, device_id);
            }
        }
    }

    pub async fn join(&mut self, connection_id: &ConnectionId, device_id: &DeviceId) {
        let room_id = RoomId::from_device(device_id);

        let Some(connection) = self.registry.get(connection_id) else {
            warn!("Join from unknown connection {}", connection_id);
            return;
        };

        let current = connection.room_id().cloned();
        if current.as_ref() == Some(&room_id) {
            debug!("{} is already in room {}", device_id, room_id);
            return;
        }

        // Refuse before leaving the current room.
        if self.rooms.get(&room_id).is_some_and(Room::is_full) {
            self.signaler
                .send_error(connection, ErrorCode::RoomFull, "room is full")
                .await;
            return;
        }

        if current.is_some() {
            self.leave(connection_id).await;
        }

        let room = match self.rooms.entry(room_id.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let timeout = self.scheduler.schedule(room_id.clone(), self.room_timeout);
                info!("Room created: {}", room_id);
                entry.insert(Room::new(room_id.clone(), timeout))
            }
        };

        if room.add_member(*connection_id).is_err() {
            if let Some(connection) = self.registry.get(connection_id) {
                self.signaler
                    .send_error(connection, ErrorCode::RoomFull, "room is full")
                    .await;
            }
            return;
        }

        let member_count = room.len();
        if let Some(connection) = self.registry.get_mut(connection_id) {
            connection.enter_room(room_id.clone());
        }
        info!("{} joined room {} ({}/2)", device_id, room_id, member_count);

        if room.is_full() {
            self.pair(&room_id).await;
        }
    }

    /// Second member arrived: stop the clock, hand out roles by arrival order.
    async fn pair(&mut self, room_id: &RoomId) {
        let Some(room) = self.rooms.get_mut(room_id) else {
            return;
        };
        let [offerer, answerer] = match room.members() {
            [a, b] => [*a, *b],
            _ => return,
        };

        room.cancel_timeout();
        room.mark_paired();

        for (id, role) in [(offerer, Role::Offerer), (answerer, Role::Answerer)] {
            if let Some(connection) = self.registry.get_mut(&id) {
                connection.assign_role(role);
            }
        }

        let (Some(first), Some(second)) = (self.registry.get(&offerer), self.registry.get(&answerer))
        else {
            return;
        };

        let first_device = first.device_label();
        let second_device = second.device_label();

        self.signaler.send_role(first, &second_device, Role::Offerer).await;
        self.signaler.send_role(second, &first_device, Role::Answerer).await;

        info!(
            "Room {} paired: {} <-> {}",
            room_id, first_device, second_device
        );
    }

    pub async fn leave(&mut self, connection_id: &ConnectionId) {
        let Some(connection) = self.registry.get_mut(connection_id) else {
            return;
        };
        let Some(room_id) = connection.room_id().cloned() else {
            return;
        };
        let device_id = connection.device_label();
        connection.reset();

        let Some(room) = self.rooms.get_mut(&room_id) else {
            return;
        };
        room.remove_member(connection_id);
        info!("{} left room {}", device_id, room_id);

        if room.is_empty() {
            if let Some(mut room) = self.rooms.remove(&room_id) {
                room.cancel_timeout();
            }
            info!("Removed empty room {}", room_id);
            return;
        }

        // One member remains: back to waiting for a partner, with a new window.
        let remaining = room.members()[0];
        room.mark_waiting();
        room.arm_timeout(self.scheduler.schedule(room_id.clone(), self.room_timeout));

        if let Some(peer) = self.registry.get_mut(&remaining) {
            peer.unpair();
        }
        if let Some(peer) = self.registry.get(&remaining) {
            self.signaler
                .send_error(peer, ErrorCode::PeerOffline, "peer went offline")
                .await;
        }
    }

    /// A room timer fired. Ignored unless it is the room's current timer.
    pub async fn expire(&mut self, timeout: RoomTimeout) {
        let RoomTimeout { room_id, timer_id } = timeout;

        let is_current = self
            .rooms
            .get(&room_id)
            .and_then(Room::timeout_id)
            .is_some_and(|id| id == timer_id);
        if !is_current {
            debug!("Ignoring stale timer {} for room {}", timer_id, room_id);
            return;
        }

        let Some(mut room) = self.rooms.remove(&room_id) else {
            return;
        };
        room.take_timeout();
        info!("Room {} timed out, removing {} member(s)", room_id, room.len());

        for member in room.members() {
            if let Some(connection) = self.registry.get_mut(member) {
                connection.reset();
            }
            if let Some(connection) = self.registry.get(member) {
                self.signaler
                    .send_error(connection, ErrorCode::ConnectionTimeout, "room timed out")
                    .await;
            }
        }
    }

    /// Report a rejected frame to its sender.
    pub async fn reject(&self, connection_id: &ConnectionId, reason: String) {
        if let Some(connection) = self.registry.get(connection_id) {
            self.signaler
                .send_error(connection, ErrorCode::MessageFormatError, reason)
                .await;
        }
    }

    pub fn stats(&self) -> RoomStats {
        let mut rooms: Vec<RoomSnapshot> = self
            .rooms
            .values()
            .map(|room| RoomSnapshot {
                id: room.id().clone(),
                status: room.status(),
                connection_count: room.len(),
                age_ms: room.created_at().elapsed().as_millis() as u64,
            })
            .collect();
        rooms.sort_by(|a, b| a.id.cmp(&b.id));

        RoomStats {
            total_rooms: self.rooms.len(),
            total_connections: self.registry.len(),
            paired_rooms: rooms
                .iter()
                .filter(|r| r.status == RoomStatus::Paired)
                .count(),
            rooms,
        }
    }
}
