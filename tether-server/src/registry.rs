use std::collections::HashMap;
use tether_core::{ConnectionId, DeviceId, Role, RoomId};
use tokio::time::Instant;

/// Where a connection is in the pairing lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connected,
    Joined,
    Paired,
}

/// One accepted transport session.
#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    device_id: Option<DeviceId>,
    status: ConnectionStatus,
    role: Option<Role>,
    room_id: Option<RoomId>,
    connected_at: Instant,
}

impl Connection {
    pub fn new(id: ConnectionId) -> Self {
        Self {
            id,
            device_id: None,
            status: ConnectionStatus::Connected,
            role: None,
            room_id: None,
            connected_at: Instant::now(),
        }
    }

    pub fn id(&self) -> &ConnectionId {
        &self.id
    }

    pub fn device_id(&self) -> Option<&DeviceId> {
        self.device_id.as_ref()
    }

    /// Device id for display and addressing; empty until the first valid
    /// message arrives.
    pub fn device_label(&self) -> DeviceId {
        self.device_id.clone().unwrap_or_default()
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn room_id(&self) -> Option<&RoomId> {
        self.room_id.as_ref()
    }

    pub fn connected_at(&self) -> Instant {
        self.connected_at
    }

    /// Records the device id on first sight. Later calls are ignored.
    pub fn bind_device(&mut self, device_id: &DeviceId) -> bool {
        if self.device_id.is_some() {
            return false;
        }
        self.device_id = Some(device_id.clone());
        true
    }

    pub(crate) fn enter_room(&mut self, room_id: RoomId) {
        self.room_id = Some(room_id);
        self.role = None;
        self.status = ConnectionStatus::Joined;
    }

    pub(crate) fn assign_role(&mut self, role: Role) {
        self.role = Some(role);
        self.status = ConnectionStatus::Paired;
    }

    /// Peer left; stay in the room and wait for a new one.
    pub(crate) fn unpair(&mut self) {
        self.role = None;
        self.status = ConnectionStatus::Joined;
    }

    /// Out of any room.
    pub(crate) fn reset(&mut self) {
        self.room_id = None;
        self.role = None;
        self.status = ConnectionStatus::Connected;
    }
}

/// All live connections, keyed by connection id.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<ConnectionId, Connection>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the id was already registered.
    pub fn insert(&mut self, id: ConnectionId) -> bool {
        if self.connections.contains_key(&id) {
            return false;
        }
        self.connections.insert(id, Connection::new(id));
        true
    }

    pub fn remove(&mut self, id: &ConnectionId) -> Option<Connection> {
        self.connections.remove(id)
    }

    pub fn get(&self, id: &ConnectionId) -> Option<&Connection> {
        self.connections.get(id)
    }

    pub fn get_mut(&mut self, id: &ConnectionId) -> Option<&mut Connection> {
        self.connections.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}
