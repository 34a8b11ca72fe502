use crate::room::timeout::TimeoutHandle;
use serde::Serialize;
use tether_core::{ConnectionId, RoomId};
use tokio::time::Instant;

/// Members a room can hold.
pub const ROOM_CAPACITY: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomStatus {
    Waiting,
    Paired,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RoomError {
    #[error("room is full")]
    RoomFull,
}

/// A two-slot pairing room.
///
/// Members keep their arrival order: the member at index 0 becomes the
/// offerer when the room pairs. When one member leaves, the other moves to
/// index 0 and the next arrival is appended after it.
#[derive(Debug)]
pub struct Room {
    id: RoomId,
    status: RoomStatus,
    members: Vec<ConnectionId>,
    created_at: Instant,
    timeout: Option<TimeoutHandle>,
}

impl Room {
    /// New rooms start in `Waiting` with their expiry timer already armed.
    pub fn new(id: RoomId, timeout: TimeoutHandle) -> Self {
        Self {
            id,
            status: RoomStatus::Waiting,
            members: Vec::with_capacity(ROOM_CAPACITY),
            created_at: Instant::now(),
            timeout: Some(timeout),
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn status(&self) -> RoomStatus {
        self.status
    }

    pub fn members(&self) -> &[ConnectionId] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= ROOM_CAPACITY
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.members.contains(id)
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    /// Appends a member and returns the new member count.
    pub fn add_member(&mut self, id: ConnectionId) -> Result<usize, RoomError> {
        if self.is_full() {
            return Err(RoomError::RoomFull);
        }
        self.members.push(id);
        Ok(self.members.len())
    }

    pub fn remove_member(&mut self, id: &ConnectionId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| m != id);
        before != self.members.len()
    }

    /// The member that is not `id`.
    pub fn peer_of(&self, id: &ConnectionId) -> Option<&ConnectionId> {
        self.members.iter().find(|m| *m != id)
    }

    pub(crate) fn mark_paired(&mut self) {
        self.status = RoomStatus::Paired;
    }

    pub(crate) fn mark_waiting(&mut self) {
        self.status = RoomStatus::Waiting;
    }

    pub fn timeout_id(&self) -> Option<u64> {
        self.timeout.as_ref().map(TimeoutHandle::id)
    }

    /// Installs `handle` as the room's only timer, cancelling any previous one.
    pub(crate) fn arm_timeout(&mut self, handle: TimeoutHandle) {
        self.cancel_timeout();
        self.timeout = Some(handle);
    }

    pub(crate) fn cancel_timeout(&mut self) {
        if let Some(handle) = self.timeout.take() {
            handle.cancel();
        }
    }

    /// Drops the handle of a timer that has just fired.
    pub(crate) fn take_timeout(&mut self) -> Option<TimeoutHandle> {
        self.timeout.take()
    }
}
