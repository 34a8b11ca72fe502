use serde::{Deserialize, Serialize};
use std::fmt;

/// Room shared by every device identifier without a numeric suffix.
pub const DEFAULT_ROOM: &str = "default";

/// Identifier a client reports for itself in `device_id`. Not authenticated.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq, Default)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn room_id(&self) -> RoomId {
        RoomId::from_device(self)
    }
}

impl From<&str> for DeviceId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for DeviceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pairing slot key, derived from a device identifier.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The trailing run of ASCII digits of `device_id`, or [`DEFAULT_ROOM`]
    /// when the identifier does not end in a digit.
    ///
    /// `"cam-12"` and `"hub-12"` both land in room `"12"`; `"cam"` and `"hub"`
    /// both land in `"default"` and compete for the same two slots.
    pub fn from_device(device_id: &DeviceId) -> Self {
        let id = device_id.as_str();
        let digits = id
            .bytes()
            .rev()
            .take_while(|b| b.is_ascii_digit())
            .count();

        if digits == 0 {
            Self(DEFAULT_ROOM.to_owned())
        } else {
            Self(id[id.len() - digits..].to_owned())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
