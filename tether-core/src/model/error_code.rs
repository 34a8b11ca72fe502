use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric error codes carried in `error` envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
pub enum ErrorCode {
    RoomFull,
    RoomNotExists,
    MessageFormatError,
    /// Reserved.
    DeviceIdError,
    ConnectionTimeout,
    PeerOffline,
    /// Reserved.
    ServerError,
}

impl ErrorCode {
    pub fn code(&self) -> u16 {
        match self {
            ErrorCode::RoomFull => 1001,
            ErrorCode::RoomNotExists => 1002,
            ErrorCode::MessageFormatError => 1003,
            ErrorCode::DeviceIdError => 1004,
            ErrorCode::ConnectionTimeout => 1005,
            ErrorCode::PeerOffline => 1006,
            ErrorCode::ServerError => 1007,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ErrorCode::RoomFull => "ROOM_FULL",
            ErrorCode::RoomNotExists => "ROOM_NOT_EXISTS",
            ErrorCode::MessageFormatError => "MESSAGE_FORMAT_ERROR",
            ErrorCode::DeviceIdError => "DEVICE_ID_ERROR",
            ErrorCode::ConnectionTimeout => "CONNECTION_TIMEOUT",
            ErrorCode::PeerOffline => "PEER_OFFLINE",
            ErrorCode::ServerError => "SERVER_ERROR",
        }
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

impl TryFrom<u16> for ErrorCode {
    type Error = UnknownErrorCode;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        Ok(match code {
            1001 => ErrorCode::RoomFull,
            1002 => ErrorCode::RoomNotExists,
            1003 => ErrorCode::MessageFormatError,
            1004 => ErrorCode::DeviceIdError,
            1005 => ErrorCode::ConnectionTimeout,
            1006 => ErrorCode::PeerOffline,
            1007 => ErrorCode::ServerError,
            other => return Err(UnknownErrorCode(other)),
        })
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.code())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown error code {0}")]
pub struct UnknownErrorCode(pub u16);
