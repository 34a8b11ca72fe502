mod connection;
mod device;
mod error_code;
mod role;
mod signaling;

pub use connection::ConnectionId;
pub use device::{DEFAULT_ROOM, DeviceId, RoomId};
pub use error_code::{ErrorCode, UnknownErrorCode};
pub use role::Role;
pub use signaling::{DecodeError, Envelope, ErrorReport, RoleAssignment, SERVER_ORIGIN, SignalMessage};
