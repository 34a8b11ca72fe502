//! Two-party signaling relay.
//!
//! Connections are paired by the numeric suffix of their device id. Once a
//! room holds two members, offer/answer/ICE envelopes sent by one are
//! relayed verbatim to the other until either leaves or the room's pairing
//! window runs out.
//!
//! - [`room`]: rooms, the pairing state machine and the event loop.
//! - [`signaling`]: the outbound seam and its WebSocket implementation.
//! - [`app`]: HTTP routes and server startup.

pub mod app;
pub mod clock;
pub mod config;
pub mod registry;
pub mod room;
pub mod signaling;

pub use app::{AppState, router, serve};
pub use config::ServerConfig;
pub use registry::{Connection, ConnectionRegistry, ConnectionStatus};
pub use room::*;
pub use signaling::*;
