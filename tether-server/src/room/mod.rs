mod pairing;
mod room;
mod room_command;
mod room_manager;
mod router;
mod stats;
#[cfg(test)]
mod test_support;
mod timeout;

pub use pairing::*;
pub use room::*;
pub use room_command::*;
pub use room_manager::*;
pub use stats::*;
pub use timeout::*;
