use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Relay settings, fixed at startup.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind: IpAddr,
    pub port: u16,
    /// How long a room may wait for its second member.
    pub room_timeout: Duration,
    /// Live WebSocket sessions accepted before upgrades are refused.
    pub max_connections: usize,
    /// Capacity of each connection's outbound queue; overflow is dropped.
    pub message_queue_size: usize,
    /// Period of the stats log line. Zero disables it.
    pub stats_interval: Duration,
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8000,
            room_timeout: Duration::from_millis(30_000),
            max_connections: 1000,
            message_queue_size: 10_000,
            stats_interval: Duration::from_secs(30),
        }
    }
}
