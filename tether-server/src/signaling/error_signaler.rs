use crate::registry::Connection;
use crate::signaling::Signaler;
use tether_core::{Envelope, ErrorCode};
use tracing::warn;

impl Signaler {
    /// Send an `error` envelope addressed to the connection's own device.
    pub async fn send_error(
        &self,
        connection: &Connection,
        code: ErrorCode,
        message: impl Into<String>,
    ) {
        let message = message.into();
        let device_id = connection.device_label();

        warn!(
            "Sending error to {} ({}): {} - {}",
            device_id,
            connection.id(),
            code,
            message
        );

        self.deliver(connection.id(), Envelope::error(code, message, &device_id))
            .await;
    }
}
