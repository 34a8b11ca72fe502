use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of the `time` stamp on outgoing envelopes.
///
/// Wall-clock microseconds, clamped so a stamp is never lower than one
/// handed out before it.
#[derive(Debug, Default)]
pub struct Clock {
    last: AtomicU64,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_micros(&self) -> u64 {
        let wall = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_micros() as u64)
            .unwrap_or_default();

        let previous = self.last.fetch_max(wall, Ordering::Relaxed);
        previous.max(wall)
    }
}
