//! Log transport: writes each payload as a structured log line.

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

use super::{PublishError, Transport};

#[derive(Debug, Default)]
pub struct LogTransport {
    emitted: AtomicU64,
}

impl LogTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Payloads written so far.
    pub fn emitted_count(&self) -> u64 {
        self.emitted.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Transport for LogTransport {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn send(&self, payload: Bytes) -> Result<(), PublishError> {
        info!(
            target: "http_observer::events",
            bytes = payload.len(),
            event = %String::from_utf8_lossy(&payload),
            "Telemetry event"
        );
        self.emitted.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
