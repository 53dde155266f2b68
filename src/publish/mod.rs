//! Event publishing.
//!
//! # Data Flow
//! ```text
//! TelemetryEvent
//!     → Publisher::publish (serde_json, optional debug dump)
//!     → tokio::spawn
//!     → Transport::send (channel | http | log)
//! ```
//!
//! # Design Decisions
//! - Fire-and-forget: the request path never awaits a transport
//! - No retries; a failed send is logged and counted, then dropped
//! - Transports are trait objects so tests can capture events in-process

pub mod channel;
pub mod log;
pub mod webhook;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::schema::{PublisherConfig, TransportKind};
use crate::event::TelemetryEvent;
use crate::observability::metrics;

pub use channel::ChannelTransport;
pub use log::LogTransport;
pub use webhook::HttpTransport;

/// Errors raised while handing an event to a transport.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("failed to serialize event: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("transport channel is closed")]
    Closed,

    #[error("http delivery failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("ingestion endpoint responded with status {0}")]
    Status(u16),

    #[error("invalid publisher configuration: {0}")]
    Config(String),
}

/// Destination for serialized telemetry events.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Short name used in logs and metric labels.
    fn name(&self) -> &'static str;

    /// Deliver one JSON-encoded event.
    async fn send(&self, payload: Bytes) -> Result<(), PublishError>;
}

/// Cloneable handle that dispatches events to a transport without blocking the caller.
#[derive(Clone)]
pub struct Publisher {
    transport: Arc<dyn Transport>,
    debug: bool,
}

impl Publisher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            debug: false,
        }
    }

    /// Log every payload at debug level before sending.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn transport_name(&self) -> &'static str {
        self.transport.name()
    }

    /// Serialize and dispatch an event. Returns as soon as the send is scheduled.
    pub fn publish(&self, event: &TelemetryEvent) {
        let payload = match event.to_json() {
            Ok(payload) => Bytes::from(payload),
            Err(e) => {
                warn!(message_id = %event.message_id, error = %e, "Failed to serialize telemetry event");
                metrics::record_publish_failure(self.transport.name());
                return;
            }
        };

        if self.debug {
            debug!(
                message_id = %event.message_id,
                payload = %String::from_utf8_lossy(&payload),
                "Publishing telemetry event"
            );
        }

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!(message_id = %event.message_id, "No async runtime available, dropping telemetry event");
                metrics::record_publish_failure(self.transport.name());
                return;
            }
        };

        metrics::record_event_published(event.sdk_type.as_str());

        let transport = Arc::clone(&self.transport);
        let message_id = event.message_id;
        handle.spawn(async move {
            if let Err(e) = transport.send(payload).await {
                warn!(
                    message_id = %message_id,
                    transport = transport.name(),
                    error = %e,
                    "Failed to publish telemetry event"
                );
                metrics::record_publish_failure(transport.name());
            }
        });
    }
}

impl std::fmt::Debug for Publisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Publisher")
            .field("transport", &self.transport.name())
            .field("debug", &self.debug)
            .finish()
    }
}

/// Build the transport described by the `[publisher]` config section.
pub fn transport_from_config(
    config: &PublisherConfig,
    api_key: &str,
) -> Result<Arc<dyn Transport>, PublishError> {
    match config.kind {
        TransportKind::Log => Ok(Arc::new(LogTransport::new())),
        TransportKind::Http => {
            let endpoint = config
                .endpoint
                .as_deref()
                .ok_or_else(|| PublishError::Config("http publisher requires an endpoint".into()))?;
            let transport = HttpTransport::new(endpoint, api_key, config.timeout())?;
            Ok(Arc::new(transport))
        }
    }
}
