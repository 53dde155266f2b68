//! Metrics collection and exposition.
//!
//! # Metrics
//! - `observer_events_published_total` (counter): events handed to a transport, by sdk_type
//! - `observer_publish_failures_total` (counter): failed or dropped deliveries, by transport
//! - `observer_redaction_passthrough_total` (counter): bodies with rules left as-is because they were not JSON
//! - `observer_capture_duration_seconds` (histogram): observed exchange latency, by sdk_type
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade and is a no-op until a recorder is installed
//! - Prometheus exposition is opt-in from the binary

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder with an HTTP scrape listener on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Prometheus metrics exporter started");
    Ok(())
}

pub fn record_event_published(sdk_type: &'static str) {
    counter!("observer_events_published_total", "sdk_type" => sdk_type).increment(1);
}

pub fn record_publish_failure(transport: &'static str) {
    counter!("observer_publish_failures_total", "transport" => transport).increment(1);
}

pub fn record_redaction_passthrough() {
    counter!("observer_redaction_passthrough_total").increment(1);
}

pub fn record_capture_duration(sdk_type: &'static str, duration: Duration) {
    histogram!("observer_capture_duration_seconds", "sdk_type" => sdk_type)
        .record(duration.as_secs_f64());
}
