//! HTTP exchange observer.
//!
//! Captures inbound request/response exchanges and the outbound calls they
//! trigger, normalizes each one into a telemetry event, redacts sensitive
//! fields, and publishes it without blocking the response.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────────┐
//!   Request ─────▶│ interceptor (tower layer)                            │
//!                 │   context: CorrelationContext (message_id, errors)   │
//!                 │        │                                             │
//!                 │        ▼                                             │
//!                 │   handler ──▶ outbound::ObservedClient ──▶ downstream│
//!                 │        │              │ parent_id = message_id       │
//!                 │        ▼              ▼                              │
//!                 │   event::build_event ◀── routing (path params)       │
//!                 │        │             ◀── redaction (headers, bodies) │
//!                 │        ▼                                             │
//!                 │   publish::Publisher ──spawn──▶ Transport            │
//!   Response ◀────│                                                      │
//!                 └──────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! let (transport, _rx) = http_observer::publish::ChannelTransport::new();
//! let observer = Observer::bootstrap(&config, Arc::new(transport)).await?;
//! let app = Router::new()
//!     .route("/users/{id}", get(show_user))
//!     .layer(observer.layer());
//! ```

// Capture core
pub mod context;
pub mod event;
pub mod redaction;
pub mod routing;

// Adapters
pub mod interceptor;
pub mod outbound;

// Process wiring
pub mod bootstrap;
pub mod config;
pub mod observability;
pub mod observer;
pub mod publish;

pub use config::ObserverConfig;
pub use context::{report_error, CorrelationContext, ErrorRecord};
pub use event::{SdkType, TelemetryEvent};
pub use interceptor::ObserverLayer;
pub use observer::{Observer, Settings};
pub use outbound::{observe_outbound_call, ObservedClient, OutboundOptions};
pub use redaction::RedactionRules;
