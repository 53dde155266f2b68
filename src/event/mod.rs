//! Telemetry event subsystem.
//!
//! # Data Flow
//! ```text
//! RequestSnapshot + ResponseSnapshot + EventMeta + duration
//!     → builder.rs (path params, query params, redaction, base64)
//!     → schema.rs (TelemetryEvent, serde JSON)
//!     → publisher
//! ```

pub mod builder;
pub mod query;
pub mod schema;

pub use builder::{build_event, EventMeta, RequestSnapshot, ResponseSnapshot};
pub use query::parse_query;
pub use schema::{QueryParams, SdkType, TelemetryEvent};
