//! Outbound call observation.
//!
//! # Data Flow
//! ```text
//! handler code
//!     → Observer::observe_outbound_call(ctx, options) → ObservedClient
//!     → send(builder) / execute(request)
//!     → reqwest::Client (real call)
//!     → event (parent_id = ctx.message_id) → publisher
//!     → re-buffered reqwest::Response back to the caller
//! ```

pub mod client;
pub mod options;

pub use client::{observe_outbound_call, ObservedClient};
pub use options::OutboundOptions;
