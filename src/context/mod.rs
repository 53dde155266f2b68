//! Correlation subsystem.
//!
//! # Data Flow
//! ```text
//! Interceptor entry
//!     → correlation.rs (new message ID, empty error list)
//!     → handler code: report_error() → error.rs (walk cause chain) → appended record
//!     → outbound calls read message_id as their parent_id
//!     → Interceptor finalizes and attaches the records to the event
//! ```

pub mod correlation;
pub mod error;

pub use correlation::{report_error, ContextState, CorrelationContext};
pub use error::{root_cause, ErrorRecord};
