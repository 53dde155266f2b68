//! Error records attached to telemetry events.
//!
//! # Design Decisions
//! - The cause chain is walked through `std::error::Error::source` until it ends
//! - The reported error's type name comes from `std::any::type_name` with the
//!   module path dropped; a wrapped root is only known as `&dyn Error`, so its
//!   name is read from its `Debug` output
//! - Stack traces follow `RUST_BACKTRACE`; empty when capture is disabled

use std::any::type_name;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::error::Error;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cause chains longer than this are cut off.
const MAX_CAUSE_DEPTH: usize = 64;

/// A non-fatal error observed while handling a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub when: DateTime<Utc>,
    pub error_type: String,
    pub message: String,
    pub root_error_type: String,
    pub root_error_message: String,
    pub stack_trace: String,
}

impl ErrorRecord {
    /// Build a record for a concrete error type.
    pub fn from_error<E>(err: &E) -> Self
    where
        E: Error + 'static,
    {
        Self::from_dyn(short_type_name(type_name::<E>()), err)
    }

    /// Build a record for a type-erased error, e.g. the contents of a `Box<dyn Error>`.
    pub fn from_dyn(error_type: &str, err: &(dyn Error + 'static)) -> Self {
        let error_type = short_type_name(error_type);
        let (root, depth) = root_cause(err);
        let root_error_type = if depth == 0 {
            error_type.to_string()
        } else {
            debug_type_name(root)
        };

        Self {
            when: Utc::now(),
            error_type: error_type.to_string(),
            message: err.to_string(),
            root_error_type,
            root_error_message: root.to_string(),
            stack_trace: capture_stack_trace(),
        }
    }
}

/// Follow `source()` to the innermost cause. Returns the root and how many
/// links were followed (0 when `err` has no source).
pub fn root_cause<'a>(err: &'a (dyn Error + 'static)) -> (&'a (dyn Error + 'static), usize) {
    let mut current = err;
    let mut depth = 0;
    while let Some(next) = current.source() {
        if depth == MAX_CAUSE_DEPTH {
            break;
        }
        current = next;
        depth += 1;
    }
    (current, depth)
}

/// `std::io::error::Error` becomes `Error`; generic arguments are kept as written.
fn short_type_name(full: &str) -> &str {
    let head_end = full.find('<').unwrap_or(full.len());
    let start = full[..head_end].rfind("::").map_or(0, |i| i + 2);
    &full[start..]
}

fn debug_type_name(err: &dyn Error) -> String {
    let rendered = format!("{err:?}");
    let name: String = rendered
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    if name.is_empty() {
        "Error".to_string()
    } else {
        name
    }
}

fn capture_stack_trace() -> String {
    let backtrace = Backtrace::capture();
    match backtrace.status() {
        BacktraceStatus::Captured => backtrace.to_string(),
        _ => String::new(),
    }
}
