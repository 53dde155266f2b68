//! Structured body redaction.

use std::borrow::Cow;

use serde_json::Value;

use super::path::JsonPath;
use super::SENTINEL;
use crate::observability::metrics;

/// Redact the JSON fields addressed by `paths` from a raw body.
///
/// Bodies that are not valid JSON come back unchanged. When no path matched,
/// the original bytes are returned so formatting is preserved.
pub fn redact_body<'a>(paths: &[JsonPath], raw: &'a [u8]) -> Cow<'a, [u8]> {
    if paths.is_empty() || raw.is_empty() {
        return Cow::Borrowed(raw);
    }

    let mut doc: Value = match serde_json::from_slice(raw) {
        Ok(doc) => doc,
        Err(_) => {
            metrics::record_redaction_passthrough();
            return Cow::Borrowed(raw);
        }
    };

    let sentinel = Value::String(SENTINEL.to_string());
    let replaced: usize = paths.iter().map(|path| path.set(&mut doc, &sentinel)).sum();
    if replaced == 0 {
        return Cow::Borrowed(raw);
    }

    match serde_json::to_vec(&doc) {
        Ok(bytes) => Cow::Owned(bytes),
        Err(e) => {
            // The document held sensitive fields; never fall back to the raw bytes.
            tracing::warn!(error = %e, "Failed to re-serialize redacted body");
            Cow::Owned(SENTINEL.as_bytes().to_vec())
        }
    }
}
