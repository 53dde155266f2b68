//! Header redaction.

use std::collections::BTreeMap;

use http::HeaderMap;

use super::{RedactionRules, SENTINEL};

/// Header name to ordered list of values, as carried in telemetry events.
pub type HeaderFields = BTreeMap<String, Vec<String>>;

/// Convert a multi-valued header map and redact every header named by `rules`.
///
/// A matched header keeps its name but its whole value list becomes `[SENTINEL]`.
/// Non UTF-8 values are rendered lossily.
pub fn redact_headers(rules: &RedactionRules, headers: &HeaderMap) -> HeaderFields {
    let mut fields = HeaderFields::new();
    for (name, value) in headers {
        fields
            .entry(name.as_str().to_string())
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }

    for (name, values) in fields.iter_mut() {
        if rules.is_sensitive_header(name) {
            *values = vec![SENTINEL.to_string()];
        }
    }
    fields
}

/// Redact an already converted header map. Returns a new map; the input is untouched.
pub fn redact_header_map(rules: &RedactionRules, fields: &HeaderFields) -> HeaderFields {
    fields
        .iter()
        .map(|(name, values)| {
            let values = if rules.is_sensitive_header(name) {
                vec![SENTINEL.to_string()]
            } else {
                values.clone()
            };
            (name.clone(), values)
        })
        .collect()
}
