//! Redaction engine.
//!
//! # Data Flow
//! ```text
//! header map ──▶ headers.rs (case-insensitive name match) ──▶ redacted header fields
//! raw body   ──▶ body.rs (parse JSON, apply paths)        ──▶ redacted bytes
//!                      ▲
//!                path.rs (JSON path expressions)
//! ```
//!
//! # Design Decisions
//! - Pure functions over rule sets; no state, no I/O
//! - Fail-open on bodies that are not JSON and on paths that do not exist
//! - Rules are parsed once at startup, never per request

pub mod body;
pub mod headers;
pub mod path;

pub use body::redact_body;
pub use headers::{redact_header_map, redact_headers, HeaderFields};
pub use path::{JsonPath, PathError};

/// Replacement value for every redacted header value and body field.
pub const SENTINEL: &str = "[CLIENT_REDACTED]";

/// Declarative redaction rules: header names plus JSON paths for each body direction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedactionRules {
    /// Lowercased header names.
    headers: Vec<String>,
    request_body: Vec<JsonPath>,
    response_body: Vec<JsonPath>,
}

impl RedactionRules {
    /// Create an empty rule set (nothing is redacted).
    pub fn new() -> Self {
        Self::default()
    }

    /// Add header names to redact. Matching is case-insensitive.
    pub fn with_headers<I, T>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.headers.extend(
            names
                .into_iter()
                .map(|name| name.as_ref().trim().to_ascii_lowercase())
                .filter(|name| !name.is_empty()),
        );
        self
    }

    /// Add JSON paths redacted from request bodies.
    pub fn with_request_body<I, T>(mut self, paths: I) -> Result<Self, PathError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.request_body.extend(parse_all(paths)?);
        Ok(self)
    }

    /// Add JSON paths redacted from response bodies.
    pub fn with_response_body<I, T>(mut self, paths: I) -> Result<Self, PathError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.response_body.extend(parse_all(paths)?);
        Ok(self)
    }

    pub fn header_names(&self) -> &[String] {
        &self.headers
    }

    pub fn request_paths(&self) -> &[JsonPath] {
        &self.request_body
    }

    pub fn response_paths(&self) -> &[JsonPath] {
        &self.response_body
    }

    /// Returns true if the header name matches a rule.
    pub fn is_sensitive_header(&self, name: &str) -> bool {
        self.headers.iter().any(|rule| rule.eq_ignore_ascii_case(name))
    }
}

fn parse_all<I, T>(paths: I) -> Result<Vec<JsonPath>, PathError>
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    paths
        .into_iter()
        .map(|p| JsonPath::parse(p.as_ref()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_rules_are_case_insensitive() {
        let rules = RedactionRules::new().with_headers(["Authorization", " X-Api-Key "]);
        assert_eq!(rules.header_names(), &["authorization", "x-api-key"]);
        assert!(rules.is_sensitive_header("AUTHORIZATION"));
        assert!(rules.is_sensitive_header("x-api-key"));
        assert!(!rules.is_sensitive_header("content-type"));
    }

    #[test]
    fn test_invalid_body_rule_is_rejected() {
        let result = RedactionRules::new().with_request_body(["user.ssn"]);
        assert!(matches!(result, Err(PathError::MissingRoot(_))));
    }
}
