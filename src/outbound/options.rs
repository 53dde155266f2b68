//! Per-client outbound observation options.

use crate::redaction::{PathError, RedactionRules};

/// Route hint and redaction rules for one observed client.
///
/// Rules here are independent of the observer's inbound rules; an empty
/// set redacts nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutboundOptions {
    /// Route pattern of the downstream call, e.g. `/users/{id}`.
    pub path_pattern_hint: Option<String>,
    pub rules: RedactionRules,
}

impl OutboundOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path_pattern_hint(mut self, hint: impl Into<String>) -> Self {
        self.path_pattern_hint = Some(hint.into());
        self
    }

    pub fn with_rules(mut self, rules: RedactionRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn redact_headers<I, T>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.rules = self.rules.with_headers(names);
        self
    }

    pub fn redact_request_body<I, T>(mut self, paths: I) -> Result<Self, PathError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.rules = self.rules.with_request_body(paths)?;
        Ok(self)
    }

    pub fn redact_response_body<I, T>(mut self, paths: I) -> Result<Self, PathError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.rules = self.rules.with_response_body(paths)?;
        Ok(self)
    }
}
