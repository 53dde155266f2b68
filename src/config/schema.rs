//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the observer.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::bootstrap::DEFAULT_ROOT_URL;
use crate::redaction::{PathError, RedactionRules};

/// Root configuration for the observer.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObserverConfig {
    /// API key used for identity bootstrap and HTTP ingestion.
    pub api_key: String,

    /// Ingestion backend root URL.
    pub root_url: String,

    /// Static project id. When set, no metadata lookup is made.
    pub project_id: Option<String>,

    /// Log every published payload at debug level.
    pub debug: bool,

    /// Version of the observed service, stamped on every event.
    pub service_version: Option<String>,

    /// Free-form tags stamped on every event.
    pub tags: Vec<String>,

    /// Sensitive field rules.
    pub redaction: RedactionConfig,

    /// Where events go.
    pub publisher: PublisherConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,

    /// Listener for the bundled demo server.
    pub listener: ListenerConfig,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            root_url: DEFAULT_ROOT_URL.to_string(),
            project_id: None,
            debug: false,
            service_version: None,
            tags: Vec::new(),
            redaction: RedactionConfig::default(),
            publisher: PublisherConfig::default(),
            observability: ObservabilityConfig::default(),
            listener: ListenerConfig::default(),
        }
    }
}

/// Redaction rules as written in the config file.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct RedactionConfig {
    /// Header names, case-insensitive.
    pub headers: Vec<String>,

    /// JSON paths redacted from request bodies (e.g. `$.password`).
    pub request_body: Vec<String>,

    /// JSON paths redacted from response bodies.
    pub response_body: Vec<String>,
}

impl RedactionConfig {
    /// Parse into a rule set. Fails on the first malformed path.
    pub fn to_rules(&self) -> Result<RedactionRules, PathError> {
        RedactionRules::new()
            .with_headers(&self.headers)
            .with_request_body(&self.request_body)?
            .with_response_body(&self.response_body)
    }
}

/// Publisher transport selection.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Write events to the log.
    #[default]
    Log,
    /// POST events to an ingestion endpoint.
    Http,
}

/// Publisher configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PublisherConfig {
    pub kind: TransportKind,

    /// Ingestion endpoint for the http transport.
    pub endpoint: Option<String>,

    /// Per-delivery timeout in seconds.
    pub timeout_secs: u64,
}

impl PublisherConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            kind: TransportKind::Log,
            endpoint: None,
            timeout_secs: 10,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}
