//! Telemetry event wire schema.
//!
//! Events serialize to a flat JSON object. Bodies are base64 text, header maps
//! are objects of string to array of string, timestamps are RFC 3339 strings.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::context::ErrorRecord;
use crate::redaction::HeaderFields;
use crate::routing::PathParams;

/// Identifies which integration produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SdkType {
    /// Inbound request observed by the tower layer.
    RustAxum,
    /// Outbound call observed through `ObservedClient`.
    ReqwestOutgoing,
}

impl SdkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SdkType::RustAxum => "RustAxum",
            SdkType::ReqwestOutgoing => "ReqwestOutgoing",
        }
    }
}

/// Query parameter name to every value given for it, in order.
pub type QueryParams = BTreeMap<String, Vec<String>>;

/// One normalized request/response exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryEvent {
    pub message_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub project_id: String,
    /// Nanoseconds from dispatch to response completion.
    pub duration: u64,
    pub host: String,
    pub method: String,
    pub raw_url: String,
    pub url_path: String,
    pub path_params: PathParams,
    pub query_params: QueryParams,
    pub referer: String,
    pub request_headers: HeaderFields,
    pub response_headers: HeaderFields,
    pub request_body: String,
    pub response_body: String,
    /// `None` when the handler failed before producing a response.
    pub status_code: Option<u16>,
    pub proto_major: u8,
    pub proto_minor: u8,
    pub errors: Vec<ErrorRecord>,
    pub sdk_type: SdkType,
    pub tags: Vec<String>,
    pub service_version: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl TelemetryEvent {
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
