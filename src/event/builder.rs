//! Event assembly.
//!
//! # Responsibilities
//! - Resolve route pattern, concrete path and raw URL
//! - Extract path and query parameters
//! - Redact headers and bodies in both directions
//! - Encode bodies and stamp identity, timing and errors
//!
//! # Design Decisions
//! - Inputs are framework-agnostic snapshots with bodies already buffered
//! - Building never fails; missing pieces degrade to empty fields

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use bytes::Bytes;
use chrono::Utc;
use http::header::{HOST, REFERER};
use http::{HeaderMap, Method, StatusCode, Uri, Version};
use uuid::Uuid;

use super::query::parse_query;
use super::schema::{SdkType, TelemetryEvent};
use crate::context::ErrorRecord;
use crate::redaction::{redact_body, redact_headers, HeaderFields, RedactionRules};
use crate::routing::extract_path_params;

/// Buffered view of a request.
#[derive(Debug, Clone)]
pub struct RequestSnapshot {
    pub method: Method,
    pub uri: Uri,
    pub version: Version,
    pub headers: HeaderMap,
    pub body: Bytes,
    /// Matched route pattern, e.g. `/users/{id}`.
    pub route_pattern: Option<String>,
}

impl RequestSnapshot {
    pub fn from_parts(parts: &http::request::Parts, body: Bytes, route_pattern: Option<String>) -> Self {
        Self {
            method: parts.method.clone(),
            uri: parts.uri.clone(),
            version: parts.version,
            headers: parts.headers.clone(),
            body,
            route_pattern,
        }
    }
}

/// Buffered view of a response.
#[derive(Debug, Clone)]
pub struct ResponseSnapshot {
    pub status: StatusCode,
    pub version: Version,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ResponseSnapshot {
    pub fn from_parts(parts: &http::response::Parts, body: Bytes) -> Self {
        Self {
            status: parts.status,
            version: parts.version,
            headers: parts.headers.clone(),
            body,
        }
    }
}

/// Identity and correlation data stamped onto an event.
#[derive(Debug, Clone)]
pub struct EventMeta {
    pub message_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub project_id: String,
    pub sdk_type: SdkType,
    pub tags: Vec<String>,
    pub service_version: Option<String>,
    pub errors: Vec<ErrorRecord>,
}

/// Assemble a telemetry event from a request, an optional response, and timing.
pub fn build_event(
    meta: EventMeta,
    request: &RequestSnapshot,
    response: Option<&ResponseSnapshot>,
    duration: Duration,
    rules: &RedactionRules,
) -> TelemetryEvent {
    let path = request.uri.path();
    let query = request.uri.query().unwrap_or_default();
    let raw_url = raw_url(path, query);
    let url_path = request
        .route_pattern
        .clone()
        .unwrap_or_else(|| path.to_string());

    let path_params = extract_path_params(&url_path, path);
    let query_params = parse_query(query);

    let request_headers = redact_headers(rules, &request.headers);
    let request_body = redact_body(rules.request_paths(), &request.body);

    let (status_code, response_headers, response_body) = match response {
        Some(response) => (
            Some(response.status.as_u16()),
            redact_headers(rules, &response.headers),
            BASE64.encode(redact_body(rules.response_paths(), &response.body)),
        ),
        None => (None, HeaderFields::new(), String::new()),
    };

    let (proto_major, proto_minor) = protocol_version(request.version);

    TelemetryEvent {
        message_id: meta.message_id,
        parent_id: meta.parent_id,
        project_id: meta.project_id,
        duration: u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX),
        host: host(&request.uri, &request.headers),
        method: request.method.as_str().to_string(),
        raw_url,
        url_path,
        path_params,
        query_params,
        referer: header_str(&request.headers, REFERER.as_str()),
        request_headers,
        response_headers,
        request_body: BASE64.encode(request_body),
        response_body,
        status_code,
        proto_major,
        proto_minor,
        errors: meta.errors,
        sdk_type: meta.sdk_type,
        tags: meta.tags,
        service_version: meta.service_version,
        timestamp: Utc::now(),
    }
}

fn raw_url(path: &str, query: &str) -> String {
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{query}")
    }
}

fn host(uri: &Uri, headers: &HeaderMap) -> String {
    uri.authority()
        .map(|authority| authority.as_str().to_string())
        .unwrap_or_else(|| header_str(headers, HOST.as_str()))
}

fn header_str(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn protocol_version(version: Version) -> (u8, u8) {
    match version {
        Version::HTTP_09 => (0, 9),
        Version::HTTP_10 => (1, 0),
        Version::HTTP_2 => (2, 0),
        Version::HTTP_3 => (3, 0),
        _ => (1, 1),
    }
}
