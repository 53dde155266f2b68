//! Client metadata lookup.
//!
//! # Responsibilities
//! - Exchange an API key for the project identity at startup
//! - Surface every failure as a typed error; the caller treats it as fatal
//!
//! # Design Decisions
//! - One request at init time, never on the request path
//! - Unknown response fields are ignored

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_ROOT_URL: &str = "https://app.apitoolkit.io";

const METADATA_PATH: &str = "/api/client_metadata";

/// Project identity returned by the ingestion backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientMetadata {
    pub project_id: String,
    #[serde(default)]
    pub topic_id: String,
    #[serde(default)]
    pub pubsub_project_id: String,
    /// Service account credentials for the push topic, passed through as-is.
    #[serde(default)]
    pub pubsub_push_service_account: serde_json::Value,
}

impl ClientMetadata {
    /// Identity for a configured project, with no backend round trip.
    pub fn offline(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            topic_id: String::new(),
            pubsub_project_id: String::new(),
            pubsub_push_service_account: serde_json::Value::Null,
        }
    }
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("api key is empty")]
    MissingApiKey,

    #[error("invalid root url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("client metadata request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("client metadata request rejected with status {0}, check the api key")]
    Rejected(u16),

    #[error("client metadata response is not valid: {0}")]
    InvalidMetadata(String),

    #[error("invalid redaction rule: {0}")]
    Rules(#[from] crate::redaction::PathError),
}

/// Build the metadata URL from a root URL. An empty root selects the default.
pub fn metadata_url(root_url: &str) -> Result<url::Url, BootstrapError> {
    let root = if root_url.trim().is_empty() {
        DEFAULT_ROOT_URL
    } else {
        root_url.trim()
    };
    let full = format!("{}{}", root.trim_end_matches('/'), METADATA_PATH);
    url::Url::parse(&full).map_err(|source| BootstrapError::InvalidUrl {
        url: root.to_string(),
        source,
    })
}

/// Fetch the project identity for `api_key` from `{root_url}/api/client_metadata`.
pub async fn resolve(
    client: &reqwest::Client,
    api_key: &str,
    root_url: &str,
) -> Result<ClientMetadata, BootstrapError> {
    if api_key.trim().is_empty() {
        return Err(BootstrapError::MissingApiKey);
    }
    let url = metadata_url(root_url)?;
    debug!(url = %url, "Requesting client metadata");

    let response = client.get(url).bearer_auth(api_key).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(BootstrapError::Rejected(status.as_u16()));
    }

    let body = response.bytes().await?;
    let metadata: ClientMetadata = serde_json::from_slice(&body)
        .map_err(|e| BootstrapError::InvalidMetadata(e.to_string()))?;
    if metadata.project_id.is_empty() {
        return Err(BootstrapError::InvalidMetadata("project_id is empty".into()));
    }

    info!(project_id = %metadata.project_id, topic_id = %metadata.topic_id, "Client metadata resolved");
    Ok(metadata)
}
