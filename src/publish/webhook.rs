//! HTTP ingestion transport.
//!
//! POSTs each JSON payload to a configured endpoint with the project API key
//! as a bearer token. Any non-2xx status is a failed delivery.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use tracing::trace;

use super::{PublishError, Transport};

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: url::Url,
    api_key: String,
}

impl HttpTransport {
    pub fn new(endpoint: &str, api_key: &str, timeout: Duration) -> Result<Self, PublishError> {
        let endpoint = url::Url::parse(endpoint)
            .map_err(|e| PublishError::Config(format!("invalid endpoint '{}': {}", endpoint, e)))?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, endpoint, api_key))
    }

    pub fn with_client(client: reqwest::Client, endpoint: url::Url, api_key: &str) -> Self {
        Self {
            client,
            endpoint,
            api_key: api_key.to_string(),
        }
    }

    pub fn endpoint(&self) -> &url::Url {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn send(&self, payload: Bytes) -> Result<(), PublishError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await?;

        let status = response.status();
        trace!(endpoint = %self.endpoint, status = status.as_u16(), "Ingestion response");
        if !status.is_success() {
            return Err(PublishError::Status(status.as_u16()));
        }
        Ok(())
    }
}
