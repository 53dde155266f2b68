//! Observed reqwest client.
//!
//! # Responsibilities
//! - Capture method, URL, headers and body of each outgoing request
//! - Read the response fully, then hand back an equivalent re-buffered response
//! - Publish one `ReqwestOutgoing` event per completed exchange, parented to the
//!   inbound request's message ID
//!
//! # Design Decisions
//! - Streaming request bodies are captured as empty
//! - A failed call is reported into the correlation context and returned unchanged;
//!   no event is published since there is no response exchange

use std::time::Instant;

use bytes::Bytes;
use http::{HeaderMap, StatusCode, Uri, Version};
use reqwest::{IntoUrl, Method, RequestBuilder, ResponseBuilderExt};
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use super::options::OutboundOptions;
use crate::context::CorrelationContext;
use crate::event::{build_event, RequestSnapshot, ResponseSnapshot, SdkType};
use crate::observability::metrics;
use crate::observer::Observer;

/// A `reqwest::Client` whose calls are published as children of one inbound request.
#[derive(Debug, Clone)]
pub struct ObservedClient {
    client: reqwest::Client,
    observer: Observer,
    ctx: CorrelationContext,
    options: OutboundOptions,
}

impl ObservedClient {
    pub fn new(
        client: reqwest::Client,
        observer: Observer,
        ctx: CorrelationContext,
        options: OutboundOptions,
    ) -> Self {
        Self {
            client,
            observer,
            ctx,
            options,
        }
    }

    pub fn context(&self) -> &CorrelationContext {
        &self.ctx
    }

    pub fn inner(&self) -> &reqwest::Client {
        &self.client
    }

    /// Start a request; pass the builder back to [`ObservedClient::send`].
    pub fn request<U: IntoUrl>(&self, method: Method, url: U) -> RequestBuilder {
        self.client.request(method, url)
    }

    pub fn get<U: IntoUrl>(&self, url: U) -> RequestBuilder {
        self.request(Method::GET, url)
    }

    pub fn post<U: IntoUrl>(&self, url: U) -> RequestBuilder {
        self.request(Method::POST, url)
    }

    /// Build and execute `builder`, observing the exchange.
    pub async fn send(&self, builder: RequestBuilder) -> Result<reqwest::Response, reqwest::Error> {
        let (client, request) = builder.build_split();
        let request = match request {
            Ok(request) => request,
            Err(e) => {
                self.ctx.report_error(&e);
                return Err(e);
            }
        };
        self.execute_with(&client, request).await
    }

    /// Execute a prepared request with the wrapped client, observing the exchange.
    pub async fn execute(&self, request: reqwest::Request) -> Result<reqwest::Response, reqwest::Error> {
        self.execute_with(&self.client, request).await
    }

    async fn execute_with(
        &self,
        client: &reqwest::Client,
        request: reqwest::Request,
    ) -> Result<reqwest::Response, reqwest::Error> {
        let snapshot = RequestSnapshot {
            method: request.method().clone(),
            uri: outbound_uri(request.url()),
            version: request.version(),
            headers: request.headers().clone(),
            body: request
                .body()
                .and_then(|body| body.as_bytes())
                .map(Bytes::copy_from_slice)
                .unwrap_or_default(),
            route_pattern: self.options.path_pattern_hint.clone(),
        };

        let start = Instant::now();
        let response = match client.execute(request).await {
            Ok(response) => response,
            Err(e) => return Err(self.fail(e)),
        };

        let status = response.status();
        let version = response.version();
        let headers = response.headers().clone();
        let url = response.url().clone();
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => return Err(self.fail(e)),
        };
        let duration = start.elapsed();

        let captured = ResponseSnapshot {
            status,
            version,
            headers: headers.clone(),
            body: body.clone(),
        };
        let meta = self.observer.event_meta(
            Uuid::new_v4(),
            Some(self.ctx.message_id()),
            SdkType::ReqwestOutgoing,
            Vec::new(),
        );
        let event = build_event(meta, &snapshot, Some(&captured), duration, &self.options.rules);
        metrics::record_capture_duration(SdkType::ReqwestOutgoing.as_str(), duration);
        debug!(
            message_id = %event.message_id,
            parent_id = %self.ctx.message_id(),
            method = %event.method,
            url_path = %event.url_path,
            status = status.as_u16(),
            "Captured outbound exchange"
        );
        self.observer.publisher().publish(&event);

        Ok(rebuild_response(status, version, headers, url, body))
    }

    fn fail(&self, e: reqwest::Error) -> reqwest::Error {
        warn!(parent_id = %self.ctx.message_id(), error = %e, "Outbound call failed");
        self.ctx.report_error(&e);
        e
    }
}

/// Client observing calls made on behalf of `ctx`.
pub fn observe_outbound_call(
    observer: &Observer,
    ctx: &CorrelationContext,
    options: OutboundOptions,
) -> ObservedClient {
    observer.observe_outbound_call(ctx, options)
}

/// Scheme, host, port, path and query of `url`; credentials are left out.
fn outbound_uri(url: &Url) -> Uri {
    let mut authority = url.host_str().unwrap_or_default().to_string();
    if let Some(port) = url.port() {
        authority.push(':');
        authority.push_str(&port.to_string());
    }
    let path_and_query = match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    };
    Uri::builder()
        .scheme(url.scheme())
        .authority(authority)
        .path_and_query(path_and_query)
        .build()
        .unwrap_or_default()
}

/// Reassemble a readable response from parts already consumed for observation.
fn rebuild_response(
    status: StatusCode,
    version: Version,
    headers: HeaderMap,
    url: Url,
    body: Bytes,
) -> reqwest::Response {
    let mut builder = http::Response::builder().url(url);
    let extensions = builder
        .extensions_mut()
        .map(std::mem::take)
        .unwrap_or_default();

    let mut response = http::Response::new(body);
    *response.status_mut() = status;
    *response.version_mut() = version;
    *response.headers_mut() = headers;
    *response.extensions_mut() = extensions;
    reqwest::Response::from(response)
}
