//! Tower layer observing inbound exchanges.
//!
//! # Data Flow
//! ```text
//! Request
//!     → new CorrelationContext (+ Observer) into extensions
//!     → buffer body, rebuild request (a read error is replayed to the handler)
//!     → activate, start clock
//!     → inner service
//!     → buffer response body, rebuild response (a read error is replayed to the client)
//!     → finalize context, build event, publish (not awaited)
//!     → Response / original error
//! ```

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::MatchedPath;
use bytes::{Bytes, BytesMut};
use futures_util::{stream, StreamExt};
use http::{Extensions, Request, Response};
use tower::{Layer, Service};
use tracing::{debug, warn};

use crate::context::{CorrelationContext, ErrorRecord};
use crate::event::{build_event, RequestSnapshot, ResponseSnapshot, SdkType};
use crate::observability::metrics;
use crate::observer::Observer;

/// Layer produced by [`Observer::layer`].
#[derive(Debug, Clone)]
pub struct ObserverLayer {
    observer: Observer,
}

impl ObserverLayer {
    pub fn new(observer: Observer) -> Self {
        Self { observer }
    }
}

impl<S> Layer<S> for ObserverLayer {
    type Service = ObserverService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ObserverService {
            inner,
            observer: self.observer.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ObserverService<S> {
    inner: S,
    observer: Observer,
}

impl<S> Service<Request<Body>> for ObserverService<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: std::error::Error + Send + Sync + 'static,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        // The readied service goes into the future; a fresh clone stays behind.
        let clone = self.inner.clone();
        let inner = std::mem::replace(&mut self.inner, clone);
        let observer = self.observer.clone();
        Box::pin(observe(observer, inner, req))
    }
}

/// Matched route pattern, e.g. `/users/{id}`, when the router knows it.
pub fn route_pattern(extensions: &Extensions) -> Option<String> {
    extensions
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
}

async fn observe<S>(observer: Observer, mut inner: S, req: Request<Body>) -> Result<Response<Body>, S::Error>
where
    S: Service<Request<Body>, Response = Response<Body>>,
    S::Error: std::error::Error + 'static,
{
    let ctx = observer.new_context();
    let message_id = ctx.message_id();

    let (mut parts, body) = req.into_parts();
    let pattern = route_pattern(&parts.extensions);
    parts.extensions.insert(ctx.clone());
    parts.extensions.insert(observer.clone());

    let (captured, body) = buffer(body, "request", &ctx).await;
    let request = RequestSnapshot::from_parts(&parts, captured, pattern);
    let req = Request::from_parts(parts, body);

    ctx.activate();
    let start = Instant::now();
    let result = inner.call(req).await;
    let duration = start.elapsed();

    match result {
        Ok(response) => {
            let (parts, body) = response.into_parts();
            let (captured, body) = buffer(body, "response", &ctx).await;
            let snapshot = ResponseSnapshot::from_parts(&parts, captured);
            emit(&observer, &ctx, &request, Some(&snapshot), duration);
            Ok(Response::from_parts(parts, body))
        }
        Err(err) => {
            debug!(message_id = %message_id, error = %err, "Inner service failed");
            // The handler may already have reported this error before returning it.
            ctx.record_if_absent(ErrorRecord::from_error(&err));
            emit(&observer, &ctx, &request, None, duration);
            Err(err)
        }
    }
}

/// Read `body` to the end. Returns the bytes to capture and the body to hand on.
///
/// On a read error the captured bytes are whatever arrived before it, and the
/// body handed on replays those bytes followed by the same error.
async fn buffer(body: Body, direction: &'static str, ctx: &CorrelationContext) -> (Bytes, Body) {
    let mut chunks = body.into_data_stream();
    let mut collected = BytesMut::new();

    while let Some(chunk) = chunks.next().await {
        match chunk {
            Ok(data) => collected.extend_from_slice(&data),
            Err(e) => {
                warn!(
                    message_id = %ctx.message_id(),
                    direction,
                    error = %e,
                    received = collected.len(),
                    "Failed to buffer body, capturing the bytes read so far"
                );
                let partial = collected.freeze();
                let replay = Body::from_stream(stream::iter([Ok(partial.clone()), Err(e)]));
                return (partial, replay);
            }
        }
    }

    let bytes = collected.freeze();
    (bytes.clone(), Body::from(bytes))
}

fn emit(
    observer: &Observer,
    ctx: &CorrelationContext,
    request: &RequestSnapshot,
    response: Option<&ResponseSnapshot>,
    duration: Duration,
) {
    let meta = observer.event_meta(ctx.message_id(), None, SdkType::RustAxum, ctx.finalize());
    let event = build_event(meta, request, response, duration, &observer.settings().rules);
    metrics::record_capture_duration(SdkType::RustAxum.as_str(), duration);
    debug!(
        message_id = %event.message_id,
        method = %event.method,
        url_path = %event.url_path,
        status = ?event.status_code,
        errors = event.errors.len(),
        "Captured inbound exchange"
    );
    observer.publisher().publish(&event);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::Settings;
    use crate::publish::{ChannelTransport, Publisher};
    use http::StatusCode;
    use std::convert::Infallible;
    use std::io;
    use std::sync::Arc;
    use tower::{service_fn, ServiceExt};

    fn broken_body(head: &'static str, error: &'static str) -> Body {
        Body::from_stream(stream::iter([
            Ok(Bytes::from_static(head.as_bytes())),
            Err(io::Error::other(error)),
        ]))
    }

    fn captured_body(payload: &[u8], field: &str) -> Vec<u8> {
        use base64::Engine;
        let json: serde_json::Value = serde_json::from_slice(payload).unwrap();
        base64::engine::general_purpose::STANDARD
            .decode(json[field].as_str().unwrap())
            .unwrap()
    }

    fn observer() -> (Observer, tokio::sync::mpsc::UnboundedReceiver<Bytes>) {
        let (transport, rx) = ChannelTransport::new();
        let observer = Observer::new(Settings::new("p-1"), Publisher::new(Arc::new(transport)));
        (observer, rx)
    }

    #[tokio::test]
    async fn test_context_is_active_inside_handler() {
        let (observer, mut rx) = observer();
        let svc = ObserverLayer::new(observer).layer(service_fn(|req: Request<Body>| async move {
            let ctx = req.extensions().get::<CorrelationContext>().cloned().unwrap();
            let state = format!("{:?}", ctx.state());
            Ok::<_, Infallible>(Response::new(Body::from(state)))
        }));

        let response = svc
            .oneshot(Request::builder().uri("/state").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Active");

        let payload = rx.recv().await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&payload).unwrap();
        assert_eq!(json["url_path"], "/state");
        assert_eq!(json["sdk_type"], "RustAxum");
    }

    #[tokio::test]
    async fn test_handler_sees_full_request_body() {
        let (observer, mut rx) = observer();
        let svc = ObserverLayer::new(observer).layer(service_fn(|req: Request<Body>| async move {
            let body = axum::body::to_bytes(req.into_body(), usize::MAX).await.unwrap();
            Ok::<_, Infallible>(Response::new(Body::from(body)))
        }));

        let response = svc
            .oneshot(Request::post("/echo").body(Body::from("ping")).unwrap())
            .await
            .unwrap();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"ping");
        assert!(rx.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_request_body_error_reaches_handler() {
        let (observer, mut rx) = observer();
        let svc = ObserverLayer::new(observer).layer(service_fn(|req: Request<Body>| async move {
            let status = match axum::body::to_bytes(req.into_body(), usize::MAX).await {
                Ok(_) => StatusCode::OK,
                Err(_) => StatusCode::BAD_REQUEST,
            };
            Ok::<_, Infallible>(
                Response::builder().status(status).body(Body::empty()).unwrap(),
            )
        }));

        let response = svc
            .oneshot(Request::post("/upload").body(broken_body(r#"{"a":"#, "client aborted")).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let payload = rx.recv().await.unwrap();
        assert_eq!(captured_body(&payload, "request_body"), br#"{"a":"#);
    }

    #[tokio::test]
    async fn test_response_body_error_reaches_client() {
        let (observer, mut rx) = observer();
        let svc = ObserverLayer::new(observer).layer(service_fn(|_req: Request<Body>| async move {
            Ok::<_, Infallible>(Response::new(broken_body("partial-", "upstream reset")))
        }));

        let response = svc
            .oneshot(Request::get("/stream").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let mut chunks = response.into_body().into_data_stream();
        assert_eq!(&chunks.next().await.unwrap().unwrap()[..], b"partial-");
        let err = chunks.next().await.unwrap().unwrap_err();
        assert!(err.to_string().contains("upstream reset"));

        let payload = rx.recv().await.unwrap();
        assert_eq!(captured_body(&payload, "response_body"), b"partial-");
    }
}
