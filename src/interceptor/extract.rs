//! Handler extractors for the per-request context and the observer handle.

use axum::extract::FromRequestParts;
use axum::response::{IntoResponse, Response};
use http::request::Parts;
use http::StatusCode;

use crate::context::CorrelationContext;
use crate::observer::Observer;

/// Rejection used when a handler asks for observer state outside the layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingObserver;

impl std::fmt::Display for MissingObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("observer layer is not installed")
    }
}

impl std::error::Error for MissingObserver {}

impl IntoResponse for MissingObserver {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

impl<S> FromRequestParts<S> for CorrelationContext
where
    S: Send + Sync,
{
    type Rejection = MissingObserver;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CorrelationContext>()
            .cloned()
            .ok_or(MissingObserver)
    }
}

impl<S> FromRequestParts<S> for Observer
where
    S: Send + Sync,
{
    type Rejection = MissingObserver;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Observer>().cloned().ok_or(MissingObserver)
    }
}
