//! Inbound interceptor: the axum/tower adapter around the capture pipeline.
//!
//! # Design Decisions
//! - Works on any `Service<Request<Body>>`; axum routers plug it in with `Router::layer`
//! - The route pattern comes from axum's `MatchedPath`, so the layer must sit on the router
//!   (not outside it) for templated `url_path` values
//! - Handler failures are recorded and propagated unchanged

pub mod extract;
pub mod layer;

pub use extract::MissingObserver;
pub use layer::{route_pattern, ObserverLayer, ObserverService};
