//! Route pattern handling.
//!
//! # Responsibilities
//! - Recover named path parameters from a route pattern and a concrete path
//!
//! # Design Decisions
//! - Strictly positional segment matching; no wildcards or regex
//! - The route pattern itself comes from the framework adapter (e.g. axum's `MatchedPath`)

pub mod params;

pub use params::{extract_path_params, PathParams};
