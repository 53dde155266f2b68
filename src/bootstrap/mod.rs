//! Identity bootstrap.
//!
//! Resolves the project identity once at startup, either from a configured
//! `project_id` or from the ingestion backend's client metadata endpoint.

pub mod credentials;

pub use credentials::{metadata_url, resolve, BootstrapError, ClientMetadata, DEFAULT_ROOT_URL};
