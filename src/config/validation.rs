//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Require an identity source (api key or static project id)
//! - Check that URLs, addresses and redaction paths parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ObserverConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{ObserverConfig, TransportKind};
use crate::redaction::JsonPath;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("either api_key or project_id must be set")]
    MissingIdentity,

    #[error("root_url '{0}' is not a valid URL")]
    InvalidRootUrl(String),

    #[error("redaction.{section} path '{path}' is invalid: {reason}")]
    InvalidRedactionPath {
        section: &'static str,
        path: String,
        reason: String,
    },

    #[error("publisher.endpoint is required for the http transport")]
    MissingEndpoint,

    #[error("publisher.endpoint '{0}' is not a valid URL")]
    InvalidEndpoint(String),

    #[error("publisher.timeout_secs must be greater than zero")]
    ZeroTimeout,

    #[error("observability.metrics_address '{0}' is not a valid socket address")]
    InvalidMetricsAddress(String),

    #[error("listener.bind_address '{0}' is not a valid socket address")]
    InvalidBindAddress(String),
}

/// Check a parsed config, collecting every problem found.
pub fn validate_config(config: &ObserverConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let has_project = config
        .project_id
        .as_deref()
        .is_some_and(|id| !id.trim().is_empty());
    if config.api_key.trim().is_empty() && !has_project {
        errors.push(ValidationError::MissingIdentity);
    }

    if !config.root_url.is_empty() && url::Url::parse(&config.root_url).is_err() {
        errors.push(ValidationError::InvalidRootUrl(config.root_url.clone()));
    }

    let sections = [
        ("request_body", &config.redaction.request_body),
        ("response_body", &config.redaction.response_body),
    ];
    for (section, paths) in sections {
        for path in paths {
            if let Err(e) = JsonPath::parse(path) {
                errors.push(ValidationError::InvalidRedactionPath {
                    section,
                    path: path.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    if config.publisher.kind == TransportKind::Http {
        match config.publisher.endpoint.as_deref() {
            None | Some("") => errors.push(ValidationError::MissingEndpoint),
            Some(endpoint) if url::Url::parse(endpoint).is_err() => {
                errors.push(ValidationError::InvalidEndpoint(endpoint.to_string()));
            }
            Some(_) => {}
        }
    }
    if config.publisher.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ObserverConfig {
        ObserverConfig {
            api_key: "key".into(),
            ..ObserverConfig::default()
        }
    }

    #[test]
    fn test_default_with_key_is_valid() {
        assert_eq!(validate_config(&valid()), Ok(()));
    }

    #[test]
    fn test_project_id_alone_is_an_identity() {
        let config = ObserverConfig {
            project_id: Some("p-1".into()),
            ..ObserverConfig::default()
        };
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ObserverConfig::default();
        config.redaction.request_body = vec!["password".into()];
        config.publisher.kind = TransportKind::Http;
        config.publisher.timeout_secs = 0;
        config.listener.bind_address = "nowhere".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&ValidationError::MissingIdentity));
        assert!(errors.contains(&ValidationError::MissingEndpoint));
        assert!(errors.contains(&ValidationError::ZeroTimeout));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidRedactionPath { section: "request_body", .. })));
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = valid();
        config.observability.metrics_address = "bogus".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::InvalidMetricsAddress("bogus".into())])
        );
    }
}
