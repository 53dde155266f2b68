//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ObserverConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ObserverConfig, ConfigError> {
    let config: ObserverConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ObserverConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{LogFormat, TransportKind};

    #[test]
    fn test_parses_full_file() {
        let config = parse_config(
            r#"
            api_key = "secret"
            root_url = "http://localhost:8080"
            debug = true
            service_version = "2.1.0"
            tags = ["prod", "eu"]

            [redaction]
            headers = ["Authorization", "Cookie"]
            request_body = ["$.password"]
            response_body = ["$.data[*].token"]

            [publisher]
            kind = "http"
            endpoint = "http://localhost:9000/ingest"
            timeout_secs = 3

            [observability]
            log_level = "debug"
            log_format = "json"

            [listener]
            bind_address = "127.0.0.1:3000"
            "#,
        )
        .unwrap();

        assert_eq!(config.tags, vec!["prod", "eu"]);
        assert_eq!(config.publisher.kind, TransportKind::Http);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        let rules = config.redaction.to_rules().unwrap();
        assert!(rules.is_sensitive_header("cookie"));
        assert_eq!(rules.response_paths()[0].as_str(), "$.data[*].token");
    }

    #[test]
    fn test_minimal_file_uses_defaults() {
        let config = parse_config(r#"project_id = "p-9""#).unwrap();
        assert_eq!(config.root_url, "https://app.apitoolkit.io");
        assert_eq!(config.publisher.kind, TransportKind::Log);
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
    }

    #[test]
    fn test_validation_errors_are_reported_together() {
        let err = parse_config(
            r#"
            [redaction]
            request_body = ["nope"]
            "#,
        )
        .unwrap_err();
        match err {
            ConfigError::Validation(errors) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_syntax_error_is_parse_error() {
        assert!(matches!(parse_config("api_key = "), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/observer.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
