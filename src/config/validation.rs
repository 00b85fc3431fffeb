//! Configuration validation.
//!
//! Semantic checks only; serde already handled the syntax. Every problem is
//! reported, not just the first one.

use std::net::SocketAddr;

use axum::http::HeaderValue;
use thiserror::Error;
use url::Url;

use crate::config::schema::RelayConfig;

/// Path served by the health endpoint; the relay cannot share it.
pub const HEALTH_PATH: &str = "/health";

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("downstream.api_key must be set")]
    MissingApiKey,

    #[error("downstream.api_key is not a valid header value")]
    InvalidApiKey,

    #[error("downstream.url '{0}' is not a valid http(s) URL")]
    InvalidDownstreamUrl(String),

    #[error("listener.bind_address '{0}' is not a socket address")]
    InvalidBindAddress(String),

    #[error("listener.relay_path '{0}' must start with '/'")]
    InvalidRelayPath(String),

    #[error("listener.relay_path '{0}' is reserved")]
    ReservedRelayPath(String),

    #[error("limits.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,

    #[error("observability.metrics_address '{0}' is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Validate a loaded configuration.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.downstream.api_key.is_empty() {
        errors.push(ValidationError::MissingApiKey);
    } else if HeaderValue::from_str(&config.downstream.api_key).is_err() {
        errors.push(ValidationError::InvalidApiKey);
    }

    match Url::parse(&config.downstream.url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        _ => errors.push(ValidationError::InvalidDownstreamUrl(
            config.downstream.url.clone(),
        )),
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if !config.listener.relay_path.starts_with('/') {
        errors.push(ValidationError::InvalidRelayPath(
            config.listener.relay_path.clone(),
        ));
    }

    if config.listener.relay_path == HEALTH_PATH {
        errors.push(ValidationError::ReservedRelayPath(
            config.listener.relay_path.clone(),
        ));
    }

    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
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

    fn valid_config() -> RelayConfig {
        let mut config = RelayConfig::default();
        config.downstream.api_key = "secret".into();
        config
    }

    #[test]
    fn test_defaults_with_key_are_valid() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_default_config_requires_api_key() {
        let errors = validate_config(&RelayConfig::default()).unwrap_err();
        assert_eq!(errors, vec![ValidationError::MissingApiKey]);
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = valid_config();
        config.downstream.url = "ftp://localhost/generate".into();
        config.listener.relay_path = "generate".into();
        config.limits.max_body_bytes = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::ZeroBodyLimit));
    }

    #[test]
    fn test_relay_path_cannot_shadow_health() {
        let mut config = valid_config();
        config.listener.relay_path = HEALTH_PATH.into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::ReservedRelayPath("/health".into())]);
    }

    #[test]
    fn test_api_key_must_be_header_safe() {
        let mut config = valid_config();
        config.downstream.api_key = "line\nbreak".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::InvalidApiKey]);
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = valid_config();
        config.observability.metrics_address = "nowhere".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::InvalidMetricsAddress("nowhere".into())]
        );
    }

    #[test]
    fn test_error_display_does_not_leak_key() {
        let mut config = valid_config();
        config.downstream.api_key = "bad\u{7f}key".into();
        let errors = validate_config(&config).unwrap_err();
        assert!(!errors[0].to_string().contains("bad"));
    }
}
