//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::RelayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `downstream.api_key`.
pub const ENV_API_KEY: &str = "RELAY_API_KEY";
/// Environment variable overriding `downstream.url`.
pub const ENV_DOWNSTREAM_URL: &str = "RELAY_DOWNSTREAM_URL";
/// Environment variable overriding `listener.bind_address`.
pub const ENV_BIND_ADDRESS: &str = "RELAY_BIND_ADDRESS";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, apply environment
/// overrides and validate the result.
pub fn load_config(path: Option<&Path>) -> Result<RelayConfig, ConfigError> {
    let config = match path {
        Some(path) => parse_config(&fs::read_to_string(path)?)?,
        None => RelayConfig::default(),
    };

    let config = apply_env_overrides(config, |name| std::env::var(name).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Parse a TOML document into a config without validating it.
pub fn parse_config(content: &str) -> Result<RelayConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Override file values with whatever `lookup` returns for the relay's
/// environment variables. Empty values are ignored.
pub fn apply_env_overrides<F>(mut config: RelayConfig, lookup: F) -> RelayConfig
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|value| !value.is_empty());

    if let Some(api_key) = get(ENV_API_KEY) {
        config.downstream.api_key = api_key;
    }
    if let Some(url) = get(ENV_DOWNSTREAM_URL) {
        config.downstream.url = url;
    }
    if let Some(bind_address) = get(ENV_BIND_ADDRESS) {
        config.listener.bind_address = bind_address;
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::LogFormat;
    use std::collections::HashMap;

    #[test]
    fn test_parse_partial_file_keeps_defaults() {
        let config = parse_config(
            r#"
            [downstream]
            api_key = "from-file"

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.downstream.api_key, "from-file");
        assert_eq!(config.downstream.url, "http://localhost:5000/generate");
        assert_eq!(config.listener.relay_path, "/generate");
        assert_eq!(config.observability.log_format, LogFormat::Json);
    }

    #[test]
    fn test_parse_rejects_bad_toml() {
        let err = parse_config("[downstream\napi_key = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_env_overrides_file_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_API_KEY, "from-env"),
            (ENV_DOWNSTREAM_URL, "http://127.0.0.1:7000/generate"),
            (ENV_BIND_ADDRESS, ""),
        ]);
        let mut config = RelayConfig::default();
        config.downstream.api_key = "from-file".into();

        let config = apply_env_overrides(config, |name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.downstream.api_key, "from-env");
        assert_eq!(config.downstream.url, "http://127.0.0.1:7000/generate");
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = load_config(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_validation_error_lists_every_problem() {
        let err = ConfigError::Validation(vec![
            ValidationError::MissingApiKey,
            ValidationError::ZeroBodyLimit,
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: downstream.api_key must be set, limits.max_body_bytes must be greater than zero"
        );
    }
}
