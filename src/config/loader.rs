//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: GatewayConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_partial_toml_with_defaults() {
        let toml = r#"
            [upstream]
            base_url = "http://products.internal:8080"
            request_timeout_ms = 1500

            [breaker]
            window_size = 20
            minimum_calls = 20
        "#;
        let config: GatewayConfig = toml::from_str(toml).unwrap();

        assert_eq!(config.upstream.base_url, "http://products.internal:8080");
        assert_eq!(config.upstream.request_timeout_ms, 1500);
        assert_eq!(config.upstream.detail_concurrency, 10);
        assert_eq!(config.breaker.window_size, 20);
        assert_eq!(config.cache.similar.max_entries, 500);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let toml = r#"
            [cache]
            sweep_interval_secs = 0
        "#;
        let config: GatewayConfig = toml::from_str(toml).unwrap();
        assert!(validate_config(&config).is_err());
    }
}
