//! Configuration file loading.

use crate::config::{validate_config, Config};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("configuration validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a YAML file.
///
/// Reads the file, parses the YAML, and validates the result.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path.as_ref())?;

    let config: Config = serde_yaml::from_str(&contents)?;

    validate_config(&config).map_err(ConfigError::ValidationError)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_minimal_config() {
        let yaml = r#"
applications:
  - name: api
    matchers:
      - path_prefix: /api
    upstreams:
      - host: 127.0.0.1
        port: 9001
"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.applications.len(), 1);
        assert_eq!(config.applications[0].name, "api");
        assert_eq!(config.applications[0].upstreams.len(), 1);
    }

    #[test]
    fn test_load_full_config() {
        let yaml = r#"
global:
  log_level: debug
  log_format: pretty

listen: "127.0.0.1:8088"

applications:
  - name: api
    matchers:
      - path_prefix: /api
      - methods: [GET, POST]
    balancer:
      strategy: weighted_round_robin
      health_check:
        path: /health
        interval: 2s
      upstream_resolution_timeout: 1s
      upstream_request_timeout: 10s
    upstreams:
      - host: 127.0.0.1
        port: 9001
        weight: 5
      - host: 127.0.0.1
        port: 9002
        weight: 2
"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.global.log_level, "debug");
        assert_eq!(config.listen, "127.0.0.1:8088".parse().unwrap());
        assert_eq!(config.applications[0].upstreams[0].weight, 5);
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_config("/nonexistent/path/config.yaml");
        assert!(matches!(result.unwrap_err(), ConfigError::ReadError(_)));
    }

    #[test]
    fn test_load_invalid_yaml() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"not: valid: yaml: {{{}}}").unwrap();

        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::ParseError(_)));
    }

    #[test]
    fn test_load_rejects_invalid_config() {
        // No applications defined.
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"applications: []").unwrap();

        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::ValidationError(_)));
    }
}
