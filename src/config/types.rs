//! Configuration data types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Global settings
    #[serde(default)]
    pub global: GlobalConfig,

    /// Address and port the proxy listens on
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,

    /// Application definitions, scanned in declaration order
    #[serde(default)]
    pub applications: Vec<ApplicationConfig>,
}

/// Global configuration settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GlobalConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format: json or pretty
    #[serde(default)]
    pub log_format: LogFormat,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::Json,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

/// One routed application: matchers plus a balanced upstream pool.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApplicationConfig {
    /// Application name, used for log scoping
    pub name: String,

    /// Matcher rules; the application accepts a request when any one matches
    #[serde(default)]
    pub matchers: Vec<MatcherConfig>,

    /// Balancer settings for this application
    #[serde(default)]
    pub balancer: BalancerSettings,

    /// Upstream instances registered at startup
    #[serde(default)]
    pub upstreams: Vec<UpstreamConfig>,
}

/// One matcher rule.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatcherConfig {
    /// Anchored path prefix, regex syntax honoured
    PathPrefix(String),

    /// Exact method membership
    Methods(Vec<String>),

    /// All listed headers must be present and match their pattern
    Headers(HashMap<String, String>),

    /// All listed query parameters must be present and match their pattern
    QueryParams(HashMap<String, String>),
}

/// Balancer settings for one application.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BalancerSettings {
    /// Election strategy
    #[serde(default)]
    pub strategy: Strategy,

    /// Health probing settings
    #[serde(default)]
    pub health_check: HealthCheckSettings,

    /// Upper bound on the time spent electing an upstream per request
    #[serde(default = "default_resolution_timeout", with = "humantime_serde")]
    pub upstream_resolution_timeout: Duration,

    /// Upper bound on the forwarded round-trip
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub upstream_request_timeout: Duration,
}

impl Default for BalancerSettings {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            health_check: HealthCheckSettings::default(),
            upstream_resolution_timeout: default_resolution_timeout(),
            upstream_request_timeout: default_request_timeout(),
        }
    }
}

/// Upstream election strategy.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    #[default]
    RoundRobin,
    WeightedRoundRobin,
    InterleavedRoundRobin,
    /// Reserved; rejected by validation
    IpHash,
}

/// Health probing settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HealthCheckSettings {
    /// Path probed on each upstream
    #[serde(default = "default_health_path")]
    pub path: String,

    /// How often to probe
    #[serde(default = "default_health_interval", with = "humantime_serde")]
    pub interval: Duration,
}

impl Default for HealthCheckSettings {
    fn default() -> Self {
        Self {
            path: default_health_path(),
            interval: default_health_interval(),
        }
    }
}

/// One upstream instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// Host name or address
    pub host: String,

    /// Port
    pub port: u16,

    /// Weight for the weighted strategies (default: 1)
    #[serde(default = "default_weight")]
    pub weight: u32,
}

// Default value functions
fn default_listen() -> SocketAddr {
    "127.0.0.1:8080".parse().unwrap()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_health_path() -> String {
    "/healthz".to_string()
}

fn default_health_interval() -> Duration {
    Duration::from_secs(10)
}

fn default_resolution_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_weight() -> u32 {
    1
}

/// Custom serde module for humantime durations.
mod humantime_serde {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = humantime::format_duration(*duration).to_string();
        serializer.serialize_str(&s)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_serde() {
        let strategy: Strategy = serde_yaml::from_str("round_robin").unwrap();
        assert_eq!(strategy, Strategy::RoundRobin);

        let strategy: Strategy = serde_yaml::from_str("weighted_round_robin").unwrap();
        assert_eq!(strategy, Strategy::WeightedRoundRobin);

        let strategy: Strategy = serde_yaml::from_str("interleaved_round_robin").unwrap();
        assert_eq!(strategy, Strategy::InterleavedRoundRobin);
    }

    #[test]
    fn test_matcher_config_yaml_shapes() {
        let yaml = r#"
- path_prefix: /api
- methods: [GET, POST]
- headers:
    X-Api-Version: "^2"
- query_params:
    tenant: "^[a-z]+$"
"#;

        let matchers: Vec<MatcherConfig> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(matchers.len(), 4);
        assert!(matches!(&matchers[0], MatcherConfig::PathPrefix(p) if p == "/api"));
        assert!(matches!(&matchers[1], MatcherConfig::Methods(m) if m.len() == 2));
    }

    #[test]
    fn test_balancer_defaults() {
        let settings = BalancerSettings::default();
        assert_eq!(settings.strategy, Strategy::RoundRobin);
        assert_eq!(settings.health_check.path, "/healthz");
        assert_eq!(settings.health_check.interval, Duration::from_secs(10));
        assert_eq!(settings.upstream_resolution_timeout, Duration::from_secs(5));
        assert_eq!(settings.upstream_request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_duration_humantime_format() {
        let settings: HealthCheckSettings =
            serde_yaml::from_str("{ path: /health, interval: 250ms }").unwrap();
        assert_eq!(settings.interval, Duration::from_millis(250));
    }
}
