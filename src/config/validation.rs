//! Configuration validation.

use crate::config::{Config, Strategy};
use std::collections::HashSet;

/// Validate the configuration.
///
/// Checks for:
/// - At least one application, each with a name and at least one matcher
/// - Unique `host:port` per application
/// - Upstream weights of at least 1
/// - Health-check paths starting with `/`
/// - No reserved strategy
pub fn validate_config(config: &Config) -> Result<(), String> {
    let mut errors = Vec::new();

    if config.applications.is_empty() {
        errors.push("at least one application must be defined".to_string());
    }

    for application in &config.applications {
        if application.name.is_empty() {
            errors.push("application name cannot be empty".to_string());
        }

        if application.matchers.is_empty() {
            errors.push(format!(
                "application '{}' has no matchers and would never receive traffic",
                application.name
            ));
        }

        if application.balancer.strategy == Strategy::IpHash {
            errors.push(format!(
                "application '{}': strategy 'ip_hash' is reserved and not yet available",
                application.name
            ));
        }

        if !application.balancer.health_check.path.starts_with('/') {
            errors.push(format!(
                "application '{}': health check path '{}' must start with '/'",
                application.name, application.balancer.health_check.path
            ));
        }

        let mut hostnames = HashSet::new();
        for upstream in &application.upstreams {
            let hostname = format!("{}:{}", upstream.host, upstream.port);

            if !hostnames.insert(hostname.clone()) {
                errors.push(format!(
                    "application '{}': duplicate upstream '{}'",
                    application.name, hostname
                ));
            }

            if upstream.weight == 0 {
                errors.push(format!(
                    "application '{}': upstream '{}' weight must be at least 1",
                    application.name, hostname
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.join("; "))
    }
}
