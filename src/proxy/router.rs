//! Fan-in across registered applications.

use crate::balancer::{BalancerConfig, ServiceBalancer};
use crate::client::{full_body, HttpClient, ProxyBody};
use crate::config::Config;
use crate::matcher::{self, MatcherError};
use crate::proxy::Application;
use hyper::{Request, Response, StatusCode};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, info};

/// Routes each request to the first application whose matchers accept it.
#[derive(Debug)]
pub struct ProxyRouter {
    applications: Vec<Arc<Application>>,
}

impl ProxyRouter {
    pub fn new() -> Self {
        Self {
            applications: Vec::new(),
        }
    }

    /// Build a router from configuration, registering every configured
    /// upstream. Probing starts as part of registration.
    pub async fn from_config(
        config: &Config,
        client: Arc<dyn HttpClient>,
    ) -> Result<Self, MatcherError> {
        let mut router = ProxyRouter::new();

        for app_config in &config.applications {
            let matchers = matcher::build_matchers(&app_config.matchers)?;

            let balancer_config = BalancerConfig {
                health_check: crate::balancer::HealthCheckConfig {
                    path: app_config.balancer.health_check.path.clone(),
                    interval: app_config.balancer.health_check.interval,
                },
                upstream_resolution_timeout: app_config.balancer.upstream_resolution_timeout,
                upstream_request_timeout: app_config.balancer.upstream_request_timeout,
                strategy: app_config.balancer.strategy.clone(),
            };
            let balancer = ServiceBalancer::new(balancer_config, Arc::clone(&client));

            for upstream in &app_config.upstreams {
                balancer
                    .register_service(&upstream.host, upstream.port, upstream.weight)
                    .await;
            }

            router.map_application(Application::new(&app_config.name, matchers, balancer));
        }

        Ok(router)
    }

    /// Register an application. Requests scan applications in registration
    /// order; the first match wins.
    pub fn map_application(&mut self, application: Application) -> Arc<Application> {
        let application = Arc::new(application);
        self.applications.push(Arc::clone(&application));
        info!(application = %application.name(), "application mapped");
        application
    }

    pub fn applications(&self) -> &[Arc<Application>] {
        &self.applications
    }

    /// Route one request.
    pub async fn route(
        &self,
        req: Request<ProxyBody>,
        client_addr: SocketAddr,
    ) -> Response<ProxyBody> {
        let (parts, body) = req.into_parts();

        let Some(application) = self.applications.iter().find(|app| app.accepts(&parts)) else {
            info!(path = %parts.uri.path(), "no matching application found");
            return not_found_response();
        };

        debug!(application = %application.name(), "application matched");
        application
            .handle(Request::from_parts(parts, body), client_addr)
            .await
    }

    /// Stop every application's probe tasks.
    pub async fn shutdown(&self) {
        for application in &self.applications {
            application.balancer().shutdown().await;
        }
    }
}

impl Default for ProxyRouter {
    fn default() -> Self {
        Self::new()
    }
}

fn not_found_response() -> Response<ProxyBody> {
    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("content-type", "text/plain")
        .body(full_body("no matching application found"))
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::FakeClient;
    use crate::client::empty_body;
    use crate::config::{
        ApplicationConfig, BalancerSettings, GlobalConfig, MatcherConfig, UpstreamConfig,
    };
    use crate::matcher::PathPrefixMatcher;
    use http_body_util::BodyExt;

    fn addr() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    fn app_with_prefix(name: &str, prefix: &str) -> Application {
        let balancer = ServiceBalancer::new(
            crate::balancer::BalancerConfig::default(),
            Arc::new(FakeClient::healthy()),
        );
        Application::new(
            name,
            vec![Box::new(PathPrefixMatcher::new(prefix).unwrap())],
            balancer,
        )
    }

    #[tokio::test]
    async fn test_unmatched_request_is_not_found() {
        let mut router = ProxyRouter::new();
        router.map_application(app_with_prefix("api", "/simple-query"));

        let req = Request::builder()
            .uri("http://localhost/x")
            .body(empty_body())
            .unwrap();

        let response = router.route(req, addr()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body, bytes::Bytes::from("no matching application found"));
    }

    #[tokio::test]
    async fn test_first_registered_application_wins() {
        let mut router = ProxyRouter::new();
        let first = router.map_application(app_with_prefix("first", "/shared"));
        router.map_application(app_with_prefix("second", "/shared"));

        let req = Request::builder()
            .uri("http://localhost/shared/path")
            .body(empty_body())
            .unwrap();
        let (parts, _) = req.into_parts();

        let selected = router
            .applications()
            .iter()
            .find(|app| app.accepts(&parts))
            .unwrap();
        assert_eq!(selected.name(), first.name());
    }

    #[tokio::test]
    async fn test_from_config_builds_applications_and_upstreams() {
        let config = Config {
            global: GlobalConfig::default(),
            listen: "127.0.0.1:8080".parse().unwrap(),
            applications: vec![ApplicationConfig {
                name: "api".to_string(),
                matchers: vec![MatcherConfig::PathPrefix("/api".to_string())],
                balancer: BalancerSettings::default(),
                upstreams: vec![
                    UpstreamConfig {
                        host: "127.0.0.1".to_string(),
                        port: 9001,
                        weight: 1,
                    },
                    UpstreamConfig {
                        host: "127.0.0.1".to_string(),
                        port: 9002,
                        weight: 2,
                    },
                ],
            }],
        };

        let router = ProxyRouter::from_config(&config, Arc::new(FakeClient::healthy()))
            .await
            .unwrap();

        assert_eq!(router.applications().len(), 1);
        let upstreams = router.applications()[0].balancer().upstreams().await;
        assert_eq!(upstreams.len(), 2);
        assert_eq!(upstreams[1].weight(), 2);

        router.shutdown().await;
    }

    #[tokio::test]
    async fn test_from_config_rejects_bad_pattern() {
        let config = Config {
            global: GlobalConfig::default(),
            listen: "127.0.0.1:8080".parse().unwrap(),
            applications: vec![ApplicationConfig {
                name: "api".to_string(),
                matchers: vec![MatcherConfig::PathPrefix("[broken".to_string())],
                balancer: BalancerSettings::default(),
                upstreams: Vec::new(),
            }],
        };

        let err = ProxyRouter::from_config(&config, Arc::new(FakeClient::healthy()))
            .await
            .unwrap_err();
        assert!(matches!(err, MatcherError::InvalidPattern { .. }));
    }
}
