//! A named bundle of matchers and a service balancer.

use crate::balancer::ServiceBalancer;
use crate::client::{full_body, ProxyBody};
use crate::error::GatewayError;
use crate::matcher::Matcher;
use crate::proxy::response;
use hyper::http::request::Parts;
use hyper::{Request, Response};
use std::net::SocketAddr;
use tracing::{instrument, warn};

/// One routed application.
#[derive(Debug)]
pub struct Application {
    name: String,
    matchers: Vec<Box<dyn Matcher>>,
    balancer: ServiceBalancer,
}

impl Application {
    pub fn new(
        name: impl Into<String>,
        matchers: Vec<Box<dyn Matcher>>,
        balancer: ServiceBalancer,
    ) -> Self {
        Self {
            name: name.into(),
            matchers,
            balancer,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn balancer(&self) -> &ServiceBalancer {
        &self.balancer
    }

    /// An application accepts a request when any one of its matchers does.
    pub fn accepts(&self, req: &Parts) -> bool {
        self.matchers.iter().any(|matcher| matcher.matches(req))
    }

    /// Forward the request through the balancer and sanitise the result.
    /// Failures become the mapped status code with the error text as body.
    #[instrument(skip_all, fields(application = %self.name))]
    pub async fn handle(
        &self,
        req: Request<ProxyBody>,
        client_addr: SocketAddr,
    ) -> Response<ProxyBody> {
        match self.balancer.handle_request(req, client_addr).await {
            Ok(upstream_response) => response::sanitized_response(upstream_response),
            Err(e) => {
                warn!(error = %e, "request handling failed");
                error_response(e)
            }
        }
    }
}

fn error_response(error: GatewayError) -> Response<ProxyBody> {
    Response::builder()
        .status(error.status())
        .header("content-type", "text/plain")
        .body(full_body(error.to_string()))
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balancer::BalancerConfig;
    use crate::client::testing::FakeClient;
    use crate::matcher::{MethodMatcher, PathPrefixMatcher};
    use crate::matcher::request_parts;
    use hyper::StatusCode;
    use std::sync::Arc;

    fn test_application(matchers: Vec<Box<dyn Matcher>>) -> Application {
        let balancer = ServiceBalancer::new(
            BalancerConfig::default(),
            Arc::new(FakeClient::healthy()),
        );
        Application::new("test-app", matchers, balancer)
    }

    #[test]
    fn test_accepts_when_any_matcher_matches() {
        let app = test_application(vec![
            Box::new(PathPrefixMatcher::new("/simple-query").unwrap()),
            Box::new(MethodMatcher::new(vec!["POST".to_string()])),
        ]);

        // Path matches even though the method does not.
        assert!(app.accepts(&request_parts("GET", "http://localhost/simple-query")));
        // Method matches even though the path does not.
        assert!(app.accepts(&request_parts("POST", "http://localhost/another-query")));
        // Neither matches.
        assert!(!app.accepts(&request_parts("GET", "http://localhost/another-query")));
    }

    #[test]
    fn test_rejects_with_no_matchers() {
        let app = test_application(Vec::new());
        assert!(!app.accepts(&request_parts("GET", "http://localhost/")));
    }

    #[test]
    fn test_error_response_carries_status_and_message() {
        let response = error_response(GatewayError::BadGateway("no upstream".to_string()));
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let response = error_response(GatewayError::GatewayTimeout("too slow".to_string()));
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);

        let response = error_response(GatewayError::Internal("bad rewrite".to_string()));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
