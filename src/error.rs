//! Gateway failure taxonomy.
//!
//! Every failure surfaced while forwarding a request carries one of these
//! kinds; the application handler maps the kind to the client-facing status
//! code and writes the error text as the body.

use hyper::StatusCode;
use thiserror::Error;

/// Typed gateway failure.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The balancer has no upstream capable of serving the request.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Election deadline elapsed or the upstream round-trip failed at the
    /// transport level.
    #[error("bad gateway: {0}")]
    BadGateway(String),

    /// The upstream round-trip exceeded the request timeout.
    #[error("gateway timeout: {0}")]
    GatewayTimeout(String),

    /// Unregistration targeted a hostname the balancer does not know.
    #[error("upstream '{0}' not found")]
    UpstreamNotFound(String),

    /// Rewrite failure or any unclassified error.
    #[error("internal proxy error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Client-facing status code for this failure.
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            GatewayError::GatewayTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::UpstreamNotFound(_) | GatewayError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
