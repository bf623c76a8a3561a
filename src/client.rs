//! HTTP request executor shared by request forwarding and health probes.
//!
//! The balancer never talks to the network directly; it goes through the
//! [`HttpClient`] trait so tests can substitute a programmable fake.

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Empty, Full};
use hyper::{Request, Response};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use std::time::Duration;
use thiserror::Error;

/// Body type flowing through the proxy in both directions.
pub type ProxyBody = BoxBody<Bytes, hyper::Error>;

/// An empty streaming body.
pub fn empty_body() -> ProxyBody {
    Empty::<Bytes>::new().map_err(|never| match never {}).boxed()
}

/// A body backed by in-memory bytes.
pub fn full_body(bytes: impl Into<Bytes>) -> ProxyBody {
    Full::new(bytes.into()).map_err(|never| match never {}).boxed()
}

/// Transport-level failure while reaching an upstream.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ClientError {
    message: String,
}

impl ClientError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Request executor the balancer forwards through.
#[async_trait]
pub trait HttpClient: Send + Sync + std::fmt::Debug {
    /// Perform one HTTP round-trip.
    async fn execute(&self, req: Request<ProxyBody>) -> Result<Response<ProxyBody>, ClientError>;
}

/// Production executor over a pooled hyper client.
#[derive(Debug)]
pub struct HyperClient {
    client: Client<HttpConnector, ProxyBody>,
}

impl HyperClient {
    /// Create a client with the given backend connect timeout.
    pub fn new(connect_timeout: Duration) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(connect_timeout));
        connector.set_nodelay(true);

        let client = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(Duration::from_secs(30))
            .build(connector);

        Self { client }
    }
}

impl Default for HyperClient {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

#[async_trait]
impl HttpClient for HyperClient {
    async fn execute(&self, req: Request<ProxyBody>) -> Result<Response<ProxyBody>, ClientError> {
        let response = self
            .client
            .request(req)
            .await
            .map_err(|e| ClientError::new(e.to_string()))?;

        Ok(response.map(|body| body.boxed()))
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn test_full_body_round_trip() {
        let body = full_body("hello");
        let collected = body.collect().await.unwrap().to_bytes();
        assert_eq!(collected, Bytes::from("hello"));
    }

    #[tokio::test]
    async fn test_empty_body_is_empty() {
        let body = empty_body();
        let collected = body.collect().await.unwrap().to_bytes();
        assert!(collected.is_empty());
    }
}
