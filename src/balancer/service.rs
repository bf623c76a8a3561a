//! Service balancer.
//!
//! Owns an ordered set of upstreams, drives their health probes, elects one
//! per request under a bounded deadline and performs the forwarded
//! round-trip.

use crate::balancer::strategy::{self, Strategy};
use crate::balancer::upstream::{HealthCheckConfig, Upstream};
use crate::client::{HttpClient, ProxyBody};
use crate::config::Strategy as StrategyKind;
use crate::error::GatewayError;
use crate::proxy::forwarder;
use hyper::{Request, Response};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Pause between election passes while every scheduled candidate is down.
const ELECTION_RETRY_DELAY: Duration = Duration::from_millis(10);

/// Balancer settings, constant after construction.
#[derive(Debug, Clone)]
pub struct BalancerConfig {
    pub health_check: HealthCheckConfig,
    pub upstream_resolution_timeout: Duration,
    pub upstream_request_timeout: Duration,
    pub strategy: StrategyKind,
}

impl Default for BalancerConfig {
    fn default() -> Self {
        Self {
            health_check: HealthCheckConfig::default(),
            upstream_resolution_timeout: Duration::from_secs(5),
            upstream_request_timeout: Duration::from_secs(30),
            strategy: StrategyKind::RoundRobin,
        }
    }
}

/// Balances one application's traffic across its registered upstreams.
#[derive(Debug)]
pub struct ServiceBalancer {
    config: BalancerConfig,
    client: Arc<dyn HttpClient>,
    strategy: Box<dyn Strategy>,
    upstreams: RwLock<Vec<Arc<Upstream>>>,
}

impl ServiceBalancer {
    /// Create a balancer forwarding through `client`. The client is shared
    /// with every probe task.
    pub fn new(config: BalancerConfig, client: Arc<dyn HttpClient>) -> Self {
        let strategy = strategy::for_kind(&config.strategy);

        Self {
            config,
            client,
            strategy,
            upstreams: RwLock::new(Vec::new()),
        }
    }

    /// Append an upstream and start probing it. The upstream reports
    /// unavailable until its first probe succeeds.
    pub async fn register_service(&self, host: &str, port: u16, weight: u32) -> Arc<Upstream> {
        let upstream = Upstream::new(host, port, weight);

        info!(upstream = %upstream.hostname(), weight, "registering upstream");
        upstream
            .start(Arc::clone(&self.client), &self.config.health_check)
            .await;
        self.upstreams.write().await.push(Arc::clone(&upstream));
        info!(upstream = %upstream.hostname(), "upstream registered");

        upstream
    }

    /// Stop probing `hostname` and drop it from the pool.
    ///
    /// Blocks until the probe task has exited; only then is the upstream
    /// removed, so an election never observes a half-dismantled entry.
    pub async fn unregister_service(&self, hostname: &str) -> Result<(), GatewayError> {
        info!(upstream = hostname, "unregistering upstream");

        let upstream = {
            let upstreams = self.upstreams.read().await;
            upstreams
                .iter()
                .find(|u| u.hostname() == hostname)
                .map(Arc::clone)
        }
        .ok_or_else(|| GatewayError::UpstreamNotFound(hostname.to_string()))?;

        upstream.stop().await;
        self.upstreams
            .write()
            .await
            .retain(|u| u.hostname() != hostname);

        info!(upstream = hostname, "upstream unregistered");
        Ok(())
    }

    /// Snapshot of the registered upstreams in registration order.
    pub async fn upstreams(&self) -> Vec<Arc<Upstream>> {
        self.upstreams.read().await.clone()
    }

    /// Elect one available upstream, bounded by the resolution timeout.
    ///
    /// The strategy is polled until it yields a candidate; an empty pool
    /// fails immediately. Callers with a tighter deadline bound the whole
    /// call by dropping the future.
    pub async fn get_available_service(&self) -> Result<Arc<Upstream>, GatewayError> {
        debug!("electing an available upstream");

        match timeout(
            self.config.upstream_resolution_timeout,
            self.election_loop(),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(GatewayError::BadGateway(
                "upstream resolution timed out".to_string(),
            )),
        }
    }

    async fn election_loop(&self) -> Result<Arc<Upstream>, GatewayError> {
        loop {
            let snapshot = self.upstreams.read().await.clone();

            if snapshot.is_empty() {
                return Err(GatewayError::BadGateway(
                    "no upstream registered".to_string(),
                ));
            }

            if let Some(upstream) = self.strategy.elect(&snapshot) {
                debug!(upstream = %upstream.hostname(), "available upstream elected");
                return Ok(upstream);
            }

            tokio::time::sleep(ELECTION_RETRY_DELAY).await;
        }
    }

    /// Forward one request to an elected upstream.
    ///
    /// No retries: a request rides exactly one upstream. Gateway-class
    /// statuses from the upstream are logged and passed through so the body
    /// still reaches the caller.
    pub async fn handle_request(
        &self,
        req: Request<ProxyBody>,
        client_addr: SocketAddr,
    ) -> Result<Response<ProxyBody>, GatewayError> {
        let upstream = self.get_available_service().await?;

        let forwarded = forwarder::forwarded_request(req, upstream.hostname(), client_addr)
            .map_err(|e| {
                GatewayError::Internal(format!("failed to build forwarded request: {e}"))
            })?;

        info!(upstream = %upstream.hostname(), "forwarding request to upstream");
        let response = match timeout(
            self.config.upstream_request_timeout,
            self.client.execute(forwarded),
        )
        .await
        {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return Err(GatewayError::BadGateway(e.to_string())),
            Err(_) => {
                return Err(GatewayError::GatewayTimeout(
                    "upstream request timed out".to_string(),
                ))
            }
        };

        if matches!(response.status().as_u16(), 502 | 503 | 504) {
            // Extension point: mark the upstream unavailable for a cooldown
            // when it answers with a gateway-class status.
            warn!(
                upstream = %upstream.hostname(),
                status = %response.status(),
                "upstream returned a gateway-class status"
            );
        }

        Ok(response)
    }

    /// Stop every probe task and empty the pool.
    pub async fn shutdown(&self) {
        let drained: Vec<Arc<Upstream>> = self.upstreams.write().await.drain(..).collect();

        for upstream in drained {
            upstream.stop().await;
        }
    }
}
