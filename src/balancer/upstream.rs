//! One backend instance and its health-probe task.

use crate::client::{empty_body, HttpClient};
use hyper::{Method, Request};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Health probing settings for one balancer, constant after construction.
#[derive(Debug, Clone)]
pub struct HealthCheckConfig {
    /// Path probed on each upstream.
    pub path: String,
    /// Probe period.
    pub interval: Duration,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            path: "/healthz".to_string(),
            interval: Duration::from_secs(10),
        }
    }
}

/// One backend instance addressable by `host:port`.
///
/// Availability starts out false and is flipped by the probe task on every
/// probe outcome. The flag is written only by the probe task; elections read
/// it concurrently and may observe a value one probe behind.
#[derive(Debug)]
pub struct Upstream {
    host: String,
    port: u16,
    hostname: String,
    weight: u32,
    available: AtomicBool,
    shutdown: watch::Sender<bool>,
    probe: Mutex<Option<JoinHandle<()>>>,
}

impl Upstream {
    pub(crate) fn new(host: &str, port: u16, weight: u32) -> Arc<Self> {
        let (shutdown, _) = watch::channel(false);

        Arc::new(Self {
            host: host.to_string(),
            port,
            hostname: format!("{host}:{port}"),
            weight,
            available: AtomicBool::new(false),
            shutdown,
            probe: Mutex::new(None),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// `host:port`, unique within a balancer.
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn weight(&self) -> u32 {
        self.weight
    }

    /// Did the most recent probe succeed?
    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::Acquire)
    }

    pub(crate) fn set_available(&self, up: bool) {
        self.available.store(up, Ordering::Release);
    }

    /// Start the periodic health probe. Runs until [`Upstream::stop`].
    pub(crate) async fn start(self: &Arc<Self>, client: Arc<dyn HttpClient>, config: &HealthCheckConfig) {
        let upstream = Arc::clone(self);
        let mut shutdown = self.shutdown.subscribe();
        let interval = config.interval;
        let path = config.path.clone();

        let handle = tokio::spawn(async move {
            info!(upstream = %upstream.hostname, "health probe starting");

            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let up = upstream.probe_once(client.as_ref(), &path).await;

                        if up && !upstream.is_available() {
                            info!(upstream = %upstream.hostname, "upstream is up");
                        } else if !up && upstream.is_available() {
                            warn!(upstream = %upstream.hostname, "upstream is down");
                        }

                        upstream.set_available(up);
                    }

                    _ = shutdown.changed() => {
                        info!(upstream = %upstream.hostname, "health probe stopping");
                        upstream.set_available(false);
                        return;
                    }
                }
            }
        });

        *self.probe.lock().await = Some(handle);
    }

    /// Issue one probe. Success means no transport error and a status below
    /// 400.
    async fn probe_once(&self, client: &dyn HttpClient, path: &str) -> bool {
        let url = format!("http://{}{}", self.hostname, path);

        let request = match Request::builder()
            .method(Method::GET)
            .uri(&url)
            .body(empty_body())
        {
            Ok(request) => request,
            Err(e) => {
                warn!(upstream = %self.hostname, error = %e, "failed to build probe request");
                return false;
            }
        };

        match client.execute(request).await {
            Ok(response) => response.status().as_u16() < 400,
            Err(e) => {
                debug!(upstream = %self.hostname, error = %e, "health probe failed");
                false
            }
        }
    }

    /// Signal the probe task and wait for it to exit. The upstream reports
    /// unavailable from the moment the signal is handled.
    pub(crate) async fn stop(&self) {
        let _ = self.shutdown.send(true);

        if let Some(handle) = self.probe.lock().await.take() {
            if let Err(e) = handle.await {
                warn!(upstream = %self.hostname, error = %e, "health probe task failed");
            }
        }
    }
}
