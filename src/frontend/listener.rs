//! Client-facing HTTP listener.
//!
//! Accepts connections and serves each one through the proxy router.

use crate::proxy::ProxyRouter;
use crate::util::RequestId;
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Listener that accepts client connections for the proxy router.
pub struct ProxyListener {
    listener: TcpListener,
    router: Arc<ProxyRouter>,
}

impl ProxyListener {
    /// Bind the listening socket.
    pub async fn bind(addr: SocketAddr, router: Arc<ProxyRouter>) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;

        info!(
            listen = %addr,
            applications = router.applications().len(),
            "proxy listener bound"
        );

        Ok(Self { listener, router })
    }

    /// Actual bound address, useful with port 0.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until the shutdown signal fires.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        info!("proxy listener starting");

        loop {
            tokio::select! {
                accept_result = self.listener.accept() => {
                    match accept_result {
                        Ok((stream, client_addr)) => {
                            self.handle_connection(stream, client_addr);
                        }
                        Err(e) => {
                            error!(error = %e, "failed to accept connection");
                        }
                    }
                }

                _ = shutdown.recv() => {
                    info!("proxy listener shutting down");
                    break;
                }
            }
        }
    }

    /// Serve one client connection on its own task.
    fn handle_connection(&self, stream: TcpStream, client_addr: SocketAddr) {
        if let Err(e) = stream.set_nodelay(true) {
            warn!(error = %e, "failed to set TCP_NODELAY on client connection");
        }

        let router = Arc::clone(&self.router);
        let request_id = RequestId::short();

        tokio::spawn(async move {
            let io = TokioIo::new(stream);

            let service = service_fn(move |req: Request<Incoming>| {
                let router = Arc::clone(&router);
                async move {
                    let req = req.map(|body| body.boxed());
                    Ok::<_, Infallible>(router.route(req, client_addr).await)
                }
            });

            let result = http1::Builder::new()
                .keep_alive(true)
                .serve_connection(io, service)
                .await;

            if let Err(e) = result {
                debug!(
                    request_id = %request_id,
                    client = %client_addr,
                    error = %e,
                    "connection closed with error"
                );
            }
        });
    }
}
