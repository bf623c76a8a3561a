//! Graceful shutdown handling.

use tokio::sync::broadcast;
use tracing::{error, info};

/// Fan-out shutdown notification for long-running tasks.
#[derive(Clone)]
pub struct ShutdownSignal {
    sender: broadcast::Sender<()>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self { sender }
    }

    /// Subscribe to shutdown notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.sender.subscribe()
    }

    /// Trigger shutdown.
    pub fn shutdown(&self) {
        let _ = self.sender.send(());
    }

    /// Trigger shutdown when the process receives Ctrl-C.
    pub fn shutdown_on_ctrl_c(&self) {
        let sender = self.sender.clone();

        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("received shutdown signal");
                }
                Err(e) => {
                    error!(error = %e, "failed to listen for shutdown signal");
                }
            }
            let _ = sender.send(());
        });
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}
