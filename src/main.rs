//! rustgate - a layer-7 reverse proxy with health-checked upstream balancing
//!
//! Usage:
//!     rustgate --config <path>
//!
//! See --help for more options.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use rustgate::client::HyperClient;
use rustgate::config::{load_config, Config};
use rustgate::frontend::ProxyListener;
use rustgate::proxy::ProxyRouter;
use rustgate::util::{init_logging, ShutdownSignal};

/// A layer-7 reverse proxy with health-checked upstream balancing.
#[derive(Parser, Debug)]
#[command(name = "rustgate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,

    /// Override log level (trace, debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Validate configuration and exit
    #[arg(long)]
    validate: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli.config).with_context(|| {
        format!(
            "failed to load configuration from '{}'",
            cli.config.display()
        )
    })?;

    init_logging(&config.global, cli.log_level.as_deref());

    if cli.validate {
        println!("Configuration is valid.");
        println!("  Listen: {}", config.listen);
        println!("  Applications: {}", config.applications.len());
        for application in &config.applications {
            println!(
                "    - {} ({:?}, {} matcher(s), {} upstream(s))",
                application.name,
                application.balancer.strategy,
                application.matchers.len(),
                application.upstreams.len()
            );
        }
        return Ok(());
    }

    info!(
        config_path = %cli.config.display(),
        listen = %config.listen,
        applications = config.applications.len(),
        "rustgate starting"
    );

    for application in &config.applications {
        info!(
            name = %application.name,
            strategy = ?application.balancer.strategy,
            matchers = application.matchers.len(),
            upstreams = application.upstreams.len(),
            "configured application"
        );
    }

    run(config)
}

/// Run the proxy with the given configuration.
fn run(config: Config) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    runtime.block_on(async { run_async(config).await })
}

/// Async entry point for the proxy.
async fn run_async(config: Config) -> Result<()> {
    let client = Arc::new(HyperClient::new(Duration::from_secs(10)));

    let router = Arc::new(
        ProxyRouter::from_config(&config, client)
            .await
            .context("failed to build proxy router")?,
    );

    let listener = ProxyListener::bind(config.listen, Arc::clone(&router))
        .await
        .with_context(|| format!("failed to bind '{}'", config.listen))?;

    let shutdown = ShutdownSignal::new();
    let listener_task = tokio::spawn(listener.run(shutdown.subscribe()));

    info!("rustgate is running");
    info!("press Ctrl+C to stop");

    let mut shutdown_rx = shutdown.subscribe();
    shutdown.shutdown_on_ctrl_c();
    let _ = shutdown_rx.recv().await;

    let _ = listener_task.await;
    router.shutdown().await;

    info!("rustgate shutting down");
    Ok(())
}
