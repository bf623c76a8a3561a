//! Logging initialization.

use crate::config::{GlobalConfig, LogFormat};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the logging system from the global configuration.
///
/// `level_override` (from the command line) wins over the configured level;
/// `RUST_LOG` wins over both so operators can raise verbosity without
/// touching the configuration file.
pub fn init_logging(config: &GlobalConfig, level_override: Option<&str>) {
    let level = level_override.unwrap_or(&config.log_level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Json => {
            registry.with(fmt::layer().json()).init();
        }
        LogFormat::Pretty => {
            registry.with(fmt::layer().pretty()).init();
        }
    }
}
