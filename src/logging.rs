use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Where log lines go. The TUI owns the terminal, so it logs to a file.
#[derive(Debug, Clone)]
pub(crate) enum LogTarget {
    Stderr,
    File(PathBuf),
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
pub(crate) fn init_logging(config: &LoggingConfig, target: LogTarget) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match &target {
        LogTarget::Stderr => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .try_init()?,
        LogTarget::File(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
                .try_init()?
        }
    }

    tracing::debug!(level = %config.level, ?target, "logging initialized");
    Ok(())
}
