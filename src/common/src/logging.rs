use crate::config::Config;
use crate::constants::LOG_FILE_NAME;
use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, time::SystemTime},
    prelude::*,
    EnvFilter,
};

/// Installs the global subscriber: stderr always, plus `forwarder.log`
/// inside `log_dir` when one is configured. `RUST_LOG` wins over
/// `log_level`.
pub fn setup_logging(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .with_context(|| format!("invalid log_level `{}`", config.log_level))?;

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    let file_layer = match config.log_dir.as_deref() {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir))?;
            let file_appender = RollingFileAppender::new(Rotation::NEVER, dir, LOG_FILE_NAME);

            Some(
                fmt::layer()
                    .with_file(true)
                    .with_line_number(true)
                    .with_thread_ids(true)
                    .with_thread_names(true)
                    .with_target(true)
                    .with_level(true)
                    .with_ansi(false)
                    .with_timer(SystemTime)
                    .with_writer(file_appender),
            )
        }
        None => None,
    };

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer);

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    match config.log_dir.as_deref() {
        Some(dir) => tracing::info!(
            "Logging system initialized. Writing to {}",
            Path::new(dir).join(LOG_FILE_NAME).display()
        ),
        None => tracing::info!("Logging system initialized. Writing to stderr"),
    }

    Ok(())
}
