//! Logger initialization using tracing.
//!
//! The investigation pipeline's progress narrative is emitted as structured
//! log events; the durable audit record is the persisted investigation
//! report, never the log stream.

use anyhow::Result;
use std::io;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::domain::models::LoggingConfig;

/// Logger handle; keeps the file-appender worker alive.
pub struct Logger {
    _guard: Option<WorkerGuard>,
}

impl Logger {
    /// Initialize the global subscriber from config. Call once at startup.
    pub fn init(config: &LoggingConfig) -> Result<Self> {
        let default_level = parse_log_level(&config.level)?;
        let env_filter = EnvFilter::builder()
            .with_default_directive(default_level.into())
            .from_env_lossy();

        let guard = if let Some(ref log_dir) = config.log_dir {
            let file_appender = rolling::daily(log_dir, "precedent.log");
            let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

            // File output is always JSON for downstream tooling.
            let file_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking_file)
                .with_ansi(false)
                .with_target(true)
                .with_filter(env_filter.clone());

            let stderr_filter = EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy();
            if config.format == "json" {
                let stderr_layer = tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(io::stderr)
                    .with_filter(stderr_filter);
                tracing_subscriber::registry()
                    .with(file_layer)
                    .with(stderr_layer)
                    .init();
            } else {
                let stderr_layer = tracing_subscriber::fmt::layer()
                    .with_writer(io::stderr)
                    .with_filter(stderr_filter);
                tracing_subscriber::registry()
                    .with(file_layer)
                    .with(stderr_layer)
                    .init();
            }
            Some(guard)
        } else {
            if config.format == "json" {
                let stderr_layer = tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(io::stderr)
                    .with_filter(env_filter);
                tracing_subscriber::registry().with(stderr_layer).init();
            } else {
                let stderr_layer = tracing_subscriber::fmt::layer()
                    .with_writer(io::stderr)
                    .with_filter(env_filter);
                tracing_subscriber::registry().with(stderr_layer).init();
            }
            None
        };

        tracing::debug!(level = %config.level, format = %config.format, "logger initialized");
        Ok(Self { _guard: guard })
    }
}

/// Parse log level string to Level
fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!("Invalid log level: {level}"),
    }
}
