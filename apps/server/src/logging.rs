//! Logging initialisation
//!
//! Console output is always enabled; a rolling file sink is added when
//! `logging.file_enabled` is set. `RUST_LOG` overrides `logging.level`.

use crate::config::LoggingConfig;
use anyhow::Context;
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Keeps the non-blocking file writer alive. Dropping it flushes pending lines.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<LoggingGuard> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .with_context(|| format!("Invalid log filter '{}'", config.level))?;

    let console_layer = if config.json {
        fmt::layer().json().with_target(true).boxed()
    } else {
        fmt::layer().with_target(true).boxed()
    };

    let (file_layer, file_guard) = if config.file_enabled {
        let rotation = match config.file_rotation.as_str() {
            "hourly" => rolling::Rotation::HOURLY,
            "minutely" => rolling::Rotation::MINUTELY,
            "never" => rolling::Rotation::NEVER,
            _ => rolling::Rotation::DAILY,
        };
        let appender = rolling::RollingFileAppender::new(
            rotation,
            &config.file_directory,
            &config.file_prefix,
        );
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = fmt::layer()
            .json()
            .with_ansi(false)
            .with_writer(writer)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install global tracing subscriber")?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}
