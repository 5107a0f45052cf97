use crate::{AppError, AppResult, config::LoggingConfig};

use std::panic::Location;

use error_location::ErrorLocation;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

const LOG_FILE_PREFIX: &str = "segment-recorder.log";

/// Installs the global subscriber: human-readable output on stderr, plus a
/// daily rolling file when a log directory is configured.
///
/// The returned guard flushes the file writer on drop and must be kept
/// alive for the lifetime of the program.
#[track_caller]
pub(crate) fn init(config: &LoggingConfig) -> AppResult<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .map_err(|e| AppError::ConfigError {
            reason: format!("Invalid log filter {:?}: {}", config.filter, e),
            location: ErrorLocation::from(Location::caller()),
        })?;

    let (file_layer, guard) = match &config.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer: Box<dyn Layer<Registry> + Send + Sync> = if config.json {
                Box::new(fmt::layer().json().with_writer(writer))
            } else {
                Box::new(fmt::layer().with_ansi(false).with_writer(writer))
            };
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| AppError::LoggingInitFailed {
            reason: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

    Ok(guard)
}
