use crate::config::{LogFormat, ServiceConfig};
use crate::error::{ErrorKind, ProgressError};

/// Initialize structured logging with tracing.
/// Call once at process startup; `RUST_LOG` wins over the configured level.
pub fn init_logging(config: &ServiceConfig) -> Result<(), ProgressError> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.log_format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .json(),
            )
            .try_init(),
        LogFormat::Pretty => registry.with(fmt::layer().with_target(true)).try_init(),
    };

    result.map_err(|e| {
        ProgressError::new(
            format!("Failed to set global tracing subscriber: {}", e),
            ErrorKind::Startup,
        )
    })?;

    tracing::info!(format = ?config.log_format, "Structured logging initialized");
    Ok(())
}

/// Startup banner with the effective configuration.
pub fn log_startup(config: &ServiceConfig) {
    tracing::info!(
        addr = %config.bind_addr(),
        data_path = ?config.data_path,
        "Progress service starting"
    );
}
