use crate::config::LogConfig;
use anyhow::{Result, anyhow};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::ChronoLocal;

/// Install the global subscriber, writing to stdout through a background worker.
///
/// `RUST_LOG` takes precedence over `log.level`. Keep the returned guard alive
/// until exit so buffered lines are flushed.
pub fn init_logging(config: &LogConfig) -> Result<WorkerGuard> {
    let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());

    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(writer)
        .with_timer(ChronoLocal::rfc_3339())
        .with_target(false);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| anyhow!("failed to install log subscriber: {e}"))?;

    tracing::debug!("logging initialized (level: {}, json: {})", config.level, config.json);

    Ok(guard)
}
