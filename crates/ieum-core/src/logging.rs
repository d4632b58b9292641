//! Diagnostic logging.
//!
//! Logs go to `$IEUM_HOME/logs/ieum.log` so they never interleave with the
//! chat transcript on stdout. The filter comes from `IEUM_LOG` when set,
//! otherwise from `log_level` in the config.

use std::fs;

use anyhow::{Context, Result, anyhow};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, paths};

/// Environment variable holding a log filter directive.
pub const LOG_ENV: &str = "IEUM_LOG";

const LOG_FILE_NAME: &str = "ieum.log";

/// Installs the global tracing subscriber.
///
/// The returned guard flushes buffered log lines on drop; keep it alive for
/// the lifetime of the process.
///
/// # Errors
/// Returns an error if the log directory cannot be created, the filter is
/// invalid, or a subscriber is already installed.
pub fn init(config: &Config) -> Result<WorkerGuard> {
    let dir = paths::logs_dir();
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(&dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(build_filter(config)?)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow!("Failed to install log subscriber: {e}"))?;

    Ok(guard)
}

fn build_filter(config: &Config) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
        return Ok(filter);
    }
    EnvFilter::try_new(config.log_filter())
        .with_context(|| format!("Invalid log_level '{}'", config.log_filter()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_from_config() {
        let config = Config {
            log_level: Some("ieum_core=debug".to_string()),
            ..Default::default()
        };
        // IEUM_LOG is not set by the test harness.
        let filter = build_filter(&config).unwrap();
        assert!(filter.to_string().contains("ieum_core=debug"));
    }

    #[test]
    fn test_invalid_filter_rejected() {
        let config = Config {
            log_level: Some("ieum_core=loud".to_string()),
            ..Default::default()
        };
        assert!(build_filter(&config).is_err());
    }
}
