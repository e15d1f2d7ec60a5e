//! Tracing subscriber setup.
//!
//! One-shot commands log to stderr so stdout stays machine-readable. The TUI
//! owns the terminal, so it logs to a daily rolling file instead.

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::{Error, Result};

/// Environment variable with a full `EnvFilter` directive, overriding `log-level`.
pub const LOG_ENV: &str = "GVI_LOG";

/// Environment variable selecting `json` log lines instead of the compact format.
pub const LOG_FORMAT_ENV: &str = "GVI_LOG_FORMAT";

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    /// Daily rolling files named `gvi.log.<date>` in this directory.
    File(PathBuf),
}

/// Keeps the file writer flushing; drop it only at exit.
#[must_use = "dropping the guard stops log delivery"]
pub struct LogGuard {
    _worker: Option<WorkerGuard>,
}

/// Build the filter: `GVI_LOG` wins, otherwise `default_level` for this crate
/// and `warn` for dependencies.
pub fn build_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "gastown_viewer={},gvi={},warn",
            default_level, default_level
        ))
    })
}

/// Default directory for TUI log files.
pub fn default_log_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("gastown-viewer").join("logs"))
}

/// Install the global subscriber. Call once, early in `main`.
pub fn init(default_level: &str, target: LogTarget) -> Result<LogGuard> {
    let filter = build_filter(default_level);
    let json = std::env::var(LOG_FORMAT_ENV).is_ok_and(|v| v == "json");
    let registry = tracing_subscriber::registry().with(filter);

    let result = match target {
        LogTarget::Stderr => {
            let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
            let init = if json {
                registry.with(layer.json()).try_init()
            } else {
                registry.with(layer.compact()).try_init()
            };
            init.map(|()| LogGuard { _worker: None })
        }
        LogTarget::File(dir) => {
            std::fs::create_dir_all(&dir)?;
            let appender = tracing_appender::rolling::daily(&dir, "gvi.log");
            let (writer, worker) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            let init = if json {
                registry.with(layer.json()).try_init()
            } else {
                registry.with(layer).try_init()
            };
            init.map(|()| LogGuard {
                _worker: Some(worker),
            })
        }
    };

    result.map_err(|e| Error::Other(format!("Failed to initialize logging: {}", e)))
}
