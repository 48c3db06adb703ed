//! Logging setup for the forge-poller binary
//!
//! The library itself only emits `tracing` events. The binary installs a
//! subscriber once, from an explicit [`LogConfig`], writing either to stderr
//! or to a log file in the data directory.

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::log_path;

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Where log output goes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogTarget {
    #[default]
    Stderr,
    File(PathBuf),
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error, off); `RUST_LOG` wins if set
    pub level: String,
    /// Emit one JSON object per event instead of human-readable lines
    pub json: bool,
    pub target: LogTarget,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            json: false,
            target: LogTarget::Stderr,
        }
    }
}

impl LogConfig {
    /// Log to the default log file under the data directory
    pub fn with_default_file(mut self) -> Self {
        self.target = LogTarget::File(log_path());
        self
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level))
    }
}

/// Install the global subscriber
///
/// The returned guard flushes buffered file output when dropped, so keep it
/// alive for the lifetime of the program.
pub fn init_logging(config: &LogConfig) -> anyhow::Result<WorkerGuard> {
    let filter = config.env_filter();

    let (writer, guard) = match &config.target {
        LogTarget::Stderr => tracing_appender::non_blocking(std::io::stderr()),
        LogTarget::File(path) => tracing_appender::non_blocking(open_log_file(path)?),
    };
    let ansi = config.target == LogTarget::Stderr;

    if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(writer))
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_ansi(ansi).with_writer(writer))
            .try_init()?;
    }

    Ok(guard)
}

/// Open `path` for appending, creating its directory first
fn open_log_file(path: &Path) -> std::io::Result<std::fs::File> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
}
