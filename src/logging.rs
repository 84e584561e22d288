//! Tracing subscriber setup.
//!
//! The bot daemon logs JSON to a daily-rotated file under the runtime logs
//! directory and plain text to stderr. One-shot subcommands log to stderr
//! only and default to `warn` so their output stays readable.

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Log file name prefix; the appender adds a `.YYYY-MM-DD` suffix.
const LOG_FILE_PREFIX: &str = "herald.log";

/// Where log output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogMode {
    /// Long-running bot: JSON file plus stderr.
    Daemon {
        /// Directory for rotated log files.
        logs_dir: PathBuf,
    },
    /// One-shot command: stderr only.
    Cli,
}

/// Keeps the non-blocking file writer alive; dropping it flushes the log.
pub struct LoggingGuard {
    _guard: Option<WorkerGuard>,
}

/// `RUST_LOG` when set, otherwise `default`.
fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Install the global subscriber for `mode`.
///
/// Keep the returned guard alive for the whole process.
///
/// # Errors
///
/// Returns an error if the logs directory cannot be created.
pub fn init(mode: &LogMode) -> anyhow::Result<LoggingGuard> {
    match mode {
        LogMode::Daemon { logs_dir } => init_daemon(logs_dir),
        LogMode::Cli => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter("warn"))
                .with_writer(std::io::stderr)
                .init();
            Ok(LoggingGuard { _guard: None })
        }
    }
}

fn init_daemon(logs_dir: &Path) -> anyhow::Result<LoggingGuard> {
    std::fs::create_dir_all(logs_dir).map_err(|e| {
        anyhow::anyhow!(
            "failed to create logs directory {}: {e}",
            logs_dir.display()
        )
    })?;

    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(logs_dir, LOG_FILE_PREFIX));

    tracing_subscriber::registry()
        .with(env_filter("info"))
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(file_writer),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(LoggingGuard {
        _guard: Some(guard),
    })
}
