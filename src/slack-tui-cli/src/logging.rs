//! Log file setup.
//!
//! The client owns the terminal, so logs never go to stdout or stderr once
//! it starts. Without `--debug` or `--log-file` no subscriber is installed.

use std::fs::{File, OpenOptions};
use std::path::Path;

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::args::{Cli, LogLevel};

/// Guard that ensures the log file is flushed when dropped.
pub struct LogGuard {
    _guard: WorkerGuard,
}

/// Install the subscriber selected on the command line, if any.
pub fn init_logging(cli: &Cli) -> Result<Option<LogGuard>> {
    if cli.debug {
        return setup_debug_file_logging().map(Some);
    }
    match &cli.log_file {
        Some(path) => setup_file_logging(path, cli.log_level).map(Some),
        None => Ok(None),
    }
}

/// Set up debug file logging that writes ALL trace-level logs to ./debug.txt.
fn setup_debug_file_logging() -> Result<LogGuard> {
    let debug_file_path = std::env::current_dir()?.join("debug.txt");

    let file = File::create(&debug_file_path).map_err(|e| {
        anyhow::anyhow!(
            "Failed to create debug.txt: {}. Check write permissions.",
            e
        )
    })?;

    let guard = install(file, EnvFilter::new("trace"));

    eprintln!(
        "Debug mode enabled: logging to {}",
        debug_file_path.display()
    );

    Ok(guard)
}

/// Append logs at `level` to `path`. `RUST_LOG`, when set, takes precedence.
fn setup_file_logging(path: &Path, level: LogLevel) -> Result<LogGuard> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| anyhow::anyhow!("Failed to open log file {}: {}", path.display(), e))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_filter_str()));

    Ok(install(file, filter))
}

fn install(file: File, filter: EnvFilter) -> LogGuard {
    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .init();

    LogGuard { _guard: guard }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_no_logging_by_default() {
        let cli = Cli::try_parse_from(["slack-tui"]).unwrap();
        assert!(init_logging(&cli).unwrap().is_none());
    }

    #[test]
    fn test_log_file_is_created() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("slack-tui.log");
        let cli = Cli::try_parse_from([
            "slack-tui",
            "--log-file",
            path.to_str().unwrap(),
        ])
        .unwrap();

        let guard = init_logging(&cli).unwrap();
        assert!(guard.is_some());
        assert!(path.exists());
    }
}
