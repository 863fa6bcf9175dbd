//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;
use slack_tui_api::{ConfigPaths, SlackResult};

/// Log verbosity level for the log file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    /// Only show errors
    Error,
    /// Show warnings and errors
    Warn,
    /// Show informational messages, warnings, and errors (default)
    #[default]
    Info,
    /// Show debug messages and above
    Debug,
    /// Show all messages including trace-level details
    Trace,
}

impl LogLevel {
    /// Convert to tracing filter string.
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Terminal client for one or more Slack workspaces.
///
/// Workspaces and their tokens are read from ~/.slack-tui.json
/// (`[{"name": "...", "token": "xoxp-..."}]`), or from the older
/// ~/.teamlist.json (`[["xoxp-...", "name"]]`).
#[derive(Debug, Parser)]
#[command(name = "slack-tui")]
#[command(author, version)]
#[command(about = "Terminal client for Slack workspaces", long_about = None)]
pub struct Cli {
    /// Read the team list from this file instead of the home directory
    #[arg(long, env = "SLACK_TUI_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable desktop notifications for new messages
    #[arg(long = "no-notify")]
    pub no_notify: bool,

    /// Log level for --log-file
    #[arg(
        long = "log-level",
        value_enum,
        env = "SLACK_TUI_LOG_LEVEL",
        default_value = "info",
        help_heading = "Debugging"
    )]
    pub log_level: LogLevel,

    /// Write logs to this file (logging is off otherwise)
    #[arg(long = "log-file", value_name = "PATH", help_heading = "Debugging")]
    pub log_file: Option<PathBuf>,

    /// Enable debug mode: writes ALL trace-level logs to ./debug.txt
    #[arg(long = "debug", help_heading = "Debugging")]
    pub debug: bool,
}

impl Cli {
    /// Where to look for the team list.
    pub fn config_paths(&self) -> SlackResult<ConfigPaths> {
        match &self.config {
            Some(path) => Ok(ConfigPaths::single(path.clone())),
            None => ConfigPaths::default_paths(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_log_level_default() {
        assert_eq!(LogLevel::default(), LogLevel::Info);
    }

    #[test]
    fn test_log_level_as_filter_str() {
        assert_eq!(LogLevel::Error.as_filter_str(), "error");
        assert_eq!(LogLevel::Warn.as_filter_str(), "warn");
        assert_eq!(LogLevel::Info.as_filter_str(), "info");
        assert_eq!(LogLevel::Debug.as_filter_str(), "debug");
        assert_eq!(LogLevel::Trace.as_filter_str(), "trace");
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "slack-tui",
            "--config",
            "/tmp/teams.json",
            "--no-notify",
            "--log-level",
            "debug",
            "--log-file",
            "/tmp/slack-tui.log",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("/tmp/teams.json")));
        assert!(cli.no_notify);
        assert_eq!(cli.log_level, LogLevel::Debug);
        assert_eq!(cli.log_file, Some(PathBuf::from("/tmp/slack-tui.log")));
        assert!(!cli.debug);

        let paths = cli.config_paths().unwrap();
        assert_eq!(paths, ConfigPaths::single("/tmp/teams.json"));
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        assert!(Cli::try_parse_from(["slack-tui", "--log-level", "loud"]).is_err());
    }
}
