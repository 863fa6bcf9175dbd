//! slack-tui - main entry point.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use slack_tui::{ApiFactory, DesktopNotifier, Notifier, SilentNotifier, SlackTui, runner};
use slack_tui_api::{RtmOptions, SlackApi, SlackClient};
use slack_tui_cli::{Cli, init_logging};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Held until the event loop returns.
    let log_guard = init_logging(&cli)?;

    // Without a home directory the client still starts and reports it.
    let config_paths = cli.config_paths();
    match &config_paths {
        Ok(paths) => tracing::info!("Team list: {}", paths.display_path().display()),
        Err(e) => tracing::warn!("Team list unavailable: {}", e),
    }

    let notifier: Box<dyn Notifier> = if cli.no_notify {
        Box::new(SilentNotifier)
    } else {
        Box::new(DesktopNotifier)
    };

    let api_factory: ApiFactory = Box::new(|entry| {
        let client: Arc<dyn SlackApi> = Arc::new(SlackClient::new(entry.token())?);
        Ok(client)
    });

    let tui = SlackTui::new(config_paths, api_factory, notifier);
    let result = runner::run(tui, RtmOptions::default()).await;

    // Flush buffered log lines, then exit without waiting on abandoned requests.
    drop(log_guard);
    result?;
    std::process::exit(0);
}
