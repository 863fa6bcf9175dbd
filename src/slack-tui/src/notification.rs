//! Desktop notifications.
//!
//! Uses platform-specific notification mechanisms:
//! - macOS: AppleScript `display notification`
//! - Linux: `notify-send` command
//! - Windows: PowerShell Toast notifications
//!
//! Every call is fire and forget. The child process is spawned and never
//! awaited, and a missing notifier binary is only logged.

use tracing::debug;

/// Title used for every notification.
pub const NOTIFICATION_TITLE: &str = "slack-tui";

/// Something that can show a notification.
pub trait Notifier: Send {
    fn notify(&self, body: &str);
}

/// Shows notifications through the desktop environment.
#[derive(Debug, Clone, Default)]
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn notify(&self, body: &str) {
        let Some(mut command) = platform_command(NOTIFICATION_TITLE, body) else {
            return;
        };
        command
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .kill_on_drop(false);

        if let Err(e) = command.spawn() {
            debug!("Desktop notification failed: {}", e);
        }
    }
}

/// Discards notifications (`--no-notify`).
#[derive(Debug, Clone, Default)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn notify(&self, body: &str) {
        debug!("Notification suppressed: {}", body);
    }
}

#[cfg(target_os = "macos")]
fn platform_command(title: &str, body: &str) -> Option<tokio::process::Command> {
    // Escape special characters for AppleScript
    let title_escaped = title.replace('"', "\\\"");
    let body_escaped = body.replace('"', "\\\"");

    let script = format!(
        r#"display notification "{}" with title "{}""#,
        body_escaped, title_escaped
    );

    let mut command = tokio::process::Command::new("osascript");
    command.args(["-e", &script]);
    Some(command)
}

#[cfg(target_os = "linux")]
fn platform_command(title: &str, body: &str) -> Option<tokio::process::Command> {
    let mut command = tokio::process::Command::new("notify-send");
    command.args(["--urgency", "normal", title, body]);
    Some(command)
}

#[cfg(target_os = "windows")]
fn platform_command(title: &str, body: &str) -> Option<tokio::process::Command> {
    // Escape special characters for PowerShell
    let title_escaped = title.replace('"', "`\"");
    let body_escaped = body.replace('"', "`\"");

    let script = format!(
        r#"
        [Windows.UI.Notifications.ToastNotificationManager, Windows.UI.Notifications, ContentType = WindowsRuntime] | Out-Null
        $template = [Windows.UI.Notifications.ToastNotificationManager]::GetTemplateContent([Windows.UI.Notifications.ToastTemplateType]::ToastText02)
        $textNodes = $template.GetElementsByTagName("text")
        $textNodes.Item(0).AppendChild($template.CreateTextNode("{}")) | Out-Null
        $textNodes.Item(1).AppendChild($template.CreateTextNode("{}")) | Out-Null
        $toast = [Windows.UI.Notifications.ToastNotification]::new($template)
        [Windows.UI.Notifications.ToastNotificationManager]::CreateToastNotifier("slack-tui").Show($toast)
        "#,
        title_escaped, body_escaped
    );

    let mut command = tokio::process::Command::new("powershell");
    command.args(["-Command", &script]);
    Some(command)
}

#[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
fn platform_command(_title: &str, _body: &str) -> Option<tokio::process::Command> {
    None
}
