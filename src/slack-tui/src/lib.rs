//! slack-tui: a terminal client for one or more Slack workspaces.
//!
//! The screen has a team list, a channel list and a user list on the left,
//! and the selected conversation with a message line on the right.
//!
//! # Architecture
//!
//! - [`team`] / [`conversation`] / [`user`] - workspace state. Team
//!   operations are synchronous transitions returning [`team::TeamEffects`];
//!   provider calls come back as [`team::TeamUpdate`]s.
//! - [`session`] - which team is focused.
//! - [`view`] - screen state, key handling and drawing.
//! - [`app`] - the controller tying teams, session and view together.
//! - [`runner`] - the `tokio::select!` event loop.
//! - [`terminal`] / [`notification`] - terminal lifecycle and desktop
//!   notifications.
//!
//! # Example
//!
//! ```rust,ignore
//! use slack_tui::{DesktopNotifier, SlackTui, runner};
//! use slack_tui_api::{ConfigPaths, RtmOptions};
//!
//! let tui = SlackTui::new(ConfigPaths::default_paths(), factory, Box::new(DesktopNotifier));
//! runner::run(tui, RtmOptions::default()).await?;
//! ```

pub mod app;
pub mod conversation;
pub mod notification;
pub mod runner;
pub mod session;
pub mod team;
pub mod terminal;
pub mod user;
pub mod view;

#[cfg(test)]
mod testing;

// Re-export main types
pub use app::{ApiFactory, RealtimeStream, SlackTui};
pub use conversation::{Conversation, canonical_name};
pub use notification::{DesktopNotifier, Notifier, SilentNotifier};
pub use session::Session;
pub use team::{Team, TeamEffects, TeamTask, TeamUpdate, ViewRequest};
pub use terminal::{SlackTerminal, restore_terminal};
pub use user::User;
pub use view::{View, ViewEvent};
