//! Slack provider plumbing for slack-tui.
//!
//! This crate wraps everything the terminal client needs from Slack:
//! - Web API calls for conversations, users, history and posting
//! - The RTM (real-time messaging) WebSocket stream
//! - Loading the team/token list from the operator's home directory
//!
//! # Architecture
//!
//! The client is consumed through the [`SlackApi`] trait so the UI layer can
//! be driven by a recording double in tests. [`SlackClient`] is the
//! `reqwest`-backed implementation and [`RtmSubscription`] turns the RTM
//! socket into a stream of [`RtmEvent`]s.
//!
//! # Example
//!
//! ```rust,ignore
//! use slack_tui_api::{ConfigPaths, SlackApi, SlackClient, load_team_tokens};
//!
//! let entries = load_team_tokens(&ConfigPaths::default_paths()?)?;
//! let client = SlackClient::new(entries[0].token())?;
//! let channels = client.list_conversations().await?;
//! ```
//!
//! # Configuration
//!
//! Two file shapes are accepted:
//! - `~/.slack-tui.json` - `[{"name": "Acme", "token": "xoxp-..."}]`
//! - `~/.teamlist.json` - `[["xoxp-...", "Acme"]]` (legacy)

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod rtm;
pub mod types;

// Re-export main types
pub use client::{SlackApi, SlackClient};
pub use config::{ConfigPaths, TeamConfigEntry, load_team_tokens};
pub use error::{SlackApiError, SlackError, SlackResult};
pub use events::{MessageEvent, RtmEvent, parse_rtm_event};
pub use rtm::{RtmOptions, RtmSubscription};
pub use types::{ConversationInfo, ConversationSummary, HistoryMessage, Member, RtmConnectInfo};
