//! Typed views of the Slack Web API responses the client consumes.
//!
//! Only the fields slack-tui reads are modelled; everything else in the
//! payload is ignored.

use serde::{Deserialize, Serialize};

/// An entry from `conversations.list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSummary {
    /// Conversation ID (C..., G..., D...).
    pub id: String,
    /// Channel name. Absent for direct messages.
    #[serde(default)]
    pub name: Option<String>,
    /// Whether this is a direct message.
    #[serde(default)]
    pub is_im: bool,
    /// Whether this is a public channel.
    #[serde(default)]
    pub is_channel: bool,
    /// Whether this is a private channel.
    #[serde(default)]
    pub is_private: bool,
    /// Counterpart user for direct messages.
    #[serde(default)]
    pub user: Option<String>,
}

impl ConversationSummary {
    /// Whether this should be shown as a direct message rather than a channel.
    pub fn is_direct_message(&self) -> bool {
        self.is_im
    }
}

/// The `channel` object from `conversations.info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationInfo {
    /// Conversation ID.
    pub id: String,
    /// Current channel name.
    #[serde(default)]
    pub name: Option<String>,
    /// Unread messages for the calling user (user tokens only).
    #[serde(default)]
    pub unread_count: Option<u64>,
    /// Unread count as Slack displays it.
    #[serde(default)]
    pub unread_count_display: Option<u64>,
}

impl ConversationInfo {
    /// Best available unread count.
    pub fn unread(&self) -> u64 {
        self.unread_count_display
            .or(self.unread_count)
            .unwrap_or_default()
    }
}

/// A message from `conversations.history`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryMessage {
    /// Sender user ID. Absent for some bot and system messages.
    #[serde(default)]
    pub user: Option<String>,
    /// Message text.
    #[serde(default)]
    pub text: String,
    /// Message timestamp.
    #[serde(default)]
    pub ts: Option<String>,
}

/// An entry from `users.list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// User ID.
    pub id: String,
    /// Username (handle).
    #[serde(default)]
    pub name: String,
    /// Whether the account has been deactivated.
    #[serde(default)]
    pub deleted: bool,
}

/// Result of `rtm.connect`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtmConnectInfo {
    /// WebSocket URL to connect to.
    pub url: String,
    /// The authenticated user's ID, if reported.
    pub self_id: Option<String>,
}
