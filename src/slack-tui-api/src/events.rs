//! Events received over the RTM socket.
//!
//! Only a handful of frame types matter to the client:
//! - `hello` - the socket is live
//! - `message` - something was posted to a conversation
//! - `goodbye` - the server is about to close the socket
//!
//! Everything else decodes as [`RtmEvent::Unknown`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SlackResult;

/// RTM frames that we handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RtmEvent {
    /// Connection acknowledged by the server.
    Hello,
    /// A message was posted, edited or deleted.
    Message(MessageEvent),
    /// Server is closing the connection; reconnect.
    Goodbye,
    /// Unknown event type (for forward compatibility).
    #[serde(other)]
    Unknown,
}

/// Event payload for messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEvent {
    /// Conversation the message belongs to.
    #[serde(default)]
    pub channel: String,
    /// User who sent the message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Text of the message.
    #[serde(default)]
    pub text: String,
    /// Timestamp of the message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<String>,
    /// Subtype of message (e.g., "message_changed").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    /// Bot ID (if message is from a bot).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_id: Option<String>,
}

impl MessageEvent {
    /// ID of the conversation this event concerns.
    pub fn channel_id(&self) -> &str {
        &self.channel
    }

    /// Check if this is a bot message.
    pub fn is_bot_message(&self) -> bool {
        self.bot_id.is_some() || self.subtype.as_deref() == Some("bot_message")
    }
}

/// Parse one text frame from the socket.
///
/// Frames without a `type` (e.g. `{"ok": true, "reply_to": 1}` replies to
/// our own pings) decode as [`RtmEvent::Unknown`].
pub fn parse_rtm_event(text: &str) -> SlackResult<RtmEvent> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    if value.get("type").is_none() {
        return Ok(RtmEvent::Unknown);
    }

    let event: RtmEvent = serde_json::from_value(value)?;
    if matches!(event, RtmEvent::Unknown) {
        debug!("Ignoring RTM frame: {}", text);
    }
    Ok(event)
}
