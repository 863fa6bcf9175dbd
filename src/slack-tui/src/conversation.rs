//! Channels and direct messages.
//!
//! Both kinds share one operation set: render their history into the
//! content pane and post a message into themselves. Both delegate to the
//! owning [`Team`], which they refer to by name only.

use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use slack_tui_api::{ConversationInfo, ConversationSummary, SlackApi};

use crate::team::{Team, TeamEffects, TeamTask, TeamUpdate};

/// A conversation inside one workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conversation {
    /// Public or private channel.
    Channel {
        team: String,
        id: String,
        name: String,
        unread_count: u64,
        /// A `conversations.info` request is outstanding.
        updating_info: bool,
    },
    /// Direct message with one user.
    DirectMessage { team: String, id: String, name: String },
}

impl Conversation {
    pub fn channel(team: impl Into<String>, id: impl Into<String>, name: impl Into<String>) -> Self {
        Conversation::Channel {
            team: team.into(),
            id: id.into(),
            name: name.into(),
            unread_count: 0,
            updating_info: false,
        }
    }

    pub fn direct_message(
        team: impl Into<String>,
        id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Conversation::DirectMessage {
            team: team.into(),
            id: id.into(),
            name: name.into(),
        }
    }

    /// Build from a `conversations.list` entry. DMs are named by the
    /// counterpart's user ID until the user list resolves it.
    pub(crate) fn from_summary(team: &str, summary: ConversationSummary) -> Self {
        if summary.is_direct_message() {
            let name = summary.user.clone().unwrap_or_else(|| summary.id.clone());
            Conversation::direct_message(team, summary.id, name)
        } else {
            let name = summary.name.clone().unwrap_or_else(|| summary.id.clone());
            Conversation::channel(team, summary.id, name)
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Conversation::Channel { id, .. } | Conversation::DirectMessage { id, .. } => id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Conversation::Channel { name, .. } | Conversation::DirectMessage { name, .. } => name,
        }
    }

    pub fn team(&self) -> &str {
        match self {
            Conversation::Channel { team, .. } | Conversation::DirectMessage { team, .. } => team,
        }
    }

    pub fn is_channel(&self) -> bool {
        matches!(self, Conversation::Channel { .. })
    }

    /// `#name` for channels, `@name` for direct messages.
    pub fn label(&self) -> String {
        match self {
            Conversation::Channel { name, .. } => format!("#{}", name),
            Conversation::DirectMessage { name, .. } => format!("@{}", name),
        }
    }

    /// Entry in the channel selector list, e.g. `general (3)`.
    pub fn selector_label(&self) -> Option<String> {
        match self {
            Conversation::Channel {
                name, unread_count, ..
            } => Some(format!("{} ({})", name, unread_count)),
            Conversation::DirectMessage { .. } => None,
        }
    }

    pub fn unread_count(&self) -> u64 {
        match self {
            Conversation::Channel { unread_count, .. } => *unread_count,
            Conversation::DirectMessage { .. } => 0,
        }
    }

    pub fn is_updating_info(&self) -> bool {
        matches!(
            self,
            Conversation::Channel {
                updating_info: true,
                ..
            }
        )
    }

    /// Render this conversation's history through its team.
    pub fn update_content(&self, team: &Team) -> TeamEffects {
        team.update_content(self.id(), &self.label())
    }

    /// Post `text` into this conversation through its team.
    pub fn post_message(&self, team: &mut Team, text: &str, now: Instant) -> TeamEffects {
        team.post_message(self.id(), text, now)
    }

    /// Start a metadata refresh. Only channels have one.
    pub(crate) fn update_info(&mut self, api: &Arc<dyn SlackApi>) -> Option<TeamTask> {
        let Conversation::Channel {
            id, updating_info, ..
        } = self
        else {
            return None;
        };

        *updating_info = true;
        let api = Arc::clone(api);
        let id = id.clone();
        Some(
            async move {
                let result = api.conversation_info(&id).await;
                TeamUpdate::ChannelInfo { id, result }
            }
            .boxed(),
        )
    }

    /// Finish a metadata refresh. `info` is `None` when the request failed.
    pub(crate) fn apply_info(&mut self, info: Option<ConversationInfo>) {
        if let Conversation::Channel {
            name,
            unread_count,
            updating_info,
            ..
        } = self
        {
            *updating_info = false;
            if let Some(info) = info {
                *unread_count = info.unread();
                if let Some(fresh) = info.name {
                    *name = fresh;
                }
            }
        }
    }
}

/// Strip a trailing parenthetical decoration: `"general (3)"` -> `"general"`.
pub fn canonical_name(label: &str) -> &str {
    let trimmed = label.trim_end();
    if trimmed.ends_with(')')
        && let Some(open) = trimmed.rfind('(')
    {
        return trimmed[..open].trim_end();
    }
    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_name() {
        assert_eq!(canonical_name("general (3)"), "general");
        assert_eq!(canonical_name("general"), "general");
        assert_eq!(canonical_name("Acme(*)"), "Acme");
        assert_eq!(canonical_name("Acme (12) "), "Acme");
        assert_eq!(canonical_name("odd(name"), "odd(name");
    }

    #[test]
    fn test_labels() {
        let channel = Conversation::channel("Acme", "C1", "general");
        assert_eq!(channel.label(), "#general");
        assert_eq!(channel.selector_label().as_deref(), Some("general (0)"));

        let dm = Conversation::direct_message("Acme", "D1", "alice");
        assert_eq!(dm.label(), "@alice");
        assert_eq!(dm.selector_label(), None);
    }

    #[test]
    fn test_from_summary_classifies() {
        let dm = Conversation::from_summary(
            "Acme",
            ConversationSummary {
                id: "D1".to_string(),
                name: None,
                is_im: true,
                is_channel: false,
                is_private: false,
                user: Some("U1".to_string()),
            },
        );
        assert!(!dm.is_channel());
        assert_eq!(dm.name(), "U1");

        let private = Conversation::from_summary(
            "Acme",
            ConversationSummary {
                id: "G1".to_string(),
                name: Some("secret".to_string()),
                is_im: false,
                is_channel: false,
                is_private: true,
                user: None,
            },
        );
        assert!(private.is_channel());
        assert_eq!(private.team(), "Acme");
    }

    #[test]
    fn test_apply_info() {
        let mut channel = Conversation::channel("Acme", "C1", "general");
        if let Conversation::Channel { updating_info, .. } = &mut channel {
            *updating_info = true;
        }
        assert!(channel.is_updating_info());

        channel.apply_info(Some(ConversationInfo {
            id: "C1".to_string(),
            name: Some("general-renamed".to_string()),
            unread_count: Some(4),
            unread_count_display: None,
        }));
        assert!(!channel.is_updating_info());
        assert_eq!(channel.name(), "general-renamed");
        assert_eq!(channel.unread_count(), 4);

        // A failed refresh only clears the flag.
        let mut channel = Conversation::channel("Acme", "C2", "random");
        channel.apply_info(None);
        assert_eq!(channel.name(), "random");
        assert!(!channel.is_updating_info());
    }

    #[test]
    fn test_update_info_only_for_channels() {
        let api: Arc<dyn SlackApi> = Arc::new(crate::testing::RecordingApi::acme());

        let mut dm = Conversation::direct_message("Acme", "D1", "bob");
        assert!(dm.update_info(&api).is_none());

        let mut channel = Conversation::channel("Acme", "C1", "general");
        let task = channel.update_info(&api).unwrap();
        assert!(channel.is_updating_info());

        match tokio_test::block_on(task) {
            TeamUpdate::ChannelInfo { id, result } => {
                assert_eq!(id, "C1");
                assert_eq!(result.unwrap().unread(), 2);
            }
            other => panic!("unexpected update: {:?}", other),
        }
    }
}
