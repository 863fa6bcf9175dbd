//! One Slack workspace.
//!
//! A [`Team`] owns the workspace's API handle, its conversations and users,
//! and the conversation currently on screen. Every operation is a
//! synchronous state transition returning [`TeamEffects`]:
//! - `requests` are render requests for the view (the controller drops them
//!   unless this team is focused, except notifications)
//! - `tasks` are provider calls still to run; each resolves to a
//!   [`TeamUpdate`] that is folded back in with [`Team::apply`]
//!
//! Nothing here awaits. The controller's event loop polls the tasks, so
//! completions for one team are applied in the order they finish.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use futures::future::BoxFuture;
use indexmap::IndexMap;
use slack_tui_api::{
    ConversationInfo, ConversationSummary, HistoryMessage, Member, MessageEvent, SlackApi,
    SlackResult,
};
use tracing::{debug, warn};

use crate::conversation::{Conversation, canonical_name};
use crate::user::User;

/// How long after posting incoming messages stay silent.
pub const NOTIFICATION_SUPPRESSION: Duration = Duration::from_secs(1);

/// A provider call in flight.
pub type TeamTask = BoxFuture<'static, TeamUpdate>;

/// Completion of a [`TeamTask`].
#[derive(Debug)]
pub enum TeamUpdate {
    ConversationsListed(SlackResult<Vec<ConversationSummary>>),
    ChannelInfo {
        id: String,
        result: SlackResult<ConversationInfo>,
    },
    UsersListed(SlackResult<Vec<Member>>),
    History {
        id: String,
        result: SlackResult<Vec<HistoryMessage>>,
    },
    ImOpened {
        user_id: String,
        user_name: String,
        result: SlackResult<String>,
    },
    MessagePosted {
        channel: String,
        result: SlackResult<String>,
    },
}

/// Something a team wants shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewRequest {
    /// Replace the channel selector items.
    ChannelList(Vec<String>),
    /// Replace the user selector items.
    UserList(Vec<String>),
    /// Empty the content pane.
    ClearContent,
    /// Set the content pane title.
    ContentLabel(String),
    /// Append text (possibly several lines) to the content pane.
    Log(String),
    /// Desktop notification. Shown whether or not the team is focused.
    Notify(String),
}

/// Output of a team transition.
#[derive(Default)]
pub struct TeamEffects {
    pub requests: Vec<ViewRequest>,
    pub tasks: Vec<TeamTask>,
}

impl std::fmt::Debug for TeamEffects {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TeamEffects")
            .field("requests", &self.requests)
            .field("tasks", &self.tasks.len())
            .finish()
    }
}

impl TeamEffects {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn request(mut self, request: ViewRequest) -> Self {
        self.requests.push(request);
        self
    }

    pub fn task(mut self, task: TeamTask) -> Self {
        self.tasks.push(task);
        self
    }

    pub fn extend(&mut self, other: TeamEffects) {
        self.requests.extend(other.requests);
        self.tasks.extend(other.tasks);
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty() && self.tasks.is_empty()
    }
}

/// One configured workspace.
pub struct Team {
    name: String,
    api: Arc<dyn SlackApi>,
    /// Keyed by conversation ID, in provider order.
    conversations: IndexMap<String, Conversation>,
    /// Keyed by user ID, in provider order.
    users: IndexMap<String, User>,
    current: Option<Conversation>,
    suppressed_until: Option<Instant>,
    conversations_loaded: bool,
    users_loaded: bool,
}

impl std::fmt::Debug for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Team")
            .field("name", &self.name)
            .field("conversations", &self.conversations.len())
            .field("users", &self.users.len())
            .field("current", &self.current)
            .finish()
    }
}

impl Team {
    pub fn new(name: impl Into<String>, api: Arc<dyn SlackApi>) -> Self {
        Self {
            name: name.into(),
            api,
            conversations: IndexMap::new(),
            users: IndexMap::new(),
            current: None,
            suppressed_until: None,
            conversations_loaded: false,
            users_loaded: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn api(&self) -> Arc<dyn SlackApi> {
        Arc::clone(&self.api)
    }

    pub fn current_conversation(&self) -> Option<&Conversation> {
        self.current.as_ref()
    }

    pub fn conversations(&self) -> impl Iterator<Item = &Conversation> {
        self.conversations.values()
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    /// User at `index` in the user selector list.
    pub fn user_at(&self, index: usize) -> Option<&User> {
        self.users.get_index(index).map(|(_, user)| user)
    }

    /// First channel whose name equals `name`.
    pub fn channel_by_name(&self, name: &str) -> Option<&Conversation> {
        self.conversations
            .values()
            .find(|c| c.is_channel() && c.name() == name)
    }

    /// Both listings have completed, successfully or not.
    pub fn is_loaded(&self) -> bool {
        self.conversations_loaded && self.users_loaded
    }

    /// Some channel metadata request is still outstanding.
    pub fn is_updating_info(&self) -> bool {
        self.conversations.values().any(Conversation::is_updating_info)
    }

    pub fn total_unread(&self) -> u64 {
        self.conversations.values().map(Conversation::unread_count).sum()
    }

    /// Team list entry: the bare name while loading, then `name (unread)`.
    pub fn selector_label(&self) -> String {
        if self.is_loaded() && !self.is_updating_info() {
            format!("{} ({})", self.name, self.total_unread())
        } else {
            self.name.clone()
        }
    }

    pub fn channel_selector_list(&self) -> Vec<String> {
        self.conversations
            .values()
            .filter_map(Conversation::selector_label)
            .collect()
    }

    pub fn user_selector_list(&self) -> Vec<String> {
        self.users.values().map(User::selector_label).collect()
    }

    /// Whether an incoming message at `now` should stay silent.
    pub fn notifications_suppressed(&self, now: Instant) -> bool {
        self.suppressed_until.is_some_and(|until| now < until)
    }

    /// Selector lists from current in-memory state, for when the team
    /// gains focus. The channel list is withheld until metadata settles.
    pub fn render_lists(&self) -> Vec<ViewRequest> {
        let mut requests = Vec::new();
        if self.conversations_loaded && !self.is_updating_info() {
            requests.push(ViewRequest::ChannelList(self.channel_selector_list()));
        }
        if self.users_loaded {
            requests.push(ViewRequest::UserList(self.user_selector_list()));
        }
        requests
    }

    /// Fetch the conversation and user lists.
    pub fn load(&mut self) -> TeamEffects {
        self.conversations_loaded = false;
        self.users_loaded = false;

        let api = self.api();
        let conversations = async move {
            TeamUpdate::ConversationsListed(api.list_conversations().await)
        }
        .boxed();

        let api = self.api();
        let users = async move { TeamUpdate::UsersListed(api.list_users().await) }.boxed();

        TeamEffects::none().task(conversations).task(users)
    }

    /// Show the channel whose selector label is `label`. Unknown names are
    /// ignored.
    pub fn select_channel(&mut self, label: &str) -> TeamEffects {
        let name = canonical_name(label);
        let Some(channel) = self.channel_by_name(name).cloned() else {
            debug!("{}: no channel named {}", self.name, name);
            return TeamEffects::none();
        };

        let effects = channel.update_content(self);
        self.current = Some(channel);
        effects
    }

    /// Open (or reuse) a direct message with a user and show it.
    pub fn open_im(&mut self, user_id: &str, user_name: &str) -> TeamEffects {
        let api = self.api();
        let user_id = user_id.to_string();
        let user_name = user_name.to_string();

        let requests = vec![
            ViewRequest::ClearContent,
            ViewRequest::ContentLabel(format!("{}/@{}", self.name, user_name)),
            ViewRequest::Log(format!("Opening IM with @{}({}) ...", user_name, user_id)),
        ];
        let task = async move {
            let result = api.open_conversation(&user_id).await;
            TeamUpdate::ImOpened {
                user_id,
                user_name,
                result,
            }
        }
        .boxed();

        TeamEffects {
            requests,
            tasks: vec![task],
        }
    }

    /// Post into the current conversation. Blank text, or no conversation
    /// selected, is a no-op.
    pub fn send_message(&mut self, text: &str, now: Instant) -> TeamEffects {
        if text.trim().is_empty() {
            return TeamEffects::none();
        }
        match self.current.clone() {
            Some(conversation) => conversation.post_message(self, text, now),
            None => TeamEffects::none(),
        }
    }

    /// Post `text` into `channel` and silence notifications briefly.
    pub fn post_message(&mut self, channel: &str, text: &str, now: Instant) -> TeamEffects {
        self.suppressed_until = Some(now + NOTIFICATION_SUPPRESSION);

        let api = self.api();
        let channel = channel.to_string();
        let text = text.to_string();
        let task = async move {
            let result = api.post_message(&channel, &text).await;
            TeamUpdate::MessagePosted { channel, result }
        }
        .boxed();

        TeamEffects::none().task(task)
    }

    /// Load the history of `id` into the content pane under `label`.
    pub fn update_content(&self, id: &str, label: &str) -> TeamEffects {
        let api = self.api();
        let id = id.to_string();

        let requests = vec![
            ViewRequest::ClearContent,
            ViewRequest::ContentLabel(format!("{}/{}", self.name, label)),
            ViewRequest::Log(format!("Loading {}({}) ...", label, id)),
        ];
        let task = async move {
            let result = api.conversation_history(&id).await;
            TeamUpdate::History { id, result }
        }
        .boxed();

        TeamEffects {
            requests,
            tasks: vec![task],
        }
    }

    /// React to a real-time message.
    pub fn handle_message(&mut self, event: &MessageEvent, now: Instant) -> TeamEffects {
        let mut effects = TeamEffects::none();

        if let Some(current) = &self.current
            && current.id() == event.channel_id()
        {
            effects.extend(current.update_content(self));
        }

        if !self.notifications_suppressed(now) {
            effects
                .requests
                .push(ViewRequest::Notify(format!("New message on {}", self.name)));
        }

        effects
    }

    /// Fold a finished provider call back into the team.
    pub fn apply(&mut self, update: TeamUpdate) -> TeamEffects {
        match update {
            TeamUpdate::ConversationsListed(result) => self.apply_conversations(result),
            TeamUpdate::ChannelInfo { id, result } => self.apply_channel_info(&id, result),
            TeamUpdate::UsersListed(result) => self.apply_users(result),
            TeamUpdate::History { id, result } => self.apply_history(&id, result),
            TeamUpdate::ImOpened {
                user_id,
                user_name,
                result,
            } => self.apply_im_opened(&user_id, &user_name, result),
            TeamUpdate::MessagePosted { channel, result } => {
                self.apply_message_posted(&channel, result)
            }
        }
    }

    fn apply_conversations(
        &mut self,
        result: SlackResult<Vec<ConversationSummary>>,
    ) -> TeamEffects {
        self.conversations_loaded = true;

        let summaries = match result {
            Ok(summaries) => summaries,
            Err(e) => {
                warn!("{}: conversations.list failed: {}", self.name, e);
                return TeamEffects::none().request(ViewRequest::Log(format!("Failed: {}", e)));
            }
        };

        let mut effects = TeamEffects::none();
        let mut conversations = IndexMap::with_capacity(summaries.len());
        for summary in summaries {
            let mut conversation = Conversation::from_summary(&self.name, summary);
            if let Conversation::DirectMessage { name, .. } = &mut conversation
                && let Some(user) = self.users.get(name.as_str())
            {
                *name = user.name.clone();
            }
            if let Some(task) = conversation.update_info(&self.api) {
                effects.tasks.push(task);
            }
            conversations.insert(conversation.id().to_string(), conversation);
        }
        self.conversations = conversations;

        debug!(
            "{}: {} conversation(s), {} metadata request(s)",
            self.name,
            self.conversations.len(),
            effects.tasks.len()
        );

        effects.requests.extend(self.channel_list_request());
        effects
    }

    fn apply_channel_info(&mut self, id: &str, result: SlackResult<ConversationInfo>) -> TeamEffects {
        let info = match result {
            Ok(info) => Some(info),
            Err(e) => {
                warn!("{}: conversations.info {} failed: {}", self.name, id, e);
                None
            }
        };

        if let Some(conversation) = self.conversations.get_mut(id) {
            conversation.apply_info(info);
            if let Some(current) = &mut self.current
                && current.id() == id
            {
                *current = conversation.clone();
            }
        }

        TeamEffects {
            requests: self.channel_list_request().into_iter().collect(),
            tasks: Vec::new(),
        }
    }

    fn apply_users(&mut self, result: SlackResult<Vec<Member>>) -> TeamEffects {
        self.users_loaded = true;

        let members = match result {
            Ok(members) => members,
            Err(e) => {
                warn!("{}: users.list failed: {}", self.name, e);
                return TeamEffects::none().request(ViewRequest::Log(format!("Failed: {}", e)));
            }
        };

        self.users = members
            .into_iter()
            .map(|member| {
                let user = User::from_member(&self.name, member);
                (user.id.clone(), user)
            })
            .collect();

        // DMs from the listing are named by user ID until now.
        for conversation in self.conversations.values_mut() {
            if let Conversation::DirectMessage { name, .. } = conversation
                && let Some(user) = self.users.get(name.as_str())
            {
                *name = user.name.clone();
            }
        }

        TeamEffects::none().request(ViewRequest::UserList(self.user_selector_list()))
    }

    fn apply_history(&mut self, id: &str, result: SlackResult<Vec<HistoryMessage>>) -> TeamEffects {
        if self.current.as_ref().map(Conversation::id) != Some(id) {
            debug!("{}: dropping stale history for {}", self.name, id);
            return TeamEffects::none();
        }

        match result {
            Ok(messages) => {
                let lines: Vec<String> = messages
                    .iter()
                    .rev()
                    .map(|message| {
                        format!("{}: {}", self.speaker_name(message.user.as_deref()), message.text)
                    })
                    .collect();

                let mut effects = TeamEffects::none().request(ViewRequest::ClearContent);
                if !lines.is_empty() {
                    effects.requests.push(ViewRequest::Log(lines.join("\n")));
                }
                effects
            }
            Err(e) => TeamEffects::none().request(ViewRequest::Log(format!("Failed: {}", e))),
        }
    }

    fn apply_im_opened(
        &mut self,
        user_id: &str,
        user_name: &str,
        result: SlackResult<String>,
    ) -> TeamEffects {
        match result {
            Ok(channel_id) => {
                debug!("{}: IM with {} is {}", self.name, user_id, channel_id);
                let dm = Conversation::direct_message(&self.name, channel_id, user_name);
                let effects = dm.update_content(self);
                self.current = Some(dm);
                effects
            }
            Err(e) => TeamEffects::none().request(ViewRequest::Log(format!("Failed: {}", e))),
        }
    }

    fn apply_message_posted(&mut self, channel: &str, result: SlackResult<String>) -> TeamEffects {
        match result {
            Ok(_) => match &self.current {
                Some(current) if current.id() == channel => current.update_content(self),
                _ => TeamEffects::none(),
            },
            Err(e) => TeamEffects::none().request(ViewRequest::Log(format!("Failed: {}", e))),
        }
    }

    fn channel_list_request(&self) -> Option<ViewRequest> {
        if self.is_updating_info() {
            return None;
        }
        Some(ViewRequest::ChannelList(self.channel_selector_list()))
    }

    /// Display name for a message author. Unknown authors render blank.
    fn speaker_name(&self, user: Option<&str>) -> &str {
        user.and_then(|id| self.users.get(id))
            .map(|user| user.name.as_str())
            .unwrap_or("")
    }
}
