//! In-memory `SlackApi` double and helpers for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use slack_tui_api::{
    ConversationInfo, ConversationSummary, HistoryMessage, Member, RtmConnectInfo, SlackApi,
    SlackError, SlackResult,
};

use crate::team::{Team, TeamEffects, TeamTask, ViewRequest};

/// A provider call as seen by [`RecordingApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ApiCall {
    ListConversations,
    ConversationInfo(String),
    History(String),
    ListUsers,
    PostMessage { channel: String, text: String },
    OpenConversation(String),
    RtmConnect,
}

/// Canned provider that records every call.
#[derive(Default)]
pub(crate) struct RecordingApi {
    pub conversations: Vec<ConversationSummary>,
    pub infos: HashMap<String, ConversationInfo>,
    pub histories: HashMap<String, Vec<HistoryMessage>>,
    pub members: Vec<Member>,
    pub fail_open: bool,
    pub fail_post: bool,
    pub calls: Mutex<Vec<ApiCall>>,
}

fn summary(id: &str, name: Option<&str>, user: Option<&str>) -> ConversationSummary {
    ConversationSummary {
        id: id.to_string(),
        name: name.map(str::to_string),
        is_im: user.is_some(),
        is_channel: user.is_none(),
        is_private: false,
        user: user.map(str::to_string),
    }
}

fn message(user: Option<&str>, text: &str) -> HistoryMessage {
    HistoryMessage {
        user: user.map(str::to_string),
        text: text.to_string(),
        ts: None,
    }
}

fn not_found(method: &str) -> SlackError {
    SlackError::Api {
        method: method.to_string(),
        payload: r#"{"error":"channel_not_found","ok":false}"#.to_string(),
    }
}

impl RecordingApi {
    /// Workspace with `#general` (C1, 2 unread), `#random` (C2, no history),
    /// a DM with bob (D1) and users alice (U1) and bob (U2).
    pub fn acme() -> Self {
        let info = |id: &str, name: &str, unread: u64| ConversationInfo {
            id: id.to_string(),
            name: Some(name.to_string()),
            unread_count: Some(unread),
            unread_count_display: Some(unread),
        };

        Self {
            conversations: vec![
                summary("C1", Some("general"), None),
                summary("C2", Some("random"), None),
                summary("D1", None, Some("U2")),
            ],
            infos: HashMap::from([
                ("C1".to_string(), info("C1", "general", 2)),
                ("C2".to_string(), info("C2", "random", 0)),
            ]),
            // Newest first, as Slack returns it.
            histories: HashMap::from([(
                "C1".to_string(),
                vec![
                    message(None, "from nowhere"),
                    message(Some("U2"), "second"),
                    message(Some("U1"), "first"),
                ],
            )]),
            members: vec![
                Member {
                    id: "U1".to_string(),
                    name: "alice".to_string(),
                    deleted: false,
                },
                Member {
                    id: "U2".to_string(),
                    name: "bob".to_string(),
                    deleted: false,
                },
            ],
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: ApiCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl SlackApi for RecordingApi {
    async fn list_conversations(&self) -> SlackResult<Vec<ConversationSummary>> {
        self.record(ApiCall::ListConversations);
        Ok(self.conversations.clone())
    }

    async fn conversation_info(&self, id: &str) -> SlackResult<ConversationInfo> {
        self.record(ApiCall::ConversationInfo(id.to_string()));
        self.infos
            .get(id)
            .cloned()
            .ok_or_else(|| not_found("conversations.info"))
    }

    async fn conversation_history(&self, id: &str) -> SlackResult<Vec<HistoryMessage>> {
        self.record(ApiCall::History(id.to_string()));
        self.histories
            .get(id)
            .cloned()
            .ok_or_else(|| not_found("conversations.history"))
    }

    async fn list_users(&self) -> SlackResult<Vec<Member>> {
        self.record(ApiCall::ListUsers);
        Ok(self.members.clone())
    }

    async fn post_message(&self, channel: &str, text: &str) -> SlackResult<String> {
        self.record(ApiCall::PostMessage {
            channel: channel.to_string(),
            text: text.to_string(),
        });
        if self.fail_post {
            return Err(not_found("chat.postMessage"));
        }
        Ok("1.0".to_string())
    }

    async fn open_conversation(&self, user: &str) -> SlackResult<String> {
        self.record(ApiCall::OpenConversation(user.to_string()));
        if self.fail_open {
            return Err(SlackError::Api {
                method: "conversations.open".to_string(),
                payload: r#"{"error":"user_not_found","ok":false}"#.to_string(),
            });
        }
        Ok(format!("D-{}", user))
    }

    async fn rtm_connect(&self) -> SlackResult<RtmConnectInfo> {
        self.record(ApiCall::RtmConnect);
        Err(SlackError::Network("offline".to_string()))
    }
}

/// Run `effects` and everything they lead to, in FIFO order. Returns every
/// render request produced along the way.
pub(crate) async fn drive(team: &mut Team, effects: TeamEffects) -> Vec<ViewRequest> {
    let mut requests = effects.requests;
    let mut queue: VecDeque<TeamTask> = effects.tasks.into();

    while let Some(task) = queue.pop_front() {
        let update = task.await;
        let effects = team.apply(update);
        requests.extend(effects.requests);
        queue.extend(effects.tasks);
    }

    requests
}
