//! Slack Web API client.
//!
//! [`SlackApi`] is the set of provider calls a workspace needs. [`SlackClient`]
//! implements it over HTTPS:
//! - every method is a `POST https://slack.com/api/<method>` with a
//!   form-encoded body and a bearer token
//! - `ok: false` responses become [`SlackError::Api`] carrying the raw body
//! - listing endpoints follow cursor pagination
//!
//! # Example
//!
//! ```rust,ignore
//! use slack_tui_api::{SlackApi, SlackClient};
//!
//! let client = SlackClient::new("xoxp-...")?;
//! let messages = client.conversation_history("C024BE91L").await?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{SlackApiError, SlackError, SlackResult};
use crate::types::{ConversationInfo, ConversationSummary, HistoryMessage, Member, RtmConnectInfo};

/// Default Slack Web API endpoint.
pub const SLACK_API_BASE: &str = "https://slack.com/api";

/// Conversation kinds requested from `conversations.list`.
const CONVERSATION_TYPES: &str = "public_channel,private_channel,im";

/// Page size for listing endpoints.
const PAGE_LIMIT: &str = "200";

/// Upper bound on pages fetched by one listing call.
const MAX_PAGES: usize = 100;

/// Transport timeout for a single request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Provider calls used by a workspace.
#[async_trait]
pub trait SlackApi: Send + Sync {
    /// All conversations visible to the token (`conversations.list`).
    async fn list_conversations(&self) -> SlackResult<Vec<ConversationSummary>>;

    /// Fresh metadata for one conversation (`conversations.info`).
    async fn conversation_info(&self, id: &str) -> SlackResult<ConversationInfo>;

    /// Recent messages, newest first as Slack returns them (`conversations.history`).
    async fn conversation_history(&self, id: &str) -> SlackResult<Vec<HistoryMessage>>;

    /// All workspace members (`users.list`).
    async fn list_users(&self) -> SlackResult<Vec<Member>>;

    /// Post `text` into `channel` (`chat.postMessage`). Returns the message ts.
    async fn post_message(&self, channel: &str, text: &str) -> SlackResult<String>;

    /// Open (or reuse) a direct message with `user` (`conversations.open`).
    /// Returns the DM conversation ID.
    async fn open_conversation(&self, user: &str) -> SlackResult<String>;

    /// Request a real-time messaging socket URL (`rtm.connect`).
    async fn rtm_connect(&self) -> SlackResult<RtmConnectInfo>;
}

/// `reqwest`-backed [`SlackApi`].
#[derive(Clone)]
pub struct SlackClient {
    /// HTTP client for API calls.
    client: reqwest::Client,
    /// API token (user or bot).
    token: SecretString,
    /// Endpoint root, without trailing slash.
    base_url: String,
}

impl std::fmt::Debug for SlackClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackClient")
            .field("token", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl SlackClient {
    /// Create a client against the public Slack API.
    pub fn new(token: impl Into<String>) -> SlackResult<Self> {
        Self::with_base_url(token, SLACK_API_BASE)
    }

    /// Create a client against another endpoint (used for tests).
    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> SlackResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| SlackError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            token: SecretString::new(token.into().into()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Endpoint root in use.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Make an API call and return the body of an `ok: true` response.
    async fn api_call(&self, method: &str, params: &[(&str, &str)]) -> SlackResult<serde_json::Value> {
        let url = format!("{}/{}", self.base_url, method);
        debug!("Slack API call: {}", method);

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.token.expose_secret()),
            )
            .form(params)
            .send()
            .await?;

        // Check for rate limiting
        if response.status() == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(30);
            warn!("{} rate limited, retry after {}s", method, retry_after);
            return Err(SlackError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            if status == 401 || status == 403 {
                return Err(SlackError::Auth(format!("{}: {}", status, body)));
            }
            return Err(SlackError::Api {
                method: method.to_string(),
                payload: format!("{}: {}", status, body),
            });
        }

        let body: serde_json::Value = response.json().await?;

        if body.get("ok").and_then(|v| v.as_bool()) != Some(true) {
            return Err(SlackApiError::from_body(method, &body).into());
        }

        Ok(body)
    }

    /// Call a method and decode one field of the response.
    async fn api_field<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, &str)],
        field: &str,
    ) -> SlackResult<T> {
        let mut body = self.api_call(method, params).await?;
        let value = body
            .get_mut(field)
            .map(serde_json::Value::take)
            .ok_or_else(|| SlackError::InvalidPayload(format!("Missing {} in {} response", field, method)))?;
        Ok(serde_json::from_value(value)?)
    }

    /// Call a cursor-paginated listing method and collect every page.
    async fn api_paginated<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, &str)],
        field: &str,
    ) -> SlackResult<Vec<T>> {
        let mut items = Vec::new();
        let mut cursor = String::new();

        for page_number in 1..=MAX_PAGES {
            let mut page_params: Vec<(&str, &str)> = params.to_vec();
            page_params.push(("limit", PAGE_LIMIT));
            if !cursor.is_empty() {
                page_params.push(("cursor", cursor.as_str()));
            }

            let mut body = self.api_call(method, &page_params).await?;
            let page = body
                .get_mut(field)
                .map(serde_json::Value::take)
                .ok_or_else(|| SlackError::InvalidPayload(format!("Missing {} in {} response", field, method)))?;
            let page_items: Vec<T> = serde_json::from_value(page)?;
            items.extend(page_items);

            match next_cursor(&body) {
                Some(next) if next == cursor => {
                    warn!("{} returned the same cursor twice, stopping", method);
                    return Ok(items);
                }
                Some(next) => cursor = next,
                None => return Ok(items),
            }

            if page_number == MAX_PAGES {
                warn!("{} still paginating after {} pages, stopping", method, MAX_PAGES);
            }
        }

        Ok(items)
    }
}

/// Cursor for the next page, if Slack reported one.
fn next_cursor(body: &serde_json::Value) -> Option<String> {
    body.get("response_metadata")
        .and_then(|m| m.get("next_cursor"))
        .and_then(|c| c.as_str())
        .filter(|c| !c.is_empty())
        .map(|c| c.to_string())
}

#[async_trait]
impl SlackApi for SlackClient {
    async fn list_conversations(&self) -> SlackResult<Vec<ConversationSummary>> {
        self.api_paginated(
            "conversations.list",
            &[("types", CONVERSATION_TYPES), ("exclude_archived", "true")],
            "channels",
        )
        .await
    }

    async fn conversation_info(&self, id: &str) -> SlackResult<ConversationInfo> {
        self.api_field("conversations.info", &[("channel", id)], "channel")
            .await
    }

    async fn conversation_history(&self, id: &str) -> SlackResult<Vec<HistoryMessage>> {
        self.api_field("conversations.history", &[("channel", id)], "messages")
            .await
    }

    async fn list_users(&self) -> SlackResult<Vec<Member>> {
        self.api_paginated("users.list", &[], "members").await
    }

    async fn post_message(&self, channel: &str, text: &str) -> SlackResult<String> {
        self.api_field(
            "chat.postMessage",
            &[("channel", channel), ("text", text), ("as_user", "true")],
            "ts",
        )
        .await
    }

    async fn open_conversation(&self, user: &str) -> SlackResult<String> {
        let channel: OpenedChannel = self
            .api_field("conversations.open", &[("users", user)], "channel")
            .await?;
        Ok(channel.id)
    }

    async fn rtm_connect(&self) -> SlackResult<RtmConnectInfo> {
        let body = self.api_call("rtm.connect", &[]).await?;

        let url = body
            .get("url")
            .and_then(|u| u.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| SlackError::InvalidPayload("Missing url in rtm.connect response".to_string()))?;
        let self_id = body
            .get("self")
            .and_then(|s| s.get("id"))
            .and_then(|id| id.as_str())
            .map(|s| s.to_string());

        Ok(RtmConnectInfo { url, self_id })
    }
}

#[derive(Debug, Deserialize)]
struct OpenedChannel {
    id: String,
}
