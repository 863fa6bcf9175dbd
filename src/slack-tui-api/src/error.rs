//! Error types for the Slack client.
//!
//! Every failure a provider call can produce ends up here: configuration
//! problems, API-level `ok: false` responses, transport errors and
//! WebSocket failures.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during Slack operations.
#[derive(Error, Debug)]
pub enum SlackError {
    /// The team list file is missing or could not be parsed.
    #[error("Failed to read {}: {reason}", path.display())]
    ConfigUnreadable {
        /// File that was tried (or the path that was expected).
        path: PathBuf,
        /// Why it could not be used.
        reason: String,
    },

    /// Slack answered with `ok: false`.
    #[error("{payload}")]
    Api {
        /// API method that was called (e.g. `conversations.history`).
        method: String,
        /// Raw JSON body returned by Slack.
        payload: String,
    },

    /// Authentication error (invalid token, revoked, etc.).
    #[error("Authentication error: {0}")]
    Auth(String),

    /// API rate limited.
    #[error("Rate limited: retry after {retry_after_secs} seconds")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// Network/HTTP error.
    #[error("Network error: {0}")]
    Network(String),

    /// Operation timed out.
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// WebSocket connection error.
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(String),

    /// Invalid payload received from Slack.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SlackError {
    /// Whether this error came from talking to Slack (as opposed to local
    /// configuration).
    pub fn is_provider_failure(&self) -> bool {
        !matches!(self, SlackError::ConfigUnreadable { .. })
    }

    pub(crate) fn config(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        SlackError::ConfigUnreadable {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl From<reqwest::Error> for SlackError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SlackError::Timeout(err.to_string())
        } else if err.is_connect() {
            SlackError::Network(format!("Connection failed: {}", err))
        } else {
            SlackError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SlackError {
    fn from(err: serde_json::Error) -> Self {
        SlackError::Json(err.to_string())
    }
}

impl From<std::io::Error> for SlackError {
    fn from(err: std::io::Error) -> Self {
        SlackError::Internal(err.to_string())
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for SlackError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        SlackError::WebSocket(err.to_string())
    }
}

/// Result type for Slack operations.
pub type SlackResult<T> = std::result::Result<T, SlackError>;

/// An `ok: false` response, before it is folded into [`SlackError`].
#[derive(Debug, Clone)]
pub struct SlackApiError {
    /// API method that failed.
    pub method: String,
    /// Error code from Slack (e.g., "channel_not_found").
    pub code: String,
    /// The full response body.
    pub payload: String,
}

impl SlackApiError {
    /// Build from a decoded response body.
    pub fn from_body(method: impl Into<String>, body: &serde_json::Value) -> Self {
        let code = body
            .get("error")
            .and_then(|e| e.as_str())
            .unwrap_or("unknown")
            .to_string();
        Self {
            method: method.into(),
            code,
            payload: body.to_string(),
        }
    }
}

impl From<SlackApiError> for SlackError {
    fn from(err: SlackApiError) -> Self {
        SlackError::Api {
            method: err.method,
            payload: err.payload,
        }
    }
}
