//! Frappe backend error types.
//!
//! Frappe reports failures as JSON bodies carrying `exc_type`, `exception`,
//! `message` and `_server_messages` (a JSON-encoded list of JSON-encoded
//! message objects). [`ErrorDetail`] decodes that shape so callers can show
//! the backend's own explanation.

use serde_json::Value;
use thiserror::Error;

use crate::core::config::MissingCredential;

/// Longest slice of a non-JSON error body kept for display.
const MAX_RAW_BODY: usize = 300;

/// Errors raised while talking to Frappe.
#[derive(Debug, Error)]
pub enum FrappeError {
    /// Credentials are absent; detected before any network call.
    #[error("Missing Frappe credentials: {0}")]
    Credentials(MissingCredential),

    /// The backend rejected the login or token.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The backend answered with a non-2xx status.
    #[error("Frappe API returned HTTP {status}{detail}")]
    Http { status: u16, detail: ErrorDetail },

    /// The request never produced a response (connect, timeout, TLS...).
    #[error("Request to Frappe failed: {0}")]
    Transport(String),

    /// The response could not be decoded into the expected shape.
    #[error("Unexpected response from Frappe: {0}")]
    Decode(String),

    /// Caller-supplied input cannot be turned into a backend request.
    #[error("{0}")]
    InvalidInput(String),
}

impl FrappeError {
    /// Create a new "invalid input" error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new "decode" error.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// HTTP status for backend responses, if this error carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FrappeError {
    fn from(err: reqwest::Error) -> Self {
        // Strip the URL so query strings never end up in tool output.
        let err = err.without_url();
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Backend-provided explanation attached to an HTTP failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorDetail {
    pub exc_type: Option<String>,
    pub exception: Option<String>,
    pub message: Option<String>,
    pub server_messages: Vec<String>,
}

impl ErrorDetail {
    /// Decode a raw response body. Non-JSON bodies become a truncated message.
    pub fn from_body(body: &str) -> Self {
        match serde_json::from_str::<Value>(body) {
            Ok(value) => Self::from_json(&value),
            Err(_) => {
                let trimmed = body.trim();
                if trimmed.is_empty() {
                    return Self::default();
                }
                Self {
                    message: Some(trimmed.chars().take(MAX_RAW_BODY).collect()),
                    ..Self::default()
                }
            }
        }
    }

    /// Decode an already-parsed JSON body.
    pub fn from_json(value: &Value) -> Self {
        let text = |key: &str| {
            value.get(key).and_then(|v| match v {
                Value::Null => None,
                Value::String(s) if s.is_empty() => None,
                Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            })
        };

        Self {
            exc_type: text("exc_type"),
            exception: text("exception"),
            message: text("message"),
            server_messages: value
                .get("_server_messages")
                .and_then(Value::as_str)
                .map(parse_server_messages)
                .unwrap_or_default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.exc_type.is_none()
            && self.exception.is_none()
            && self.message.is_none()
            && self.server_messages.is_empty()
    }
}

impl std::fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        let mut parts = Vec::new();
        match (&self.exc_type, &self.exception) {
            (_, Some(exception)) => parts.push(exception.clone()),
            (Some(exc_type), None) => parts.push(exc_type.clone()),
            (None, None) => {}
        }
        if let Some(message) = &self.message {
            parts.push(message.clone());
        }
        if !self.server_messages.is_empty() {
            parts.push(format!(
                "server messages: {}",
                self.server_messages.join("; ")
            ));
        }
        write!(f, " - {}", parts.join(" | "))
    }
}

/// `_server_messages` is `"[\"{\\\"message\\\": \\\"...\\\"}\", ...]"`.
fn parse_server_messages(raw: &str) -> Vec<String> {
    let Ok(entries) = serde_json::from_str::<Vec<String>>(raw) else {
        return vec![raw.to_string()];
    };
    entries
        .into_iter()
        .map(|entry| {
            serde_json::from_str::<Value>(&entry)
                .ok()
                .and_then(|v| v.get("message").and_then(Value::as_str).map(String::from))
                .unwrap_or(entry)
        })
        .collect()
}
