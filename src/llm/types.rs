//! LLM types — proxy wire messages and errors.
//!
//! The assistant proxy speaks a Gemini-style message shape:
//! `{ role, parts: [{ text }] }`. These types serialize to exactly that.

use serde::{Deserialize, Serialize};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by assistant client operations.
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// The HTTP request never produced a response.
    #[error("assistant unreachable: {0}")]
    Unreachable(String),

    /// The proxy answered with a non-success HTTP status.
    #[error("assistant unreachable: status {status}")]
    Status { status: u16, body: String },

    /// The proxy answered 2xx but without usable `text`.
    #[error("empty response from assistant")]
    EmptyResponse,
}

impl AssistantError {
    /// Collapse the error into the coarse failure taxonomy callers see.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::EmptyResponse => FailureKind::EmptyResponse,
            Self::ConfigParse(_) | Self::HttpClientBuild(_) | Self::Unreachable(_) | Self::Status { .. } => {
                FailureKind::Unreachable
            }
        }
    }

    /// Stable diagnostic code for logs.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ConfigParse(_) => "E_CONFIG_PARSE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
            Self::Unreachable(_) => "E_UNREACHABLE",
            Self::Status { .. } => "E_STATUS",
            Self::EmptyResponse => "E_EMPTY_RESPONSE",
        }
    }
}

/// Normalized failure signal surfaced at the session boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    /// Transport failure or non-success status.
    Unreachable,
    /// Success status but no usable text.
    EmptyResponse,
    /// Another submission is still pending on the same session.
    Busy,
}

impl FailureKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unreachable => "unreachable",
            Self::EmptyResponse => "empty-response",
            Self::Busy => "busy",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// MESSAGE TYPES
// =============================================================================

/// Author of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// A text segment of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

/// A single message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Message {
    #[must_use]
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self { role, parts: vec![Part { text: text.into() }] }
    }

    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    #[must_use]
    pub fn model(text: impl Into<String>) -> Self {
        Self::new(Role::Model, text)
    }

    /// Concatenated text of all parts.
    #[must_use]
    pub fn text(&self) -> String {
        self.parts.iter().map(|p| p.text.as_str()).collect()
    }
}

// =============================================================================
// ASSISTANT CHAT TRAIT
// =============================================================================

/// Async seam for the remote model. Enables mocking in tests.
#[async_trait::async_trait]
pub trait AssistantChat: Send + Sync {
    /// Send the full ordered message list and return the reply text.
    ///
    /// # Errors
    ///
    /// Returns an [`AssistantError`] if the proxy is unreachable, answers
    /// with a non-success status, or returns no usable text.
    async fn complete(&self, messages: &[Message]) -> Result<String, AssistantError>;
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
