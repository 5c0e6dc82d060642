//! Assistant proxy client.
//!
//! Thin HTTP wrapper for `POST <base>/api/gemini`. The proxy holds the
//! provider credentials; this side only ships messages and reads back
//! `{ "text": ... }`. Pure parsing in `parse_response` for testability.

use tracing::{debug, warn};

use super::config::AssistantConfig;
use super::prompt::ProxyRequest;
use super::types::{AssistantChat, AssistantError, Message};

// =============================================================================
// CLIENT
// =============================================================================

pub struct ProxyClient {
    http: reqwest::Client,
    endpoint: String,
}

impl ProxyClient {
    /// # Errors
    ///
    /// Returns [`AssistantError::HttpClientBuild`] if the HTTP client fails to build.
    pub fn new(config: &AssistantConfig) -> Result<Self, AssistantError> {
        let mut builder = reqwest::Client::builder().connect_timeout(config.connect_timeout);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| AssistantError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, endpoint: config.endpoint() })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl AssistantChat for ProxyClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, AssistantError> {
        debug!(endpoint = %self.endpoint, messages = messages.len(), "assistant: sending request");

        let response = self
            .http
            .post(&self.endpoint)
            .json(&ProxyRequest { messages })
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "assistant: transport failure");
                AssistantError::Unreachable(e.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AssistantError::Unreachable(e.to_string()))?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "assistant: non-success status");
            return Err(AssistantError::Status { status: status.as_u16(), body });
        }

        parse_response(&body)
    }
}

// =============================================================================
// PARSING
// =============================================================================

#[derive(serde::Deserialize)]
struct ProxyResponse {
    #[serde(default)]
    text: Option<serde_json::Value>,
}

fn parse_response(body: &str) -> Result<String, AssistantError> {
    let parsed: ProxyResponse = serde_json::from_str(body).map_err(|e| {
        warn!(error = %e, "assistant: response body is not JSON");
        AssistantError::EmptyResponse
    })?;

    match parsed.text {
        Some(serde_json::Value::String(text)) if !text.is_empty() => Ok(text),
        _ => Err(AssistantError::EmptyResponse),
    }
}

#[cfg(test)]
#[path = "proxy_test.rs"]
mod tests;
