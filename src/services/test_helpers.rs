//! Shared mocks for service tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use crate::llm::types::{AssistantChat, AssistantError, Message};

// =========================================================================
// ScriptedAssistant
// =========================================================================

/// Replays canned results in order and records every request it sees.
pub struct ScriptedAssistant {
    responses: Mutex<VecDeque<Result<String, AssistantError>>>,
    pub requests: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedAssistant {
    pub fn new(responses: Vec<Result<String, AssistantError>>) -> Arc<Self> {
        Arc::new(Self { responses: Mutex::new(responses.into()), requests: Mutex::new(Vec::new()) })
    }

    pub fn replying(text: &str) -> Arc<Self> {
        Self::new(vec![Ok(text.to_string())])
    }

    pub fn last_request(&self) -> Vec<Message> {
        self.requests.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl AssistantChat for ScriptedAssistant {
    async fn complete(&self, messages: &[Message]) -> Result<String, AssistantError> {
        self.requests.lock().unwrap().push(messages.to_vec());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("done".into()))
    }
}

// =========================================================================
// GatedAssistant
// =========================================================================

/// Holds every request open until the gate is notified.
pub struct GatedAssistant {
    pub gate: Arc<Notify>,
    reply: String,
}

impl GatedAssistant {
    pub fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self { gate: Arc::new(Notify::new()), reply: reply.to_string() })
    }
}

#[async_trait::async_trait]
impl AssistantChat for GatedAssistant {
    async fn complete(&self, _messages: &[Message]) -> Result<String, AssistantError> {
        self.gate.notified().await;
        Ok(self.reply.clone())
    }
}
