//! Chat display state.
//!
//! DESIGN
//! ======
//! `ChatState` is what the chat panel shows: an ordered list of display
//! messages, including error notices that never enter the assistant's
//! history. It is cheap to clone; clones share the same buffer so the reveal
//! task and the renderer see one view.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::reveal::RevealSink;

// =============================================================================
// DISPLAY MESSAGE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayRole {
    User,
    Model,
    Error,
}

impl DisplayRole {
    /// Speaker label shown before the message.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::User => "You",
            Self::Model => "AI",
            Self::Error => "Error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayMessage {
    pub id: Uuid,
    pub role: DisplayRole,
    pub content: String,
}

// =============================================================================
// CHAT STATE
// =============================================================================

#[derive(Clone, Default)]
pub struct ChatState {
    messages: Arc<Mutex<Vec<DisplayMessage>>>,
}

impl ChatState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, role: DisplayRole, content: impl Into<String>) -> Uuid {
        let id = Uuid::new_v4();
        self.lock().push(DisplayMessage { id, role, content: content.into() });
        id
    }

    #[must_use]
    pub fn messages(&self) -> Vec<DisplayMessage> {
        self.lock().clone()
    }

    #[must_use]
    pub fn last(&self) -> Option<DisplayMessage> {
        self.lock().last().cloned()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<DisplayMessage>> {
        self.messages.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RevealSink for ChatState {
    /// Grow the trailing model message; anything else at the tail is left alone.
    fn on_unit(&self, unit: &str) {
        let mut messages = self.lock();
        if let Some(last) = messages.last_mut() {
            if last.role == DisplayRole::Model {
                last.content.push_str(unit);
            }
        }
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
