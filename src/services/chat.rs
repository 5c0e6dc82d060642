//! Chat panel — input → session → reveal → history.
//!
//! The panel owns the display state and the revealer. Replies are shown
//! through the reveal animation; failures become an `Error` display message
//! carrying the session's user-facing text. Dropping the panel drops the
//! revealer, which cancels any reveal still running.

use std::sync::Arc;

use tracing::debug;

use super::reveal::{RevealHandle, Revealer};
use super::session::{AssistantReply, AssistantSession};
use crate::llm::types::FailureKind;
use crate::state::{ChatState, DisplayRole};

pub enum SendOutcome {
    /// Blank input; nothing happened.
    Ignored,
    /// The reply is being revealed.
    Revealing(RevealHandle),
    /// The session reported a failure, already shown as an error message.
    Failed(FailureKind),
}

pub struct ChatPanel {
    session: Arc<AssistantSession>,
    revealer: Revealer,
    state: ChatState,
}

impl ChatPanel {
    /// `revealer` should feed `state` (directly or through a wrapping sink).
    #[must_use]
    pub fn new(session: Arc<AssistantSession>, revealer: Revealer, state: ChatState) -> Self {
        Self { session, revealer, state }
    }

    #[must_use]
    pub fn state(&self) -> &ChatState {
        &self.state
    }

    #[must_use]
    pub fn session(&self) -> &AssistantSession {
        &self.session
    }

    /// Submit one line of user input.
    pub async fn handle_send(&self, input: &str) -> SendOutcome {
        if input.trim().is_empty() {
            return SendOutcome::Ignored;
        }

        self.state.push(DisplayRole::User, input);
        let context = self.session.current_context();
        debug!(algorithm = context.algorithm_text(), "chat: sending with current context");

        match self.session.submit(input, Some(context)).await {
            AssistantReply::Response(text) => {
                // The old reveal must stop before the new model message becomes the target.
                self.revealer.cancel();
                self.state.push(DisplayRole::Model, "");
                SendOutcome::Revealing(self.revealer.start(input, &text))
            }
            AssistantReply::Error { kind, message } => {
                self.state.push(DisplayRole::Error, message);
                SendOutcome::Failed(kind)
            }
        }
    }

    /// Stop any reveal in progress, e.g. when the panel is hidden.
    pub fn close(&self) {
        self.revealer.cancel();
    }
}

#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;
