//! Assistant session — one conversation's history plus its remote calls.
//!
//! DESIGN
//! ======
//! `submit` resolves the effective context (explicit override first, then
//! the host's accessor), formats the request, and calls the injected
//! `AssistantChat`. History is append-only and written only after a reply
//! arrives, so a failed or abandoned call leaves it untouched.
//!
//! The session is `Idle` or `Pending`. A submit that arrives while another
//! is pending is turned away with a `busy` reply rather than interleaving
//! two requests against the same history. The pending flag is cleared by a
//! drop guard, which also covers callers that drop the future mid-flight.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{info, warn};

use crate::llm::prompt::{ContextSnapshot, build_messages};
use crate::llm::types::{AssistantChat, FailureKind, Message};

pub const UNREACHABLE_MESSAGE: &str = "Unable to reach assistant right now. Try again later.";
pub const BUSY_MESSAGE: &str = "Assistant is still answering. Please wait.";

/// Pull-based context source owned by the host application.
pub type ContextAccessor = Arc<dyn Fn() -> ContextSnapshot + Send + Sync>;

// =============================================================================
// TYPES
// =============================================================================

/// Tagged result of a submission. Errors never escape the session as `Err`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssistantReply {
    Response(String),
    Error { kind: FailureKind, message: String },
}

impl AssistantReply {
    fn failure(kind: FailureKind) -> Self {
        let message = match kind {
            FailureKind::Busy => BUSY_MESSAGE,
            FailureKind::Unreachable | FailureKind::EmptyResponse => UNREACHABLE_MESSAGE,
        };
        Self::Error { kind, message: message.to_string() }
    }

    #[must_use]
    pub fn is_response(&self) -> bool {
        matches!(self, Self::Response(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Pending,
}

// =============================================================================
// SESSION
// =============================================================================

pub struct AssistantSession {
    client: Arc<dyn AssistantChat>,
    context: Option<ContextAccessor>,
    history: Mutex<Vec<Message>>,
    pending: AtomicBool,
}

struct PendingGuard<'a>(&'a AtomicBool);

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl AssistantSession {
    #[must_use]
    pub fn new(client: Arc<dyn AssistantChat>, context: Option<ContextAccessor>) -> Self {
        Self { client, context, history: Mutex::new(Vec::new()), pending: AtomicBool::new(false) }
    }

    /// Current context as the accessor reports it (empty when there is none).
    #[must_use]
    pub fn current_context(&self) -> ContextSnapshot {
        self.context.as_ref().map(|get| get()).unwrap_or_default()
    }

    /// Send `query` to the assistant and record the exchange on success.
    pub async fn submit(&self, query: &str, context_override: Option<ContextSnapshot>) -> AssistantReply {
        if self
            .pending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!(query_len = query.len(), "assistant: submit rejected while pending");
            return AssistantReply::failure(FailureKind::Busy);
        }
        let _pending = PendingGuard(&self.pending);

        let context = context_override.unwrap_or_else(|| self.current_context());
        info!(
            algorithm = context.algorithm_text(),
            step = %context.step_text(),
            query_len = query.len(),
            "assistant: query received"
        );

        let user_message = Message::user(query);
        let messages = build_messages(&self.lock_history(), query, &context);

        match self.client.complete(&messages).await {
            Ok(text) => {
                let mut history = self.lock_history();
                history.push(user_message);
                history.push(Message::model(text.clone()));
                info!(reply_len = text.len(), history_len = history.len(), "assistant: reply recorded");
                AssistantReply::Response(text)
            }
            Err(e) => {
                warn!(code = e.error_code(), kind = %e.kind(), error = %e, "assistant: request failed");
                AssistantReply::failure(e.kind())
            }
        }
    }

    /// Copy of the committed history in chronological order.
    #[must_use]
    pub fn history(&self) -> Vec<Message> {
        self.lock_history().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock_history().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock_history().is_empty()
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        if self.pending.load(Ordering::Acquire) { SessionState::Pending } else { SessionState::Idle }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.state() == SessionState::Pending
    }

    /// Start a fresh conversation.
    pub fn clear(&self) {
        self.lock_history().clear();
    }

    fn lock_history(&self) -> MutexGuard<'_, Vec<Message>> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
