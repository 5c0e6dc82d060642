use super::*;
use crate::llm::types::{AssistantError, Role};
use crate::services::test_helpers::{GatedAssistant, ScriptedAssistant};
use std::time::Duration;

fn accessor(ctx: ContextSnapshot) -> Option<ContextAccessor> {
    Some(Arc::new(move || ctx.clone()))
}

// =========================================================================
// success path
// =========================================================================

#[tokio::test]
async fn success_appends_user_then_model() {
    let mock = ScriptedAssistant::replying("Three swaps so far.");
    let session = AssistantSession::new(mock.clone(), None);

    let reply = session.submit("how many swaps so far?", None).await;

    assert_eq!(reply, AssistantReply::Response("Three swaps so far.".into()));
    let history = session.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0], Message::user("how many swaps so far?"));
    assert_eq!(history[1], Message::model("Three swaps so far."));
}

#[tokio::test]
async fn request_carries_preamble_history_and_query() {
    let mock = ScriptedAssistant::new(vec![Ok("first answer".into()), Ok("second answer".into())]);
    let session = AssistantSession::new(mock.clone(), None);

    session.submit("first?", None).await;
    session
        .submit("second?", Some(ContextSnapshot::new("Bubble Sort", 3, &[5, 3, 8])))
        .await;

    let request = mock.last_request();
    assert_eq!(request.len(), 4);
    let preamble = request[0].text();
    assert!(preamble.contains("Algorithm: Bubble Sort"));
    assert!(preamble.contains("Step: 3"));
    assert!(preamble.contains("Array: [5, 3, 8]"));
    assert_eq!(request[1], Message::user("first?"));
    assert_eq!(request[2], Message::model("first answer"));
    assert_eq!(request[3], Message::user("second?"));
    assert_eq!(session.len(), 4);
}

// =========================================================================
// context resolution
// =========================================================================

#[tokio::test]
async fn accessor_supplies_context_when_no_override() {
    let mock = ScriptedAssistant::replying("ok");
    let session = AssistantSession::new(mock.clone(), accessor(ContextSnapshot::new("Heap Sort", 9, &[1, 2])));

    session.submit("where are we?", None).await;

    let preamble = mock.last_request()[0].text();
    assert!(preamble.contains("Algorithm: Heap Sort"));
    assert!(preamble.contains("Step: 9"));
}

#[tokio::test]
async fn override_wins_over_accessor() {
    let mock = ScriptedAssistant::replying("ok");
    let session = AssistantSession::new(mock.clone(), accessor(ContextSnapshot::new("Heap Sort", 9, &[1, 2])));

    session
        .submit("where are we?", Some(ContextSnapshot::new("Insertion Sort", 1, &[4])))
        .await;

    let preamble = mock.last_request()[0].text();
    assert!(preamble.contains("Algorithm: Insertion Sort"));
    assert!(!preamble.contains("Heap Sort"));
}

#[tokio::test]
async fn no_context_source_uses_fallbacks() {
    let mock = ScriptedAssistant::replying("ok");
    let session = AssistantSession::new(mock.clone(), None);

    session.submit("hi", None).await;

    let preamble = mock.last_request()[0].text();
    assert!(preamble.contains("Algorithm: Unknown"));
    assert!(preamble.contains("Array: [N/A]"));
}

// =========================================================================
// failure path
// =========================================================================

#[tokio::test]
async fn unreachable_leaves_history_unchanged() {
    let mock = ScriptedAssistant::new(vec![Err(AssistantError::Status { status: 500, body: String::new() })]);
    let session = AssistantSession::new(mock, None);

    let reply = session.submit("q", None).await;

    assert_eq!(
        reply,
        AssistantReply::Error { kind: FailureKind::Unreachable, message: UNREACHABLE_MESSAGE.into() }
    );
    assert!(session.is_empty());
}

#[tokio::test]
async fn empty_response_leaves_history_unchanged() {
    let mock = ScriptedAssistant::new(vec![Ok("seed".into()), Err(AssistantError::EmptyResponse)]);
    let session = AssistantSession::new(mock, None);
    session.submit("first", None).await;

    let reply = session.submit("second", None).await;

    assert!(matches!(reply, AssistantReply::Error { kind: FailureKind::EmptyResponse, ref message } if message == UNREACHABLE_MESSAGE));
    assert_eq!(session.len(), 2);
}

// =========================================================================
// pending state
// =========================================================================

#[tokio::test]
async fn overlapping_submit_is_rejected_as_busy() {
    let mock = GatedAssistant::new("slow answer");
    let gate = mock.gate.clone();
    let session = Arc::new(AssistantSession::new(mock, None));

    let first = {
        let session = session.clone();
        tokio::spawn(async move { session.submit("first", None).await })
    };
    while !session.is_pending() {
        tokio::task::yield_now().await;
    }

    let second = session.submit("second", None).await;
    assert!(matches!(second, AssistantReply::Error { kind: FailureKind::Busy, .. }));

    gate.notify_one();
    assert_eq!(first.await.unwrap(), AssistantReply::Response("slow answer".into()));
    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(session.history().iter().map(|m| m.role).collect::<Vec<_>>(), vec![Role::User, Role::Model]);
}

#[tokio::test]
async fn dropped_submit_returns_to_idle_without_history() {
    let mock = GatedAssistant::new("never");
    let session = AssistantSession::new(mock, None);

    let result = tokio::time::timeout(Duration::from_millis(10), session.submit("q", None)).await;

    assert!(result.is_err());
    assert_eq!(session.state(), SessionState::Idle);
    assert!(session.is_empty());
}

#[tokio::test]
async fn clear_starts_new_conversation() {
    let mock = ScriptedAssistant::replying("ok");
    let session = AssistantSession::new(mock, None);
    session.submit("q", None).await;

    session.clear();
    assert!(session.is_empty());
}
