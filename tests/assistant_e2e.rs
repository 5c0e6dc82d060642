//! Session → proxy client → HTTP endpoint, with an in-process proxy.

use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use sortvision::llm::{AssistantConfig, ContextSnapshot, FailureKind, Message, ProxyClient};
use sortvision::services::session::{AssistantReply, AssistantSession, UNREACHABLE_MESSAGE};

type Captured = Arc<Mutex<Vec<Value>>>;

async fn spawn_proxy(reply: fn() -> Response) -> (ProxyClient, Captured) {
    let captured: Captured = Arc::default();
    let sink = captured.clone();
    let app = Router::new().route(
        "/api/gemini",
        post(move |Json(body): Json<Value>| {
            let sink = sink.clone();
            async move {
                sink.lock().unwrap().push(body);
                reply()
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = ProxyClient::new(&AssistantConfig::with_base_url(&format!("http://{addr}"))).unwrap();
    (client, captured)
}

#[tokio::test]
async fn context_is_embedded_in_the_posted_preamble() {
    let (client, captured) = spawn_proxy(|| Json(json!({ "text": "Two swaps so far." })).into_response()).await;
    let session = AssistantSession::new(Arc::new(client), None);

    let reply = session
        .submit("how many swaps so far?", Some(ContextSnapshot::new("Bubble Sort", 3, &[5, 3, 8])))
        .await;

    assert_eq!(reply, AssistantReply::Response("Two swaps so far.".into()));
    let body = captured.lock().unwrap()[0].clone();
    let preamble = body["messages"][0]["parts"][0]["text"].as_str().unwrap().to_string();
    assert!(preamble.contains("Algorithm: Bubble Sort"));
    assert!(preamble.contains("Step: 3"));
    assert!(preamble.contains("Array: [5, 3, 8]"));
    assert_eq!(body["messages"][1], json!({ "role": "user", "parts": [{ "text": "how many swaps so far?" }] }));
    assert_eq!(
        session.history(),
        vec![Message::user("how many swaps so far?"), Message::model("Two swaps so far.")]
    );
}

#[tokio::test]
async fn http_500_is_unreachable_and_history_is_unchanged() {
    let (client, _) = spawn_proxy(|| (StatusCode::INTERNAL_SERVER_ERROR, "upstream down").into_response()).await;
    let session = AssistantSession::new(Arc::new(client), None);

    let reply = session.submit("q", None).await;

    assert_eq!(
        reply,
        AssistantReply::Error { kind: FailureKind::Unreachable, message: UNREACHABLE_MESSAGE.into() }
    );
    assert!(session.is_empty());
}

#[tokio::test]
async fn missing_text_is_empty_response_and_history_is_unchanged() {
    let (client, _) = spawn_proxy(|| Json(json!({})).into_response()).await;
    let session = AssistantSession::new(Arc::new(client), None);

    let reply = session.submit("q", None).await;

    assert!(matches!(reply, AssistantReply::Error { kind: FailureKind::EmptyResponse, .. }));
    assert!(session.is_empty());
}

#[tokio::test]
async fn history_is_replayed_on_the_next_request() {
    let (client, captured) = spawn_proxy(|| Json(json!({ "text": "ok" })).into_response()).await;
    let session = AssistantSession::new(Arc::new(client), None);

    session.submit("first", None).await;
    session.submit("second", None).await;

    let bodies = captured.lock().unwrap();
    let roles: Vec<&str> = bodies[1]["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["role"].as_str().unwrap())
        .collect();
    assert_eq!(roles, vec!["user", "user", "model", "user"]);
    assert_eq!(bodies[1]["messages"][3]["parts"][0]["text"], "second");
}
