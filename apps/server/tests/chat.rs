mod common;

use axum::http::{header, StatusCode};
use common::spawn_app;
use promptdeck_ai::test_utils::ScriptedCompletionClient;
use promptdeck_core::chat::{ModelId, StreamChunk, StreamFrame};
use serde_json::json;

fn encoded(frames: &[StreamFrame]) -> String {
    frames.iter().map(|f| f.encode().unwrap()).collect()
}

#[tokio::test]
async fn streams_cumulative_frames_and_persists_reply_once() {
    let app = spawn_app(ScriptedCompletionClient::with_chunks([
        StreamChunk::partial("H"),
        StreamChunk::partial("He"),
        StreamChunk::finished("Hello"),
    ]))
    .await;
    let id = app.create_conversation("Greeting", "gpt-5").await;

    let response = app
        .post(
            "/api/chat/stream",
            json!({ "conversationId": id, "message": "hello" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.headers[header::CONTENT_TYPE],
        "text/event-stream"
    );
    assert_eq!(response.headers[header::CACHE_CONTROL], "no-cache");
    assert_eq!(response.headers["x-accel-buffering"], "no");
    assert_eq!(
        response.text(),
        encoded(&[
            StreamChunk::partial("H").into(),
            StreamChunk::partial("He").into(),
            StreamChunk::finished("Hello").into(),
        ])
    );

    let messages = app.messages(&id).await;
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[0]["content"], "hello");
    assert_eq!(messages[1]["role"], "assistant");
    assert_eq!(messages[1]["content"], "Hello");

    let requests = app.client.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].model, ModelId::Gpt5);
    assert_eq!(requests[0].history.last().unwrap().content, "hello");
}

#[tokio::test]
async fn request_model_overrides_conversation_model() {
    let app = spawn_app(ScriptedCompletionClient::with_deltas(&["ok"])).await;
    let id = app.create_conversation("Override", "gpt-5").await;

    let response = app
        .post(
            "/api/chat/stream",
            json!({ "conversationId": id, "message": "hi", "model": "gpt-4o-mini" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(app.client.requests()[0].model, ModelId::Gpt4oMini);
}

#[tokio::test]
async fn unknown_conversation_is_rejected_before_streaming() {
    let app = spawn_app(ScriptedCompletionClient::with_deltas(&["never"])).await;

    let response = app
        .post(
            "/api/chat/stream",
            json!({ "conversationId": "ghost", "message": "hello" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(
        response.headers[header::CONTENT_TYPE],
        "application/json"
    );
    assert_eq!(response.json()["code"], 404);
    assert!(app.client.requests().is_empty());
    assert!(app.messages("ghost").await.is_empty());
}

#[tokio::test]
async fn missing_fields_are_a_bad_request() {
    let app = spawn_app(ScriptedCompletionClient::default()).await;

    let response = app
        .post("/api/chat/stream", json!({ "message": "  " }))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let details = response.json()["details"].clone();
    assert_eq!(
        details,
        json!(["conversationId is required", "message is required"])
    );
}

#[tokio::test]
async fn upstream_failure_mid_stream_sends_error_frame_and_keeps_user_turn() {
    let app = spawn_app(
        ScriptedCompletionClient::with_chunks([StreamChunk::partial("Hel")])
            .then_fail("OpenAI streaming error: connection reset"),
    )
    .await;
    let id = app.create_conversation("Flaky", "gpt-4").await;

    let response = app
        .post(
            "/api/chat/stream",
            json!({ "conversationId": id, "message": "hello" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.text(),
        encoded(&[
            StreamChunk::partial("Hel").into(),
            StreamFrame::error("Streaming failed: OpenAI streaming error: connection reset"),
        ])
    );

    let messages = app.messages(&id).await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["role"], "user");
}

#[tokio::test]
async fn upstream_failure_on_open_sends_single_error_frame() {
    let app = spawn_app(ScriptedCompletionClient::failing_to_open("OpenAI API error: 401")).await;
    let id = app.create_conversation("Denied", "gpt-5").await;

    let response = app
        .post(
            "/api/chat/stream",
            json!({ "conversationId": id, "message": "hello" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.text(),
        encoded(&[StreamFrame::error(
            "Streaming failed: OpenAI API error: 401"
        )])
    );
    assert_eq!(app.messages(&id).await.len(), 1);
}

#[tokio::test]
async fn non_streaming_chat_returns_both_messages() {
    let app = spawn_app(ScriptedCompletionClient::default().with_reply("Hi there")).await;
    let id = app.create_conversation("Plain", "gpt-5").await;

    let response = app
        .post("/api/chat", json!({ "conversationId": id, "message": "hello" }))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["userMessage"]["content"], "hello");
    assert_eq!(body["userMessage"]["role"], "user");
    assert_eq!(body["assistantMessage"]["content"], "Hi there");
    assert_eq!(body["assistantMessage"]["conversationId"], id.as_str());
}

#[tokio::test]
async fn non_streaming_upstream_failure_is_a_server_error() {
    let client = ScriptedCompletionClient::default().with_failing_reply("OpenAI API error: 500");
    let app = spawn_app(client).await;
    let id = app.create_conversation("Broken", "gpt-5").await;

    let response = app
        .post("/api/chat", json!({ "conversationId": id, "message": "hello" }))
        .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json()["code"], 500);

    let messages = app.messages(&id).await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["role"], "user");
}
