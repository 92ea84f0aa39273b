mod common;

use axum::http::StatusCode;
use common::spawn_app;
use promptdeck_ai::test_utils::ScriptedCompletionClient;

#[tokio::test]
async fn healthz_works() {
    let app = spawn_app(ScriptedCompletionClient::default()).await;

    let response = app.get("/api/healthz").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text(), "ok");
    assert!(response.headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn lists_models_with_display_names() {
    let app = spawn_app(ScriptedCompletionClient::default()).await;

    let response = app.get("/api/models").await;

    assert_eq!(response.status, StatusCode::OK);
    let models = response.json();
    let models = models.as_array().unwrap();
    assert_eq!(models.len(), 5);
    assert_eq!(models[0]["id"], "gpt-5");
    assert_eq!(models[0]["name"], "GPT-5");
    assert_eq!(models[4]["id"], "gpt-3.5-turbo");
}
