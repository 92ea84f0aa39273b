use axum::{body::to_bytes, body::Body, http::Request};
use promptdeck_ai::test_utils::ScriptedCompletionClient;
use promptdeck_server::{
    api::{app_router, spa_fallback},
    build_state_with_completion_client,
    config::Config,
};
use std::sync::Arc;
use tempfile::tempdir;
use tower::ServiceExt;

#[tokio::test]
async fn serves_index_html_for_unknown_route() {
    let db_dir = tempdir().unwrap();
    let static_dir = tempdir().unwrap();
    std::fs::write(static_dir.path().join("index.html"), "<html>SPA</html>").unwrap();

    let config = Config {
        db_path: db_dir.path().join("test.db").to_string_lossy().to_string(),
        static_dir: static_dir.path().to_string_lossy().to_string(),
        ..Config::default()
    };
    let state = build_state_with_completion_client(
        &config,
        Arc::new(ScriptedCompletionClient::default()),
    )
    .await
    .unwrap();
    let app = app_router(state, &config).fallback_service(spa_fallback(&config));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/conversations/abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), axum::http::StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(body, "<html>SPA</html>".as_bytes());

    // API routes still win over the fallback.
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(body, "ok".as_bytes());
}
