#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use promptdeck_ai::test_utils::ScriptedCompletionClient;
use promptdeck_server::{api::app_router, build_state_with_completion_client, config::Config};
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub client: Arc<ScriptedCompletionClient>,
    _db_dir: TempDir,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).unwrap()
    }
}

pub fn test_config(db_dir: &TempDir) -> Config {
    Config {
        db_path: db_dir.path().join("test.db").to_string_lossy().to_string(),
        ..Config::default()
    }
}

pub async fn spawn_app(client: ScriptedCompletionClient) -> TestApp {
    let db_dir = tempdir().unwrap();
    let config = test_config(&db_dir);
    let client = Arc::new(client);
    let state = build_state_with_completion_client(&config, client.clone())
        .await
        .unwrap();
    TestApp {
        router: app_router(state, &config),
        client,
        _db_dir: db_dir,
    }
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> TestResponse {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: serde_json::Value) -> TestResponse {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn create_conversation(&self, title: &str, model: &str) -> String {
        let response = self
            .post(
                "/api/conversations",
                serde_json::json!({ "title": title, "model": model }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
        response.json()["id"].as_str().unwrap().to_string()
    }

    pub async fn messages(&self, conversation_id: &str) -> Vec<serde_json::Value> {
        let response = self
            .get(&format!("/api/conversations/{}/messages", conversation_id))
            .await;
        assert_eq!(response.status, StatusCode::OK);
        response.json().as_array().unwrap().clone()
    }
}
