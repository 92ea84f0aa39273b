//! HTTP client for the PromptDeck API.

use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use promptdeck_core::chat::{ChatExchange, ChatRequest, ModelInfo};
use promptdeck_core::conversations::{Conversation, Message, NewConversation};
use promptdeck_core::prompts::{NewPrompt, Prompt, PromptUpdate};

use crate::errors::{ClientError, Result};
use crate::stream::{consume_stream, StreamHandler, StreamOutcome};

/// Connect timeout. Responses have no total timeout because a streamed
/// reply stays open for as long as the model keeps generating.
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default base URL of a locally running server.
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

// ─────────────────────────────────────────────────────────────────────────────
// Response types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
}

/// Builds a status error from a non-success body, preferring the server's
/// `message` field.
fn status_error(status: reqwest::StatusCode, body: &str) -> ClientError {
    let message = serde_json::from_str::<ApiErrorResponse>(body)
        .ok()
        .and_then(|err| err.message.or(err.error))
        .unwrap_or_else(|| {
            let snippet: String = body.chars().take(200).collect();
            if snippet.is_empty() {
                format!("HTTP {}", status)
            } else {
                snippet
            }
        });
    ClientError::Status {
        status: status.as_u16(),
        message,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// API Client
// ─────────────────────────────────────────────────────────────────────────────

/// Typed client for the `/api` routes.
///
/// ```ignore
/// let client = ApiClient::new("http://localhost:8080/api")?;
/// let prompts = client.list_prompts().await?;
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        debug!("[PromptDeckApi] GET {}", url);

        let response = self
            .client
            .get(&url)
            .headers(Self::headers())
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn send_json<B, T>(&self, method: reqwest::Method, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        debug!("[PromptDeckApi] {} {}", method, url);

        let response = self
            .client
            .request(method, &url)
            .headers(Self::headers())
            .json(body)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn delete(&self, path: &str) -> Result<DeleteResponse> {
        let url = self.url(path);
        debug!("[PromptDeckApi] DELETE {}", url);

        let response = self
            .client
            .delete(&url)
            .headers(Self::headers())
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        serde_json::from_str(&body)
            .map_err(|e| ClientError::Decode(format!("{} - {}", e, body)))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Prompts
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn list_prompts(&self) -> Result<Vec<Prompt>> {
        self.get("/prompts").await
    }

    pub async fn get_prompt(&self, id: &str) -> Result<Prompt> {
        self.get(&format!("/prompts/{}", id)).await
    }

    pub async fn create_prompt(&self, prompt: &NewPrompt) -> Result<Prompt> {
        self.send_json(reqwest::Method::POST, "/prompts", prompt)
            .await
    }

    pub async fn update_prompt(&self, id: &str, update: &PromptUpdate) -> Result<Prompt> {
        self.send_json(reqwest::Method::PUT, &format!("/prompts/{}", id), update)
            .await
    }

    pub async fn delete_prompt(&self, id: &str) -> Result<DeleteResponse> {
        self.delete(&format!("/prompts/{}", id)).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Conversations
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn list_conversations(&self) -> Result<Vec<Conversation>> {
        self.get("/conversations").await
    }

    pub async fn get_conversation(&self, id: &str) -> Result<Conversation> {
        self.get(&format!("/conversations/{}", id)).await
    }

    pub async fn create_conversation(
        &self,
        conversation: &NewConversation,
    ) -> Result<Conversation> {
        self.send_json(reqwest::Method::POST, "/conversations", conversation)
            .await
    }

    pub async fn delete_conversation(&self, id: &str) -> Result<DeleteResponse> {
        self.delete(&format!("/conversations/{}", id)).await
    }

    pub async fn list_messages(&self, conversation_id: &str) -> Result<Vec<Message>> {
        self.get(&format!("/conversations/{}/messages", conversation_id))
            .await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Chat
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        self.get("/models").await
    }

    /// Runs one turn and waits for the whole reply.
    pub async fn send_chat_message(&self, request: &ChatRequest) -> Result<ChatExchange> {
        validate_request(request)?;
        self.send_json(reqwest::Method::POST, "/chat", request).await
    }

    /// Runs one turn over the event stream, feeding frames to `handler`.
    ///
    /// Failures before the stream opens (validation, transport, or a JSON
    /// error response) are reported through `handler.on_error` and returned
    /// as `Err`. Failures after that are reported through `handler.on_error`
    /// and the returned outcome.
    pub async fn stream_chat_message<H>(
        &self,
        request: &ChatRequest,
        handler: &mut H,
    ) -> Result<StreamOutcome>
    where
        H: StreamHandler + ?Sized,
    {
        let response = match self.open_stream(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!("[PromptDeckApi] Failed to start streaming chat: {}", e);
                handler.on_error(&e.to_string());
                return Err(e);
            }
        };

        Ok(consume_stream(response.bytes_stream(), handler).await)
    }

    async fn open_stream(&self, request: &ChatRequest) -> Result<reqwest::Response> {
        validate_request(request)?;

        let url = self.url("/chat/stream");
        debug!("[PromptDeckApi] POST {} (stream)", url);

        let response = self
            .client
            .post(&url)
            .headers(Self::headers())
            .header(ACCEPT, "text/event-stream")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(status_error(status, &body));
        }
        Ok(response)
    }
}

fn validate_request(request: &ChatRequest) -> Result<()> {
    request
        .validate()
        .map_err(|e| ClientError::InvalidInput(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view_state::ChatViewState;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:8080/api/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/api");
        assert_eq!(client.url("/prompts"), "http://localhost:8080/api/prompts");
    }

    #[test]
    fn test_status_error_prefers_message_field() {
        let err = status_error(
            reqwest::StatusCode::NOT_FOUND,
            r#"{"code":404,"message":"Conversation c9 not found"}"#,
        );
        match err {
            ClientError::Status { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Conversation c9 not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_status_error_falls_back_to_body() {
        let err = status_error(reqwest::StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(err.status(), Some(502));
        assert_eq!(err.to_string(), "API error 502: upstream down");

        let err = status_error(reqwest::StatusCode::INTERNAL_SERVER_ERROR, "");
        assert_eq!(
            err.to_string(),
            "API error 500: HTTP 500 Internal Server Error"
        );
    }

    #[tokio::test]
    async fn test_blank_message_rejected_before_sending() {
        // Nothing listens on this port; validation must fail first.
        let client = ApiClient::new("http://127.0.0.1:9").unwrap();
        let err = client
            .send_chat_message(&ChatRequest::new("c1", "   "))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_fails_the_view() {
        let client = ApiClient::new("http://127.0.0.1:9").unwrap();
        let mut view = ChatViewState::default();

        let err = client
            .stream_chat_message(&ChatRequest::new("c1", "hello"), &mut view)
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Http(_)));
        match view {
            ChatViewState::Failed { message } => assert_eq!(message, err.to_string()),
            other => panic!("unexpected view: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_stream_request_fails_the_view() {
        let client = ApiClient::new("http://127.0.0.1:9").unwrap();
        let mut view = ChatViewState::default();

        let err = client
            .stream_chat_message(&ChatRequest::new("", "hello"), &mut view)
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::InvalidInput(_)));
        assert!(matches!(view, ChatViewState::Failed { .. }));
    }
}
