//! Scripted completion client and mock environment for tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::stream;
use futures::StreamExt;

use promptdeck_core::chat::{ChatTurn, ModelId, StreamChunk};
use promptdeck_core::conversations::ConversationRepositoryTrait;
use promptdeck_core::test_utils::InMemoryConversationRepository;

use crate::completion::{CompletionClientTrait, CompletionStream};
use crate::env::AiEnvironment;
use crate::error::AiError;

/// One element a scripted stream produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptStep {
    Chunk(StreamChunk),
    Fail(String),
}

/// A completion request as the client saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub history: Vec<ChatTurn>,
    pub model: ModelId,
}

/// Completion client that replays a fixed script and records every request.
pub struct ScriptedCompletionClient {
    steps: Vec<ScriptStep>,
    open_error: Option<String>,
    reply: Result<String, String>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl Default for ScriptedCompletionClient {
    fn default() -> Self {
        Self {
            steps: Vec::new(),
            open_error: None,
            reply: Ok(String::new()),
            requests: Mutex::new(Vec::new()),
        }
    }
}

impl ScriptedCompletionClient {
    /// Streams exactly these chunks.
    pub fn with_chunks(chunks: impl IntoIterator<Item = StreamChunk>) -> Self {
        Self {
            steps: chunks.into_iter().map(ScriptStep::Chunk).collect(),
            ..Default::default()
        }
    }

    /// Streams the cumulative text of `deltas` followed by a finished chunk,
    /// the way a well-behaved provider would.
    pub fn with_deltas(deltas: &[&str]) -> Self {
        let mut content = String::new();
        let mut chunks = Vec::with_capacity(deltas.len() + 1);
        for delta in deltas {
            content.push_str(delta);
            chunks.push(StreamChunk::partial(content.clone()));
        }
        chunks.push(StreamChunk::finished(content));
        Self::with_chunks(chunks)
    }

    /// Fails when the stream is opened.
    pub fn failing_to_open(message: impl Into<String>) -> Self {
        Self {
            open_error: Some(message.into()),
            ..Default::default()
        }
    }

    /// Appends a mid-stream failure after the scripted chunks.
    pub fn then_fail(mut self, message: impl Into<String>) -> Self {
        self.steps.push(ScriptStep::Fail(message.into()));
        self
    }

    /// Answer returned by `complete`.
    pub fn with_reply(mut self, reply: impl Into<String>) -> Self {
        self.reply = Ok(reply.into());
        self
    }

    /// Makes `complete` fail.
    pub fn with_failing_reply(mut self, message: impl Into<String>) -> Self {
        self.reply = Err(message.into());
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn record(&self, history: Vec<ChatTurn>, model: ModelId) {
        self.requests
            .lock()
            .unwrap()
            .push(RecordedRequest { history, model });
    }
}

#[async_trait]
impl CompletionClientTrait for ScriptedCompletionClient {
    async fn complete(&self, history: &[ChatTurn], model: ModelId) -> Result<String, AiError> {
        self.record(history.to_vec(), model);
        self.reply.clone().map_err(AiError::Upstream)
    }

    async fn stream_complete(
        &self,
        history: Vec<ChatTurn>,
        model: ModelId,
    ) -> Result<CompletionStream, AiError> {
        self.record(history, model);
        if let Some(message) = &self.open_error {
            return Err(AiError::Upstream(message.clone()));
        }

        let items: Vec<Result<StreamChunk, AiError>> = self
            .steps
            .iter()
            .map(|step| match step {
                ScriptStep::Chunk(chunk) => Ok(chunk.clone()),
                ScriptStep::Fail(message) => Err(AiError::Upstream(message.clone())),
            })
            .collect();
        Ok(stream::iter(items).boxed())
    }
}

/// Environment backed by the in-memory repository and a scripted client.
pub struct MockEnvironment {
    pub repository: Arc<InMemoryConversationRepository>,
    pub client: Arc<ScriptedCompletionClient>,
}

impl MockEnvironment {
    pub fn new(client: ScriptedCompletionClient) -> Self {
        Self {
            repository: Arc::new(InMemoryConversationRepository::default()),
            client: Arc::new(client),
        }
    }
}

impl AiEnvironment for MockEnvironment {
    fn conversation_repository(&self) -> Arc<dyn ConversationRepositoryTrait> {
        self.repository.clone()
    }

    fn completion_client(&self) -> Arc<dyn CompletionClientTrait> {
        self.client.clone()
    }
}
