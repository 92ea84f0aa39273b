//! Completion client: the seam between the relay and the upstream model API.
//!
//! Streaming completions are exposed as cumulative [`StreamChunk`]s: every
//! element carries the whole reply produced so far, and the stream always
//! ends with exactly one `finished` element or a single error.

use async_trait::async_trait;
use futures::stream::{self, BoxStream};
use futures::StreamExt;
use log::{debug, error};
use reqwest::Client as HttpClient;
use rig::{
    agent::MultiTurnStreamItem,
    client::CompletionClient,
    completion::{Chat, Message},
    message::{AssistantContent, Text, UserContent},
    providers::openai,
    streaming::{StreamedAssistantContent, StreamingChat},
    OneOrMany,
};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use promptdeck_core::chat::{ChatTurn, MessageRole, ModelId, StreamChunk};

use crate::error::AiError;

/// Reply stored when the provider answers with nothing.
pub const EMPTY_COMPLETION_FALLBACK: &str = "No response generated.";

const PROVIDER_ID: &str = "openai";

/// Lazy, one-shot stream of cumulative chunks.
pub type CompletionStream = BoxStream<'static, Result<StreamChunk, AiError>>;

/// Abstraction over the upstream chat-completion API.
#[async_trait]
pub trait CompletionClientTrait: Send + Sync {
    /// Single request/response completion. No retry.
    async fn complete(&self, history: &[ChatTurn], model: ModelId) -> Result<String, AiError>;

    /// Opens a streaming completion. Failures to open are returned directly;
    /// later failures arrive as one `Err` item that ends the stream.
    async fn stream_complete(
        &self,
        history: Vec<ChatTurn>,
        model: ModelId,
    ) -> Result<CompletionStream, AiError>;
}

// ============================================================================
// Accumulation
// ============================================================================

/// One raw event from a provider stream, before accumulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamDelta {
    /// Incremental text.
    Text(String),
    /// Whole reply as reported by the provider once it is done.
    Final(String),
}

struct Accumulator {
    upstream: BoxStream<'static, Result<UpstreamDelta, AiError>>,
    content: String,
    done: bool,
}

/// Folds provider deltas into cumulative chunks.
///
/// Empty deltas are skipped. A `Final` payload is only used when no text was
/// streamed before it. When the upstream ends, one `finished` chunk with the
/// full text is emitted; an upstream error is passed through once and ends
/// the stream.
pub fn accumulate(
    upstream: BoxStream<'static, Result<UpstreamDelta, AiError>>,
) -> CompletionStream {
    let state = Accumulator {
        upstream,
        content: String::new(),
        done: false,
    };

    stream::unfold(state, |mut state| async move {
        if state.done {
            return None;
        }
        loop {
            match state.upstream.next().await {
                Some(Ok(UpstreamDelta::Text(delta))) => {
                    if delta.is_empty() {
                        continue;
                    }
                    state.content.push_str(&delta);
                    let chunk = StreamChunk::partial(state.content.clone());
                    return Some((Ok(chunk), state));
                }
                Some(Ok(UpstreamDelta::Final(text))) => {
                    if !state.content.trim().is_empty() || text.trim().is_empty() {
                        continue;
                    }
                    state.content = text;
                    let chunk = StreamChunk::partial(state.content.clone());
                    return Some((Ok(chunk), state));
                }
                Some(Err(e)) => {
                    state.done = true;
                    return Some((Err(e), state));
                }
                None => {
                    state.done = true;
                    let chunk = StreamChunk::finished(state.content.clone());
                    return Some((Ok(chunk), state));
                }
            }
        }
    })
    .boxed()
}

// ============================================================================
// History Building
// ============================================================================

/// Splits a history into the prompt (last user turn) and the preceding chat.
pub fn build_history(turns: &[ChatTurn]) -> Result<(Message, Vec<Message>), AiError> {
    let Some(last_user_index) = turns
        .iter()
        .rposition(|turn| turn.role == MessageRole::User)
    else {
        return Err(AiError::InvalidInput(
            "A user message is required to start the chat".to_string(),
        ));
    };

    let prompt = user_message(&turns[last_user_index].content);

    let history = turns
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != last_user_index)
        .map(|(_, turn)| match turn.role {
            MessageRole::User => user_message(&turn.content),
            MessageRole::Assistant => Message::Assistant {
                id: None,
                content: OneOrMany::one(AssistantContent::Text(Text {
                    text: turn.content.clone(),
                })),
            },
        })
        .collect();

    Ok((prompt, history))
}

fn user_message(text: &str) -> Message {
    Message::User {
        content: OneOrMany::one(UserContent::Text(Text {
            text: text.to_string(),
        })),
    }
}

// ============================================================================
// OpenAI Client
// ============================================================================

/// Sampling parameters sent with every completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionConfig {
    pub temperature: f64,
    pub max_tokens: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 2000,
        }
    }
}

/// Completion client for the OpenAI Chat Completions API.
pub struct OpenAiCompletionClient {
    api_key: Option<String>,
    base_url: Option<String>,
    config: CompletionConfig,
}

impl OpenAiCompletionClient {
    pub fn new(
        api_key: Option<String>,
        base_url: Option<String>,
        config: CompletionConfig,
    ) -> Self {
        Self {
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            base_url,
            config,
        }
    }

    /// Uses the Completions API rather than the Responses API.
    fn client(&self) -> Result<openai::CompletionsClient<HttpClient>, AiError> {
        let key = self
            .api_key
            .clone()
            .ok_or_else(|| AiError::MissingApiKey(PROVIDER_ID.to_string()))?;
        let mut builder = openai::CompletionsClient::builder().api_key(&key);
        if let Some(url) = &self.base_url {
            builder = builder.base_url(url);
        }
        builder
            .build()
            .map_err(|e| AiError::Transport(e.to_string()))
    }
}

#[async_trait]
impl CompletionClientTrait for OpenAiCompletionClient {
    async fn complete(&self, history: &[ChatTurn], model: ModelId) -> Result<String, AiError> {
        let client = self.client()?;
        let (prompt, chat_history) = build_history(history)?;

        debug!("Requesting completion from model {}", model);
        let agent = client
            .agent(model.as_str())
            .temperature(self.config.temperature)
            .max_tokens(self.config.max_tokens)
            .build();

        let response = agent.chat(prompt, chat_history).await.map_err(|e| {
            error!("OpenAI API error: {}", e);
            AiError::Upstream(format!("OpenAI API error: {}", e))
        })?;

        if response.trim().is_empty() {
            return Ok(EMPTY_COMPLETION_FALLBACK.to_string());
        }
        Ok(response)
    }

    async fn stream_complete(
        &self,
        history: Vec<ChatTurn>,
        model: ModelId,
    ) -> Result<CompletionStream, AiError> {
        let client = self.client()?;
        let (prompt, chat_history) = build_history(&history)?;

        debug!("Opening streaming completion with model {}", model);
        let agent = client
            .agent(model.as_str())
            .temperature(self.config.temperature)
            .max_tokens(self.config.max_tokens)
            .build();

        let (tx, rx) = mpsc::channel::<Result<UpstreamDelta, AiError>>(16);

        tokio::spawn(async move {
            let mut stream = agent.stream_chat(prompt, chat_history).await;

            while let Some(item) = stream.next().await {
                let delta = match item {
                    Ok(MultiTurnStreamItem::StreamAssistantItem(
                        StreamedAssistantContent::Text(Text { text }),
                    )) => Ok(UpstreamDelta::Text(text)),
                    Ok(MultiTurnStreamItem::FinalResponse(final_response)) => {
                        Ok(UpstreamDelta::Final(final_response.response().to_string()))
                    }
                    Ok(_) => continue,
                    Err(e) => {
                        error!("OpenAI streaming error: {}", e);
                        Err(AiError::Upstream(format!("OpenAI streaming error: {}", e)))
                    }
                };

                let failed = delta.is_err();
                if tx.send(delta).await.is_err() || failed {
                    break;
                }
            }
        });

        Ok(accumulate(ReceiverStream::new(rx).boxed()))
    }
}
