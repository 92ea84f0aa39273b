//! Chat domain models and the event-stream wire format.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::conversations::Message;
use crate::errors::{Error, Result, ValidationError};

/// Prefix of every payload line on the event stream.
pub const DATA_PREFIX: &str = "data: ";

/// Blank line closing one event.
pub const FRAME_TERMINATOR: &str = "\n\n";

/// Upstream chat models a conversation can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ModelId {
    #[default]
    #[serde(rename = "gpt-5")]
    Gpt5,
    #[serde(rename = "gpt-4o")]
    Gpt4o,
    #[serde(rename = "gpt-4o-mini")]
    Gpt4oMini,
    #[serde(rename = "gpt-4")]
    Gpt4,
    #[serde(rename = "gpt-3.5-turbo")]
    Gpt35Turbo,
}

impl ModelId {
    pub const ALL: [ModelId; 5] = [
        ModelId::Gpt5,
        ModelId::Gpt4o,
        ModelId::Gpt4oMini,
        ModelId::Gpt4,
        ModelId::Gpt35Turbo,
    ];

    /// Token sent to the provider unchanged.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelId::Gpt5 => "gpt-5",
            ModelId::Gpt4o => "gpt-4o",
            ModelId::Gpt4oMini => "gpt-4o-mini",
            ModelId::Gpt4 => "gpt-4",
            ModelId::Gpt35Turbo => "gpt-3.5-turbo",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ModelId::Gpt5 => "GPT-5",
            ModelId::Gpt4o => "GPT-4o",
            ModelId::Gpt4oMini => "GPT-4o Mini",
            ModelId::Gpt4 => "GPT-4",
            ModelId::Gpt35Turbo => "GPT-3.5 Turbo",
        }
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ModelId::ALL
            .into_iter()
            .find(|model| model.as_str() == s)
            .ok_or_else(|| {
                Error::Validation(ValidationError::InvalidInput(format!(
                    "Unknown model '{}'",
                    s
                )))
            })
    }
}

/// Catalog entry served to the model picker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: ModelId,
    pub name: String,
}

pub fn available_models() -> Vec<ModelInfo> {
    ModelId::ALL
        .into_iter()
        .map(|id| ModelInfo {
            id,
            name: id.display_name().to_string(),
        })
        .collect()
}

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown message role '{}'",
                other
            )))),
        }
    }
}

/// One entry of the history handed to the completion client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: MessageRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

impl From<&Message> for ChatTurn {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role,
            content: message.content.clone(),
        }
    }
}

/// Cumulative assistant text so far plus a completion marker.
///
/// `content` always holds the whole reply produced up to this point, never
/// a delta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamChunk {
    pub content: String,
    #[serde(default)]
    pub finished: bool,
}

impl StreamChunk {
    pub fn partial(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            finished: false,
        }
    }

    pub fn finished(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            finished: true,
        }
    }
}

/// One event on the streaming channel.
///
/// Encoded as `data: <json>\n\n`, where the JSON is either
/// `{"content": .., "finished": ..}` or `{"error": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StreamFrame {
    Error { error: String },
    Chunk(StreamChunk),
}

impl StreamFrame {
    pub fn error(message: impl Into<String>) -> Self {
        StreamFrame::Error {
            error: message.into(),
        }
    }

    /// Error frames and finished chunks end the stream.
    pub fn is_terminal(&self) -> bool {
        match self {
            StreamFrame::Error { .. } => true,
            StreamFrame::Chunk(chunk) => chunk.finished,
        }
    }

    /// Renders the frame as one complete event, terminator included.
    pub fn encode(&self) -> Result<String> {
        let json = serde_json::to_string(self)?;
        Ok(format!("{}{}{}", DATA_PREFIX, json, FRAME_TERMINATOR))
    }

    /// Parses the JSON payload of a `data:` line (prefix already removed).
    pub fn decode(payload: &str) -> Result<Self> {
        Ok(serde_json::from_str(payload)?)
    }
}

impl From<StreamChunk> for StreamFrame {
    fn from(chunk: StreamChunk) -> Self {
        StreamFrame::Chunk(chunk)
    }
}

/// Body of `POST /chat` and `POST /chat/stream`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub conversation_id: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelId>,
}

impl ChatRequest {
    pub fn new(conversation_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            message: message.into(),
            model: None,
        }
    }

    pub fn with_model(mut self, model: ModelId) -> Self {
        self.model = Some(model);
        self
    }

    pub fn validate(&self) -> Result<()> {
        let mut issues = Vec::new();
        if self.conversation_id.trim().is_empty() {
            issues.push("conversationId is required".to_string());
        }
        if self.message.trim().is_empty() {
            issues.push("message is required".to_string());
        }
        ValidationError::check(issues)
    }
}

/// Result of a non-streaming chat turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatExchange {
    pub user_message: Message,
    pub assistant_message: Message,
}
