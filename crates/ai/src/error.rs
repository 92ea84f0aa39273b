//! Chat relay error types.

use promptdeck_core::Error as CoreError;
use thiserror::Error;

/// Chat relay and completion errors.
#[derive(Debug, Error)]
pub enum AiError {
    /// Invalid input or request.
    #[error("{0}")]
    InvalidInput(String),

    /// The targeted conversation does not exist.
    #[error("Conversation {0} not found")]
    ConversationNotFound(String),

    /// Missing API key for a provider.
    #[error("Missing API key for provider {0}")]
    MissingApiKey(String),

    /// The upstream completion API failed or returned something unusable.
    #[error("{0}")]
    Upstream(String),

    /// Building the upstream client or reaching the provider failed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Core error from promptdeck-core.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AiError {
    /// Create a new invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new upstream error.
    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }

    /// Create a new internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// True when the failure came from talking to the completion provider.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            AiError::Upstream(_)
                | AiError::Transport(_)
                | AiError::MissingApiKey(_)
                | AiError::InvalidInput(_)
        )
    }

    /// Text of the `{error}` frame sent when this error ends an open stream.
    pub fn stream_message(&self) -> String {
        if self.is_upstream() {
            format!("Streaming failed: {}", self)
        } else {
            format!("Server error: {}", self)
        }
    }
}

/// Error code for programmatic handling.
impl AiError {
    pub fn code(&self) -> &'static str {
        match self {
            AiError::InvalidInput(_) => "INVALID_INPUT",
            AiError::ConversationNotFound(_) => "CONVERSATION_NOT_FOUND",
            AiError::MissingApiKey(_) => "MISSING_API_KEY",
            AiError::Upstream(_) => "UPSTREAM_ERROR",
            AiError::Transport(_) => "TRANSPORT_ERROR",
            AiError::Core(_) => "CORE_ERROR",
            AiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
