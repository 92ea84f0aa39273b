//! Conversation and message domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chat::{MessageRole, ModelId};
use crate::errors::{Result, ValidationError};

/// A named thread of messages bound to one model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub model: ModelId,
    pub created_at: DateTime<Utc>,
}

/// Input model for creating a new conversation
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewConversation {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub model: ModelId,
}

impl NewConversation {
    pub fn new(title: impl Into<String>, model: ModelId) -> Self {
        Self {
            title: title.into(),
            model,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return ValidationError::check(vec!["title must not be empty".to_string()]);
        }
        Ok(())
    }
}

/// Max characters of a title derived from a first message.
pub const DERIVED_TITLE_MAX_CHARS: usize = 50;

/// Title for a conversation started implicitly by its first message.
pub fn derive_title(first_message: &str) -> Option<String> {
    let trimmed = first_message.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(truncate_to_title(trimmed, DERIVED_TITLE_MAX_CHARS))
}

/// Truncate a string to create a title, respecting word boundaries.
pub fn truncate_to_title(text: &str, max_chars: usize) -> String {
    let text = text.trim();

    // Char count, not byte count.
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let mut end_byte = text.len();
    let mut last_space: Option<(usize, usize)> = None;

    for (chars_seen, (idx, ch)) in text.char_indices().enumerate() {
        if chars_seen == max_chars {
            end_byte = idx;
            break;
        }
        if ch.is_whitespace() {
            last_space = Some((idx, chars_seen));
        }
    }

    let truncated = &text[..end_byte];
    let title = match last_space {
        Some((byte_idx, char_idx)) if char_idx > max_chars / 2 => &truncated[..byte_idx],
        _ => truncated,
    };

    format!("{}...", title.trim())
}

/// One immutable turn within a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Input model for appending a message to a conversation
#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub conversation_id: String,
    pub role: MessageRole,
    pub content: String,
}

impl NewMessage {
    pub fn user(conversation_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(conversation_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}
