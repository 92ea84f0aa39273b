//! Prompt domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ValidationError};

/// A reusable prompt template.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    pub id: String,
    pub title: String,
    pub content: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input model for creating a new prompt
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewPrompt {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewPrompt {
    pub fn validate(&self) -> Result<()> {
        let mut issues = Vec::new();
        if self.title.trim().is_empty() {
            issues.push("title must not be empty".to_string());
        }
        if self.content.trim().is_empty() {
            issues.push("content must not be empty".to_string());
        }
        ValidationError::check(issues)
    }
}

/// Partial update. Absent fields are left untouched; `description: null`
/// clears the description.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PromptUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    pub description: Option<Option<String>>,
}

impl PromptUpdate {
    pub fn validate(&self) -> Result<()> {
        let mut issues = Vec::new();
        if self.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            issues.push("title must not be empty".to_string());
        }
        if self.content.as_deref().is_some_and(|c| c.trim().is_empty()) {
            issues.push("content must not be empty".to_string());
        }
        ValidationError::check(issues)
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.description.is_none()
    }

    /// Applies the present fields onto an existing prompt.
    pub fn apply_to(self, prompt: &mut Prompt) {
        if let Some(title) = self.title {
            prompt.title = title;
        }
        if let Some(content) = self.content {
            prompt.content = content;
        }
        if let Some(description) = self.description {
            prompt.description = description;
        }
    }
}
