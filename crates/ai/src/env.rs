//! Environment abstraction for the chat relay.
//!
//! This module provides the `AiEnvironment` trait that abstracts runtime
//! dependencies (persistence and the upstream completion client). The server
//! implements it with its SQLite repository and configured provider client;
//! tests use the in-memory doubles from `test_utils`.

use std::sync::Arc;

use promptdeck_core::conversations::ConversationRepositoryTrait;

use crate::completion::CompletionClientTrait;

/// Environment abstraction for the chat relay.
///
/// Implementations provide access to:
/// - Conversation repository for message persistence
/// - Completion client for the upstream model API
pub trait AiEnvironment: Send + Sync {
    /// Get the conversation repository for conversation/message persistence.
    fn conversation_repository(&self) -> Arc<dyn ConversationRepositoryTrait>;

    /// Get the client used to reach the upstream model.
    fn completion_client(&self) -> Arc<dyn CompletionClientTrait>;
}
