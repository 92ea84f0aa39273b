//! Server-side implementation of AiEnvironment.
//!
//! Hands the chat relay the SQLite-backed conversation repository and the
//! configured completion client.

use std::sync::Arc;

use promptdeck_ai::{AiEnvironment, CompletionClientTrait};
use promptdeck_core::conversations::ConversationRepositoryTrait;

pub struct ServerAiEnvironment {
    conversation_repository: Arc<dyn ConversationRepositoryTrait>,
    completion_client: Arc<dyn CompletionClientTrait>,
}

impl ServerAiEnvironment {
    pub fn new(
        conversation_repository: Arc<dyn ConversationRepositoryTrait>,
        completion_client: Arc<dyn CompletionClientTrait>,
    ) -> Self {
        Self {
            conversation_repository,
            completion_client,
        }
    }
}

impl AiEnvironment for ServerAiEnvironment {
    fn conversation_repository(&self) -> Arc<dyn ConversationRepositoryTrait> {
        self.conversation_repository.clone()
    }

    fn completion_client(&self) -> Arc<dyn CompletionClientTrait> {
        self.completion_client.clone()
    }
}
