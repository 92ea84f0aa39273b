use log::{debug, info};
use std::sync::Arc;

use super::conversations_model::{Conversation, Message, NewConversation};
use super::conversations_traits::{ConversationRepositoryTrait, ConversationServiceTrait};
use crate::errors::{Error, Result};
use async_trait::async_trait;

pub struct ConversationService {
    repository: Arc<dyn ConversationRepositoryTrait>,
}

impl ConversationService {
    pub fn new(repository: Arc<dyn ConversationRepositoryTrait>) -> Self {
        ConversationService { repository }
    }
}

#[async_trait]
impl ConversationServiceTrait for ConversationService {
    fn get_conversations(&self) -> Result<Vec<Conversation>> {
        self.repository.list_conversations()
    }

    fn get_conversation(&self, conversation_id: &str) -> Result<Conversation> {
        self.repository
            .get_conversation(conversation_id)?
            .ok_or_else(|| Error::not_found("Conversation", conversation_id))
    }

    async fn create_conversation(
        &self,
        new_conversation: NewConversation,
    ) -> Result<Conversation> {
        new_conversation.validate()?;
        let created = self.repository.create_conversation(new_conversation).await?;
        debug!(
            "Created conversation {} using {}",
            created.id, created.model
        );
        Ok(created)
    }

    async fn delete_conversation(&self, conversation_id: String) -> Result<()> {
        let deleted = self
            .repository
            .delete_conversation(conversation_id.clone())
            .await?;
        if deleted == 0 {
            return Err(Error::not_found("Conversation", &conversation_id));
        }
        info!("Deleted conversation {}", conversation_id);
        Ok(())
    }

    fn get_messages(&self, conversation_id: &str) -> Result<Vec<Message>> {
        self.repository.list_messages(conversation_id)
    }
}
