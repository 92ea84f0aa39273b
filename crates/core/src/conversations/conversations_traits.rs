use crate::conversations::conversations_model::{
    Conversation, Message, NewConversation, NewMessage,
};
use crate::errors::Result;
use async_trait::async_trait;

/// Trait for conversation and message repository operations
#[async_trait]
pub trait ConversationRepositoryTrait: Send + Sync {
    /// Newest first.
    fn list_conversations(&self) -> Result<Vec<Conversation>>;
    fn get_conversation(&self, conversation_id: &str) -> Result<Option<Conversation>>;
    async fn create_conversation(&self, new_conversation: NewConversation)
        -> Result<Conversation>;
    /// Removes the conversation and all of its messages in one atomic write.
    async fn delete_conversation(&self, conversation_id: String) -> Result<usize>;

    /// Oldest first; ties keep insertion order. Empty for unknown conversations.
    fn list_messages(&self, conversation_id: &str) -> Result<Vec<Message>>;
    fn get_message(&self, message_id: &str) -> Result<Option<Message>>;
    /// Fails with `Error::NotFound` when the conversation does not exist.
    async fn create_message(&self, new_message: NewMessage) -> Result<Message>;
}

/// Trait for conversation service operations
#[async_trait]
pub trait ConversationServiceTrait: Send + Sync {
    fn get_conversations(&self) -> Result<Vec<Conversation>>;
    fn get_conversation(&self, conversation_id: &str) -> Result<Conversation>;
    async fn create_conversation(&self, new_conversation: NewConversation)
        -> Result<Conversation>;
    async fn delete_conversation(&self, conversation_id: String) -> Result<()>;
    fn get_messages(&self, conversation_id: &str) -> Result<Vec<Message>>;
}
