//! In-memory repositories for tests.
//!
//! These mirror the SQLite repositories' observable behaviour (ordering,
//! cascade delete, foreign-key check on message insert) without a database.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::conversations::{
    Conversation, ConversationRepositoryTrait, Message, NewConversation, NewMessage,
};
use crate::errors::{Error, Result};
use crate::prompts::{NewPrompt, Prompt, PromptRepositoryTrait, PromptUpdate};

/// Mock prompt repository for testing.
#[derive(Default)]
pub struct InMemoryPromptRepository {
    prompts: RwLock<HashMap<String, (u64, Prompt)>>,
    sequence: AtomicU64,
}

#[async_trait]
impl PromptRepositoryTrait for InMemoryPromptRepository {
    fn list_prompts(&self) -> Result<Vec<Prompt>> {
        let prompts = self.prompts.read().unwrap();
        let mut list: Vec<_> = prompts.values().cloned().collect();
        list.sort_by(|(a_seq, a), (b_seq, b)| {
            b.created_at.cmp(&a.created_at).then(b_seq.cmp(a_seq))
        });
        Ok(list.into_iter().map(|(_, prompt)| prompt).collect())
    }

    fn get_prompt(&self, prompt_id: &str) -> Result<Option<Prompt>> {
        Ok(self
            .prompts
            .read()
            .unwrap()
            .get(prompt_id)
            .map(|(_, prompt)| prompt.clone()))
    }

    async fn create_prompt(&self, new_prompt: NewPrompt) -> Result<Prompt> {
        let prompt = Prompt {
            id: Uuid::new_v4().to_string(),
            title: new_prompt.title,
            content: new_prompt.content,
            description: new_prompt.description,
            created_at: Utc::now(),
        };
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .write()
            .unwrap()
            .insert(prompt.id.clone(), (seq, prompt.clone()));
        Ok(prompt)
    }

    async fn update_prompt(
        &self,
        prompt_id: String,
        update: PromptUpdate,
    ) -> Result<Option<Prompt>> {
        let mut prompts = self.prompts.write().unwrap();
        Ok(prompts.get_mut(&prompt_id).map(|(_, prompt)| {
            update.apply_to(prompt);
            prompt.clone()
        }))
    }

    async fn delete_prompt(&self, prompt_id: String) -> Result<usize> {
        Ok(self
            .prompts
            .write()
            .unwrap()
            .remove(&prompt_id)
            .map_or(0, |_| 1))
    }
}

#[derive(Default)]
struct ConversationStore {
    conversations: HashMap<String, (u64, Conversation)>,
    messages: HashMap<String, (u64, Message)>,
}

/// Mock conversation repository for testing.
#[derive(Default)]
pub struct InMemoryConversationRepository {
    store: RwLock<ConversationStore>,
    sequence: AtomicU64,
}

impl InMemoryConversationRepository {
    /// Inserts a conversation with a caller-chosen id.
    pub fn insert_conversation(&self, conversation: Conversation) {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        self.store
            .write()
            .unwrap()
            .conversations
            .insert(conversation.id.clone(), (seq, conversation));
    }

    /// Inserts a fully-formed message, bypassing the conversation check.
    pub fn insert_message(&self, message: Message) {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        self.store
            .write()
            .unwrap()
            .messages
            .insert(message.id.clone(), (seq, message));
    }

    pub fn message_count(&self) -> usize {
        self.store.read().unwrap().messages.len()
    }
}

#[async_trait]
impl ConversationRepositoryTrait for InMemoryConversationRepository {
    fn list_conversations(&self) -> Result<Vec<Conversation>> {
        let store = self.store.read().unwrap();
        let mut list: Vec<_> = store.conversations.values().cloned().collect();
        list.sort_by(|(a_seq, a), (b_seq, b)| {
            b.created_at.cmp(&a.created_at).then(b_seq.cmp(a_seq))
        });
        Ok(list.into_iter().map(|(_, c)| c).collect())
    }

    fn get_conversation(&self, conversation_id: &str) -> Result<Option<Conversation>> {
        Ok(self
            .store
            .read()
            .unwrap()
            .conversations
            .get(conversation_id)
            .map(|(_, c)| c.clone()))
    }

    async fn create_conversation(
        &self,
        new_conversation: NewConversation,
    ) -> Result<Conversation> {
        let conversation = Conversation {
            id: Uuid::new_v4().to_string(),
            title: new_conversation.title,
            model: new_conversation.model,
            created_at: Utc::now(),
        };
        self.insert_conversation(conversation.clone());
        Ok(conversation)
    }

    async fn delete_conversation(&self, conversation_id: String) -> Result<usize> {
        let mut store = self.store.write().unwrap();
        if store.conversations.remove(&conversation_id).is_none() {
            return Ok(0);
        }
        store
            .messages
            .retain(|_, (_, m)| m.conversation_id != conversation_id);
        Ok(1)
    }

    fn list_messages(&self, conversation_id: &str) -> Result<Vec<Message>> {
        let store = self.store.read().unwrap();
        let mut list: Vec<_> = store
            .messages
            .values()
            .filter(|(_, m)| m.conversation_id == conversation_id)
            .cloned()
            .collect();
        list.sort_by(|(a_seq, a), (b_seq, b)| {
            a.created_at.cmp(&b.created_at).then(a_seq.cmp(b_seq))
        });
        Ok(list.into_iter().map(|(_, m)| m).collect())
    }

    fn get_message(&self, message_id: &str) -> Result<Option<Message>> {
        Ok(self
            .store
            .read()
            .unwrap()
            .messages
            .get(message_id)
            .map(|(_, m)| m.clone()))
    }

    async fn create_message(&self, new_message: NewMessage) -> Result<Message> {
        let mut store = self.store.write().unwrap();
        if !store
            .conversations
            .contains_key(&new_message.conversation_id)
        {
            return Err(Error::not_found(
                "Conversation",
                &new_message.conversation_id,
            ));
        }
        let message = Message {
            id: Uuid::new_v4().to_string(),
            conversation_id: new_message.conversation_id,
            role: new_message.role,
            content: new_message.content,
            created_at: Utc::now(),
        };
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        store
            .messages
            .insert(message.id.clone(), (seq, message.clone()));
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{MessageRole, ModelId};
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn conversation(id: &str) -> Conversation {
        Conversation {
            id: id.to_string(),
            title: "t".to_string(),
            model: ModelId::Gpt5,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_message_requires_conversation() {
        let repo = InMemoryConversationRepository::default();
        let err = repo
            .create_message(NewMessage::user("missing", "hi"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(repo.message_count(), 0);
    }

    proptest! {
        // Messages come back in creation order no matter how they were inserted.
        #[test]
        fn prop_messages_sorted_by_creation(
            offsets in proptest::collection::vec(0i64..1_000, 1..30),
        ) {
            let repo = InMemoryConversationRepository::default();
            repo.insert_conversation(conversation("c1"));
            let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
            for (i, offset) in offsets.iter().enumerate() {
                repo.insert_message(Message {
                    id: format!("m{}", i),
                    conversation_id: "c1".to_string(),
                    role: MessageRole::User,
                    content: i.to_string(),
                    created_at: base + Duration::seconds(*offset),
                });
            }

            let listed = repo.list_messages("c1").unwrap();
            prop_assert_eq!(listed.len(), offsets.len());
            for pair in listed.windows(2) {
                prop_assert!(pair[0].created_at <= pair[1].created_at);
                if pair[0].created_at == pair[1].created_at {
                    // Ties keep insertion order.
                    let a: usize = pair[0].content.parse().unwrap();
                    let b: usize = pair[1].content.parse().unwrap();
                    prop_assert!(a < b);
                }
            }
        }
    }
}
