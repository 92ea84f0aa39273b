//! Repository for conversations and messages.
//!
//! Implements the `ConversationRepositoryTrait` from promptdeck-core.

use async_trait::async_trait;
use diesel::dsl::max;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use log::debug;
use std::sync::Arc;
use uuid::Uuid;

use promptdeck_core::conversations::{
    Conversation, ConversationRepositoryTrait, Message, NewConversation, NewMessage,
};
use promptdeck_core::{Error, Result};

use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{conversations, messages};
use crate::utils::now_db_timestamp;

use super::model::{ConversationDB, MessageDB};

/// SQLite implementation of the conversation repository.
pub struct ConversationRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl ConversationRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl ConversationRepositoryTrait for ConversationRepository {
    // ========================================================================
    // Conversation Operations
    // ========================================================================

    fn list_conversations(&self) -> Result<Vec<Conversation>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = conversations::table
            .order((conversations::created_at.desc(), conversations::id.desc()))
            .select(ConversationDB::as_select())
            .load::<ConversationDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows
            .into_iter()
            .map(Conversation::try_from)
            .collect::<std::result::Result<Vec<_>, _>>()?)
    }

    fn get_conversation(&self, conversation_id: &str) -> Result<Option<Conversation>> {
        let mut conn = get_connection(&self.pool)?;
        let row = conversations::table
            .find(conversation_id)
            .select(ConversationDB::as_select())
            .first::<ConversationDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(Conversation::try_from).transpose()?)
    }

    async fn create_conversation(
        &self,
        new_conversation: NewConversation,
    ) -> Result<Conversation> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Conversation> {
                let row = ConversationDB {
                    id: Uuid::new_v4().to_string(),
                    title: new_conversation.title,
                    model: new_conversation.model.as_str().to_string(),
                    created_at: now_db_timestamp(),
                };
                let result_db = diesel::insert_into(conversations::table)
                    .values(&row)
                    .returning(ConversationDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(Conversation::try_from(result_db)?)
            })
            .await
    }

    async fn delete_conversation(&self, conversation_id: String) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let removed_messages = diesel::delete(
                    messages::table.filter(messages::conversation_id.eq(&conversation_id)),
                )
                .execute(conn)
                .map_err(StorageError::from)?;

                let deleted = diesel::delete(conversations::table.find(&conversation_id))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                debug!(
                    "Deleted conversation {} ({} messages)",
                    conversation_id, removed_messages
                );
                Ok(deleted)
            })
            .await
    }

    // ========================================================================
    // Message Operations
    // ========================================================================

    fn list_messages(&self, conversation_id: &str) -> Result<Vec<Message>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = messages::table
            .filter(messages::conversation_id.eq(conversation_id))
            .order((messages::created_at.asc(), messages::seq.asc()))
            .select(MessageDB::as_select())
            .load::<MessageDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows
            .into_iter()
            .map(Message::try_from)
            .collect::<std::result::Result<Vec<_>, _>>()?)
    }

    fn get_message(&self, message_id: &str) -> Result<Option<Message>> {
        let mut conn = get_connection(&self.pool)?;
        let row = messages::table
            .find(message_id)
            .select(MessageDB::as_select())
            .first::<MessageDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(Message::try_from).transpose()?)
    }

    async fn create_message(&self, new_message: NewMessage) -> Result<Message> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Message> {
                let exists = conversations::table
                    .find(&new_message.conversation_id)
                    .select(conversations::id)
                    .first::<String>(conn)
                    .optional()
                    .map_err(StorageError::from)?
                    .is_some();
                if !exists {
                    return Err(Error::not_found(
                        "Conversation",
                        &new_message.conversation_id,
                    ));
                }

                let last_seq: Option<i64> = messages::table
                    .filter(messages::conversation_id.eq(&new_message.conversation_id))
                    .select(max(messages::seq))
                    .first(conn)
                    .map_err(StorageError::from)?;

                let row = MessageDB {
                    id: Uuid::new_v4().to_string(),
                    conversation_id: new_message.conversation_id,
                    role: new_message.role.as_str().to_string(),
                    content: new_message.content,
                    created_at: now_db_timestamp(),
                    seq: last_seq.unwrap_or(0) + 1,
                };
                let result_db = diesel::insert_into(messages::table)
                    .values(&row)
                    .returning(MessageDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(Message::try_from(result_db)?)
            })
            .await
    }
}
