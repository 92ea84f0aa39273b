//! Database models for conversations and messages.

use diesel::prelude::*;
use promptdeck_core::chat::{MessageRole, ModelId};
use promptdeck_core::conversations::{Conversation, Message};

use crate::errors::StorageError;
use crate::schema::{conversations, messages};
use crate::utils::from_db_timestamp;

/// Database model for conversations.
#[derive(Debug, Clone, PartialEq, Queryable, Identifiable, Insertable, Selectable)]
#[diesel(table_name = conversations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ConversationDB {
    pub id: String,
    pub title: String,
    pub model: String,
    pub created_at: String,
}

/// Database model for messages.
#[derive(Debug, Clone, PartialEq, Queryable, Identifiable, Insertable, Selectable)]
#[diesel(table_name = messages)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MessageDB {
    pub id: String,
    pub conversation_id: String,
    pub role: String,
    pub content: String,
    pub created_at: String,
    /// Position within the conversation, assigned by the writer.
    pub seq: i64,
}

impl TryFrom<ConversationDB> for Conversation {
    type Error = StorageError;

    fn try_from(db: ConversationDB) -> Result<Self, Self::Error> {
        let model = db
            .model
            .parse::<ModelId>()
            .map_err(|e| StorageError::InvalidData(e.to_string()))?;
        Ok(Conversation {
            created_at: from_db_timestamp(&db.created_at)?,
            id: db.id,
            title: db.title,
            model,
        })
    }
}

impl TryFrom<MessageDB> for Message {
    type Error = StorageError;

    fn try_from(db: MessageDB) -> Result<Self, Self::Error> {
        let role = db
            .role
            .parse::<MessageRole>()
            .map_err(|e| StorageError::InvalidData(e.to_string()))?;
        Ok(Message {
            created_at: from_db_timestamp(&db.created_at)?,
            id: db.id,
            conversation_id: db.conversation_id,
            role,
            content: db.content,
        })
    }
}
