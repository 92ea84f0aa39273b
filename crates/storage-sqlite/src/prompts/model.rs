//! Database models for prompts.

use diesel::prelude::*;
use promptdeck_core::prompts::Prompt;

use crate::errors::StorageError;
use crate::utils::from_db_timestamp;

/// Database model for prompts
#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::prompts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PromptDB {
    pub id: String,
    pub title: String,
    pub content: String,
    pub description: Option<String>,
    pub created_at: String,
}

impl TryFrom<PromptDB> for Prompt {
    type Error = StorageError;

    fn try_from(db: PromptDB) -> Result<Self, Self::Error> {
        Ok(Prompt {
            created_at: from_db_timestamp(&db.created_at)?,
            id: db.id,
            title: db.title,
            content: db.content,
            description: db.description,
        })
    }
}
