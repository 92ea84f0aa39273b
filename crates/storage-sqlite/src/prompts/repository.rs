use promptdeck_core::prompts::{NewPrompt, Prompt, PromptRepositoryTrait, PromptUpdate};
use promptdeck_core::Result;

use super::model::PromptDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::prompts;
use crate::utils::now_db_timestamp;
use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;

use std::sync::Arc;
use uuid::Uuid;

pub struct PromptRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl PromptRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        PromptRepository { pool, writer }
    }
}

fn find_prompt(conn: &mut SqliteConnection, prompt_id: &str) -> Result<Option<PromptDB>> {
    Ok(prompts::table
        .find(prompt_id)
        .select(PromptDB::as_select())
        .first::<PromptDB>(conn)
        .optional()
        .map_err(StorageError::from)?)
}

#[async_trait]
impl PromptRepositoryTrait for PromptRepository {
    fn list_prompts(&self) -> Result<Vec<Prompt>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = prompts::table
            .order((prompts::created_at.desc(), prompts::id.desc()))
            .select(PromptDB::as_select())
            .load::<PromptDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows
            .into_iter()
            .map(Prompt::try_from)
            .collect::<std::result::Result<Vec<_>, _>>()?)
    }

    fn get_prompt(&self, prompt_id: &str) -> Result<Option<Prompt>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(find_prompt(&mut conn, prompt_id)?
            .map(Prompt::try_from)
            .transpose()?)
    }

    async fn create_prompt(&self, new_prompt: NewPrompt) -> Result<Prompt> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Prompt> {
                let row = PromptDB {
                    id: Uuid::new_v4().to_string(),
                    title: new_prompt.title,
                    content: new_prompt.content,
                    description: new_prompt.description,
                    created_at: now_db_timestamp(),
                };
                let result_db = diesel::insert_into(prompts::table)
                    .values(&row)
                    .returning(PromptDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(Prompt::try_from(result_db)?)
            })
            .await
    }

    async fn update_prompt(
        &self,
        prompt_id: String,
        update: PromptUpdate,
    ) -> Result<Option<Prompt>> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Option<Prompt>> {
                let Some(existing) = find_prompt(conn, &prompt_id)? else {
                    return Ok(None);
                };
                let mut prompt = Prompt::try_from(existing)?;
                if update.is_empty() {
                    return Ok(Some(prompt));
                }
                update.apply_to(&mut prompt);

                diesel::update(prompts::table.find(&prompt_id))
                    .set((
                        prompts::title.eq(&prompt.title),
                        prompts::content.eq(&prompt.content),
                        prompts::description.eq(&prompt.description),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(Some(prompt))
            })
            .await
    }

    async fn delete_prompt(&self, prompt_id: String) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                Ok(diesel::delete(prompts::table.find(prompt_id))
                    .execute(conn)
                    .map_err(StorageError::from)?)
            })
            .await
    }
}
