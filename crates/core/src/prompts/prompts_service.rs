use log::debug;
use std::sync::Arc;

use super::prompts_model::{NewPrompt, Prompt, PromptUpdate};
use super::prompts_traits::{PromptRepositoryTrait, PromptServiceTrait};
use crate::errors::{Error, Result};
use async_trait::async_trait;

pub struct PromptService {
    repository: Arc<dyn PromptRepositoryTrait>,
}

impl PromptService {
    pub fn new(repository: Arc<dyn PromptRepositoryTrait>) -> Self {
        PromptService { repository }
    }
}

#[async_trait]
impl PromptServiceTrait for PromptService {
    fn get_prompts(&self) -> Result<Vec<Prompt>> {
        self.repository.list_prompts()
    }

    fn get_prompt(&self, prompt_id: &str) -> Result<Prompt> {
        self.repository
            .get_prompt(prompt_id)?
            .ok_or_else(|| Error::not_found("Prompt", prompt_id))
    }

    async fn create_prompt(&self, mut new_prompt: NewPrompt) -> Result<Prompt> {
        new_prompt.validate()?;
        // Treat a blank description like an absent one.
        new_prompt.description = new_prompt
            .description
            .filter(|d| !d.trim().is_empty());
        debug!("Creating prompt '{}'", new_prompt.title);
        self.repository.create_prompt(new_prompt).await
    }

    async fn update_prompt(&self, prompt_id: String, update: PromptUpdate) -> Result<Prompt> {
        update.validate()?;
        self.repository
            .update_prompt(prompt_id.clone(), update)
            .await?
            .ok_or_else(|| Error::not_found("Prompt", &prompt_id))
    }

    async fn delete_prompt(&self, prompt_id: String) -> Result<()> {
        let deleted = self.repository.delete_prompt(prompt_id.clone()).await?;
        if deleted == 0 {
            return Err(Error::not_found("Prompt", &prompt_id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::InMemoryPromptRepository;

    fn service() -> PromptService {
        PromptService::new(Arc::new(InMemoryPromptRepository::default()))
    }

    fn new_prompt(title: &str) -> NewPrompt {
        NewPrompt {
            title: title.to_string(),
            content: format!("{} content", title),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_list_newest_first() {
        let service = service();
        service.create_prompt(new_prompt("first")).await.unwrap();
        service.create_prompt(new_prompt("second")).await.unwrap();

        let prompts = service.get_prompts().unwrap();
        assert_eq!(prompts.len(), 2);
        assert_eq!(prompts[0].title, "second");
        assert_eq!(prompts[1].title, "first");
    }

    #[tokio::test]
    async fn test_create_rejects_blank_title() {
        let service = service();
        let err = service.create_prompt(new_prompt("  ")).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(service.get_prompts().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_description_is_dropped() {
        let service = service();
        let mut prompt = new_prompt("t");
        prompt.description = Some("   ".to_string());
        let created = service.create_prompt(prompt).await.unwrap();
        assert!(created.description.is_none());
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let service = service();
        let created = service.create_prompt(new_prompt("t")).await.unwrap();

        let updated = service
            .update_prompt(
                created.id.clone(),
                PromptUpdate {
                    title: Some("renamed".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "renamed");
        assert_eq!(updated.content, created.content);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_update_missing_prompt_is_not_found() {
        let service = service();
        let err = service
            .update_prompt("missing".to_string(), PromptUpdate::default())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete() {
        let service = service();
        let created = service.create_prompt(new_prompt("t")).await.unwrap();
        service.delete_prompt(created.id.clone()).await.unwrap();
        assert!(service.get_prompt(&created.id).unwrap_err().is_not_found());

        let err = service.delete_prompt(created.id).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
