use crate::errors::Result;
use crate::prompts::prompts_model::{NewPrompt, Prompt, PromptUpdate};
use async_trait::async_trait;

/// Trait for prompt repository operations
#[async_trait]
pub trait PromptRepositoryTrait: Send + Sync {
    /// Newest first.
    fn list_prompts(&self) -> Result<Vec<Prompt>>;
    fn get_prompt(&self, prompt_id: &str) -> Result<Option<Prompt>>;
    async fn create_prompt(&self, new_prompt: NewPrompt) -> Result<Prompt>;
    /// Returns `None` when no prompt has this id.
    async fn update_prompt(&self, prompt_id: String, update: PromptUpdate)
        -> Result<Option<Prompt>>;
    async fn delete_prompt(&self, prompt_id: String) -> Result<usize>;
}

/// Trait for prompt service operations
#[async_trait]
pub trait PromptServiceTrait: Send + Sync {
    fn get_prompts(&self) -> Result<Vec<Prompt>>;
    fn get_prompt(&self, prompt_id: &str) -> Result<Prompt>;
    async fn create_prompt(&self, new_prompt: NewPrompt) -> Result<Prompt>;
    async fn update_prompt(&self, prompt_id: String, update: PromptUpdate) -> Result<Prompt>;
    async fn delete_prompt(&self, prompt_id: String) -> Result<()>;
}
