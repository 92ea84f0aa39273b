//! Prompts module - saved prompt templates.

mod prompts_model;
mod prompts_service;
mod prompts_traits;

pub use prompts_model::{NewPrompt, Prompt, PromptUpdate};
pub use prompts_service::PromptService;
pub use prompts_traits::{PromptRepositoryTrait, PromptServiceTrait};
