//! SQLite storage implementation for prompts.

mod model;
mod repository;

pub use model::PromptDB;
pub use repository::PromptRepository;
