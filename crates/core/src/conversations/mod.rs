//! Conversations module - conversation threads and their messages.

mod conversations_model;
mod conversations_service;
mod conversations_traits;

pub use conversations_model::{
    derive_title, truncate_to_title, Conversation, Message, NewConversation, NewMessage,
    DERIVED_TITLE_MAX_CHARS,
};
pub use conversations_service::ConversationService;
pub use conversations_traits::{ConversationRepositoryTrait, ConversationServiceTrait};
