//! Conversation persistence module.
//!
//! Conversations own their messages: deleting one removes the other in the
//! same transaction, and the schema cascades as a second line.

pub mod model;
pub mod repository;

pub use model::{ConversationDB, MessageDB};
pub use repository::ConversationRepository;
