//! PromptDeck Core - Domain entities, services, and traits.
//!
//! This crate contains the business rules for prompts, conversations and
//! chat turns. It is database-agnostic and defines the repository traits
//! that are implemented by the `storage-sqlite` crate.
//!
//! The `chat` module also owns the wire framing shared by the relay server
//! and the stream consumer, so both sides agree on one definition of an
//! event frame.

pub mod chat;
pub mod conversations;
pub mod errors;
pub mod prompts;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
