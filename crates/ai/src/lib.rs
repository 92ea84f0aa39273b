//! PromptDeck AI - completion client and streaming chat relay using rig-core.
//!
//! This crate sits between the HTTP layer and the upstream chat-completion
//! API. It persists each turn through the core repository traits and streams
//! the reply as cumulative [`StreamFrame`](promptdeck_core::chat::StreamFrame)s.
//!
//! # Architecture
//!
//! - `chat`: Streaming relay (`ChatService`) and its per-turn state machine
//! - `completion`: Completion client trait, chunk accumulation, OpenAI client
//! - `env`: Environment abstraction for repositories and the completion client
//! - `error`: Relay error taxonomy
//! - `test_utils`: Scripted completion client (tests / `test-utils` feature)
//!
//! # Example
//!
//! ```ignore
//! use promptdeck_ai::{ChatConfig, ChatService};
//! use promptdeck_core::chat::{ChatRequest, StreamFrame};
//!
//! // Server implements AiEnvironment
//! let service = ChatService::new(Arc::new(env), ChatConfig::default());
//!
//! let mut frames = service
//!     .stream_message(ChatRequest::new(conversation_id, "Hello"))
//!     .await?;
//!
//! while let Some(frame) = frames.next().await {
//!     match frame {
//!         StreamFrame::Chunk(chunk) => render(&chunk.content),
//!         StreamFrame::Error { error } => show_error(&error),
//!     }
//! }
//! ```

pub mod chat;
pub mod completion;
pub mod env;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export main types for convenience
pub use chat::{ChatConfig, ChatService, RelayState};
pub use completion::{
    accumulate, build_history, CompletionClientTrait, CompletionConfig, CompletionStream,
    OpenAiCompletionClient, UpstreamDelta, EMPTY_COMPLETION_FALLBACK,
};
pub use env::AiEnvironment;
pub use error::AiError;
