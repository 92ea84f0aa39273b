//! Chat module - model identifiers, turn shapes and stream framing.

mod chat_model;

pub use chat_model::{
    available_models, ChatExchange, ChatRequest, ChatTurn, MessageRole, ModelId, ModelInfo,
    StreamChunk, StreamFrame, DATA_PREFIX, FRAME_TERMINATOR,
};
