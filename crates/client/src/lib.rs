//! PromptDeck Client - typed API access and the event-stream consumer.
//!
//! [`ApiClient`] wraps the REST routes. [`consume_stream`] turns the byte
//! stream of `POST /api/chat/stream` into ordered [`StreamHandler`] callbacks,
//! and [`ChatSession`] ties both together for a single chat pane.

pub mod api_client;
pub mod errors;
pub mod session;
pub mod stream;
pub mod view_state;

pub use api_client::{ApiClient, DeleteResponse, DEFAULT_API_URL};
pub use errors::{ClientError, Result};
pub use session::ChatSession;
pub use stream::{
    consume_stream, parse_line, SseLineDecoder, StreamHandler, StreamOutcome, STREAM_ENDED_EARLY,
};
pub use view_state::ChatViewState;
