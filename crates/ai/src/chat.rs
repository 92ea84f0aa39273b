//! Chat relay - user turn ↔ completion ↔ assistant turn, with streaming.
//!
//! This module provides the streaming relay between the HTTP layer and the
//! completion client. It handles:
//! - Validating the turn and persisting the user message before any upstream call
//! - Forwarding every cumulative chunk as one discrete frame
//! - Persisting the assistant message exactly once, on the first finished chunk
//! - Turning mid-stream failures into a single error frame

use dashmap::DashMap;
use futures::stream::BoxStream;
use futures::StreamExt;
use log::{debug, error, info, warn};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, OwnedMutexGuard};
use tokio_stream::wrappers::ReceiverStream;

use promptdeck_core::chat::{ChatExchange, ChatRequest, ChatTurn, ModelId, StreamFrame};
use promptdeck_core::conversations::{Conversation, NewMessage};

use crate::env::AiEnvironment;
use crate::error::AiError;

// ============================================================================
// Chat Configuration
// ============================================================================

/// Configuration for the chat relay.
pub struct ChatConfig {
    /// Serialise turns that target the same conversation.
    pub serialize_turns: bool,
    /// Frames buffered between the relay task and the transport.
    pub channel_capacity: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            serialize_turns: true,
            channel_capacity: 1,
        }
    }
}

// ============================================================================
// Relay State
// ============================================================================

/// Lifecycle of one streaming turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    Validating,
    PersistingUserTurn,
    Streaming,
    PersistingAssistantTurn,
    Persisted,
    Closed,
    Errored,
}

impl RelayState {
    pub fn can_transition_to(self, next: RelayState) -> bool {
        use RelayState::*;
        matches!(
            (self, next),
            (Validating, PersistingUserTurn)
                | (PersistingUserTurn, Streaming)
                | (Streaming, PersistingAssistantTurn)
                | (PersistingAssistantTurn, Persisted)
                | (Persisted, Closed)
                | (Validating, Errored)
                | (PersistingUserTurn, Errored)
                | (Streaming, Errored)
                | (PersistingAssistantTurn, Errored)
                | (Errored, Closed)
        )
    }

    pub fn is_final(self) -> bool {
        self == RelayState::Closed
    }
}

/// Tracks the state of one relay run and rejects illegal moves.
struct RelayRun {
    conversation_id: String,
    state: RelayState,
}

impl RelayRun {
    fn new(conversation_id: &str) -> Self {
        Self {
            conversation_id: conversation_id.to_string(),
            state: RelayState::Validating,
        }
    }

    fn advance(&mut self, next: RelayState) -> Result<(), AiError> {
        if !self.state.can_transition_to(next) {
            return Err(AiError::internal(format!(
                "Illegal relay transition {:?} -> {:?} for conversation {}",
                self.state, next, self.conversation_id
            )));
        }
        debug!(
            "Relay {}: {:?} -> {:?}",
            self.conversation_id, self.state, next
        );
        self.state = next;
        Ok(())
    }

    fn fail(&mut self) {
        if self.state.can_transition_to(RelayState::Errored) {
            self.state = RelayState::Errored;
        }
    }

    fn close(&mut self) {
        if self.state.can_transition_to(RelayState::Closed) {
            self.state = RelayState::Closed;
        } else {
            warn!(
                "Relay {} closed from unexpected state {:?}",
                self.conversation_id, self.state
            );
        }
    }
}

// ============================================================================
// Per-conversation Turn Locks
// ============================================================================

#[derive(Default)]
struct TurnLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl TurnLocks {
    async fn acquire(self: &Arc<Self>, conversation_id: &str) -> TurnGuard {
        let lock = self
            .locks
            .entry(conversation_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone();
        let guard = lock.lock_owned().await;
        TurnGuard {
            locks: self.clone(),
            conversation_id: conversation_id.to_string(),
            guard: Some(guard),
        }
    }

    fn release(&self, conversation_id: &str) {
        self.locks
            .remove_if(conversation_id, |_, lock| Arc::strong_count(lock) == 1);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.len()
    }
}

/// Holds a conversation's turn lock; drops the table entry once unused.
struct TurnGuard {
    locks: Arc<TurnLocks>,
    conversation_id: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for TurnGuard {
    fn drop(&mut self) {
        self.guard.take();
        self.locks.release(&self.conversation_id);
    }
}

// ============================================================================
// Chat Service
// ============================================================================

/// Chat service relaying turns between conversations and the completion client.
pub struct ChatService<E: AiEnvironment + 'static> {
    env: Arc<E>,
    config: ChatConfig,
    turn_locks: Arc<TurnLocks>,
}

impl<E: AiEnvironment + 'static> ChatService<E> {
    /// Create a new chat service.
    pub fn new(env: Arc<E>, config: ChatConfig) -> Self {
        Self {
            env,
            config,
            turn_locks: Arc::new(TurnLocks::default()),
        }
    }

    /// Get environment reference.
    pub fn env(&self) -> &Arc<E> {
        &self.env
    }

    /// Validates the request and resolves the target conversation and model.
    /// Performs no writes.
    fn resolve_turn(&self, request: &ChatRequest) -> Result<(Conversation, ModelId), AiError> {
        request.validate()?;
        let conversation = self
            .env
            .conversation_repository()
            .get_conversation(&request.conversation_id)?
            .ok_or_else(|| AiError::ConversationNotFound(request.conversation_id.clone()))?;
        let model = request.model.unwrap_or(conversation.model);
        Ok((conversation, model))
    }

    async fn acquire_turn(&self, conversation_id: &str) -> Option<TurnGuard> {
        if !self.config.serialize_turns {
            return None;
        }
        Some(self.turn_locks.acquire(conversation_id).await)
    }

    /// Send a message and wait for the full reply.
    ///
    /// The user message stays persisted when the upstream call fails.
    pub async fn send_message(&self, request: ChatRequest) -> Result<ChatExchange, AiError> {
        let (conversation, model) = self.resolve_turn(&request)?;
        let _turn = self.acquire_turn(&conversation.id).await;
        let repo = self.env.conversation_repository();

        let user_message = repo
            .create_message(NewMessage::user(&conversation.id, request.message))
            .await?;

        let history: Vec<ChatTurn> = repo
            .list_messages(&conversation.id)?
            .iter()
            .map(ChatTurn::from)
            .collect();

        info!(
            "Processing message for conversation {} with model {}",
            conversation.id, model
        );
        let reply = self
            .env
            .completion_client()
            .complete(&history, model)
            .await
            .inspect_err(|e| error!("Completion for {} failed: {}", conversation.id, e))?;

        let assistant_message = repo
            .create_message(NewMessage::assistant(&conversation.id, reply))
            .await?;

        Ok(ChatExchange {
            user_message,
            assistant_message,
        })
    }

    /// Send a message and get a stream of frames.
    ///
    /// Validation, a missing conversation, and failure to store the user turn
    /// are returned as errors before any frame is produced. Everything after
    /// that is reported in-band as a single error frame.
    pub async fn stream_message(
        &self,
        request: ChatRequest,
    ) -> Result<BoxStream<'static, StreamFrame>, AiError> {
        let mut relay = RelayRun::new(&request.conversation_id);

        let (conversation, model) = match self.resolve_turn(&request) {
            Ok(resolved) => resolved,
            Err(e) => {
                relay.fail();
                return Err(e);
            }
        };

        let turn = self.acquire_turn(&conversation.id).await;
        relay.advance(RelayState::PersistingUserTurn)?;

        let repo = self.env.conversation_repository();
        if let Err(e) = repo
            .create_message(NewMessage::user(&conversation.id, request.message))
            .await
        {
            relay.fail();
            return Err(e.into());
        }
        relay.advance(RelayState::Streaming)?;

        info!(
            "Streaming reply for conversation {} with model {}",
            conversation.id, model
        );

        let (tx, rx) = mpsc::channel::<StreamFrame>(self.config.channel_capacity.max(1));
        let env = self.env.clone();
        let conversation_id = conversation.id;

        tokio::spawn(async move {
            let mut sink = FrameSink::new(tx, &conversation_id);
            let result =
                relay_completion(env, &conversation_id, model, &mut sink, &mut relay).await;
            if let Err(e) = result {
                error!("Chat stream for {} failed: {}", conversation_id, e);
                relay.fail();
                sink.send(StreamFrame::error(e.stream_message())).await;
            }
            relay.close();
            // Release the turn before the channel closes.
            drop(turn);
            drop(sink);
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }
}

// ============================================================================
// Relay Task
// ============================================================================

/// Sender side of the frame channel. Once the consumer is gone, sends are
/// dropped silently and the relay keeps running.
struct FrameSink {
    tx: mpsc::Sender<StreamFrame>,
    conversation_id: String,
    connected: bool,
}

impl FrameSink {
    fn new(tx: mpsc::Sender<StreamFrame>, conversation_id: &str) -> Self {
        Self {
            tx,
            conversation_id: conversation_id.to_string(),
            connected: true,
        }
    }

    async fn send(&mut self, frame: StreamFrame) {
        if !self.connected {
            return;
        }
        if self.tx.send(frame).await.is_err() {
            debug!(
                "Client for conversation {} disconnected; finishing without it",
                self.conversation_id
            );
            self.connected = false;
        }
    }
}

async fn relay_completion<E: AiEnvironment + 'static>(
    env: Arc<E>,
    conversation_id: &str,
    model: ModelId,
    sink: &mut FrameSink,
    relay: &mut RelayRun,
) -> Result<(), AiError> {
    let repo = env.conversation_repository();

    // Includes the user turn stored just before.
    let history: Vec<ChatTurn> = repo
        .list_messages(conversation_id)?
        .iter()
        .map(ChatTurn::from)
        .collect();

    let mut upstream = env
        .completion_client()
        .stream_complete(history, model)
        .await?;

    while let Some(item) = upstream.next().await {
        let chunk = item?;

        if !chunk.finished {
            sink.send(StreamFrame::from(chunk)).await;
            continue;
        }

        let content = chunk.content.clone();
        sink.send(StreamFrame::from(chunk)).await;

        relay.advance(RelayState::PersistingAssistantTurn)?;
        let message = repo
            .create_message(NewMessage::assistant(conversation_id, content))
            .await?;
        relay.advance(RelayState::Persisted)?;
        info!(
            "Stored assistant message {} for conversation {}",
            message.id, conversation_id
        );
        // Anything the upstream sends after this is ignored.
        return Ok(());
    }

    Err(AiError::upstream(
        "Upstream stream ended before the reply finished",
    ))
}
