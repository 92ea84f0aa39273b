//! Chat session: the active conversation plus the reply being rendered.

use log::info;

use promptdeck_core::chat::{ChatRequest, ModelId};
use promptdeck_core::conversations::{derive_title, Conversation, Message, NewConversation};

use crate::api_client::ApiClient;
use crate::errors::{ClientError, Result};
use crate::stream::{StreamHandler, StreamOutcome};
use crate::view_state::ChatViewState;

pub struct ChatSession {
    client: ApiClient,
    conversation_id: Option<String>,
    model: ModelId,
    view: ChatViewState,
}

impl ChatSession {
    /// A session with no conversation yet. The first `send` creates one.
    pub fn new(client: ApiClient, model: ModelId) -> Self {
        Self {
            client,
            conversation_id: None,
            model,
            view: ChatViewState::default(),
        }
    }

    /// Continues an existing conversation with its bound model.
    pub fn resume(client: ApiClient, conversation: &Conversation) -> Self {
        Self {
            client,
            conversation_id: Some(conversation.id.clone()),
            model: conversation.model,
            view: ChatViewState::default(),
        }
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    pub fn model(&self) -> ModelId {
        self.model
    }

    /// Model sent with later turns. Does not rebind the stored conversation.
    pub fn set_model(&mut self, model: ModelId) {
        self.model = model;
    }

    pub fn view(&self) -> &ChatViewState {
        &self.view
    }

    /// Drops the active conversation so the next `send` starts a new one.
    pub fn start_new(&mut self) {
        self.conversation_id = None;
        self.view.reset();
    }

    pub async fn history(&self) -> Result<Vec<Message>> {
        match &self.conversation_id {
            Some(id) => self.client.list_messages(id).await,
            None => Ok(Vec::new()),
        }
    }

    /// Sends `message` and streams the reply into the view.
    pub async fn send(&mut self, message: &str) -> Result<StreamOutcome> {
        let conversation_id = match &self.conversation_id {
            Some(id) => id.clone(),
            None => match self.open_conversation(message).await {
                Ok(id) => id,
                Err(e) => {
                    self.view.on_error(&e.to_string());
                    return Err(e);
                }
            },
        };

        self.view.reset();
        let request = ChatRequest::new(conversation_id, message).with_model(self.model);
        self.client
            .stream_chat_message(&request, &mut self.view)
            .await
    }

    async fn open_conversation(&mut self, first_message: &str) -> Result<String> {
        let title = derive_title(first_message)
            .ok_or_else(|| ClientError::InvalidInput("message is required".to_string()))?;

        let conversation = self
            .client
            .create_conversation(&NewConversation::new(title, self.model))
            .await?;
        info!(
            "Started conversation {} ({})",
            conversation.id, conversation.title
        );

        self.conversation_id = Some(conversation.id.clone());
        Ok(conversation.id)
    }
}
