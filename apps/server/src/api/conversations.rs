use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use promptdeck_core::conversations::{Conversation, Message, NewConversation};

use super::{ApiJson, SuccessResponse};
use crate::{error::ApiResult, main_lib::AppState};

async fn list_conversations(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Conversation>>> {
    let conversations = state.conversation_service.get_conversations()?;
    Ok(Json(conversations))
}

async fn get_conversation(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Conversation>> {
    let conversation = state.conversation_service.get_conversation(&id)?;
    Ok(Json(conversation))
}

async fn create_conversation(
    State(state): State<Arc<AppState>>,
    ApiJson(conversation): ApiJson<NewConversation>,
) -> ApiResult<Json<Conversation>> {
    let created = state
        .conversation_service
        .create_conversation(conversation)
        .await?;
    Ok(Json(created))
}

/// Removes the conversation together with its messages.
async fn delete_conversation(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<SuccessResponse>> {
    state.conversation_service.delete_conversation(id).await?;
    Ok(Json(SuccessResponse::ok()))
}

async fn list_messages(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Message>>> {
    let messages = state.conversation_service.get_messages(&id)?;
    Ok(Json(messages))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/conversations",
            get(list_conversations).post(create_conversation),
        )
        .route(
            "/conversations/{id}",
            get(get_conversation).delete(delete_conversation),
        )
        .route("/conversations/{id}/messages", get(list_messages))
}
