use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use promptdeck_core::prompts::{NewPrompt, Prompt, PromptUpdate};

use super::{ApiJson, SuccessResponse};
use crate::{error::ApiResult, main_lib::AppState};

async fn list_prompts(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Prompt>>> {
    let prompts = state.prompt_service.get_prompts()?;
    Ok(Json(prompts))
}

async fn get_prompt(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Prompt>> {
    let prompt = state.prompt_service.get_prompt(&id)?;
    Ok(Json(prompt))
}

async fn create_prompt(
    State(state): State<Arc<AppState>>,
    ApiJson(prompt): ApiJson<NewPrompt>,
) -> ApiResult<Json<Prompt>> {
    let created = state.prompt_service.create_prompt(prompt).await?;
    Ok(Json(created))
}

async fn update_prompt(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    ApiJson(update): ApiJson<PromptUpdate>,
) -> ApiResult<Json<Prompt>> {
    let updated = state.prompt_service.update_prompt(id, update).await?;
    Ok(Json(updated))
}

async fn delete_prompt(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<SuccessResponse>> {
    state.prompt_service.delete_prompt(id).await?;
    Ok(Json(SuccessResponse::ok()))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/prompts", get(list_prompts).post(create_prompt))
        .route(
            "/prompts/{id}",
            get(get_prompt).put(update_prompt).delete(delete_prompt),
        )
}
