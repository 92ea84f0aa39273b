use std::sync::Arc;

use axum::{routing::get, Json, Router};
use promptdeck_core::chat::{available_models, ModelInfo};

use crate::main_lib::AppState;

async fn list_models() -> Json<Vec<ModelInfo>> {
    Json(available_models())
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/models", get(list_models))
}
