use std::{sync::Arc, time::Duration};

use axum::{
    extract::State,
    http::{header::HeaderName, HeaderValue},
    response::{
        sse::{Event as SseEvent, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::post,
    Json, Router,
};
use futures::StreamExt;
use promptdeck_core::chat::{ChatExchange, ChatRequest};

use super::ApiJson;
use crate::{error::ApiResult, main_lib::AppState};

const X_ACCEL_BUFFERING: HeaderName = HeaderName::from_static("x-accel-buffering");

async fn send_message(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<ChatRequest>,
) -> ApiResult<Json<ChatExchange>> {
    let exchange = state.chat_service.send_message(request).await?;
    Ok(Json(exchange))
}

/// Streams the reply as `data: {...}` events. Validation and lookup
/// failures are answered with a JSON error before the stream opens.
async fn stream_message(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<ChatRequest>,
) -> ApiResult<Response> {
    let frames = state.chat_service.stream_message(request).await?;
    let events = frames.map(|frame| SseEvent::default().json_data(frame));

    let sse = Sse::new(events).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    );
    Ok((
        [(X_ACCEL_BUFFERING, HeaderValue::from_static("no"))],
        sse,
    )
        .into_response())
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/chat", post(send_message))
        .route("/chat/stream", post(stream_message))
}
