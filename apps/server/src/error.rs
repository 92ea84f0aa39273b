use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use promptdeck_ai::AiError;
use promptdeck_core::errors::Error as CoreError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("{0}")]
    Ai(#[from] AiError),
    #[error("{0}")]
    BadRequest(String),
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<String>>,
}

fn core_status(err: &CoreError) -> (StatusCode, Option<Vec<String>>) {
    match err {
        CoreError::Validation(v) => (StatusCode::BAD_REQUEST, Some(v.details())),
        e if e.is_not_found() => (StatusCode::NOT_FOUND, None),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, None),
    }
}

impl ApiError {
    fn status_and_details(&self) -> (StatusCode, Option<Vec<String>>) {
        match self {
            ApiError::Core(e) => core_status(e),
            ApiError::Ai(e) => match e {
                AiError::Core(core) => core_status(core),
                AiError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, Some(vec![msg.clone()])),
                AiError::ConversationNotFound(_) => (StatusCode::NOT_FOUND, None),
                AiError::MissingApiKey(_)
                | AiError::Upstream(_)
                | AiError::Transport(_)
                | AiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, None),
            },
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, Some(vec![msg.clone()])),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, details) = self.status_and_details();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message: self.to_string(),
            details,
        });
        (status, body).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use promptdeck_core::errors::ValidationError;

    #[test]
    fn test_status_mapping() {
        let validation: ApiError =
            CoreError::Validation(ValidationError::InvalidFields(vec!["a".into(), "b".into()]))
                .into();
        assert_eq!(
            validation.status_and_details(),
            (StatusCode::BAD_REQUEST, Some(vec!["a".into(), "b".into()]))
        );

        let missing: ApiError = CoreError::not_found("Prompt", "p1").into();
        assert_eq!(missing.status_and_details().0, StatusCode::NOT_FOUND);
        assert_eq!(missing.to_string(), "Prompt p1 not found");

        let not_found: ApiError = AiError::ConversationNotFound("c9".into()).into();
        assert_eq!(not_found.status_and_details().0, StatusCode::NOT_FOUND);

        let upstream: ApiError = AiError::upstream("OpenAI API error: 503").into();
        assert_eq!(
            upstream.status_and_details().0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
