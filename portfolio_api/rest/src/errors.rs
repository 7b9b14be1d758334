use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::models::ApiError;

/// Log `err` and respond with a generic 500 carrying `message`.
pub fn internal_server_error(err: impl Into<anyhow::Error>, message: &'static str) -> Response {
    let err = err.into();
    tracing::error!("internal server error: {err:#}");
    error(StatusCode::INTERNAL_SERVER_ERROR, message)
}

pub fn error(code: StatusCode, message: impl Into<String>) -> Response {
    (
        code,
        Json(ApiError {
            message: message.into(),
        }),
    )
        .into_response()
}
