pub mod config;
pub mod logging;
pub mod models;
pub mod util;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Error returned by request handling. Logged and rendered as a plain-text 500.
pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!("Error handling request: {:#}", self.0);
        (StatusCode::INTERNAL_SERVER_ERROR, format!("Internal server error: {:#}", self.0))
            .into_response()
    }
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
    fn from(err: E) -> Self { Self(err.into()) }
}
