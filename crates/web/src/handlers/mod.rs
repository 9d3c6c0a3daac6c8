use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::AppState;

mod common;
mod webhook;

pub const WEBHOOK_PATHS: &[&str] = &[
    "/webhook/claude-complete",
    "/webhook/tests-complete",
    "/webhook/bugfix-complete",
    "/webhook/workflow",
];

pub fn build_router() -> Router<AppState> {
    // Method mismatches on known paths answer like unknown paths
    Router::new()
        .route("/health", get(common::health).fallback(common::not_found))
        .route(
            "/webhook/claude-complete",
            post(webhook::claude_complete).fallback(common::not_found),
        )
        .route(
            "/webhook/tests-complete",
            post(webhook::tests_complete).fallback(common::not_found),
        )
        .route(
            "/webhook/bugfix-complete",
            post(webhook::bugfix_complete).fallback(common::not_found),
        )
        .route("/webhook/workflow", post(webhook::workflow).fallback(common::not_found))
        .fallback(common::not_found)
        // Bodies are read in full, as announced by `Content-Length`
        .layer(DefaultBodyLimit::disable())
}
