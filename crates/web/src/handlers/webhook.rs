use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use worktree_relay_core::models::Stage;
use worktree_relay_trigger::{Dispatcher, TriggerOutcome};

use crate::payload::{
    BugfixCompletePayload, ClaudeCompletePayload, JsonPayload, TestsCompletePayload,
    WorkflowPayload,
};

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub status: &'static str,
    pub message: String,
}

fn respond(outcome: TriggerOutcome, message: impl Into<String>, failure: &'static str) -> Response {
    if outcome.is_success() {
        Json(WebhookResponse { status: "success", message: message.into() }).into_response()
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, failure).into_response()
    }
}

/// Code generation finished: run the tests.
pub async fn claude_complete(
    State(dispatcher): State<Arc<Dispatcher>>,
    JsonPayload(payload): JsonPayload<ClaudeCompletePayload>,
) -> Response {
    tracing::info!("Claude Code completion webhook received");
    let project_name = payload.project_name();
    tracing::info!("Project: {}, Worktree: {}", project_name, payload.worktree_type());
    let outcome = dispatcher.trigger(Stage::Test.as_str(), project_name).await;
    respond(outcome, "Test workflow triggered", "Failed to trigger test workflow")
}

/// Tests finished: update the documentation.
pub async fn tests_complete(
    State(dispatcher): State<Arc<Dispatcher>>,
    JsonPayload(payload): JsonPayload<TestsCompletePayload>,
) -> Response {
    tracing::info!("Tests completion webhook received");
    let project_name = payload.project_name();
    tracing::info!("Project: {}, Test results: {}", project_name, payload.test_results());
    let outcome = dispatcher.trigger(Stage::Docs.as_str(), project_name).await;
    respond(outcome, "Documentation workflow triggered", "Failed to trigger documentation workflow")
}

/// Bug fix finished: validate it.
pub async fn bugfix_complete(
    State(dispatcher): State<Arc<Dispatcher>>,
    JsonPayload(payload): JsonPayload<BugfixCompletePayload>,
) -> Response {
    tracing::info!("Bugfix completion webhook received");
    let project_name = payload.project_name();
    tracing::info!("Project: {}, Bugfix ID: {}", project_name, payload.bugfix_id());
    let outcome = dispatcher.trigger(Stage::Validation.as_str(), project_name).await;
    respond(outcome, "Validation workflow triggered", "Failed to trigger validation workflow")
}

pub async fn workflow(
    State(dispatcher): State<Arc<Dispatcher>>,
    JsonPayload(payload): JsonPayload<WorkflowPayload>,
) -> Response {
    tracing::info!("Generic workflow webhook received");
    let workflow_type = payload.workflow_type();
    let project_name = payload.project_name();
    tracing::info!("Workflow type: {}, Project: {}", workflow_type, project_name);
    let outcome = dispatcher.trigger(workflow_type, project_name).await;
    respond(outcome, format!("{workflow_type} workflow triggered"), "Failed to trigger workflow")
}
