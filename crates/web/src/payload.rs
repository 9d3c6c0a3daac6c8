use anyhow::anyhow;
use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;
use worktree_relay_core::AppError;

const UNKNOWN: &str = "unknown";

/// Parse a request body as JSON. Only a syntax error is a client error; anything else
/// that goes wrong is reported as an internal error.
pub fn parse_json(body: &[u8]) -> Result<Value, Response> {
    let text = std::str::from_utf8(body).map_err(|e| AppError::from(e).into_response())?;
    serde_json::from_str(text)
        .map_err(|_| (StatusCode::BAD_REQUEST, "Invalid JSON data").into_response())
}

/// Read the whole request body, whatever its `Content-Type`.
pub async fn read_body<S: Send + Sync>(req: Request, state: &S) -> Result<Bytes, Response> {
    Bytes::from_request(req, state)
        .await
        .map_err(|e| AppError::from(anyhow!("error reading body: {e}")).into_response())
}

/// JSON body extractor that does not require a `Content-Type` header.
///
/// A body that is not JSON is rejected with `400 Invalid JSON data`. A body that is
/// JSON but does not fit the payload type is an internal error.
#[must_use]
pub struct JsonPayload<T>(pub T);

impl<S, T> FromRequest<S> for JsonPayload<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = read_body(req, state).await?;
        let value = parse_json(&body)?;
        if !value.is_object() {
            return Err(AppError::from(anyhow!("expected a JSON object")).into_response());
        }
        let payload =
            serde_json::from_value(value).map_err(|e| AppError::from(e).into_response())?;
        Ok(Self(payload))
    }
}

/// `POST /webhook/claude-complete`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClaudeCompletePayload {
    pub project_name: Option<String>,
    pub worktree_type: Option<String>,
}

impl ClaudeCompletePayload {
    pub fn project_name(&self) -> &str { self.project_name.as_deref().unwrap_or(UNKNOWN) }

    pub fn worktree_type(&self) -> &str { self.worktree_type.as_deref().unwrap_or("feature") }
}

/// `POST /webhook/tests-complete`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TestsCompletePayload {
    pub project_name: Option<String>,
    pub test_results: Option<Value>,
}

impl TestsCompletePayload {
    pub fn project_name(&self) -> &str { self.project_name.as_deref().unwrap_or(UNKNOWN) }

    pub fn test_results(&self) -> String {
        self.test_results.as_ref().map_or_else(|| "{}".to_string(), Value::to_string)
    }
}

/// `POST /webhook/bugfix-complete`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BugfixCompletePayload {
    pub project_name: Option<String>,
    pub bugfix_id: Option<Value>,
}

impl BugfixCompletePayload {
    pub fn project_name(&self) -> &str { self.project_name.as_deref().unwrap_or(UNKNOWN) }

    /// Bugfix IDs are commonly sent as numbers; strings are shown without quotes.
    pub fn bugfix_id(&self) -> String {
        match &self.bugfix_id {
            Some(Value::String(id)) => id.clone(),
            Some(value) => value.to_string(),
            None => UNKNOWN.to_string(),
        }
    }
}

/// `POST /webhook/workflow`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WorkflowPayload {
    pub workflow_type: Option<String>,
    pub project_name: Option<String>,
}

impl WorkflowPayload {
    pub fn workflow_type(&self) -> &str { self.workflow_type.as_deref().unwrap_or(UNKNOWN) }

    pub fn project_name(&self) -> &str { self.project_name.as_deref().unwrap_or(UNKNOWN) }
}
