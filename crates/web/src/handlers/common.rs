use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    Json,
    extract::Request,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::payload::{parse_json, read_body};

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub timestamp: f64,
}

pub async fn health() -> Json<Health> {
    let timestamp =
        SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs_f64()).unwrap_or_default();
    Json(Health { status: "healthy", timestamp })
}

/// Unknown path or method. A POST body is parsed before the path is rejected, so
/// malformed JSON is reported as such on any path.
pub async fn not_found(req: Request) -> Response {
    let method = req.method().clone();
    if method == Method::POST {
        match read_body(req, &()).await.and_then(|body| parse_json(&body)) {
            Ok(_) => (StatusCode::NOT_FOUND, "Endpoint not found").into_response(),
            Err(response) => response,
        }
    } else if method == Method::GET || method == Method::HEAD {
        (StatusCode::NOT_FOUND, "Not found").into_response()
    } else {
        (StatusCode::NOT_IMPLEMENTED, format!("Unsupported method ('{method}')")).into_response()
    }
}
