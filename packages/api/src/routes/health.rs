use axum::{http::StatusCode, Json};
use serde_json::{json, Value};

/// Liveness probe; needs no identity.
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
