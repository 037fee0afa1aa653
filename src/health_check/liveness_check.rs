use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// The process is up and able to answer requests. Dependencies are not consulted here, that is
/// the job of the readiness check.
pub async fn handler() -> Response {
    let msg = serde_json::json!({"status": "ok"});
    (StatusCode::OK, Json(msg)).into_response()
}
