use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::app::Version;

pub async fn handler() -> Response {
    let version = Version::new();

    let msg = serde_json::json!({
        "build_profile": version.build_profile,
        "name": version.name,
        "version": version.version,
    });

    (StatusCode::OK, Json(msg)).into_response()
}
