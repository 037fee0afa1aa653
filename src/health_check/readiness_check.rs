use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Something the service can't do its job without. The catalog and ping log routes are useless
/// without the database, so that is what gets probed.
#[async_trait]
pub trait DataSource {
    async fn is_ready(&self) -> Result<(), DataSourceError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DataSourceError {
    #[error("one or more dependent services aren't available")]
    DependencyFailure,
}

pub type DynDataSource = Arc<dyn DataSource + Send + Sync>;

/// An unreachable database takes the instance out of rotation even though the proxy routes
/// would still answer.
pub async fn handler(State(data_source): State<DynDataSource>) -> Response {
    match data_source.is_ready().await {
        Ok(()) => {
            let msg = serde_json::json!({"status": "ok"});
            (StatusCode::OK, Json(msg)).into_response()
        }
        Err(err) => {
            tracing::warn!("readiness check failed: {err}");

            let msg = serde_json::json!({"status": "failure", "message": "catalog storage is unavailable"});
            (StatusCode::SERVICE_UNAVAILABLE, Json(msg)).into_response()
        }
    }
}
