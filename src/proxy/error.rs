use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::proxy::FetchError;

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("no candidate location served the game '{0}'")]
    AssetNotFound(String),

    #[error("error fetching website: {0}")]
    Fetch(#[from] FetchError),

    #[error("unusable target: {0}")]
    InvalidInput(String),
}

impl ProxyError {
    /// Used by routes that hand upstream failures straight back to the client rather than
    /// collapsing them into a 400.
    pub fn propagated_status(&self) -> StatusCode {
        match self {
            ProxyError::Fetch(FetchError::UpstreamNon2xx(status)) => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            _ => self.status_code(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::AssetNotFound(_) => StatusCode::NOT_FOUND,
            ProxyError::Fetch(FetchError::ClientBuild(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::Fetch(_) | ProxyError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn into_propagated_response(self) -> Response {
        let status = self.propagated_status();
        error_response(status, &self)
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        error_response(self.status_code(), &self)
    }
}

fn error_response(status: StatusCode, err: &ProxyError) -> Response {
    if status.is_server_error() {
        tracing::error!("proxy request failed: {err}");
    } else {
        tracing::warn!("proxy request failed: {err}");
    }

    let msg = serde_json::json!({"status": "error", "message": err.to_string()});
    (status, Json(msg)).into_response()
}
