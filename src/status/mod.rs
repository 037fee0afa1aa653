use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::app::AppState;
use crate::extractors::ApiJson;
use crate::database::Database;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/status", get(list_handler).post(create_handler))
        .with_state(state)
}

/// A single check-in from a client.
#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct StatusCheck {
    pub id: String,
    pub client_name: String,

    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

#[derive(Deserialize)]
pub struct NewStatusCheck {
    client_name: String,
}

/// Append-only record of client pings.
#[derive(Clone)]
pub struct PingLog {
    database: Database,
}

impl PingLog {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    pub async fn append(&self, client_name: &str) -> Result<StatusCheck, sqlx::Error> {
        let check = StatusCheck {
            id: Uuid::new_v4().to_string(),
            client_name: client_name.to_string(),
            timestamp: OffsetDateTime::now_utc(),
        };

        sqlx::query("INSERT INTO status_checks (id, client_name, timestamp) VALUES (?, ?, ?);")
            .bind(&check.id)
            .bind(&check.client_name)
            .bind(check.timestamp)
            .execute(self.database.pool())
            .await?;

        Ok(check)
    }

    pub async fn list_all(&self) -> Result<Vec<StatusCheck>, sqlx::Error> {
        sqlx::query_as::<_, StatusCheck>(
            "SELECT id, client_name, timestamp FROM status_checks ORDER BY rowid;",
        )
        .fetch_all(self.database.pool())
        .await
    }
}

pub async fn create_handler(
    State(ping_log): State<PingLog>,
    ApiJson(request): ApiJson<NewStatusCheck>,
) -> Response {
    match ping_log.append(&request.client_name).await {
        Ok(check) => (StatusCode::OK, Json(check)).into_response(),
        Err(err) => storage_failure(err),
    }
}

pub async fn list_handler(State(ping_log): State<PingLog>) -> Response {
    match ping_log.list_all().await {
        Ok(checks) => (StatusCode::OK, Json(checks)).into_response(),
        Err(err) => storage_failure(err),
    }
}

fn storage_failure(err: sqlx::Error) -> Response {
    tracing::error!("ping log storage failed: {err}");

    let msg = serde_json::json!({"status": "error", "message": "ping log unavailable"});
    (StatusCode::INTERNAL_SERVER_ERROR, Json(msg)).into_response()
}
