use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;

mod defaults;
mod store;

pub use store::{Catalog, CatalogError, CategoryCount, Game, NewGame};

use crate::app::AppState;
use crate::extractors::{ApiJson, ApiQuery};

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/games", get(list_handler).post(create_handler))
        .route("/games/categories", get(categories_handler))
        .route("/games/init-defaults", post(init_defaults_handler))
        .route("/games/:game_id", delete(delete_handler))
        .with_state(state)
}

#[derive(Deserialize)]
pub struct ListQuery {
    category: Option<String>,
}

pub async fn create_handler(
    State(catalog): State<Catalog>,
    ApiJson(new_game): ApiJson<NewGame>,
) -> Result<Json<Game>, CatalogError> {
    let game = catalog.insert(new_game).await?;
    tracing::info!(game_id = %game.id, "game added to the catalog");

    Ok(Json(game))
}

pub async fn list_handler(
    State(catalog): State<Catalog>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Json<Vec<Game>>, CatalogError> {
    let category = query.category.as_deref().filter(|c| !c.is_empty());
    Ok(Json(catalog.list(category).await?))
}

pub async fn categories_handler(
    State(catalog): State<Catalog>,
) -> Result<Json<Vec<CategoryCount>>, CatalogError> {
    Ok(Json(catalog.count_by_category().await?))
}

pub async fn delete_handler(
    State(catalog): State<Catalog>,
    Path(game_id): Path<String>,
) -> Result<Response, CatalogError> {
    if !catalog.delete_by_id(&game_id).await? {
        let msg = serde_json::json!({"status": "error", "message": "Game not found"});
        return Ok((StatusCode::NOT_FOUND, Json(msg)).into_response());
    }

    let msg = serde_json::json!({"message": "Game deleted successfully"});
    Ok((StatusCode::OK, Json(msg)).into_response())
}

pub async fn init_defaults_handler(State(catalog): State<Catalog>) -> Result<Response, CatalogError> {
    let count = catalog.replace_with_defaults().await?;
    tracing::info!(count, "catalog reset to the default games");

    let msg = serde_json::json!({"message": format!("Initialized {count} default games")});
    Ok((StatusCode::OK, Json(msg)).into_response())
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        tracing::error!("catalog request failed: {self}");

        let msg = serde_json::json!({"status": "error", "message": "catalog storage unavailable"});
        (StatusCode::INTERNAL_SERVER_ERROR, Json(msg)).into_response()
    }
}
