use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

mod candidates;
mod error;
mod fetcher;
mod rewrite;
mod service;
pub mod sources;
mod target;

pub use candidates::{resolve_named_asset, MatchedAsset};
pub use error::ProxyError;
pub use fetcher::{Fetch, FetchConfig, FetchError, HttpFetcher, UpstreamResult};
pub use rewrite::{prefix_relative_references, Rewriter};
pub use service::{ProxiedDocument, ProxyService};
pub use target::{resolve, ResolvedTarget};

use crate::app::AppState;
use crate::extractors::{ApiJson, ApiQuery};

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/proxy", post(proxy_handler))
        .route("/proxy-direct", get(proxy_direct_handler))
        .route("/smart-proxy", post(smart_proxy_handler))
        .route("/search-suggestions", get(search_suggestions_handler))
        .route("/gn-math-proxy", get(game_proxy_handler))
        .route("/gnmath-proxy", get(portal_proxy_handler))
        .route("/gn-math-games", get(known_games_handler))
        .with_state(state)
}

#[derive(Deserialize)]
pub struct ProxyRequest {
    url: String,
}

#[derive(Deserialize)]
pub struct DirectQuery {
    url: String,
}

#[derive(Deserialize)]
pub struct SuggestionQuery {
    #[serde(default)]
    q: String,
}

#[derive(Deserialize)]
pub struct GameQuery {
    game: String,
}

#[derive(Serialize)]
struct Suggestions {
    suggestions: Vec<String>,
}

#[derive(Serialize)]
struct KnownGames {
    games: &'static [&'static str],
}

pub async fn proxy_handler(
    State(proxy): State<ProxyService>,
    ApiJson(request): ApiJson<ProxyRequest>,
) -> Result<ProxiedDocument, ProxyError> {
    let target = ResolvedTarget::from_url_input(&request.url)?;
    proxy.proxy(&target, Rewriter::basic()).await
}

pub async fn proxy_direct_handler(
    State(proxy): State<ProxyService>,
    ApiQuery(query): ApiQuery<DirectQuery>,
) -> Result<ProxiedDocument, ProxyError> {
    let target = ResolvedTarget::from_url_input(&query.url)?;
    proxy.proxy(&target, Rewriter::basic()).await
}

pub async fn smart_proxy_handler(
    State(proxy): State<ProxyService>,
    ApiJson(request): ApiJson<ProxyRequest>,
) -> Result<ProxiedDocument, ProxyError> {
    let target = resolve(&request.url)?;
    proxy.proxy(&target, Rewriter::enhanced()).await
}

pub async fn search_suggestions_handler(
    State(proxy): State<ProxyService>,
    ApiQuery(query): ApiQuery<SuggestionQuery>,
) -> Response {
    let suggestions = proxy.suggestions(&query.q).await;
    Json(Suggestions { suggestions }).into_response()
}

pub async fn game_proxy_handler(
    State(proxy): State<ProxyService>,
    ApiQuery(query): ApiQuery<GameQuery>,
) -> Result<ProxiedDocument, ProxyError> {
    proxy.named_asset(&query.game).await
}

pub async fn portal_proxy_handler(State(proxy): State<ProxyService>) -> Response {
    match proxy.portal().await {
        Ok(doc) => doc.into_response(),
        Err(err) => err.into_propagated_response(),
    }
}

pub async fn known_games_handler() -> Response {
    Json(KnownGames {
        games: sources::KNOWN_GAMES,
    })
    .into_response()
}
