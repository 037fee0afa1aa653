use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use crate::app::AppState;
use crate::http_server;
use crate::proxy::{FetchConfig, ProxyService};
use crate::tests::helpers::{test_database, ScriptedFetcher};

/// The full application router backed by an in-memory database and the provided fetcher.
pub(crate) async fn test_router(fetcher: Arc<ScriptedFetcher>) -> Router {
    let proxy = ProxyService::new(FetchConfig::default(), fetcher);
    let state = AppState::new(test_database().await, proxy);

    http_server::router(state)
}

pub(crate) async fn send(router: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
    let response = router.clone().oneshot(request).await.expect("router is infallible");

    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body to be readable");

    (status, headers, body)
}
