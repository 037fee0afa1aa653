use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Request};
use axum::http::uri::PathAndQuery;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::MakeRequestUuid;
use tower_http::sensitive_headers::{
    SetSensitiveRequestHeadersLayer, SetSensitiveResponseHeadersLayer,
};
use tower_http::trace::{DefaultOnFailure, DefaultOnResponse, MakeSpan, TraceLayer};
use tower_http::{LatencyUnit, ServiceBuilderExt};
use tracing::{Level, Span};

use crate::app::{AppState, Config, Error};
use crate::{catalog, health_check, proxy, status};

mod error_handlers;

static FILTERED_VALUE: &str = "<filtered>";

static MISSING_VALUE: &str = "<not_provided>";

/// The largest size content that any client can send us before we reject it. Requests only ever
/// carry small JSON documents, the large bodies flow the other way.
const REQUEST_MAX_SIZE: usize = 256 * 1_024;

/// The maximum number of seconds that any individual request can take before it is dropped with an
/// error. Upstream timeouts apply per fetch, so this has to leave room for a full walk of the game
/// mirrors.
const REQUEST_TIMEOUT_SECS: u64 = 120;

const SENSITIVE_HEADERS: &[http::HeaderName] = &[
    header::AUTHORIZATION,
    header::COOKIE,
    header::PROXY_AUTHORIZATION,
    header::SET_COOKIE,
];

static SERVICE_BANNER: &str = "AccessAnywhere - Unblock websites and play games!";

#[derive(Clone, Default)]
struct SensitiveRequestMakeSpan;

impl<B> MakeSpan<B> for SensitiveRequestMakeSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        let uri = match request.uri().path_and_query() {
            Some(path_and_query) => filter_path_and_query(path_and_query),
            None => request.uri().path().to_string(),
        };

        tracing::span!(
            Level::INFO,
            "http_request",
            method = %request.method(),
            uri = %uri,
            version = ?request.version(),
        )
    }
}

/// Proxied URLs and search phrases arrive in query strings, only the parameter names are worth
/// logging.
fn filter_path_and_query(path_and_query: &PathAndQuery) -> String {
    let query = match path_and_query.query() {
        Some(q) => q,
        None => {
            return path_and_query.to_string();
        }
    };

    let mut filtered_query_pairs = vec![];
    for query_pair in query.split('&') {
        let mut qp_iter = query_pair.split('=');

        match (qp_iter.next(), qp_iter.next()) {
            (Some(key), Some(val)) if !key.is_empty() && !val.is_empty() => {
                filtered_query_pairs.push([key, FILTERED_VALUE].join("="));
            }
            (Some(key), _) if !key.is_empty() => {
                filtered_query_pairs.push([key, MISSING_VALUE].join("="));
            }
            unknown => {
                tracing::warn!("encountered weird query pair: {unknown:?}");
            }
        }
    }

    if filtered_query_pairs.is_empty() {
        return path_and_query.path().to_string();
    }

    format!("{}?{}", path_and_query.path(), filtered_query_pairs.join("&"))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(val) => Some(val),
            Err(err) => {
                tracing::warn!(origin, "ignoring unusable CORS origin: {err}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn banner_handler() -> Response {
    Json(serde_json::json!({"message": SERVICE_BANNER})).into_response()
}

/// All of the application routes without any of the middleware.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/", get(banner_handler))
        .merge(proxy::router(state.clone()))
        .merge(catalog::router(state.clone()))
        .merge(status::router(state.clone()));

    Router::new()
        .route("/api/", get(banner_handler))
        .nest("/api", api)
        .nest("/_status", health_check::router(state.clone()))
        .fallback(error_handlers::not_found_handler)
        .with_state(state)
}

pub async fn run(config: Config, mut shutdown_rx: watch::Receiver<()>) -> Result<(), HttpServerError> {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(SensitiveRequestMakeSpan)
        .on_response(
            DefaultOnResponse::new()
                .include_headers(false)
                .level(config.log_level())
                .latency_unit(LatencyUnit::Micros),
        )
        .on_failure(DefaultOnFailure::new().latency_unit(LatencyUnit::Micros));

    // The order of these layers and configuration extensions was carefully chosen as they will see
    // the requests to responses effectively in the order they're defined.
    let middleware_stack = ServiceBuilder::new()
        // Tracing and log handling get setup before anything else
        .layer(trace_layer)
        .layer(HandleErrorLayer::new(error_handlers::server_error_handler))
        // From here on out our requests might be logged, ensure any sensitive headers are stripped
        // before we do any logging
        .layer(SetSensitiveRequestHeadersLayer::from_shared(
            SENSITIVE_HEADERS.into(),
        ))
        // If requests are queued or take longer than this duration we want the cut them off
        // regardless of any other protections that are inplace
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        // If any future services or middleware indicate they're not available, reject them with a
        // service too busy error
        .load_shed()
        // Each request may hold an outbound connection open for a while, keep the total bounded
        .concurrency_limit(1024)
        // Make sure our request has a unique identifier if we don't already have one.
        .set_x_request_id(MakeRequestUuid)
        .propagate_x_request_id()
        .layer(DefaultBodyLimit::max(REQUEST_MAX_SIZE))
        // Browsers load the proxied documents from the frontend's origin
        .layer(cors_layer(config.cors_origins()))
        // Finally make sure any responses successfully generated from our service is also
        // filtering out any sensitive headers from our logs.
        .layer(SetSensitiveResponseHeadersLayer::from_shared(
            SENSITIVE_HEADERS.into(),
        ));

    let state = AppState::from_config(&config).await?;
    let app = router(state).layer(middleware_stack);

    let listener = TcpListener::bind(config.listen_addr())
        .await
        .map_err(HttpServerError::BindFailed)?;

    tracing::info!(addr = ?config.listen_addr(), "server listening");
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async move { let _ = shutdown_rx.changed().await; })
        .await
        .map_err(HttpServerError::ServingFailed)?;

    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum HttpServerError {
    #[error("unable to bind to the listen address: {0}")]
    BindFailed(std::io::Error),

    #[error("an error occurred running the HTTP server: {0}")]
    ServingFailed(std::io::Error),

    #[error("state initialization failed: {0}")]
    StateInitializationFailed(#[from] Error),
}
