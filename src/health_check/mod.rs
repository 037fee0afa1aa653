use axum::routing::get;
use axum::Router;

use crate::app::AppState;

mod liveness_check;
mod readiness_check;
mod version;

pub use readiness_check::{DataSource, DataSourceError, DynDataSource};

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/healthz", get(liveness_check::handler))
        .route("/readyz", get(readiness_check::handler))
        .route("/version", get(version::handler))
        .with_state(state)
}
