use std::sync::Arc;

use axum::extract::FromRef;

use crate::app::{Config, Error};
use crate::catalog::Catalog;
use crate::database::{self, Database};
use crate::health_check::DynDataSource;
use crate::proxy::ProxyService;
use crate::status::PingLog;

#[derive(Clone)]
pub struct AppState {
    database: Database,
    proxy: ProxyService,
}

impl AppState {
    // not implemented as a From trait so it can be async
    pub async fn from_config(config: &Config) -> Result<Self, Error> {
        let database = database::connect(config.db_url()).await?;
        let proxy = ProxyService::from_config(config.fetch().clone())?;

        Ok(Self::new(database, proxy))
    }

    pub fn new(database: Database, proxy: ProxyService) -> Self {
        Self { database, proxy }
    }
}

impl FromRef<AppState> for Catalog {
    fn from_ref(state: &AppState) -> Self {
        Catalog::new(state.database.clone())
    }
}

impl FromRef<AppState> for Database {
    fn from_ref(state: &AppState) -> Self {
        state.database.clone()
    }
}

impl FromRef<AppState> for DynDataSource {
    fn from_ref(state: &AppState) -> Self {
        Arc::new(state.database.clone())
    }
}

impl FromRef<AppState> for PingLog {
    fn from_ref(state: &AppState) -> Self {
        PingLog::new(state.database.clone())
    }
}

impl FromRef<AppState> for ProxyService {
    fn from_ref(state: &AppState) -> Self {
        state.proxy.clone()
    }
}
