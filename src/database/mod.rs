use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::health_check::{DataSource, DataSourceError};

mod sqlite;

/// Shared handle to the backing store for the catalog and ping log.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl DataSource for Database {
    async fn is_ready(&self) -> Result<(), DataSourceError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|err| {
                tracing::warn!("database readiness probe failed: {err}");
                DataSourceError::DependencyFailure
            })?;

        Ok(())
    }
}

/// Connects to the SQLite database at `db_url` and brings its schema up to date.
pub async fn connect(db_url: &str) -> Result<Database, DatabaseSetupError> {
    if !db_url.starts_with("sqlite:") {
        return Err(DatabaseSetupError::UnsupportedUrl(db_url.to_string()));
    }

    let pool = sqlite::configure_pool(db_url).await?;
    tracing::info!("database connected and migrated");

    Ok(Database { pool })
}

#[derive(Debug, thiserror::Error)]
pub enum DatabaseSetupError {
    #[error("provided database url wasn't valid: {0}")]
    BadUrl(sqlx::Error),

    #[error("failed to get a connection to the database: {0}")]
    DatabaseUnavailable(sqlx::Error),

    #[error("unable to run pending migrations: {0}")]
    MigrationFailed(sqlx::migrate::MigrateError),

    #[error("only sqlite databases are supported, got '{0}'")]
    UnsupportedUrl(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_database_is_migrated_and_ready() {
        let database = connect("sqlite::memory:").await.unwrap();

        database.is_ready().await.unwrap();

        let tables: Vec<(String,)> =
            sqlx::query_as("SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE '\\_%' ESCAPE '\\' ORDER BY name")
                .fetch_all(database.pool())
                .await
                .unwrap();

        let names: Vec<&str> = tables.iter().map(|(name,)| name.as_str()).collect();
        assert_eq!(names, vec!["games", "status_checks"]);
    }

    #[tokio::test]
    async fn test_other_databases_are_refused() {
        let result = connect("postgres://localhost/catalog").await;
        assert!(matches!(result, Err(DatabaseSetupError::UnsupportedUrl(_))));
    }
}
