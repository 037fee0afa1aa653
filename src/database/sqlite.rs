use std::str::FromStr;

use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous};

use crate::database::DatabaseSetupError;

static MIGRATOR: Migrator = sqlx::migrate!("migrations/sqlite");

/// Pool size used for file backed databases.
const MAX_FILE_CONNECTIONS: u32 = 8;

pub(super) async fn configure_pool(url: &str) -> Result<SqlitePool, DatabaseSetupError> {
    let connection_options = SqliteConnectOptions::from_str(url)
        .map_err(DatabaseSetupError::BadUrl)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .statement_cache_capacity(250)
        .synchronous(SqliteSynchronous::Normal);

    // Every connection to an in-memory database gets its own empty database, so those pools are
    // pinned to a single connection that is never recycled.
    let pool_options = if is_memory_url(url) {
        SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(MAX_FILE_CONNECTIONS)
    };

    let pool = pool_options
        .connect_with(connection_options)
        .await
        .map_err(DatabaseSetupError::DatabaseUnavailable)?;

    MIGRATOR
        .run(&pool)
        .await
        .map_err(DatabaseSetupError::MigrationFailed)?;

    Ok(pool)
}

fn is_memory_url(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}
