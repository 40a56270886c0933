use std::time::Duration;

use blockbot_core::config::DatabaseConfig;
use sqlx::sqlite::SqlitePoolOptions;

pub type DbPool = sqlx::SqlitePool;

const IN_MEMORY_URL: &str = "sqlite::memory:";
const IN_MEMORY_CONNECTIONS: u32 = 2;

pub async fn connect(config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    connect_with_settings(&config.url, config.max_connections, config.timeout_secs).await
}

pub async fn connect_with_settings(
    database_url: &str,
    max_connections: u32,
    timeout_secs: u64,
) -> Result<DbPool, sqlx::Error> {
    // `:memory:` is accepted by config validation but sqlx wants the URL form.
    let database_url = if database_url == ":memory:" { IN_MEMORY_URL } else { database_url };

    let options = SqlitePoolOptions::new()
        .acquire_timeout(Duration::from_secs(timeout_secs.max(1)))
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                sqlx::query("PRAGMA journal_mode = WAL").execute(&mut *conn).await?;
                sqlx::query("PRAGMA busy_timeout = 5000").execute(&mut *conn).await?;
                Ok(())
            })
        });

    // The pool's in-memory database lives only while one of its connections
    // is open, so those connections are never reaped.
    let options = if database_url.starts_with(IN_MEMORY_URL) {
        options
            .max_connections(IN_MEMORY_CONNECTIONS)
            .min_connections(IN_MEMORY_CONNECTIONS)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        options.max_connections(max_connections.max(1))
    };

    options.connect(database_url).await
}

pub async fn ping(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(pool).await.map(|_| ())
}
