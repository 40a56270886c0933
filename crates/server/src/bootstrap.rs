use std::sync::Arc;

use blockbot_core::clock::{Clock, SystemClock};
use blockbot_core::config::{AppConfig, ConfigError, LoadOptions};
use blockbot_db::{connect, migrations, BlockStore, DbPool, SqlKeyValueStore};
use thiserror::Error;
use tracing::info;

use crate::tracker::BlockTracker;
use crate::webhook::WebhookState;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub webhook: WebhookState<BlockTracker>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    bootstrap_with_clock(config, Arc::new(SystemClock)).await
}

pub async fn bootstrap_with_clock(
    config: AppConfig,
    clock: Arc<dyn Clock>,
) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool = connect(&config.database).await.map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "block store connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "block store migrations applied"
    );

    let blocks = BlockStore::new(Arc::new(SqlKeyValueStore::new(db_pool.clone())));
    let webhook = WebhookState::new(
        BlockTracker::new(blocks, clock),
        config.slack.clone(),
        config.bot.clone(),
    );

    Ok(Application { config, db_pool, webhook })
}
