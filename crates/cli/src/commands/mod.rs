pub mod config;
pub mod migrate;
pub mod status;
pub mod totals;

use blockbot_core::config::{AppConfig, LoadOptions};
use blockbot_db::{connect, migrations, BlockStore, DbPool, SqlKeyValueStore};
use serde::Serialize;
use std::sync::Arc;
use tokio::runtime::Runtime;

pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_RUNTIME: u8 = 3;
pub const EXIT_STORE_CONNECT: u8 = 4;
pub const EXIT_MIGRATION: u8 = 5;
pub const EXIT_STORE_READ: u8 = 6;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Loaded config plus a runtime for commands that talk to the store.
pub(crate) struct StoreSession {
    pub runtime: Runtime,
    pub config: AppConfig,
}

impl StoreSession {
    pub fn open(command: &str) -> Result<Self, CommandResult> {
        let config = AppConfig::load(LoadOptions::default()).map_err(|error| {
            CommandResult::failure(
                command,
                "config_validation",
                format!("configuration issue: {error}"),
                EXIT_CONFIG,
            )
        })?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|error| {
                CommandResult::failure(
                    command,
                    "runtime_init",
                    format!("failed to initialize async runtime: {error}"),
                    EXIT_RUNTIME,
                )
            })?;

        Ok(Self { runtime, config })
    }

    /// Connects and migrates, so reads work against a fresh database too.
    pub async fn connect_blocks(
        &self,
        command: &str,
    ) -> Result<(DbPool, BlockStore), CommandResult> {
        let pool = connect(&self.config.database).await.map_err(|error| {
            CommandResult::failure(command, "store_connectivity", error.to_string(), EXIT_STORE_CONNECT)
        })?;
        migrations::run_pending(&pool).await.map_err(|error| {
            CommandResult::failure(command, "migration", error.to_string(), EXIT_MIGRATION)
        })?;

        let blocks = BlockStore::new(Arc::new(SqlKeyValueStore::new(pool.clone())));
        Ok((pool, blocks))
    }
}
