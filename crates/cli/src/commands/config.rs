use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use blockbot_core::config::{AppConfig, LoadOptions};
use secrecy::ExposeSecret;
use toml::Value;

/// One rendered setting: dotted key, displayed value, and the env vars that can set it.
struct Entry {
    key: &'static str,
    value: String,
    env_keys: &'static [&'static str],
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let file_path = detect_config_path();
    let file_doc = file_path.as_deref().and_then(load_config_file_doc);

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for entry in entries(&config) {
        let source = field_source(&entry, file_doc.as_ref(), file_path.as_deref());
        lines.push(format!("- {} = {} (source: {source})", entry.key, entry.value));
    }

    lines.join("\n")
}

fn entries(config: &AppConfig) -> Vec<Entry> {
    vec![
        Entry {
            key: "database.url",
            value: config.database.url.clone(),
            env_keys: &["BLOCKBOT_DATABASE_URL"],
        },
        Entry {
            key: "database.max_connections",
            value: config.database.max_connections.to_string(),
            env_keys: &["BLOCKBOT_DATABASE_MAX_CONNECTIONS"],
        },
        Entry {
            key: "database.timeout_secs",
            value: config.database.timeout_secs.to_string(),
            env_keys: &["BLOCKBOT_DATABASE_TIMEOUT_SECS"],
        },
        Entry {
            key: "slack.webhook_token",
            value: redact_token(config.slack.webhook_token.expose_secret()),
            env_keys: &["BLOCKBOT_SLACK_WEBHOOK_TOKEN", "OUTGOING_WEBHOOK_TOKEN"],
        },
        Entry {
            key: "slack.trigger_word",
            value: config.slack.trigger_word.clone(),
            env_keys: &["BLOCKBOT_SLACK_TRIGGER_WORD"],
        },
        Entry {
            key: "bot.username",
            value: config.bot.username.clone().unwrap_or_else(|| "<unset>".to_string()),
            env_keys: &["BLOCKBOT_BOT_USERNAME", "BOT_USERNAME"],
        },
        Entry {
            key: "bot.icon_emoji",
            value: config.bot.icon_emoji.clone().unwrap_or_else(|| "<unset>".to_string()),
            env_keys: &["BLOCKBOT_BOT_ICON", "BOT_ICON"],
        },
        Entry {
            key: "server.bind_address",
            value: config.server.bind_address.clone(),
            env_keys: &["BLOCKBOT_SERVER_BIND_ADDRESS"],
        },
        Entry {
            key: "server.port",
            value: config.server.port.to_string(),
            env_keys: &["BLOCKBOT_SERVER_PORT"],
        },
        Entry {
            key: "server.health_check_port",
            value: config.server.health_check_port.to_string(),
            env_keys: &["BLOCKBOT_SERVER_HEALTH_CHECK_PORT"],
        },
        Entry {
            key: "logging.level",
            value: config.logging.level.clone(),
            env_keys: &["BLOCKBOT_LOGGING_LEVEL", "BLOCKBOT_LOG_LEVEL"],
        },
        Entry {
            key: "logging.format",
            value: format!("{:?}", config.logging.format),
            env_keys: &["BLOCKBOT_LOGGING_FORMAT", "BLOCKBOT_LOG_FORMAT"],
        },
    ]
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("blockbot.toml"), PathBuf::from("config/blockbot.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: &Path) -> Option<Value> {
    fs::read_to_string(path).ok()?.parse::<Value>().ok()
}

fn field_source(entry: &Entry, file_doc: Option<&Value>, file_path: Option<&Path>) -> String {
    let from_env = entry
        .env_keys
        .iter()
        .find(|key| env::var(key).map(|value| !value.trim().is_empty()).unwrap_or(false));
    if let Some(env_key) = from_env {
        return format!("env ({env_key})");
    }

    if let Some(doc) = file_doc {
        if contains_path(doc, entry.key) {
            let file_path = file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    key_path
        .split('.')
        .try_fold(root, |current, key| current.get(key))
        .is_some()
}

/// Keeps the first two characters so operators can tell tokens apart.
fn redact_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    let visible: String = trimmed.chars().take(2).collect();
    format!("{visible}***")
}
